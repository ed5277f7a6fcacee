use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use hls_segmenter::hls::{CutterKind, InputSource, Options, PlaylistMode, run};
use hls_segmenter::Cutter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(about = "Splits a media stream into HLS segments and writes the index")]
struct Opt {
    /// Input file (default: stdin)
    #[clap(short, long, conflicts_with = "udp")]
    input: Option<PathBuf>,

    /// UDP socket to bind + listen (IPv4, unicast or multicast)
    #[clap(long)]
    udp: Option<SocketAddr>,

    /// Stream format
    #[clap(long, value_enum, default_value_t = CutterKind::Mpegts)]
    format: CutterKind,

    /// Segment file pattern; the run of '?' is replaced by the sequence number
    #[clap(short, long, default_value = "out-?????.ts")]
    output: String,

    /// Fill the output pattern with the Unix time instead of the sequence number
    #[clap(short, long, default_value_t = false)]
    timestamp: bool,

    /// Prefix for segment URIs in the index
    #[clap(short = 'O', long, default_value = "")]
    out_prefix: String,

    /// Suffix for segment URIs in the index
    #[clap(short = 's', long, default_value = "")]
    out_suffix: String,

    /// Target segment length in seconds
    #[clap(short, long, default_value_t = 10)]
    length: u64,

    /// Format-specific options
    #[clap(short, long, default_value = "")]
    extra: String,

    /// Index file
    #[clap(short = 'I', long, default_value = "out.m3u8")]
    index: PathBuf,

    /// Live index keeping only the last N segments
    #[clap(short = 'L', long)]
    live: Option<usize>,

    /// Encrypt segments, with a new key every N segments
    #[clap(short, long)]
    crypto: Option<u64>,

    /// Key file pattern
    #[clap(short, long, default_value = "key-????.key")]
    key: String,

    /// Prefix for key URIs in the index
    #[clap(short = 'K', long, default_value = "")]
    key_prefix: String,

    /// Suffix for key URIs in the index
    #[clap(short = 'S', long, default_value = "")]
    key_suffix: String,

    /// Print one JSON line per segment on stdout
    #[clap(long, default_value_t = false)]
    report: bool,

    /// Describe the chosen format's extra options and exit
    #[clap(long, default_value_t = false)]
    usage: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let opt = Opt::parse();
    if opt.usage {
        println!("{}", Cutter::usage(opt.format));
        return Ok(());
    }

    let input = match (opt.input, opt.udp) {
        (_, Some(addr)) => InputSource::Udp(addr),
        (Some(path), None) => InputSource::File(path),
        (None, None) => InputSource::Stdin,
    };
    let playlist = match opt.live {
        Some(window) if window > 0 => PlaylistMode::Live { window },
        Some(_) => anyhow::bail!("live window must hold at least one segment"),
        None => PlaylistMode::Final,
    };

    run(&Options {
        input,
        kind: opt.format,
        length: opt.length,
        extra: opt.extra,
        output_pattern: opt.output,
        timestamp_names: opt.timestamp,
        out_prefix: opt.out_prefix,
        out_suffix: opt.out_suffix,
        index: opt.index,
        playlist,
        crypto_every: opt.crypto,
        key_pattern: opt.key,
        key_prefix: opt.key_prefix,
        key_suffix: opt.key_suffix,
        report: opt.report,
    })?;
    Ok(())
}
