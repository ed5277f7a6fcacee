use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Read, Write},
};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::constants::AES_BLOCK_SIZE;
use crate::crypto::{AES_128_METHOD, EncryptingWriter, iv_for_sequence};
use crate::keys::{KeySource, RandomKeys};
use crate::naming::{NameFill, NamePattern};
use crate::network::UdpSource;
use crate::playlist::{KeyRef, Playlist};
use crate::report::{Reporter, RunSummary, SegmentRecord};
use crate::segmenter::{Cutter, Segmenter};
use crate::types::{InputSource, Options, SegmentOutcome, Termination};

/// Counts the bytes the cutter hands to a sink
struct CountingWriter<W: Write> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Rounds segment durations to whole seconds, carrying the rounding error
/// into the next segment.
#[derive(Debug, Default)]
pub struct DurationRounder {
    acc: f64,
}

impl DurationRounder {
    pub fn round(&mut self, seconds: f64) -> u64 {
        let exact = seconds.abs() + self.acc;
        let rounded = exact.round().max(0.0);
        self.acc = exact - rounded;
        rounded as u64
    }
}

fn open_input(source: &InputSource) -> anyhow::Result<Box<dyn Read>> {
    Ok(match source {
        InputSource::Stdin => Box::new(BufReader::new(io::stdin())),
        InputSource::File(path) => {
            let file = File::open(path).with_context(|| format!("Could not open input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        InputSource::Udp(addr) => Box::new(BufReader::new(UdpSource::bind(*addr)?)),
    })
}

/// Current key and the name of the file holding it
struct ActiveKey {
    key: [u8; AES_BLOCK_SIZE],
    file: String,
}

/// Runs one segmenting session until the input ends or a fatal error.
pub fn run(opts: &Options) -> anyhow::Result<RunSummary> {
    run_with_keys(opts, &mut RandomKeys::new())
}

/// Like [`run`], drawing encryption keys from `keys`.
pub fn run_with_keys(opts: &Options, keys: &mut dyn KeySource) -> anyhow::Result<RunSummary> {
    // Configuration errors surface before any I/O.
    let mut cutter = Cutter::new(opts.kind, opts.length, &opts.extra)?;
    let fill = if opts.timestamp_names { NameFill::Timestamp } else { NameFill::Sequence };
    let out_names = NamePattern::new(&opts.output_pattern, fill)?;
    let key_names = NamePattern::new(&opts.key_pattern, NameFill::Sequence)?;
    if opts.crypto_every == Some(0) {
        anyhow::bail!("key rotation interval must be positive");
    }

    let mut input = open_input(&opts.input)?;

    let mut playlist = Playlist::new(&opts.index, opts.length, opts.playlist)
        .with_uri_affixes(&opts.out_prefix, &opts.out_suffix)
        .with_key_affixes(&opts.key_prefix, &opts.key_suffix);
    playlist
        .begin()
        .with_context(|| format!("Could not create index file {}", opts.index.display()))?;

    let mut rounder = DurationRounder::default();
    let mut active_key: Option<ActiveKey> = None;
    let mut summary = RunSummary { segments: 0, total_secs: 0, bytes: 0, termination: Termination::EndOfStream };

    info!("Segmenting {:?} as {:?}, {} s per segment", opts.input, opts.kind, opts.length);

    loop {
        let seq = playlist.sequence();
        let name = out_names.name(seq);

        if let Some(every) = opts.crypto_every {
            if (seq - 1) % every == 0 {
                let key = keys.next_key();
                let file = key_names.name(seq);
                fs::write(&file, key).with_context(|| format!("Could not write key file {file}"))?;
                info!("New key {file} from segment {seq}");
                active_key = Some(ActiveKey { key, file });
            }
        }

        let sink = BufWriter::new(File::create(&name).with_context(|| format!("Could not create segment {name}"))?);
        let (outcome, bytes) = match &active_key {
            Some(k) => {
                let mut out = CountingWriter::new(EncryptingWriter::new(sink, &k.key, &iv_for_sequence(seq)));
                let outcome = cutter.copy_segment(&mut input, &mut out);
                let bytes = out.count;
                out.into_inner()
                    .finish()
                    .with_context(|| format!("Could not finish segment {name}"))?;
                (outcome, bytes)
            }
            None => {
                let mut out = CountingWriter::new(sink);
                let outcome = cutter.copy_segment(&mut input, &mut out);
                let bytes = out.count;
                out.flush().with_context(|| format!("Could not finish segment {name}"))?;
                (outcome, bytes)
            }
        };
        let outcome: SegmentOutcome = outcome.with_context(|| format!("Segmenting failed in {name}"))?;

        let mut duration = rounder.round(outcome.seconds as f64);
        if outcome.is_final() {
            // some players skip a last segment that looks too short
            duration += 1;
        }

        let key_ref = active_key
            .as_ref()
            .map(|k| KeyRef { method: AES_128_METHOD.to_string(), uri: k.file.clone() });
        playlist
            .add_segment(duration, &name, key_ref)
            .with_context(|| format!("Could not update index file {}", opts.index.display()))?;

        info!("Segment {name}: {} s, {bytes} bytes", outcome.seconds);
        debug!("Segment {seq} listed as {duration} s");

        if opts.report {
            let record = SegmentRecord {
                sequence: seq,
                file: name.clone(),
                duration_secs: outcome.seconds,
                playlist_secs: duration,
                bytes,
                key_file: active_key.as_ref().map(|k| k.file.clone()),
                termination: outcome.termination,
                ts_time: chrono::Utc::now().to_rfc3339(),
            };
            println!("{}", Reporter::json_line(&record));
        }

        summary.segments += 1;
        summary.total_secs += outcome.seconds;
        summary.bytes += bytes;

        if outcome.is_final() {
            if outcome.termination == Termination::SyncLost {
                warn!("Transport stream sync lost, stopping after {name}");
            }
            summary.termination = outcome.termination;
            break;
        }
    }

    playlist
        .end()
        .with_context(|| format!("Could not close index file {}", opts.index.display()))?;
    info!("Done: {} segments, {} s, {} bytes", summary.segments, summary.total_secs, summary.bytes);
    Ok(summary)
}
