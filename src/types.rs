use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Serialize;

/// How a `copy_segment` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The cut point was reached; more input follows
    Cut,
    /// The source ran dry during this call
    EndOfStream,
    /// Transport-stream sync was lost after table acquisition
    SyncLost,
}

/// Result of one `copy_segment` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOutcome {
    /// Whole seconds of media copied during the call
    pub seconds: u64,
    pub termination: Termination,
}

impl SegmentOutcome {
    pub fn cut(seconds: u64) -> Self {
        Self { seconds, termination: Termination::Cut }
    }

    pub fn end_of_stream(seconds: u64) -> Self {
        Self { seconds, termination: Termination::EndOfStream }
    }

    pub fn sync_lost(seconds: u64) -> Self {
        Self { seconds, termination: Termination::SyncLost }
    }

    /// True when the orchestrator must stop calling the cutter
    pub fn is_final(&self) -> bool {
        self.termination != Termination::Cut
    }

    /// Signed form: positive while data remains, `<= 0` once the stream is over.
    pub fn signed(&self) -> i64 {
        let secs = i64::try_from(self.seconds).unwrap_or(i64::MAX);
        if self.is_final() { -secs } else { secs }
    }
}

/// Closed set of cutters, picked once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CutterKind {
    /// Raw byte-count blocks, no codec awareness
    Fixed,
    /// AAC in ADTS framing
    Adts,
    /// MPEG-1/2/2.5 audio layers I, II and III
    MpegAudio,
    /// Single-program MPEG-TS carrying H.264
    Mpegts,
}

/// Where the source bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
    Udp(SocketAddr),
}

/// Playlist flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistMode {
    /// Every segment, closed with `#EXT-X-ENDLIST`
    Final,
    /// Sliding window of the last `window` segments
    Live { window: usize },
}

/// Configuration options for a segmenting run
#[derive(Debug, Clone)]
pub struct Options {
    pub input: InputSource,
    pub kind: CutterKind,
    pub length: u64,
    pub extra: String,
    pub output_pattern: String,
    pub timestamp_names: bool,
    pub out_prefix: String,
    pub out_suffix: String,
    pub index: PathBuf,
    pub playlist: PlaylistMode,
    /// Rotate the AES key every `n` segments; `None` disables encryption
    pub crypto_every: Option<u64>,
    pub key_pattern: String,
    pub key_prefix: String,
    pub key_suffix: String,
    /// Print a JSON line per segment on stdout
    pub report: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            input: InputSource::Stdin,
            kind: CutterKind::Mpegts,
            length: 10,
            extra: String::new(),
            output_pattern: "out-?????.ts".to_string(),
            timestamp_names: false,
            out_prefix: String::new(),
            out_suffix: String::new(),
            index: PathBuf::from("out.m3u8"),
            playlist: PlaylistMode::Final,
            crypto_every: None,
            key_pattern: "key-????.key".to_string(),
            key_prefix: String::new(),
            key_suffix: String::new(),
            report: false,
        }
    }
}
