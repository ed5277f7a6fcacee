//! Format-aware cutters
//!
//! Every cutter is stateful and lives for a whole run: it is called once per
//! segment against the same continuous input, with a fresh output each time.

use std::io::{Read, Write};

use crate::error::{Result, SegmentError};
use crate::types::{CutterKind, SegmentOutcome};

mod adts;
mod clock;
mod fixed;
mod frame;
mod mpeg_audio;
mod mpegts;

pub use adts::{Adts, AdtsCutter};
pub use clock::FracClock;
pub use fixed::FixedBlock;
pub use frame::{FrameCutter, FrameFormat, FrameInfo};
pub use mpeg_audio::{MpegAudio, MpegAudioCutter};
pub use mpegts::{MpegtsH264, Program};

/// Copies one segment's worth of `input` to `output`.
pub trait Segmenter {
    /// Runs until the cut point, a fatal error, or the end of `input`.
    /// The outcome carries the whole seconds copied during the call and
    /// whether more data follows.
    fn copy_segment(&mut self, input: &mut dyn Read, output: &mut dyn Write) -> Result<SegmentOutcome>;
}

/// The cutter picked for a run
#[derive(Debug)]
pub enum Cutter {
    Fixed(FixedBlock),
    Adts(AdtsCutter),
    MpegAudio(MpegAudioCutter),
    Mpegts(MpegtsH264),
}

impl Cutter {
    /// Builds the cutter for `kind`. `length` is the target segment
    /// duration in seconds; `extra` is the cutter-specific option string.
    /// Bad options fail here, before any stream I/O.
    pub fn new(kind: CutterKind, length: u64, extra: &str) -> Result<Self> {
        if length == 0 {
            return Err(SegmentError::Config("segment length must be positive".into()));
        }
        Ok(match kind {
            CutterKind::Fixed => Cutter::Fixed(FixedBlock::new(length, extra)?),
            CutterKind::Adts => Cutter::Adts(AdtsCutter::new(length)),
            CutterKind::MpegAudio => Cutter::MpegAudio(MpegAudioCutter::new(length)),
            CutterKind::Mpegts => Cutter::Mpegts(MpegtsH264::new(length, extra)?),
        })
    }

    /// Short description of the cutter and its extra options
    pub fn usage(kind: CutterKind) -> &'static str {
        match kind {
            CutterKind::Fixed => {
                "Splits on raw byte blocks; one block counts as one second.\n\
                 extra options: [block size in bytes], default 1024"
            }
            CutterKind::Adts => "Splits AAC/ADTS audio on frame boundaries. No extra options.",
            CutterKind::MpegAudio => "Splits MPEG audio (MP1/MP2/MP3) on frame boundaries. No extra options.",
            CutterKind::Mpegts => {
                "Splits an MPEG-TS on PES starts, parsing PAT and PMT to find the streams.\n\
                 For H.264 it only cuts before an SPS (IDR frame).\n\
                 extra options: [IDR] to cut at every IDR frame, ignoring timing"
            }
        }
    }
}

impl Segmenter for Cutter {
    fn copy_segment(&mut self, input: &mut dyn Read, output: &mut dyn Write) -> Result<SegmentOutcome> {
        match self {
            Cutter::Fixed(c) => c.copy_segment(input, output),
            Cutter::Adts(c) => c.copy_segment(input, output),
            Cutter::MpegAudio(c) => c.copy_segment(input, output),
            Cutter::Mpegts(c) => c.copy_segment(input, output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_rejected() {
        assert!(matches!(Cutter::new(CutterKind::Adts, 0, ""), Err(SegmentError::Config(_))));
    }

    #[test]
    fn extra_options_checked_up_front() {
        assert!(Cutter::new(CutterKind::Fixed, 10, "12k").is_err());
        assert!(Cutter::new(CutterKind::Mpegts, 10, "everything").is_err());
        assert!(matches!(Cutter::new(CutterKind::Mpegts, 10, "IDR"), Ok(Cutter::Mpegts(_))));
        assert!(matches!(Cutter::new(CutterKind::MpegAudio, 10, ""), Ok(Cutter::MpegAudio(_))));
    }
}
