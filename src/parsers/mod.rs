//! Codec framing parsers
//!
//! Only what the cutters need to find frame and access-unit boundaries.

mod adts;
mod h264;
mod mpeg_audio;
mod utils;

pub use adts::{ADTS_SAMPLE_RATES, AdtsHeader, parse_adts_header};
pub use h264::starts_with_sps;
pub use mpeg_audio::{Layer, MpegAudioHeader, MpegVersion, parse_mpeg_audio_header};
pub use utils::{read_full, shift_in};
