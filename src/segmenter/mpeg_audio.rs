use crate::constants::{MPEG_AUDIO_FRAC_SECOND, MPEG_AUDIO_HEADER_SIZE};
use crate::error::Result;
use crate::parsers::parse_mpeg_audio_header;
use crate::segmenter::frame::{FrameCutter, FrameFormat, FrameInfo};

/// MPEG-1/2/2.5 audio, layers I to III
#[derive(Debug)]
pub struct MpegAudio;

impl FrameFormat for MpegAudio {
    const NAME: &'static str = "MPEG audio";
    const HEADER_SIZE: usize = MPEG_AUDIO_HEADER_SIZE;
    const FRAC_SECOND: u64 = MPEG_AUDIO_FRAC_SECOND;

    fn parse(header: &[u8]) -> Result<Option<FrameInfo>> {
        Ok(parse_mpeg_audio_header(header)
            .map(|h| FrameInfo {
                length: h.frame_length(),
                samples: h.samples(),
                sample_rate: h.sample_rate,
            })
            .filter(|info| info.length > MPEG_AUDIO_HEADER_SIZE))
    }
}

pub type MpegAudioCutter = FrameCutter<MpegAudio>;
