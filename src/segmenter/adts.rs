use crate::constants::{ADTS_FRAC_SECOND, ADTS_HEADER_SIZE, ADTS_SAMPLES_PER_FRAME};
use crate::error::{Result, SegmentError};
use crate::parsers::parse_adts_header;
use crate::segmenter::frame::{FrameCutter, FrameFormat, FrameInfo};

/// AAC audio in ADTS framing
#[derive(Debug)]
pub struct Adts;

impl FrameFormat for Adts {
    const NAME: &'static str = "ADTS";
    const HEADER_SIZE: usize = ADTS_HEADER_SIZE;
    const FRAC_SECOND: u64 = ADTS_FRAC_SECOND;

    fn parse(header: &[u8]) -> Result<Option<FrameInfo>> {
        let Some(h) = parse_adts_header(header) else {
            return Ok(None);
        };
        if h.raw_blocks != 1 {
            return Err(SegmentError::MultiBlockFrame(h.raw_blocks));
        }
        Ok(Some(FrameInfo {
            length: h.frame_length,
            samples: ADTS_SAMPLES_PER_FRAME,
            sample_rate: h.sample_rate,
        }))
    }
}

pub type AdtsCutter = FrameCutter<Adts>;
