//! H.264 access-unit probe used to pick transport-stream cut points

use crate::constants::{NAL_AUD, NAL_SPS_HEADER};

/// Offset of `PES_header_data_length` from the start of a PES packet
const PES_HEADER_LENGTH_OFFSET: usize = 8;
/// 4-byte Annex B start code in front of every NAL
const START_CODE_LEN: usize = 4;
/// AUD: start code, NAL header and `primary_pic_type` byte
const AUD_LEN: usize = START_CODE_LEN + 2;

/// Checks whether the PES packet beginning in `payload` opens with an SPS,
/// after an optional access unit delimiter.
///
/// This is the cut trigger for H.264 streams. An SPS usually precedes an
/// IDR picture, so it approximates "start of an IDR access unit"; it does
/// not look at slice types. Assumes 4-byte start codes.
pub fn starts_with_sps(payload: &[u8]) -> bool {
    let Some(&hdr_len) = payload.get(PES_HEADER_LENGTH_OFFSET) else {
        return false;
    };
    let mut nal = PES_HEADER_LENGTH_OFFSET + 1 + hdr_len as usize;

    if payload.get(nal + START_CODE_LEN) == Some(&NAL_AUD) {
        nal += AUD_LEN;
    }
    payload.get(nal + START_CODE_LEN) == Some(&NAL_SPS_HEADER)
}
