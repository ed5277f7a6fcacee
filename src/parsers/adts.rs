//! ADTS (AAC) frame header parser

use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::constants::ADTS_HEADER_SIZE;

/// Sampling frequencies indexed by `sampling_frequency_index`
pub const ADTS_SAMPLE_RATES: [u32; 12] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000,
];

/// Fields of a fixed + variable ADTS header the cutter cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdtsHeader {
    pub protection_absent: bool,
    pub sample_rate: u32,
    pub channel_config: u8,
    /// Whole frame length, header included
    pub frame_length: usize,
    /// `number_of_raw_data_blocks_in_frame + 1`
    pub raw_blocks: u8,
}

/// Parse the first 7 bytes of an ADTS frame.
///
/// `None` means the bytes are not a usable header (no sync word, reserved
/// sample-rate index or a frame length shorter than the header) and the
/// caller should treat it as lost sync.
pub fn parse_adts_header(data: &[u8]) -> Option<AdtsHeader> {
    if data.len() < ADTS_HEADER_SIZE {
        return None;
    }
    let mut br = BitReader::endian(data, BigEndian);

    let sync = br.read::<12, u16>().ok()?;
    if sync != 0xFFF {
        return None;
    }
    let _id = br.read_bit().ok()?;
    let _layer = br.read::<2, u8>().ok()?;
    let protection_absent = br.read_bit().ok()?;
    let _profile = br.read::<2, u8>().ok()?;
    let sr_index = br.read::<4, u8>().ok()?;
    let _private = br.read_bit().ok()?;
    let channel_config = br.read::<3, u8>().ok()?;
    let _original_copy = br.read_bit().ok()?;
    let _home = br.read_bit().ok()?;
    let _copyright_id_bit = br.read_bit().ok()?;
    let _copyright_id_start = br.read_bit().ok()?;
    let frame_length = br.read::<13, u16>().ok()? as usize;
    let _buffer_fullness = br.read::<11, u16>().ok()?;
    let raw_blocks = br.read::<2, u8>().ok()? + 1;

    let sample_rate = *ADTS_SAMPLE_RATES.get(sr_index as usize)?;
    if frame_length < ADTS_HEADER_SIZE {
        return None;
    }

    Some(AdtsHeader {
        protection_absent,
        sample_rate,
        channel_config,
        frame_length,
        raw_blocks,
    })
}
