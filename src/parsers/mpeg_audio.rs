//! MPEG audio (MP1/MP2/MP3) frame header parser

use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::constants::MPEG_AUDIO_HEADER_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    V2_5,
    V2,
    V1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    I,
    II,
    III,
}

/// Bitrates in kbit/s: [MPEG-1 | MPEG-2/2.5][layer I, II, III][index]
const BITRATES: [[[u16; 16]; 3]; 2] = [
    [
        [0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448, 0],
        [0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384, 0],
        [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0],
    ],
    [
        [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256, 0],
        [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0],
        [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0],
    ],
];

/// Sample rates in Hz per version, index 3 reserved
const SAMPLE_RATES: [[u32; 3]; 3] = [
    [11025, 12000, 8000],
    [22050, 24000, 16000],
    [44100, 48000, 32000],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MpegAudioHeader {
    pub version: MpegVersion,
    pub layer: Layer,
    pub bitrate_kbps: u32,
    pub sample_rate: u32,
    pub padding: bool,
    pub channels: u8,
}

impl MpegAudioHeader {
    /// Whole frame length in bytes, header included
    pub fn frame_length(&self) -> usize {
        let bitrate = self.bitrate_kbps * 1000;
        let pad = u32::from(self.padding);
        let len = match (self.layer, self.version) {
            (Layer::I, _) => (12 * bitrate / self.sample_rate + pad) * 4,
            (Layer::II, _) | (Layer::III, MpegVersion::V1) => 144 * bitrate / self.sample_rate + pad,
            (Layer::III, _) => 72 * bitrate / self.sample_rate + pad,
        };
        len as usize
    }

    /// PCM samples represented by one frame
    pub fn samples(&self) -> u64 {
        match (self.layer, self.version) {
            (Layer::I, _) => 384,
            (Layer::II, _) | (Layer::III, MpegVersion::V1) => 1152,
            (Layer::III, _) => 576,
        }
    }
}

/// Parse a 4-byte MPEG audio frame header.
///
/// Reserved version or layer, free-format or invalid bitrate and reserved
/// sample-rate index all yield `None`: the cutter cannot size such a frame.
pub fn parse_mpeg_audio_header(data: &[u8]) -> Option<MpegAudioHeader> {
    if data.len() < MPEG_AUDIO_HEADER_SIZE {
        return None;
    }
    let mut br = BitReader::endian(data, BigEndian);

    let sync = br.read::<11, u16>().ok()?;
    if sync != 0x7FF {
        return None;
    }
    let version = match br.read::<2, u8>().ok()? {
        0b00 => MpegVersion::V2_5,
        0b10 => MpegVersion::V2,
        0b11 => MpegVersion::V1,
        _ => return None,
    };
    let layer = match br.read::<2, u8>().ok()? {
        0b01 => Layer::III,
        0b10 => Layer::II,
        0b11 => Layer::I,
        _ => return None,
    };
    let _protection = br.read_bit().ok()?;
    let bitrate_idx = br.read::<4, u8>().ok()? as usize;
    let sr_idx = br.read::<2, u8>().ok()? as usize;
    let padding = br.read_bit().ok()?;
    let _private = br.read_bit().ok()?;
    let channel_mode = br.read::<2, u8>().ok()?;

    let family = usize::from(version != MpegVersion::V1);
    let layer_idx = match layer {
        Layer::I => 0,
        Layer::II => 1,
        Layer::III => 2,
    };
    let bitrate_kbps = u32::from(BITRATES[family][layer_idx][bitrate_idx]);
    if bitrate_kbps == 0 {
        return None;
    }
    let version_idx = match version {
        MpegVersion::V2_5 => 0,
        MpegVersion::V2 => 1,
        MpegVersion::V1 => 2,
    };
    let sample_rate = *SAMPLE_RATES[version_idx].get(sr_idx)?;

    Some(MpegAudioHeader {
        version,
        layer,
        bitrate_kbps,
        sample_rate,
        padding,
        channels: if channel_mode == 0b11 { 1 } else { 2 },
    })
}
