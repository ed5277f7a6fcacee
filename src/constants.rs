//! Constants for stream framing and duration accounting

/// MPEG-TS packet constants
pub const TS_PACKET_SIZE: usize = 188;
pub const TS_SYNC_BYTE: u8 = 0x47;

/// PAT always travels on PID 0
pub const PAT_PID: u16 = 0x0000;

/// PCR base runs at 90 kHz and wraps after 33 bits
pub const PCR_BASE_HZ: u64 = 90_000;
pub const PCR_WRAP_MASK: u64 = (1u64 << 33) - 1;

/// PMT stream types
pub const STREAM_TYPE_H264: u8 = 0x1B;

/// H.264 NAL header bytes the cut heuristic looks at
pub const NAL_AUD: u8 = 0x09;
pub const NAL_SPS_HEADER: u8 = 0x67;

/// Fractional-second units: LCM of every sample rate the parser accepts
pub const ADTS_FRAC_SECOND: u64 = 28_224_000;
pub const MPEG_AUDIO_FRAC_SECOND: u64 = 14_112_000;

/// Samples carried by a single raw ADTS data block
pub const ADTS_SAMPLES_PER_FRAME: u64 = 1024;
pub const ADTS_HEADER_SIZE: usize = 7;
pub const MPEG_AUDIO_HEADER_SIZE: usize = 4;

/// Default FixedBlock block size in bytes
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Extra option that switches the TS cutter to per-access-unit cuts
pub const IDR_OPTION: &str = "IDR";

/// AES-128 block and key size
pub const AES_BLOCK_SIZE: usize = 16;

/// Wildcard used in output and key name patterns
pub const NAME_WILDCARD: char = '?';
