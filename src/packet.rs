//! Fixed-size transport stream packet

use crate::constants::{PCR_WRAP_MASK, TS_PACKET_SIZE, TS_SYNC_BYTE};

/// One 188-byte transport packet, kept verbatim
#[derive(Clone, PartialEq, Eq)]
pub struct TsPacket {
    bytes: [u8; TS_PACKET_SIZE],
}

impl std::fmt::Debug for TsPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsPacket")
            .field("pid", &self.pid())
            .field("pusi", &self.payload_unit_start())
            .field("pcr", &self.pcr())
            .finish()
    }
}

impl TsPacket {
    pub fn new(bytes: [u8; TS_PACKET_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; TS_PACKET_SIZE] {
        &self.bytes
    }

    pub fn in_sync(&self) -> bool {
        self.bytes[0] == TS_SYNC_BYTE
    }

    pub fn pid(&self) -> u16 {
        (((self.bytes[1] & 0x1F) as u16) << 8) | (self.bytes[2] as u16)
    }

    pub fn payload_unit_start(&self) -> bool {
        self.bytes[1] & 0x40 != 0
    }

    pub fn has_adaptation_field(&self) -> bool {
        self.bytes[3] & 0x20 != 0
    }

    /// Offset of the first payload byte, past any adaptation field
    pub fn payload_offset(&self) -> usize {
        if self.has_adaptation_field() {
            4 + 1 + self.bytes[4] as usize
        } else {
            4
        }
    }

    /// Payload bytes; empty when the adaptation field fills the packet
    pub fn payload(&self) -> &[u8] {
        let start = self.payload_offset().min(TS_PACKET_SIZE);
        &self.bytes[start..]
    }

    /// 33-bit PCR base from the adaptation field, if one is carried
    pub fn pcr(&self) -> Option<u64> {
        if !self.has_adaptation_field() || self.bytes[4] == 0 || self.bytes[5] & 0x10 == 0 {
            return None;
        }
        let p = &self.bytes[6..11];
        let base = ((p[0] as u64) << 25)
            | ((p[1] as u64) << 17)
            | ((p[2] as u64) << 9)
            | ((p[3] as u64) << 1)
            | ((p[4] as u64) >> 7);
        Some(base & PCR_WRAP_MASK)
    }
}

/// Ticks elapsed from `from` to `to` on the wrapping 33-bit clock
pub fn pcr_delta(from: u64, to: u64) -> u64 {
    to.wrapping_sub(from) & PCR_WRAP_MASK
}
