//! Single-packet PSI sections with CRC-32/MPEG-2 check

use bitstream_io::{BigEndian, BitRead, BitReader};
use crc::{CRC_32_MPEG_2, Crc};

use crate::error::{Result, SegmentError};

const CRC_MPEG: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// table_id up to and including last_section_number
const LONG_HEADER_LEN: usize = 8;
const CRC_LEN: usize = 4;

/// A long-form section found at the start of a packet payload
#[derive(Debug)]
pub struct Section<'a> {
    pub table_id: u8,
    /// `transport_stream_id` for a PAT, `program_number` for a PMT
    pub table_id_ext: u16,
    pub version: u8,
    pub crc_ok: bool,
    /// Table-specific bytes between the header and the CRC
    pub body: &'a [u8],
}

impl<'a> Section<'a> {
    /// Reads the section that starts in `payload`, a packet payload with the
    /// payload-unit-start flag set.
    ///
    /// A non-zero pointer field, or a section longer than what is left of
    /// the packet, means the table spans several packets. A CRC mismatch is
    /// reported through `crc_ok`, not rejected.
    pub fn read(pid: u16, payload: &'a [u8]) -> Result<Self> {
        let (&pointer, data) = payload
            .split_first()
            .ok_or_else(|| SegmentError::MalformedTable(format!("empty payload on PID 0x{pid:04X}")))?;
        if pointer != 0 {
            return Err(SegmentError::MultiPacketTable(pid));
        }
        let short = || SegmentError::MalformedTable(format!("short section on PID 0x{pid:04X}"));
        if data.len() < LONG_HEADER_LEN {
            return Err(short());
        }

        let mut br = BitReader::endian(data, BigEndian);
        let table_id = br.read::<8, u8>().map_err(|_| short())?;
        br.skip(4).map_err(|_| short())?;
        let section_length = br.read::<12, u16>().map_err(|_| short())? as usize;
        let table_id_ext = br.read::<16, u16>().map_err(|_| short())?;
        br.skip(2).map_err(|_| short())?;
        let version = br.read::<5, u8>().map_err(|_| short())?;

        if section_length < LONG_HEADER_LEN - 3 + CRC_LEN {
            return Err(SegmentError::MalformedTable(format!(
                "section_length {section_length} on PID 0x{pid:04X}"
            )));
        }
        let end = 3 + section_length;
        let Some(section) = data.get(..end) else {
            return Err(SegmentError::MultiPacketTable(pid));
        };

        let (covered, crc) = section.split_at(end - CRC_LEN);
        let stored = u32::from_be_bytes([crc[0], crc[1], crc[2], crc[3]]);

        Ok(Self {
            table_id,
            table_id_ext,
            version,
            crc_ok: CRC_MPEG.checksum(covered) == stored,
            body: &covered[LONG_HEADER_LEN..],
        })
    }
}

/// CRC-32/MPEG-2 over a section, as stored in its last four bytes
pub fn section_crc(section: &[u8]) -> u32 {
    CRC_MPEG.checksum(section)
}
