use crate::constants::PAT_PID;
use crate::error::{Result, SegmentError};
use crate::psi::section::Section;

const PAT_TABLE_ID: u8 = 0x00;

#[derive(Clone, Debug)]
pub struct PatSection {
    pub version: u8,
    pub crc_ok: bool,
    /// Program entries; the network PID entry (program 0) is left out
    pub programs: Vec<PatEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatEntry {
    pub program_number: u16,
    pub pmt_pid: u16,
}

/// Parses a PAT from the payload of a payload-unit-start packet.
pub fn parse_pat(payload: &[u8]) -> Result<PatSection> {
    let sec = Section::read(PAT_PID, payload)?;
    if sec.table_id != PAT_TABLE_ID {
        return Err(SegmentError::MalformedTable(format!("table_id 0x{:02X} on PAT PID", sec.table_id)));
    }

    let programs = sec
        .body
        .chunks_exact(4)
        .map(|e| PatEntry {
            program_number: u16::from_be_bytes([e[0], e[1]]),
            pmt_pid: u16::from_be_bytes([e[2] & 0x1F, e[3]]),
        })
        .filter(|e| e.program_number != 0)
        .collect();

    Ok(PatSection { version: sec.version, crc_ok: sec.crc_ok, programs })
}

impl PatSection {
    /// The one program this stream carries; fails for an MPTS or an empty PAT.
    pub fn single_program(&self) -> Result<&PatEntry> {
        match self.programs.as_slice() {
            [only] => Ok(only),
            other => Err(SegmentError::MultiProgram(other.len())),
        }
    }
}
