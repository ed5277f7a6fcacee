use crate::error::{Result, SegmentError};
use crate::psi::section::Section;

const PMT_TABLE_ID: u8 = 0x02;

#[derive(Clone, Debug)]
pub struct PmtSection {
    pub version: u8,
    pub program_number: u16,
    pub pcr_pid: u16,
    pub crc_ok: bool,
    pub streams: Vec<StreamInfo>,
}

/// One entry of the elementary stream loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamInfo {
    pub stream_type: u8,
    pub elementary_pid: u16,
}

fn pid13(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi & 0x1F, lo])
}

fn len12(hi: u8, lo: u8) -> usize {
    usize::from(u16::from_be_bytes([hi & 0x0F, lo]))
}

/// Parses a PMT carried on `pid` from the payload of a payload-unit-start
/// packet. Descriptors are skipped.
pub fn parse_pmt(pid: u16, payload: &[u8]) -> Result<PmtSection> {
    let sec = Section::read(pid, payload)?;
    if sec.table_id != PMT_TABLE_ID {
        return Err(SegmentError::MalformedTable(format!(
            "table_id 0x{:02X} on PMT PID 0x{pid:04X}",
            sec.table_id
        )));
    }
    let [pcr_hi, pcr_lo, info_hi, info_lo, ..] = *sec.body else {
        return Err(SegmentError::MalformedTable(format!("short PMT body on PID 0x{pid:04X}")));
    };

    let mut rest = sec.body.get(4 + len12(info_hi, info_lo)..).unwrap_or_default();
    let mut streams = Vec::new();
    while let [stream_type, pid_hi, pid_lo, es_hi, es_lo, tail @ ..] = rest {
        streams.push(StreamInfo { stream_type: *stream_type, elementary_pid: pid13(*pid_hi, *pid_lo) });
        rest = tail.get(len12(*es_hi, *es_lo)..).unwrap_or_default();
    }

    Ok(PmtSection {
        version: sec.version,
        program_number: sec.table_id_ext,
        pcr_pid: pid13(pcr_hi, pcr_lo),
        crc_ok: sec.crc_ok,
        streams,
    })
}
