//! Transport stream cutter aligned on H.264 access units
//!
//! Parses PAT and PMT once, then copies the program's packets into
//! segments, cutting only where a video PES starts with an SPS once the
//! PCR says enough time went by. PAT and PMT are repeated at the head of
//! every later segment so each one decodes on its own.

use std::collections::BTreeSet;
use std::io::{Read, Write};

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::constants::{
    IDR_OPTION, PAT_PID, PCR_BASE_HZ, PCR_WRAP_MASK, STREAM_TYPE_H264, TS_PACKET_SIZE, TS_SYNC_BYTE,
};
use crate::error::{Result, SegmentError};
use crate::packet::{TsPacket, pcr_delta};
use crate::parsers::{read_full, starts_with_sps};
use crate::psi::{parse_pat, parse_pmt};
use crate::segmenter::Segmenter;
use crate::types::SegmentOutcome;

/// Everything learned from PAT and PMT. Immutable once built.
#[derive(Debug, Clone)]
pub struct Program {
    pub pmt_pid: u16,
    /// Elementary PIDs copied into every segment
    pub carried: BTreeSet<u16>,
    pub h264_pid: Option<u16>,
    pat: Bytes,
    pmt: Bytes,
}

impl Program {
    fn copies(&self, pid: u16) -> bool {
        pid == PAT_PID || pid == self.pmt_pid || self.carried.contains(&pid)
    }

    pub fn pat_packet(&self) -> &[u8] {
        &self.pat
    }

    pub fn pmt_packet(&self) -> &[u8] {
        &self.pmt
    }
}

#[derive(Debug)]
enum State {
    AwaitingPat,
    AwaitingPmt { pmt_pid: u16, pat: Bytes },
    Streaming(Program),
}

/// What happens to one packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Drop,
    Copy,
    /// Close the segment; the packet opens the next one
    Cut,
}

enum PacketRead {
    Packet(TsPacket),
    Eof,
    SyncLost,
}

#[derive(Debug)]
pub struct MpegtsH264 {
    pcr_length: u64,
    per_access_unit: bool,
    state: State,
    pending: Option<TsPacket>,
    /// Nominal start of the current segment on the PCR timeline
    cut_start: Option<u64>,
    last_pcr: Option<u64>,
}

impl MpegtsH264 {
    /// `extra` may be `IDR` to cut at every access unit regardless of time.
    pub fn new(length: u64, extra: &str) -> Result<Self> {
        let per_access_unit = match extra.trim() {
            "" => false,
            IDR_OPTION => true,
            other => {
                return Err(SegmentError::Config(format!(
                    "Invalid extra-options \"{other}\": expected \"{IDR_OPTION}\" or nothing"
                )));
            }
        };
        if per_access_unit {
            info!("Splitting every IDR, ignoring timing");
        }
        Ok(Self {
            pcr_length: length * PCR_BASE_HZ,
            per_access_unit,
            state: State::AwaitingPat,
            pending: None,
            cut_start: None,
            last_pcr: None,
        })
    }

    /// The program, once PAT and PMT have been captured
    pub fn program(&self) -> Option<&Program> {
        match &self.state {
            State::Streaming(program) => Some(program),
            _ => None,
        }
    }

    fn acquiring(&self) -> bool {
        !matches!(self.state, State::Streaming(_))
    }

    /// Reads one packet. While tables are still being acquired a bad sync
    /// byte triggers a forward scan for the next 0x47; afterwards it is
    /// reported to the caller.
    fn read_packet(&self, input: &mut dyn Read) -> Result<PacketRead> {
        let mut bytes = [0u8; TS_PACKET_SIZE];
        if read_full(input, &mut bytes)? < TS_PACKET_SIZE {
            return Ok(PacketRead::Eof);
        }
        let packet = TsPacket::new(bytes);
        if packet.in_sync() {
            return Ok(PacketRead::Packet(packet));
        }
        if !self.acquiring() {
            return Ok(PacketRead::SyncLost);
        }

        let mut skipped = 0usize;
        loop {
            match bytes[1..].iter().position(|&b| b == TS_SYNC_BYTE) {
                Some(pos) => {
                    let off = pos + 1;
                    skipped += off;
                    bytes.copy_within(off.., 0);
                    let tail = TS_PACKET_SIZE - off;
                    if read_full(input, &mut bytes[tail..])? < off {
                        return Ok(PacketRead::Eof);
                    }
                }
                None => {
                    skipped += TS_PACKET_SIZE;
                    if read_full(input, &mut bytes)? < TS_PACKET_SIZE {
                        return Ok(PacketRead::Eof);
                    }
                }
            }
            if bytes[0] == TS_SYNC_BYTE {
                warn!("Lost TS-sync, skipped {skipped} bytes");
                return Ok(PacketRead::Packet(TsPacket::new(bytes)));
            }
        }
    }

    fn on_pat(&mut self, packet: &TsPacket) -> Result<Decision> {
        if packet.pid() != PAT_PID || !packet.payload_unit_start() {
            return Ok(Decision::Drop);
        }
        let pat = parse_pat(packet.payload())?;
        if !pat.crc_ok {
            warn!("PAT CRC mismatch, using it anyway");
        }
        let pmt_pid = pat.single_program()?.pmt_pid;
        info!("Parsed PAT, using PMT PID {pmt_pid}");
        self.state = State::AwaitingPmt {
            pmt_pid,
            pat: Bytes::copy_from_slice(packet.as_bytes()),
        };
        Ok(Decision::Copy)
    }

    fn on_pmt(&mut self, packet: &TsPacket, pmt_pid: u16, pat: Bytes) -> Result<Decision> {
        if packet.pid() != pmt_pid || !packet.payload_unit_start() {
            self.state = State::AwaitingPmt { pmt_pid, pat };
            return Ok(Decision::Drop);
        }
        let pmt = parse_pmt(pmt_pid, packet.payload())?;
        if !pmt.crc_ok {
            warn!("PMT CRC mismatch, using it anyway");
        }
        if pmt.streams.is_empty() {
            return Err(SegmentError::NoElementaryStreams(pmt_pid));
        }

        let carried: BTreeSet<u16> = pmt.streams.iter().map(|s| s.elementary_pid).collect();
        let h264_pid = pmt
            .streams
            .iter()
            .filter(|s| s.stream_type == STREAM_TYPE_H264)
            .map(|s| s.elementary_pid)
            .last();
        info!(?carried, ?h264_pid, pcr_pid = pmt.pcr_pid, "Parsed PMT for program {}", pmt.program_number);

        self.state = State::Streaming(Program {
            pmt_pid,
            carried,
            h264_pid,
            pat,
            pmt: Bytes::copy_from_slice(packet.as_bytes()),
        });
        Ok(Decision::Copy)
    }

    /// Streaming-phase decision. `may_cut` is false until the segment holds
    /// some media: the packet that closed the previous segment opens this
    /// one and is never a cut itself.
    fn on_stream(&self, packet: &TsPacket, may_cut: bool) -> Decision {
        let State::Streaming(program) = &self.state else {
            return Decision::Drop;
        };
        let pid = packet.pid();

        if may_cut && self.is_cut_point(program, packet) {
            return Decision::Cut;
        }
        if program.copies(pid) { Decision::Copy } else { Decision::Drop }
    }

    fn is_cut_point(&self, program: &Program, packet: &TsPacket) -> bool {
        let enough_time = self.per_access_unit
            || match (self.cut_start, self.last_pcr) {
                (Some(start), Some(pcr)) => pcr_delta(start, pcr) >= self.pcr_length,
                _ => false,
            };
        enough_time
            && program.h264_pid.is_none_or(|video| video == packet.pid())
            && packet.payload_unit_start()
            && starts_with_sps(packet.payload())
    }
}

impl Segmenter for MpegtsH264 {
    fn copy_segment(&mut self, input: &mut dyn Read, output: &mut dyn Write) -> Result<SegmentOutcome> {
        if let Some(program) = self.program() {
            output.write_all(program.pat_packet())?;
            output.write_all(program.pmt_packet())?;
        }

        let mut first_pcr: Option<u64> = None;
        let mut has_media = false;
        let elapsed = |first: Option<u64>, last: Option<u64>| match (first, last) {
            (Some(a), Some(b)) => pcr_delta(a, b) / PCR_BASE_HZ,
            _ => 0,
        };

        loop {
            let packet = match self.pending.take() {
                Some(packet) => packet,
                None => match self.read_packet(input)? {
                    PacketRead::Packet(packet) => packet,
                    PacketRead::Eof => {
                        return Ok(SegmentOutcome::end_of_stream(elapsed(first_pcr, self.last_pcr)));
                    }
                    PacketRead::SyncLost => {
                        warn!("Lost TS-sync, ending the stream");
                        return Ok(SegmentOutcome::sync_lost(elapsed(first_pcr, self.last_pcr)));
                    }
                },
            };

            let decision = match std::mem::replace(&mut self.state, State::AwaitingPat) {
                State::AwaitingPat => self.on_pat(&packet)?,
                State::AwaitingPmt { pmt_pid, pat } => self.on_pmt(&packet, pmt_pid, pat)?,
                streaming @ State::Streaming(_) => {
                    self.state = streaming;
                    if let Some(pcr) = packet.pcr() {
                        first_pcr.get_or_insert(pcr);
                        self.cut_start.get_or_insert(pcr);
                        self.last_pcr = Some(pcr);
                    }
                    let decision = self.on_stream(&packet, has_media);
                    has_media |= decision == Decision::Copy
                        && self.program().is_some_and(|p| p.carried.contains(&packet.pid()));
                    decision
                }
            };

            match decision {
                Decision::Copy => output.write_all(packet.as_bytes())?,
                Decision::Drop => {}
                Decision::Cut => {
                    debug!(pcr = ?self.last_pcr, "Cut before PID {}", packet.pid());
                    self.pending = Some(packet);
                    if let Some(start) = self.cut_start {
                        self.cut_start = Some((start + self.pcr_length) & PCR_WRAP_MASK);
                    }
                    return Ok(SegmentOutcome::cut(elapsed(first_pcr, self.last_pcr)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_option_parsing() {
        assert!(!MpegtsH264::new(10, "").unwrap().per_access_unit);
        assert!(MpegtsH264::new(10, "IDR").unwrap().per_access_unit);
        assert!(matches!(MpegtsH264::new(10, "idr"), Err(SegmentError::Config(_))));
    }

    #[test]
    fn garbage_before_first_packet_is_skipped() {
        let mut bytes = vec![0x00, 0x12, 0x34];
        let mut packet = [0xFFu8; TS_PACKET_SIZE];
        packet[0] = TS_SYNC_BYTE;
        packet[1] = 0x1F;
        packet[2] = 0xFF;
        packet[3] = 0x10;
        bytes.extend_from_slice(&packet);

        let cutter = MpegtsH264::new(10, "").unwrap();
        let mut input = std::io::Cursor::new(bytes);
        match cutter.read_packet(&mut input).unwrap() {
            PacketRead::Packet(p) => assert_eq!(p.pid(), 0x1FFF),
            _ => panic!("expected a packet after resync"),
        }
    }
}
