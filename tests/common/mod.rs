//! Synthetic stream builders shared by the integration tests
#![allow(dead_code)]

use std::io::Cursor;

use hls_segmenter::psi::section_crc;
use hls_segmenter::{Segmenter, SegmentOutcome};

pub const TS: usize = 188;
pub const PMT_PID: u16 = 0x1000;
pub const VIDEO_PID: u16 = 0x100;
pub const AUDIO_PID: u16 = 0x101;
pub const NULL_PID: u16 = 0x1FFF;
pub const PCR_WRAP: u64 = 1 << 33;

/// Runs a cutter over `input` until it reports a final outcome.
pub fn segment_all(cutter: &mut dyn Segmenter, input: Vec<u8>) -> Vec<(SegmentOutcome, Vec<u8>)> {
    let mut input = Cursor::new(input);
    let mut segments = Vec::new();
    loop {
        let mut out = Vec::new();
        let outcome = cutter.copy_segment(&mut input, &mut out).unwrap();
        segments.push((outcome, out));
        if outcome.is_final() {
            return segments;
        }
        assert!(segments.len() < 10_000, "cutter never finished");
    }
}

// ── audio ──

/// One ADTS frame (AAC LC, stereo, one raw block) with `body` after the header
pub fn adts_frame(sr_index: u8, body: &[u8]) -> Vec<u8> {
    let len = (7 + body.len()) as u16;
    let mut f = vec![
        0xFF,
        0xF1,
        0x40 | (sr_index << 2),
        0x80 | ((len >> 11) as u8 & 0x03),
        (len >> 3) as u8,
        ((len & 0x07) as u8) << 5 | 0x1F,
        0xFC,
    ];
    f.extend_from_slice(body);
    f
}

/// `count` 48 kHz ADTS frames of 20 bytes each
pub fn adts_stream(count: usize) -> Vec<u8> {
    (0..count)
        .flat_map(|i| adts_frame(3, &[(i % 0x7F) as u8; 13]))
        .collect()
}

/// MPEG-1 layer III, 128 kbit/s, 48 kHz: 384 bytes, 1152 samples
pub const MP3_HEADER: [u8; 4] = [0xFF, 0xFB, 0x94, 0x64];
pub const MP3_FRAME_LEN: usize = 384;

pub fn mp3_stream(count: usize) -> Vec<u8> {
    let mut v = Vec::with_capacity(count * MP3_FRAME_LEN);
    for i in 0..count {
        v.extend_from_slice(&MP3_HEADER);
        v.extend(std::iter::repeat_n((i % 0x7F) as u8, MP3_FRAME_LEN - 4));
    }
    v
}

// ── transport stream ──

pub fn ts_packet(pid: u16, pusi: bool, pcr: Option<u64>, payload: &[u8]) -> [u8; TS] {
    let mut b = [0xFFu8; TS];
    b[0] = 0x47;
    b[1] = (u8::from(pusi) << 6) | ((pid >> 8) as u8 & 0x1F);
    b[2] = pid as u8;
    let start = match pcr {
        Some(base) => {
            b[3] = 0x30;
            b[4] = 7;
            b[5] = 0x10;
            b[6] = (base >> 25) as u8;
            b[7] = (base >> 17) as u8;
            b[8] = (base >> 9) as u8;
            b[9] = (base >> 1) as u8;
            b[10] = ((base & 1) << 7) as u8 | 0x7E;
            b[11] = 0;
            12
        }
        None => {
            b[3] = 0x10;
            4
        }
    };
    b[start..start + payload.len()].copy_from_slice(payload);
    b
}

fn psi_payload(section_wo_crc: &[u8]) -> Vec<u8> {
    let mut v = vec![0x00];
    v.extend_from_slice(section_wo_crc);
    v.extend_from_slice(&section_crc(section_wo_crc).to_be_bytes());
    v
}

pub fn pat_packet(programs: &[(u16, u16)]) -> [u8; TS] {
    let len = 5 + 4 * programs.len() + 4;
    let mut s = vec![0x00, 0xB0 | (len >> 8) as u8, len as u8, 0x00, 0x01, 0xC1, 0x00, 0x00];
    for &(pn, pid) in programs {
        s.extend_from_slice(&pn.to_be_bytes());
        s.push(0xE0 | (pid >> 8) as u8);
        s.push(pid as u8);
    }
    ts_packet(0, true, None, &psi_payload(&s))
}

pub fn pmt_packet(pmt_pid: u16, streams: &[(u8, u16)]) -> [u8; TS] {
    let len = 5 + 4 + 5 * streams.len() + 4;
    let mut s = vec![0x02, 0xB0 | (len >> 8) as u8, len as u8, 0x00, 0x01, 0xC1, 0x00, 0x00];
    s.extend_from_slice(&[0xE0 | (VIDEO_PID >> 8) as u8, VIDEO_PID as u8, 0xF0, 0x00]);
    for &(stype, pid) in streams {
        s.extend_from_slice(&[stype, 0xE0 | (pid >> 8) as u8, pid as u8, 0xF0, 0x00]);
    }
    ts_packet(pmt_pid, true, None, &psi_payload(&s))
}

/// Video PES start carrying an AUD and then either an SPS or a non-IDR slice
pub fn video_pes_start(sps: bool) -> Vec<u8> {
    let mut v = vec![0x00, 0x00, 0x01, 0xE0, 0x00, 0x00, 0x80, 0x80, 0x05, 0x21, 0x00, 0x01, 0x00, 0x01];
    v.extend_from_slice(&[0, 0, 0, 1, 0x09, 0xF0]);
    v.extend_from_slice(&[0, 0, 0, 1, if sps { 0x67 } else { 0x41 }, 0x64, 0x00, 0x1F]);
    v
}

/// Shape of a synthetic single-program stream
pub struct TsStream {
    pub frames: usize,
    /// PCR ticks between video frames
    pub frame_ticks: u64,
    /// Frames per GOP; the first frame of each GOP carries an SPS
    pub gop: usize,
    pub first_pcr: u64,
    /// Repeat PAT and PMT in front of every GOP
    pub repeat_tables: bool,
}

impl Default for TsStream {
    fn default() -> Self {
        // 5 fps, 2 s GOPs
        Self { frames: 150, frame_ticks: 18_000, gop: 10, first_pcr: 0, repeat_tables: true }
    }
}

impl TsStream {
    pub fn pat() -> [u8; TS] {
        pat_packet(&[(1, PMT_PID)])
    }

    pub fn pmt() -> [u8; TS] {
        pmt_packet(PMT_PID, &[(0x1B, VIDEO_PID), (0x0F, AUDIO_PID)])
    }

    pub fn pcr_of(&self, frame: usize) -> u64 {
        (self.first_pcr + frame as u64 * self.frame_ticks) % PCR_WRAP
    }

    /// The stream as a list of packets
    pub fn packets(&self) -> Vec<[u8; TS]> {
        let mut out = vec![Self::pat(), Self::pmt()];
        for i in 0..self.frames {
            let idr = i % self.gop == 0;
            if idr && self.repeat_tables && i > 0 {
                out.push(Self::pat());
                out.push(Self::pmt());
            }
            out.push(ts_packet(VIDEO_PID, true, Some(self.pcr_of(i)), &video_pes_start(idr)));
            out.push(ts_packet(VIDEO_PID, false, None, &[0xAB; 184]));
            out.push(ts_packet(AUDIO_PID, true, None, &[0x00, 0x00, 0x01, 0xC0, 0x00, 0x10]));
            out.push(ts_packet(NULL_PID, false, None, &[]));
        }
        out
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.packets().concat()
    }
}

pub fn pid_of(packet: &[u8]) -> u16 {
    ((packet[1] as u16 & 0x1F) << 8) | packet[2] as u16
}

pub fn pusi(packet: &[u8]) -> bool {
    packet[1] & 0x40 != 0
}
