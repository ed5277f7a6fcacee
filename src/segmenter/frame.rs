//! Shared loop for codecs framed by self-describing headers

use std::io::{Read, Write};
use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::error::Result;
use crate::parsers::{read_full, shift_in};
use crate::segmenter::clock::FracClock;
use crate::segmenter::Segmenter;
use crate::types::SegmentOutcome;

/// Largest header any frame format reads up front
const MAX_HEADER: usize = 8;

/// Size and duration of one frame, derived from its header alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Whole frame length, header included
    pub length: usize,
    pub samples: u64,
    pub sample_rate: u32,
}

/// A frame-based codec the [`FrameCutter`] can walk.
pub trait FrameFormat {
    const NAME: &'static str;
    const HEADER_SIZE: usize;
    /// Clock unit: a common multiple of every sample rate `parse` can return
    const FRAC_SECOND: u64;

    /// `Ok(None)` when `header` is not a valid frame header (lost sync);
    /// `Err` for a valid header this cutter refuses to handle.
    fn parse(header: &[u8]) -> Result<Option<FrameInfo>>;
}

/// Copies whole frames until the target duration is reached.
#[derive(Debug)]
pub struct FrameCutter<F: FrameFormat> {
    clock: FracClock,
    frame: Vec<u8>,
    _format: PhantomData<F>,
}

impl<F: FrameFormat> FrameCutter<F> {
    pub fn new(length: u64) -> Self {
        Self {
            clock: FracClock::new(F::FRAC_SECOND, length),
            frame: Vec::new(),
            _format: PhantomData,
        }
    }

    /// Reads the next header, scanning forward byte by byte past garbage.
    /// Skipped bytes are dropped. `Ok(None)` at end of stream.
    fn next_header(&mut self, input: &mut dyn Read) -> Result<Option<FrameInfo>> {
        let mut buf = [0u8; MAX_HEADER];
        let header = &mut buf[..F::HEADER_SIZE];
        if read_full(input, header)? < F::HEADER_SIZE {
            return Ok(None);
        }

        let mut skipped = 0u64;
        loop {
            if let Some(info) = F::parse(header)? {
                if skipped > 0 {
                    warn!("{}: lost sync, skipped {skipped} bytes", F::NAME);
                }
                self.frame.clear();
                self.frame.extend_from_slice(header);
                return Ok(Some(info));
            }
            if !shift_in(input, header)? {
                warn!("{}: lost sync, {skipped} bytes skipped before end of stream", F::NAME);
                return Ok(None);
            }
            skipped += 1;
        }
    }
}

impl<F: FrameFormat> Segmenter for FrameCutter<F> {
    fn copy_segment(&mut self, input: &mut dyn Read, output: &mut dyn Write) -> Result<SegmentOutcome> {
        while !self.clock.reached() {
            let Some(info) = self.next_header(input)? else {
                return Ok(SegmentOutcome::end_of_stream(self.clock.seconds()));
            };

            self.frame.resize(info.length, 0);
            let body = &mut self.frame[F::HEADER_SIZE..];
            let want = body.len();
            if read_full(input, body)? < want {
                debug!("{}: dropping frame truncated by end of stream", F::NAME);
                return Ok(SegmentOutcome::end_of_stream(self.clock.seconds()));
            }
            output.write_all(&self.frame)?;

            let ticks = self.clock.ticks_for(info.samples, info.sample_rate);
            self.clock.advance(ticks);
        }

        let seconds = self.clock.cut();
        debug!("{}: segment closed at {seconds}s, residual {} ticks", F::NAME, self.clock.residual_ticks());
        Ok(SegmentOutcome::cut(seconds))
    }
}
