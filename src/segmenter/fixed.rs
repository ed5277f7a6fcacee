use std::io::{Read, Write};

use tracing::debug;

use crate::constants::DEFAULT_BLOCK_SIZE;
use crate::error::{Result, SegmentError};
use crate::parsers::read_full;
use crate::segmenter::Segmenter;
use crate::types::SegmentOutcome;

/// Cuts after a fixed number of fixed-size byte blocks; one block counts
/// as one second. No codec awareness.
#[derive(Debug)]
pub struct FixedBlock {
    blocks: u64,
    buf: Vec<u8>,
}

impl FixedBlock {
    /// `extra` is the block size in bytes; empty selects the default.
    pub fn new(blocks: u64, extra: &str) -> Result<Self> {
        let extra = extra.trim();
        let block_size = if extra.is_empty() {
            DEFAULT_BLOCK_SIZE
        } else {
            extra.parse::<usize>().map_err(|_| {
                SegmentError::Config(format!("Invalid extra-options \"{extra}\": Not an integer"))
            })?
        };
        if block_size == 0 {
            return Err(SegmentError::Config("block size must be positive".into()));
        }
        Ok(Self { blocks, buf: vec![0; block_size] })
    }

    pub fn block_size(&self) -> usize {
        self.buf.len()
    }
}

impl Segmenter for FixedBlock {
    fn copy_segment(&mut self, input: &mut dyn Read, output: &mut dyn Write) -> Result<SegmentOutcome> {
        for done in 0..self.blocks {
            let n = read_full(input, &mut self.buf)?;
            output.write_all(&self.buf[..n])?;
            if n < self.buf.len() {
                debug!("fixed: end of stream after {done} blocks and {n} bytes");
                return Ok(SegmentOutcome::end_of_stream(done));
            }
        }
        Ok(SegmentOutcome::cut(self.blocks))
    }
}
