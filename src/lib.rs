// src/lib.rs
pub mod hls {
    pub use crate::report::RunSummary;
    pub use crate::types::{CutterKind, InputSource, Options, PlaylistMode};

    /// Blocking entry-point; returns once the input ends or on a fatal error
    pub fn run(opts: &Options) -> anyhow::Result<RunSummary> {
        crate::core::run(opts)
    }
}

pub mod constants;
pub mod crypto;
pub mod error;
pub mod keys;
pub mod naming;
pub mod network;
pub mod packet;
pub mod parsers;
pub mod playlist;
pub mod psi;
pub mod report;
pub mod segmenter;
pub mod types;
pub mod core;

pub use error::{Result, SegmentError};
pub use segmenter::{Cutter, Segmenter};
pub use types::{SegmentOutcome, Termination};
