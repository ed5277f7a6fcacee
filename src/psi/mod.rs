//! Program-specific information: PAT and PMT

pub mod section;
pub mod pat;
pub mod pmt;

pub use pat::{parse_pat, PatEntry, PatSection};
pub use pmt::{parse_pmt, PmtSection, StreamInfo};
pub use section::section_crc;
