use thiserror::Error;

/// Everything a cutter or one of its collaborators can fail with.
///
/// End of stream is deliberately absent: it is reported through
/// [`crate::types::SegmentOutcome`].
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unsupported stream: PAT describes {0} programs, exactly one is supported")]
    MultiProgram(usize),

    #[error("Unsupported stream: table on PID 0x{0:04X} spans more than one packet")]
    MultiPacketTable(u16),

    #[error("Unsupported stream: ADTS frame carries {0} raw data blocks")]
    MultiBlockFrame(u8),

    #[error("No elementary streams found in PMT on PID 0x{0:04X}")]
    NoElementaryStreams(u16),

    #[error("Malformed table: {0}")]
    MalformedTable(String),
}

pub type Result<T> = std::result::Result<T, SegmentError>;
