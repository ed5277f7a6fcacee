//! Machine-readable per-segment records

use serde::Serialize;

use crate::types::Termination;

/// One finished segment, as printed with `--report`
#[derive(Debug, Clone, Serialize)]
pub struct SegmentRecord {
    pub sequence: u64,
    pub file: String,
    /// Whole seconds reported by the cutter
    pub duration_secs: u64,
    /// Duration written into the playlist
    pub playlist_secs: u64,
    pub bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
    pub termination: Termination,
    pub ts_time: String,
}

/// Totals for a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub segments: u64,
    pub total_secs: u64,
    pub bytes: u64,
    pub termination: Termination,
}

/// Report generator for segmenting runs
pub struct Reporter;

impl Reporter {
    pub fn json_line<T: Serialize>(record: &T) -> String {
        serde_json::to_string(record).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }
}
