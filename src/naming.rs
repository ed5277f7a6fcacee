//! Output and key file names from `?` patterns

use crate::constants::NAME_WILDCARD;
use crate::error::{Result, SegmentError};

/// Which value fills the wildcard run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFill {
    /// Sequence number in lower-case hex, as wide as the wildcard run
    Sequence,
    /// Current Unix time in seconds
    Timestamp,
}

/// A pattern such as `out-?????.ts`, split around its first wildcard run
#[derive(Debug, Clone)]
pub struct NamePattern {
    prefix: String,
    suffix: String,
    digits: usize,
    fill: NameFill,
}

impl NamePattern {
    pub fn new(pattern: &str, fill: NameFill) -> Result<Self> {
        let start = pattern.find(NAME_WILDCARD).ok_or_else(|| {
            SegmentError::Config(format!(
                "Pattern \"{pattern}\" does not contain wildcard character \"{NAME_WILDCARD}\""
            ))
        })?;
        let rest = &pattern[start..];
        let digits = rest.len() - rest.trim_start_matches(NAME_WILDCARD).len();
        Ok(Self {
            prefix: pattern[..start].to_string(),
            suffix: pattern[start + digits..].to_string(),
            digits,
            fill,
        })
    }

    pub fn name(&self, seq: u64) -> String {
        let middle = match self.fill {
            NameFill::Sequence => {
                let hex = format!("{seq:0width$x}", width = self.digits);
                hex[hex.len() - self.digits..].to_string()
            }
            NameFill::Timestamp => chrono::Utc::now().timestamp().to_string(),
        };
        format!("{}{middle}{}", self.prefix, self.suffix)
    }
}
