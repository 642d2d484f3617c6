//! Output block domain type

use std::borrow::Cow;

use crate::extract::strip_log_timestamp;

/// Command output captured between the start and end marker lines of a
/// log entry
///
/// The bytes are exactly what the log held between the two marker lines;
/// neither marker line nor its timestamp is included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBlock {
    entry: String,
    bytes: Vec<u8>,
}

impl OutputBlock {
    pub fn new(entry: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            entry: entry.into(),
            bytes,
        }
    }

    /// Name of the archive entry the block was found in
    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Text for terminal display
    ///
    /// Drops the timestamp the CI system prefixes to every log line and the
    /// trailing line break.
    pub fn display_text(&self) -> String {
        self.to_text()
            .lines()
            .map(strip_log_timestamp)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
