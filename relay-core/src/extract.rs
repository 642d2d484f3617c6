//! Token-delimited output extraction
//!
//! The remote workflow echoes `[START-<token>]` before running the commands
//! and `[END-<token>]` after them. Every log line is prefixed with a
//! timestamp, so a marker line looks like:
//!
//! ```text
//! 2024-03-01T10:00:00.1234567Z [START-1b4e28ba-2fa1-11d2-883f-0016d3cca427]
//! ```
//!
//! The step's script is echoed into the log too, which puts the marker text
//! inside longer lines (`echo "[START-...]"`). Only lines consisting of the
//! marker alone count.

use chrono::DateTime;
use thiserror::Error;
use tracing::debug;

use crate::archive::{ArchiveError, LogArchive};
use crate::domain::output::OutputBlock;
use crate::domain::token::CorrelationToken;

/// Log entries searched by default, in order: the validation step and the
/// command step of the `plan` job
pub const DEFAULT_LOG_ENTRIES: &[&str] = &["plan/5_Validate.txt", "plan/7_Command.txt"];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to find output for {token} in {searched:?}")]
    NotFound {
        token: CorrelationToken,
        searched: Vec<String>,
    },

    #[error("log entry {entry} holds {count} output blocks for {token}")]
    Ambiguous {
        entry: String,
        token: CorrelationToken,
        count: usize,
    },

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Removes the leading log timestamp (and a byte order mark) from a line
///
/// A line holding nothing but a timestamp strips to the empty string. Lines
/// without a leading RFC 3339 timestamp are returned as is.
pub fn strip_log_timestamp(line: &str) -> &str {
    let line = line.strip_prefix('\u{feff}').unwrap_or(line);
    match line.split_once(' ') {
        Some((prefix, rest)) if DateTime::parse_from_rfc3339(prefix).is_ok() => rest,
        None if DateTime::parse_from_rfc3339(line).is_ok() => "",
        _ => line,
    }
}

fn is_marker_line(line: &[u8], marker: &str) -> bool {
    match std::str::from_utf8(line) {
        Ok(text) => strip_log_timestamp(text.trim_end()) == marker,
        Err(_) => false,
    }
}

/// Finds every output block for `token` in one log
///
/// A block opens at the first start marker line and closes at the first end
/// marker line after it. A start marker without a matching end marker does
/// not produce a block.
pub fn find_blocks<'a>(log: &'a [u8], token: &CorrelationToken) -> Vec<&'a [u8]> {
    let start_marker = token.start_marker();
    let end_marker = token.end_marker();

    let mut blocks = Vec::new();
    let mut open: Option<usize> = None;
    let mut offset = 0;

    for line in log.split_inclusive(|byte| *byte == b'\n') {
        let next = offset + line.len();
        match open {
            None if is_marker_line(line, &start_marker) => open = Some(next),
            Some(begin) if is_marker_line(line, &end_marker) => {
                blocks.push(&log[begin..offset]);
                open = None;
            }
            _ => {}
        }
        offset = next;
    }

    blocks
}

/// Extracts the output block for `token` from the first listed entry that
/// contains one
///
/// Entries are searched in the given order and entries missing from the
/// archive are skipped. The winning entry must hold exactly one block.
pub fn extract_output(
    archive: &mut LogArchive,
    token: &CorrelationToken,
    entries: &[String],
) -> Result<OutputBlock, ExtractError> {
    for name in entries {
        let Some(contents) = archive.read_entry(name)? else {
            debug!(entry = %name, "Log entry not present in archive");
            continue;
        };

        let blocks = find_blocks(&contents, token);
        match blocks.as_slice() {
            [] => debug!(entry = %name, "No output markers in log entry"),
            [block] => return Ok(OutputBlock::new(name.as_str(), block.to_vec())),
            _ => {
                return Err(ExtractError::Ambiguous {
                    entry: name.clone(),
                    token: *token,
                    count: blocks.len(),
                });
            }
        }
    }

    Err(ExtractError::NotFound {
        token: *token,
        searched: entries.to_vec(),
    })
}
