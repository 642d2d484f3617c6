//! Correlation token domain type

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier tying a dispatch to the run it produced and to the output
/// block that run writes into its logs.
///
/// One token is generated per invocation. It travels in the dispatch
/// payload, comes back in the run's display name and wraps the command
/// output as `[START-<token>]` / `[END-<token>]` marker lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationToken(Uuid);

impl CorrelationToken {
    /// Generates a fresh random (v4) token
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Marker line content opening the output block
    pub fn start_marker(&self) -> String {
        format!("[START-{}]", self.0)
    }

    /// Marker line content closing the output block
    pub fn end_marker(&self) -> String {
        format!("[END-{}]", self.0)
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
