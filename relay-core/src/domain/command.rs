//! Command batch domain type

use serde::{Deserialize, Serialize};

/// Ordered command lines carried verbatim to the remote workflow
///
/// Contents are never inspected; the workflow decides what to do with them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandBatch(Vec<String>);

impl CommandBatch {
    pub fn new(commands: Vec<String>) -> Self {
        Self(commands)
    }

    /// Splits operator input into commands, one per line
    ///
    /// Both `\n` and `\r\n` terminate a line. The empty element left behind
    /// by a final line terminator is dropped; blank lines in between are kept.
    pub fn from_text(text: &str) -> Self {
        let mut commands: Vec<String> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();

        if commands.last().is_some_and(|last| last.is_empty()) {
            commands.pop();
        }

        Self(commands)
    }

    pub fn commands(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_splits_lines() {
        let batch = CommandBatch::from_text("echo hi\nls -la\n");
        assert_eq!(batch.commands(), &["echo hi", "ls -la"]);
    }

    #[test]
    fn test_from_text_handles_crlf() {
        let batch = CommandBatch::from_text("echo hi\r\nuname -a\r\n");
        assert_eq!(batch.commands(), &["echo hi", "uname -a"]);
    }

    #[test]
    fn test_from_text_keeps_interior_blank_lines() {
        let batch = CommandBatch::from_text("a\n\nb");
        assert_eq!(batch.commands(), &["a", "", "b"]);
    }

    #[test]
    fn test_from_text_empty_input() {
        assert!(CommandBatch::from_text("").is_empty());
    }

    #[test]
    fn test_serializes_as_array() {
        let batch = CommandBatch::new(vec!["echo hi".to_string()]);
        assert_eq!(serde_json::to_string(&batch).unwrap(), r#"["echo hi"]"#);
    }
}
