//! Data models for transcription.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Plain-text transcript of one recording.
///
/// Only constructed from non-empty text, and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranscriptionResult(String);

impl TranscriptionResult {
    /// Wrap transcript text, returning `None` if it is blank.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The transcript text.
    pub fn text(&self) -> &str {
        &self.0
    }

    /// Consume the result and return the text.
    pub fn into_text(self) -> String {
        self.0
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }
}

impl fmt::Display for TranscriptionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TranscriptionResult {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_rejected() {
        assert!(TranscriptionResult::new("").is_none());
        assert!(TranscriptionResult::new("  \n\t ").is_none());
    }

    #[test]
    fn test_text_is_trimmed() {
        let result = TranscriptionResult::new("  Hello, this is John from TechSolutions.\n").unwrap();
        assert_eq!(result.text(), "Hello, this is John from TechSolutions.");
        assert_eq!(result.word_count(), 6);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let result = TranscriptionResult::new("hi there").unwrap();
        assert_eq!(serde_json::to_string(&result).unwrap(), "\"hi there\"");
    }
}
