//! Error types for callbrief.

use thiserror::Error;

/// Library-level error type for callbrief operations.
#[derive(Error, Debug)]
pub enum CallBriefError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Failed to process transcription with agent: {0}")]
    AgentProcessing(String),

    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("Web search error: {0}")]
    Search(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CallBriefError {
    /// Whether this error aborts the whole pipeline rather than a single tool.
    pub fn is_total_failure(&self) -> bool {
        matches!(
            self,
            CallBriefError::Transcription(_)
                | CallBriefError::AgentProcessing(_)
                | CallBriefError::Config(_)
                | CallBriefError::OpenAI(_)
        )
    }
}

/// Result type alias for callbrief operations.
pub type Result<T> = std::result::Result<T, CallBriefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_message() {
        let err = CallBriefError::AgentProcessing("model timed out".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to process transcription with agent: model timed out"
        );
    }

    #[test]
    fn test_total_failure_classification() {
        assert!(CallBriefError::Transcription("x".into()).is_total_failure());
        assert!(!CallBriefError::Calendar("x".into()).is_total_failure());
        assert!(!CallBriefError::Search("x".into()).is_total_failure());
    }
}
