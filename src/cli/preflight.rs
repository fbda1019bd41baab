//! Pre-flight checks before expensive operations.
//!
//! Validates that required keys and credentials are available before
//! starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{CallBriefError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Transcription and analysis need the OpenAI key.
    Analyze,
    /// A standalone web search needs the SerpAPI key.
    Search,
    /// A standalone calendar event needs the token file.
    Schedule,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Analyze => check_openai_key(settings),
        Operation::Search => check_serpapi_key(settings),
        Operation::Schedule => check_calendar_token(settings),
    }
}

fn check_openai_key(settings: &Settings) -> Result<()> {
    settings.openai_api_key().map(|_| ()).ok_or_else(|| {
        CallBriefError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )
    })
}

fn check_serpapi_key(settings: &Settings) -> Result<()> {
    settings.serpapi_api_key().map(|_| ()).ok_or_else(|| {
        CallBriefError::Config(
            "SERPAPI_API_KEY not set. Set it with: export SERPAPI_API_KEY='...'".to_string(),
        )
    })
}

fn check_calendar_token(settings: &Settings) -> Result<()> {
    let path = settings.token_path();
    if path.exists() {
        Ok(())
    } else {
        Err(CallBriefError::Config(format!(
            "Calendar token not found at {}. Authorize Google Calendar access first",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_requires_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.calendar.token_path = dir.path().join("token.json").display().to_string();
        assert!(check(Operation::Schedule, &settings).is_err());

        std::fs::write(settings.token_path(), "{}").unwrap();
        assert!(check(Operation::Schedule, &settings).is_ok());
    }

    #[test]
    fn test_configured_keys_pass() {
        let mut settings = Settings::default();
        settings.openai.api_key = Some("sk-test".to_string());
        settings.search.api_key = Some("serp".to_string());
        assert!(check(Operation::Analyze, &settings).is_ok());
        assert!(check(Operation::Search, &settings).is_ok());
    }
}
