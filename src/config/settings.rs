//! Configuration settings for callbrief.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub openai: OpenAiSettings,
    pub transcription: TranscriptionSettings,
    pub agent: AgentSettings,
    pub search: SearchSettings,
    pub calendar: CalendarSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level when no -v flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// OpenAI connection settings shared by transcription and the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    /// API key. Falls back to `OPENAI_API_KEY` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Alternative API base (for proxies or compatible servers).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout_seconds: 300,
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model to use.
    pub model: String,
    /// Optional ISO-639-1 language hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            language: None,
        }
    }
}

/// Agent (chat model) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Chat model used for analysis and tool calling.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum model turns before the run is abandoned.
    pub max_iterations: usize,
    /// Ask the model for a JSON object instead of labeled sections.
    pub structured_output: bool,
    /// TOML file overriding the instruction template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_file: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4-turbo-preview".to_string(),
            temperature: 0.7,
            max_iterations: 15,
            structured_output: false,
            prompt_file: None,
        }
    }
}

/// Web search (SerpAPI) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// SerpAPI key. Falls back to `SERPAPI_API_KEY` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// SerpAPI base URL.
    pub base_url: String,
    /// Search engine passed to SerpAPI.
    pub engine: String,
    /// Number of organic results to keep.
    pub num_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://serpapi.com".to_string(),
            engine: "google".to_string(),
            num_results: 3,
        }
    }
}

/// Google Calendar settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Authorized-user token file produced by the OAuth setup step.
    pub token_path: String,
    /// Calendar to insert events into.
    pub calendar_id: String,
    /// Calendar API base URL.
    pub base_url: String,
    /// Event length when none is given.
    pub default_duration_minutes: i64,
    /// IANA timezone that meeting times are read in and that events carry.
    pub timezone: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            token_path: "~/.config/callbrief/token.json".to_string(),
            calendar_id: "primary".to_string(),
            base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            default_duration_minutes: 30,
            timezone: "UTC".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::CallBriefError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("callbrief")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded calendar token path.
    pub fn token_path(&self) -> PathBuf {
        Self::expand_path(&self.calendar.token_path)
    }

    /// OpenAI key from the config file, else `OPENAI_API_KEY`.
    pub fn openai_api_key(&self) -> Option<String> {
        non_empty(self.openai.api_key.clone()).or_else(|| env_key("OPENAI_API_KEY"))
    }

    /// SerpAPI key from the config file, else `SERPAPI_API_KEY`.
    pub fn serpapi_api_key(&self) -> Option<String> {
        non_empty(self.search.api_key.clone()).or_else(|| env_key("SERPAPI_API_KEY"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_key(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.transcription.model, "whisper-1");
        assert_eq!(settings.agent.max_iterations, 15);
        assert_eq!(settings.search.num_results, 3);
        assert_eq!(settings.calendar.default_duration_minutes, 30);
        assert_eq!(settings.calendar.calendar_id, "primary");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [agent]
            model = "gpt-4o"

            [search]
            api_key = "serp-key"
            "#,
        )
        .unwrap();

        assert_eq!(settings.agent.model, "gpt-4o");
        assert_eq!(settings.agent.temperature, 0.7);
        assert_eq!(settings.serpapi_api_key().as_deref(), Some("serp-key"));
        assert_eq!(settings.search.engine, "google");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.calendar.calendar_id = "sales@example.com".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.calendar.calendar_id, "sales@example.com");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.agent.model, "gpt-4-turbo-preview");
    }

    #[test]
    fn test_blank_key_is_ignored() {
        let mut settings = Settings::default();
        settings.search.api_key = Some("   ".to_string());
        assert_ne!(settings.serpapi_api_key().as_deref(), Some("   "));
    }
}
