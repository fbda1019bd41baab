//! OpenAI Whisper transcription implementation.

use super::{Transcriber, TranscriptionResult};
use crate::config::{OpenAiSettings, TranscriptionSettings};
use crate::error::{CallBriefError, Result};
use crate::openai::create_client;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Audio containers accepted by the Whisper API.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "flac", "m4a", "mp3", "mp4", "mpeg", "mpga", "oga", "ogg", "wav", "webm",
];

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    language: Option<String>,
}

impl WhisperTranscriber {
    /// Create a new Whisper transcriber.
    pub fn new(
        api_key: &str,
        openai: &OpenAiSettings,
        settings: &TranscriptionSettings,
    ) -> Result<Self> {
        Ok(Self {
            client: create_client(api_key, openai)?,
            model: settings.model.clone(),
            language: settings.language.clone(),
        })
    }

    /// The Whisper model in use.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<TranscriptionResult> {
        check_audio_path(audio_path)?;

        let file_bytes = tokio::fs::read(audio_path).await.map_err(|e| {
            CallBriefError::Transcription(format!(
                "Could not read {}: {}",
                audio_path.display(),
                e
            ))
        })?;
        debug!("Read {} bytes of audio", file_bytes.len());

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder.build().map_err(|e| {
            CallBriefError::Transcription(format!("Failed to build request: {}", e))
        })?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| CallBriefError::Transcription(format!("Whisper API error: {}", e)))?;

        let result = TranscriptionResult::new(response.text).ok_or_else(|| {
            CallBriefError::Transcription("Whisper returned an empty transcript".to_string())
        })?;

        info!("Transcribed {} words", result.word_count());
        Ok(result)
    }
}

/// Reject paths Whisper would refuse before uploading anything.
fn check_audio_path(audio_path: &Path) -> Result<()> {
    if !audio_path.is_file() {
        return Err(CallBriefError::Transcription(format!(
            "Audio file not found: {}",
            audio_path.display()
        )));
    }

    let extension = audio_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(CallBriefError::Transcription(format!(
            "Unsupported audio format '{}' (expected one of: {})",
            extension,
            SUPPORTED_EXTENSIONS.join(", ")
        )));
    }

    Ok(())
}
