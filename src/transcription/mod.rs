//! Transcription module for callbrief.
//!
//! Turns a sales call recording into plain text using OpenAI Whisper. Every
//! failure, from an unreadable file to an API error, surfaces as
//! [`CallBriefError::Transcription`](crate::error::CallBriefError::Transcription).

mod models;
mod whisper;

pub use models::TranscriptionResult;
pub use whisper::WhisperTranscriber;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file to non-empty text.
    async fn transcribe(&self, audio_path: &Path) -> Result<TranscriptionResult>;
}
