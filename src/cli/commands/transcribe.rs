//! Transcribe command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::transcription::{Transcriber, WhisperTranscriber};
use anyhow::Result;
use std::path::Path;

/// Run the transcribe command.
pub async fn run_transcribe(audio: &Path, output: Option<&Path>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Analyze, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'callbrief doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let api_key = settings
        .openai_api_key()
        .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY not set"))?;
    let transcriber =
        WhisperTranscriber::new(&api_key, &settings.openai, &settings.transcription)?;

    let spinner = Output::spinner(&format!(
        "Transcribing {} with {}...",
        audio.display(),
        transcriber.model()
    ));
    let result = transcriber.transcribe(audio).await;
    spinner.finish_and_clear();

    let transcript = result.map_err(|e| {
        Output::error(&format!("{}", e));
        e
    })?;

    match output {
        Some(path) => {
            std::fs::write(path, transcript.text())?;
            Output::success(&format!(
                "Transcript ({} words) written to {}",
                transcript.word_count(),
                path.display()
            ));
        }
        None => println!("{}", transcript),
    }

    Ok(())
}
