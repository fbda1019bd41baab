//! Analyze command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;
use std::path::Path;

/// Run the analyze command.
pub async fn run_analyze(
    audio: &Path,
    json: bool,
    transcript_out: Option<&Path>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Analyze, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'callbrief doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Pipeline::from_settings(&settings)?;

    let spinner = Output::spinner(&format!("Analyzing {}...", audio.display()));
    let report = match pipeline.process_audio(audio).await {
        Ok(report) => {
            spinner.finish_and_clear();
            report
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Analysis failed: {}", e));
            if e.is_total_failure() {
                Output::info("Run 'callbrief doctor' for detailed diagnostics.");
            }
            return Err(e.into());
        }
    };

    if let Some(path) = transcript_out {
        std::fs::write(path, report.transcript.text())?;
        if !json {
            Output::success(&format!("Transcript written to {}", path.display()));
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        Output::info(&format!(
            "Transcribed {} words",
            report.transcript.word_count()
        ));
        Output::transcript_preview(report.transcript.text());
        Output::record(&report.record);
    }

    Ok(())
}
