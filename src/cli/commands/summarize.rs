//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::{Context, Result};
use std::io::Read;

/// Run the summarize command on a transcript file or stdin.
pub async fn run_summarize(input: &str, json: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Analyze, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'callbrief doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let transcript = read_transcript(input)?;
    let pipeline = Pipeline::from_settings(&settings)?;

    let spinner = Output::spinner("Analyzing transcript...");
    let result = pipeline.process(&transcript).await;
    spinner.finish_and_clear();

    let record = result.map_err(|e| {
        Output::error(&format!("Analysis failed: {}", e));
        e
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        Output::record(&record);
    }

    Ok(())
}

fn read_transcript(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read transcript from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}
