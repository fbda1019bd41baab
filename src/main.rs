//! callbrief CLI entry point.

use anyhow::Result;
use callbrief::cli::{commands, Cli, Commands};
use callbrief::config::Settings;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("callbrief={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match &cli.command {
        Commands::Analyze {
            audio,
            json,
            transcript_out,
        } => {
            commands::run_analyze(audio, *json, transcript_out.as_deref(), settings).await?;
        }

        Commands::Transcribe { audio, output } => {
            commands::run_transcribe(audio, output.as_deref(), settings).await?;
        }

        Commands::Summarize { input, json } => {
            commands::run_summarize(input, *json, settings).await?;
        }

        Commands::Schedule {
            summary,
            start,
            duration,
        } => {
            commands::run_schedule(summary, start.as_deref(), *duration, settings).await?;
        }

        Commands::Search { query } => {
            commands::run_search(query, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, Some(config_path))?;
        }
    }

    Ok(())
}
