//! CLI module for callbrief.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// callbrief - Sales call summaries with follow-ups
///
/// Transcribes a sales call recording, summarizes it with an LLM agent,
/// schedules any agreed meeting and researches competitors that came up.
#[derive(Parser, Debug)]
#[command(name = "callbrief")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CALLBRIEF_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe a call recording and analyze it
    Analyze {
        /// Audio file (mp3, wav, m4a, ...)
        audio: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Also write the transcript to this file
        #[arg(long)]
        transcript_out: Option<PathBuf>,
    },

    /// Transcribe a call recording only
    Transcribe {
        /// Audio file (mp3, wav, m4a, ...)
        audio: PathBuf,

        /// Write the transcript to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze an existing transcript
    Summarize {
        /// Transcript file, or '-' for stdin
        input: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Schedule a calendar event
    Schedule {
        /// What the meeting is about (may include the time, e.g. "Demo tomorrow at 3pm")
        summary: String,

        /// Start time (ISO 8601 or natural language)
        #[arg(short, long)]
        start: Option<String>,

        /// Length in minutes
        #[arg(short, long)]
        duration: Option<i64>,
    },

    /// Run a web search
    Search {
        /// Search query
        query: String,
    },

    /// Check API keys, credentials and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
