//! callbrief - Sales call summaries with automatic follow-ups
//!
//! Turns a recorded sales call into a structured brief: an executive summary,
//! action items, a scheduled follow-up meeting and competitive research.
//!
//! # Overview
//!
//! A call goes through three stages:
//! - Transcription of the recording with OpenAI Whisper
//! - An LLM agent that reads the transcript and may call two tools, a
//!   Google Calendar scheduler and a SerpAPI web search
//! - Parsing of the agent's answer into an [`report::AgentOutputRecord`],
//!   with a repair pass that schedules meetings the model only described
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `transcription` - Speech-to-text
//! - `tools` - Web search, calendar and date resolution
//! - `agent` - Tool-calling conversation loop
//! - `report` - Response parsing and calendar repair
//! - `pipeline` - Wires the stages together
//!
//! # Example
//!
//! ```rust,no_run
//! use callbrief::config::Settings;
//! use callbrief::pipeline::Pipeline;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::from_settings(&settings)?;
//!
//!     let report = pipeline.process_audio(Path::new("call.mp3")).await?;
//!     println!("{}", report.record.summary);
//!     for item in &report.record.action_items {
//!         println!("- {}", item);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod pipeline;
pub mod report;
pub mod tools;
pub mod transcription;

pub use error::{CallBriefError, Result};
