//! Configuration module for callbrief.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, Prompts};
pub use settings::{
    AgentSettings, CalendarSettings, GeneralSettings, OpenAiSettings, SearchSettings, Settings,
    TranscriptionSettings,
};
