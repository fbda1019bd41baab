//! CLI command implementations.

mod analyze;
mod config;
mod doctor;
mod schedule;
mod search;
mod summarize;
mod transcribe;

pub use analyze::run_analyze;
pub use config::run_config;
pub use doctor::run_doctor;
pub use schedule::run_schedule;
pub use search::run_search;
pub use summarize::run_summarize;
pub use transcribe::run_transcribe;
