//! Schedule command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::build_scheduler;
use crate::tools::ScheduleResult;
use anyhow::Result;

/// Run the schedule command.
pub async fn run_schedule(
    summary: &str,
    start: Option<&str>,
    duration: Option<i64>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Schedule, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'callbrief doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let scheduler = build_scheduler(&settings)?;

    let spinner = Output::spinner("Creating event...");
    let result = scheduler.schedule_event(summary, start, duration).await;
    spinner.finish_and_clear();

    match result {
        ScheduleResult::Created { .. } => {
            Output::success(&result.to_string());
            Ok(())
        }
        ScheduleResult::Failed { reason } => {
            Output::error(&reason);
            Err(anyhow::anyhow!(reason))
        }
    }
}
