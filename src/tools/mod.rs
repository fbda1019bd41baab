//! Tool adapters: web search and calendar scheduling.
//!
//! Each adapter wraps one external service behind a trait so the agent and
//! the report repair pass can be exercised without network access.
//! Expected failures (no results, unschedulable text, calendar errors) are
//! returned as data so a call summary is always produced.

mod calendar;
pub mod datetime;
mod scheduler;
mod search;

pub use calendar::{AuthorizedUserToken, CalendarEvent, CalendarService, GoogleCalendar};
pub use scheduler::{
    ScheduleRequest, ScheduleResult, Scheduler, DEFAULT_DURATION_MINUTES, DEFAULT_SUMMARY,
    MAX_DURATION_MINUTES, UNRESOLVED_TIME_MESSAGE,
};
pub use search::{SearchHit, SearchResult, SerpApiSearch, WebSearch, MAX_RESULTS};

#[cfg(test)]
pub(crate) mod testing;
