//! Scheduling: time resolution plus calendar submission.

use super::calendar::{CalendarEvent, CalendarService};
use super::datetime::{parse_iso_in, parse_natural_in};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::Url;

/// Event length when the caller gives none.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// Longest event accepted; longer requests get the default duration.
pub const MAX_DURATION_MINUTES: i64 = 7 * 24 * 60;

/// Summary used when nothing better can be derived.
pub const DEFAULT_SUMMARY: &str = "Follow-up Meeting";

/// Returned when no start time can be resolved.
pub const UNRESOLVED_TIME_MESSAGE: &str =
    "Could not determine event time from the provided information. Please specify a date and time.";

/// A scheduling request whose start time is already absolute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRequest {
    pub summary: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl ScheduleRequest {
    /// Resolve a request from loose inputs, reading wall-clock times in `tz`.
    ///
    /// With `start_time`, a strict ISO parse is tried before the lenient parser;
    /// without it, the lenient parser reads the summary itself. Returns `None`
    /// when neither yields a timestamp, or when the event would end out of range.
    /// Durations outside `1..=MAX_DURATION_MINUTES` fall back to the default.
    pub fn resolve(
        summary: &str,
        start_time: Option<&str>,
        duration_minutes: Option<i64>,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Option<Self> {
        let start = match start_time.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_iso_in(raw, tz).or_else(|| parse_natural_in(raw, now, tz)),
            None => parse_natural_in(summary, now, tz),
        }?;

        let summary = summary.trim();
        let request = Self {
            summary: if summary.is_empty() {
                DEFAULT_SUMMARY.to_string()
            } else {
                summary.to_string()
            },
            start_time: start,
            duration_minutes: duration_minutes
                .filter(|d| (1..=MAX_DURATION_MINUTES).contains(d))
                .unwrap_or(DEFAULT_DURATION_MINUTES),
        };
        request.end_time()?;
        Some(request)
    }

    /// Start plus duration, or `None` if that is not a representable instant.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
            .checked_add_signed(Duration::try_minutes(self.duration_minutes)?)
    }
}

/// Outcome of a scheduling attempt. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScheduleResult {
    Created { link: Url },
    Failed { reason: String },
}

impl ScheduleResult {
    pub fn is_created(&self) -> bool {
        matches!(self, ScheduleResult::Created { .. })
    }
}

impl fmt::Display for ScheduleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleResult::Created { link } => write!(f, "Event created: {}", link),
            ScheduleResult::Failed { reason } => f.write_str(reason),
        }
    }
}

/// Schedules events on a calendar service.
#[derive(Clone)]
pub struct Scheduler {
    calendar: Arc<dyn CalendarService>,
    timezone: Tz,
    default_duration_minutes: i64,
    fixed_now: Option<DateTime<Utc>>,
}

impl Scheduler {
    pub fn new(calendar: Arc<dyn CalendarService>) -> Self {
        Self {
            calendar,
            timezone: chrono_tz::UTC,
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            fixed_now: None,
        }
    }

    /// Set the IANA timezone that wall-clock times are read in and that events carry.
    ///
    /// Unknown names keep UTC.
    pub fn with_timezone(mut self, timezone: &str) -> Self {
        match timezone.trim().parse::<Tz>() {
            Ok(tz) => self.timezone = tz,
            Err(_) => warn!("Unknown timezone '{}', using UTC", timezone),
        }
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Set the event length used when a call gives none.
    pub fn with_default_duration(mut self, minutes: i64) -> Self {
        if (1..=MAX_DURATION_MINUTES).contains(&minutes) {
            self.default_duration_minutes = minutes;
        }
        self
    }

    /// Pin the reference time used for relative dates.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    /// Resolve the start time and create the event.
    ///
    /// The calendar service is never contacted when the time cannot be resolved.
    #[instrument(skip(self))]
    pub async fn schedule_event(
        &self,
        summary: &str,
        start_time: Option<&str>,
        duration_minutes: Option<i64>,
    ) -> ScheduleResult {
        let duration = duration_minutes
            .filter(|d| (1..=MAX_DURATION_MINUTES).contains(d))
            .unwrap_or(self.default_duration_minutes);
        let Some(request) =
            ScheduleRequest::resolve(summary, start_time, Some(duration), self.now(), self.timezone)
        else {
            warn!("No event time could be resolved");
            return ScheduleResult::Failed {
                reason: UNRESOLVED_TIME_MESSAGE.to_string(),
            };
        };

        self.submit(&request).await
    }

    /// Submit an already-resolved request.
    pub async fn submit(&self, request: &ScheduleRequest) -> ScheduleResult {
        let Some(end) = request.end_time() else {
            return ScheduleResult::Failed {
                reason: "Failed to create event: event end time is out of range".to_string(),
            };
        };
        let event = CalendarEvent {
            summary: request.summary.clone(),
            start: request.start_time,
            end,
            timezone: self.timezone.name().to_string(),
        };

        match self.calendar.create_event(&event).await {
            Ok(link) => {
                info!("Scheduled '{}' at {}", event.summary, event.start);
                ScheduleResult::Created { link }
            }
            Err(e) => {
                warn!("Calendar submission failed: {}", e);
                ScheduleResult::Failed {
                    reason: format!("Failed to create event: {}", e),
                }
            }
        }
    }
}
