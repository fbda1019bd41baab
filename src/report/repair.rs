//! Calendar repair pass.
//!
//! When the model wrote a meeting time into the Calendar section instead of
//! calling the calendar tool, the event is scheduled here from that text.

use super::AgentOutputRecord;
use crate::tools::datetime::find_iso_timestamp;
use crate::tools::{Scheduler, DEFAULT_SUMMARY};
use tracing::{info, warn};

const LEADING_FILLER: &[&str] = &[
    "please", "schedule", "scheduled", "scheduling", "book", "booked", "a", "an", "the",
];

const TRAILING_FILLER: &[&str] = &[
    "for", "at", "on", "is", "was", "be", "will", "to", "set", "scheduled", "schedule", "starting",
];

/// Whether the calendar text still needs an event created for it.
pub fn needs_calendar_repair(calendar: &str) -> bool {
    let calendar = calendar.trim();
    !calendar.is_empty() && !calendar.contains("Event created:") && !calendar.contains("http")
}

/// Derive an event summary from the text that precedes the timestamp.
pub fn repair_summary(calendar: &str, timestamp: &str) -> String {
    let before = calendar.split(timestamp).next().unwrap_or_default();
    let mut words: Vec<&str> = before.split_whitespace().collect();

    while let Some(first) = words.first() {
        if is_filler(first, LEADING_FILLER) {
            words.remove(0);
        } else {
            break;
        }
    }
    while let Some(last) = words.last() {
        if is_filler(last, TRAILING_FILLER) {
            words.pop();
        } else {
            break;
        }
    }

    let summary = words
        .join(" ")
        .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_string();

    let mut chars = summary.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => DEFAULT_SUMMARY.to_string(),
    }
}

fn is_filler(word: &str, filler: &[&str]) -> bool {
    let word = word
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase();
    word.is_empty() || filler.contains(&word.as_str())
}

/// Schedule the event described in an unconfirmed calendar field.
///
/// Returns `true` when the field was replaced with a scheduling result.
/// Text with no `YYYY-MM-DDTHH:MM:SS` timestamp is left as it is.
pub async fn repair_calendar(record: &mut AgentOutputRecord, scheduler: &Scheduler) -> bool {
    if !needs_calendar_repair(&record.calendar) {
        return false;
    }

    let Some(timestamp) = find_iso_timestamp(&record.calendar) else {
        warn!("Calendar section has no timestamp, leaving it unscheduled");
        return false;
    };

    let summary = repair_summary(&record.calendar, timestamp);
    info!("Repairing calendar section: '{}' at {}", summary, timestamp);

    let result = scheduler
        .schedule_event(&summary, Some(timestamp), None)
        .await;
    record.calendar = result.to_string();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{RecordingCalendar, TEST_EVENT_LINK};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn record_with_calendar(calendar: &str) -> AgentOutputRecord {
        AgentOutputRecord {
            calendar: calendar.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_needs_repair() {
        assert!(needs_calendar_repair("Demo on 2025-07-02T15:00:00"));
        assert!(!needs_calendar_repair(""));
        assert!(!needs_calendar_repair("Event created: https://calendar.google.com/e"));
        assert!(!needs_calendar_repair("See http://cal.example/e"));
    }

    #[test]
    fn test_repair_summary() {
        assert_eq!(
            repair_summary("Schedule a demo for 2025-07-02T15:00:00", "2025-07-02T15:00:00"),
            "Demo"
        );
        assert_eq!(
            repair_summary(
                "Sales demo follow-up scheduled for 2025-06-26T14:00:00.",
                "2025-06-26T14:00:00"
            ),
            "Sales demo follow-up"
        );
        assert_eq!(
            repair_summary("2025-06-26T14:00:00", "2025-06-26T14:00:00"),
            DEFAULT_SUMMARY
        );
    }

    #[tokio::test]
    async fn test_repair_schedules_and_replaces_field() {
        let calendar = Arc::new(RecordingCalendar::default());
        let scheduler = Scheduler::new(calendar.clone());
        let mut record = record_with_calendar("Pricing review on 2025-07-02T15:00:00");

        assert!(repair_calendar(&mut record, &scheduler).await);
        assert_eq!(record.calendar, format!("Event created: {}", TEST_EVENT_LINK));

        let events = calendar.submitted();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Pricing review");
        assert_eq!(events[0].start, Utc.with_ymd_and_hms(2025, 7, 2, 15, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_confirmed_field_untouched() {
        let calendar = Arc::new(RecordingCalendar::default());
        let scheduler = Scheduler::new(calendar.clone());
        let original = "Demo booked, see https://calendar.google.com/e for 2025-07-02T15:00:00";
        let mut record = record_with_calendar(original);

        assert!(!repair_calendar(&mut record, &scheduler).await);
        assert_eq!(record.calendar, original);
        assert!(calendar.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_no_timestamp_left_alone() {
        let calendar = Arc::new(RecordingCalendar::default());
        let scheduler = Scheduler::new(calendar.clone());
        let mut record = record_with_calendar("Follow up next week about pricing");

        assert!(!repair_calendar(&mut record, &scheduler).await);
        assert_eq!(record.calendar, "Follow up next week about pricing");
        assert!(calendar.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_failed_submission_recorded() {
        let scheduler = Scheduler::new(Arc::new(RecordingCalendar::failing("token expired")));
        let mut record = record_with_calendar("Kickoff 2025-07-02T15:00:00");

        assert!(repair_calendar(&mut record, &scheduler).await);
        assert_eq!(
            record.calendar,
            "Failed to create event: Calendar error: token expired"
        );
    }
}
