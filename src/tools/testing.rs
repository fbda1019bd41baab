//! In-memory tool services for tests.

use super::{CalendarEvent, CalendarService, SearchResult, WebSearch};
use crate::error::{CallBriefError, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use url::Url;

/// Link returned by [`RecordingCalendar`] for every event.
pub const TEST_EVENT_LINK: &str = "https://calendar.google.com/event?eid=test";

/// Calendar that records submitted events instead of creating them.
#[derive(Default)]
pub struct RecordingCalendar {
    events: Mutex<Vec<CalendarEvent>>,
    fail_with: Option<String>,
}

impl RecordingCalendar {
    pub fn failing(reason: &str) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub fn submitted(&self) -> Vec<CalendarEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarService for RecordingCalendar {
    async fn create_event(&self, event: &CalendarEvent) -> Result<Url> {
        self.events.lock().unwrap().push(event.clone());
        match &self.fail_with {
            Some(reason) => Err(CallBriefError::Calendar(reason.clone())),
            None => Ok(Url::parse(TEST_EVENT_LINK).unwrap()),
        }
    }
}

/// Search that returns a fixed result and records queries.
pub struct StaticSearch {
    result: SearchResult,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new(result: SearchResult) -> Self {
        Self {
            result,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for StaticSearch {
    async fn search(&self, query: &str) -> Result<SearchResult> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.result.clone())
    }
}
