//! Google Calendar adapter.
//!
//! Inserts events through the Calendar v3 REST API using an authorized-user
//! token file. The file is produced once by an interactive OAuth setup step
//! outside this crate; here it is only read and, when the access token has
//! expired, refreshed in memory.

use super::datetime::parse_iso;
use crate::config::CalendarSettings;
use crate::error::{CallBriefError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// Refresh this long before the recorded expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// An event ready to be submitted to a calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub timezone: String,
}

/// Trait for calendar services.
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Create an event and return a link to it.
    async fn create_event(&self, event: &CalendarEvent) -> Result<Url>;
}

/// Authorized-user credential file as written by Google's OAuth client libraries.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUserToken {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub expiry: Option<String>,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl AuthorizedUserToken {
    /// Read a token file from disk.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            CallBriefError::Calendar(format!(
                "Could not read calendar token {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            CallBriefError::Calendar(format!("Invalid calendar token {}: {}", path.display(), e))
        })
    }

    /// Whether the stored access token can be used as-is at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        if self.token.as_deref().map_or(true, str::is_empty) {
            return false;
        }
        match self.expiry.as_deref().and_then(parse_iso) {
            Some(expiry) => expiry - ChronoDuration::seconds(EXPIRY_MARGIN_SECS) > now,
            // No expiry recorded: trust the token and let the API reject it.
            None => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertedEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    html_link: Option<String>,
}

/// Google Calendar v3 client.
pub struct GoogleCalendar {
    client: reqwest::Client,
    token_path: PathBuf,
    calendar_id: String,
    base_url: String,
}

impl GoogleCalendar {
    /// Create a client for the calendar named in the settings.
    pub fn new(token_path: PathBuf, settings: &CalendarSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CallBriefError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token_path,
            calendar_id: settings.calendar_id.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a usable access token, refreshing it if needed.
    async fn access_token(&self) -> Result<String> {
        let token = AuthorizedUserToken::load(&self.token_path).await?;

        if token.is_fresh(Utc::now()) {
            if let Some(access) = token.token {
                return Ok(access);
            }
        }

        let (Some(refresh_token), Some(client_id), Some(client_secret)) = (
            token.refresh_token.as_deref(),
            token.client_id.as_deref(),
            token.client_secret.as_deref(),
        ) else {
            return Err(CallBriefError::Calendar(
                "Calendar token has expired and cannot be refreshed (missing refresh_token, \
                 client_id or client_secret). Re-run the OAuth setup."
                    .to_string(),
            ));
        };

        debug!("Refreshing calendar access token");
        let response = self
            .client
            .post(&token.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await
            .map_err(|e| CallBriefError::Calendar(format!("token refresh failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CallBriefError::Calendar(format!(
                "token refresh returned status {}: {}",
                status, body
            )));
        }

        let refreshed: RefreshResponse = response.json().await.map_err(|e| {
            CallBriefError::Calendar(format!("failed to parse token refresh response: {}", e))
        })?;
        Ok(refreshed.access_token)
    }

    fn events_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CallBriefError::Config(format!("Invalid calendar base_url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| CallBriefError::Config("calendar base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["calendars", self.calendar_id.as_str(), "events"]);
        Ok(url)
    }
}

#[async_trait]
impl CalendarService for GoogleCalendar {
    #[instrument(skip(self, event), fields(summary = %event.summary))]
    async fn create_event(&self, event: &CalendarEvent) -> Result<Url> {
        let access_token = self.access_token().await?;

        let body = json!({
            "summary": event.summary,
            "start": {
                "dateTime": event.start.to_rfc3339_opts(SecondsFormat::Secs, true),
                "timeZone": event.timezone,
            },
            "end": {
                "dateTime": event.end.to_rfc3339_opts(SecondsFormat::Secs, true),
                "timeZone": event.timezone,
            },
        });

        let response = self
            .client
            .post(self.events_url()?)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CallBriefError::Calendar(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CallBriefError::Calendar(format!(
                "Calendar API returned status {}: {}",
                status, body
            )));
        }

        let inserted: InsertedEvent = response
            .json()
            .await
            .map_err(|e| CallBriefError::Calendar(format!("failed to parse response: {}", e)))?;

        let link = inserted
            .html_link
            .ok_or_else(|| CallBriefError::Calendar("response had no htmlLink".to_string()))?;
        let link = Url::parse(&link)
            .map_err(|e| CallBriefError::Calendar(format!("invalid htmlLink '{}': {}", link, e)))?;

        info!(event_id = ?inserted.id, "Calendar event created");
        Ok(link)
    }
}
