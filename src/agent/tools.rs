//! Tool definitions and dispatch for the sales call agent.

use super::model::ToolSpec;
use crate::error::{CallBriefError, Result};
use crate::tools::{Scheduler, WebSearch};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Function name of the calendar tool.
pub const CALENDAR_TOOL: &str = "calendar";

/// Function name of the web search tool.
pub const WEB_SEARCH_TOOL: &str = "web_search";

/// Tools the agent can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Search the web for competitor, product or market information.
    WebSearch { query: String },

    /// Schedule a meeting in the calendar.
    Calendar {
        summary: String,
        #[serde(default)]
        start_time: Option<String>,
        #[serde(default)]
        duration_minutes: Option<i64>,
    },
}

/// Tool execution context holding the adapters that are configured.
#[derive(Clone, Default)]
pub struct ToolContext {
    pub search: Option<Arc<dyn WebSearch>>,
    pub scheduler: Option<Scheduler>,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(search: Option<Arc<dyn WebSearch>>, scheduler: Option<Scheduler>) -> Self {
        Self { search, scheduler }
    }

    /// Definitions for the tools that can actually run.
    pub fn definitions(&self) -> Vec<ToolSpec> {
        tool_definitions()
            .into_iter()
            .filter(|spec| match spec.name {
                WEB_SEARCH_TOOL => self.search.is_some(),
                CALENDAR_TOOL => self.scheduler.is_some(),
                _ => false,
            })
            .collect()
    }

    /// Execute a tool call and return the observation for the model.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::WebSearch { query } => {
                let search = self.search.as_ref().ok_or_else(|| {
                    CallBriefError::Config("web search is not configured".to_string())
                })?;
                match search.search(query).await {
                    Ok(result) => Ok(result.to_string()),
                    Err(e) => {
                        warn!("Web search failed: {}", e);
                        Ok(format!("Search failed: {}", e))
                    }
                }
            }
            ToolCall::Calendar {
                summary,
                start_time,
                duration_minutes,
            } => {
                let scheduler = self.scheduler.as_ref().ok_or_else(|| {
                    CallBriefError::Config("calendar is not configured".to_string())
                })?;
                let result = scheduler
                    .schedule_event(summary, start_time.as_deref(), *duration_minutes)
                    .await;
                info!(created = result.is_created(), "calendar tool finished");
                Ok(result.to_string())
            }
        }
    }
}

/// Get function definitions for every tool the agent knows.
pub fn tool_definitions() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: WEB_SEARCH_TOOL,
            description: "Web Search: searches the web for real-time information about \
                competitors, products, or market trends. Input should be a search query.",
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            }),
        },
        ToolSpec {
            name: CALENDAR_TOOL,
            description: "Calendar: schedules a meeting or demo in Google Calendar. \
                Give the meeting summary and its date/time (ISO 8601 like \
                2025-06-26T14:00:00, or natural language).",
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "summary": {
                        "type": "string",
                        "description": "What the meeting is about"
                    },
                    "start_time": {
                        "type": "string",
                        "description": "Start time, preferably YYYY-MM-DDTHH:MM:SS"
                    },
                    "duration_minutes": {
                        "type": "integer",
                        "description": "Length of the meeting in minutes (default: 30)",
                        "default": 30
                    }
                },
                "required": ["summary"]
            }),
        },
    ]
}

/// Parse a tool call from the model's function name and argument payload.
///
/// A payload that is not a JSON object is taken as the tool's single string
/// argument (the query, or the meeting summary).
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args = match serde_json::from_str::<Value>(arguments) {
        Ok(Value::Object(map)) => Value::Object(map),
        Ok(Value::String(s)) => Value::String(s),
        _ => Value::String(arguments.trim().to_string()),
    };

    match normalize_tool_name(name).as_str() {
        WEB_SEARCH_TOOL => {
            let query = single_or_field(&args, &["query", "input"])
                .ok_or_else(|| CallBriefError::AgentProcessing("Missing 'query' argument".to_string()))?;
            Ok(ToolCall::WebSearch { query })
        }
        CALENDAR_TOOL => {
            let summary = single_or_field(&args, &["summary", "input"]).ok_or_else(|| {
                CallBriefError::AgentProcessing("Missing 'summary' argument".to_string())
            })?;
            let start_time = string_field(&args, "start_time");
            let duration_minutes = match args.get("duration_minutes") {
                Some(Value::Number(n)) => n.as_i64(),
                Some(Value::String(s)) => s.trim().parse().ok(),
                _ => None,
            };
            Ok(ToolCall::Calendar {
                summary,
                start_time,
                duration_minutes,
            })
        }
        _ => Err(CallBriefError::AgentProcessing(format!("Unknown tool: {}", name))),
    }
}

/// Map model-facing aliases ("Web Search", "schedule_event") to canonical names.
fn normalize_tool_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase().replace([' ', '-'], "_");
    match lowered.as_str() {
        "web_search" | "search" | "websearch" => WEB_SEARCH_TOOL.to_string(),
        "calendar" | "schedule_event" | "schedule" => CALENDAR_TOOL.to_string(),
        _ => lowered,
    }
}

fn single_or_field(args: &Value, keys: &[&str]) -> Option<String> {
    match args {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        _ => keys.iter().find_map(|key| string_field(args, key)),
    }
}

fn string_field(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
