//! Turns the agent's final text into an [`AgentOutputRecord`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Section labels, in the order the agent is asked to answer.
pub const SECTION_LABELS: [&str; 4] = ["Executive Summary", "Action Items", "Calendar", "Web Search"];

/// Structured outcome of analyzing one call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutputRecord {
    pub summary: String,
    pub action_items: Vec<String>,
    pub calendar: String,
    pub web_search: String,
}

impl AgentOutputRecord {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.action_items.is_empty()
            && self.calendar.is_empty()
            && self.web_search.is_empty()
    }
}

/// Renders the record back in the labeled-section layout the agent answers in.
impl fmt::Display for AgentOutputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Executive Summary: {}", self.summary)?;
        writeln!(f, "Action Items:")?;
        for item in &self.action_items {
            writeln!(f, "- {}", item)?;
        }
        writeln!(f, "Calendar: {}", self.calendar)?;
        write!(f, "Web Search: {}", self.web_search)
    }
}

/// Parse the agent's final response.
///
/// A JSON object (bare, or inside a fenced block) is read directly; anything
/// else goes through the labeled-section parser.
pub fn parse_response(text: &str) -> AgentOutputRecord {
    parse_structured(text).unwrap_or_else(|| parse_sections(text))
}

/// Parse `Label: ...` sections.
///
/// Each present label's value runs to the nearest later occurrence of any
/// other label. Absent labels leave their field empty.
pub fn parse_sections(text: &str) -> AgentOutputRecord {
    let mut record = AgentOutputRecord::default();

    for label in SECTION_LABELS {
        let marker = format!("{}:", label);
        let Some(pos) = text.find(&marker) else {
            continue;
        };
        let start = pos + marker.len();
        let rest = &text[start..];

        let end = SECTION_LABELS
            .iter()
            .filter(|other| **other != label)
            .filter_map(|other| rest.find(&format!("{}:", other)))
            .min()
            .unwrap_or(rest.len());
        let value = rest[..end].trim();

        match label {
            "Executive Summary" => record.summary = value.to_string(),
            "Action Items" => record.action_items = split_action_items(value),
            "Calendar" => record.calendar = value.to_string(),
            _ => record.web_search = value.to_string(),
        }
    }

    record
}

/// Split an action item block into one entry per non-blank line.
///
/// Leading `-`, `*`, `•` bullets and `1.` / `1)` numbering are removed.
pub fn split_action_items(block: &str) -> Vec<String> {
    block
        .lines()
        .map(strip_list_marker)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
    {
        return rest.trim();
    }
    if line == "-" || line == "*" || line == "•" {
        return "";
    }

    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim();
        }
    }
    line
}

#[derive(Deserialize)]
struct StructuredResponse {
    #[serde(alias = "executive_summary")]
    summary: Value,
    #[serde(default)]
    action_items: Value,
    #[serde(default)]
    calendar: Value,
    #[serde(default)]
    web_search: Value,
}

/// Read a JSON object answer, if the text holds one.
pub fn parse_structured(text: &str) -> Option<AgentOutputRecord> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    // Only a bare object or a fenced block counts; braces in prose do not.
    let before = text[..start].trim();
    if !(before.is_empty() || before.ends_with("```json") || before.ends_with("```")) {
        return None;
    }

    let response: StructuredResponse = serde_json::from_str(&text[start..=end]).ok()?;

    let action_items = match response.action_items {
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .flat_map(|item| split_action_items(&item))
            .collect(),
        other => split_action_items(&value_text(&other)),
    };

    Some(AgentOutputRecord {
        summary: value_text(&response.summary),
        action_items,
        calendar: value_text(&response.calendar),
        web_search: value_text(&response.web_search),
    })
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = "Executive Summary: Acme wants a CRM pilot for 20 seats.
Action Items:
- Send pricing sheet
- Book technical demo
Calendar: Event created: https://calendar.google.com/event?eid=abc
Web Search: Acme CRM review: https://example.com/acme";

    #[test]
    fn test_all_four_sections() {
        let record = parse_sections(FULL_RESPONSE);
        assert_eq!(record.summary, "Acme wants a CRM pilot for 20 seats.");
        assert_eq!(record.action_items, vec!["Send pricing sheet", "Book technical demo"]);
        assert_eq!(
            record.calendar,
            "Event created: https://calendar.google.com/event?eid=abc"
        );
        assert_eq!(record.web_search, "Acme CRM review: https://example.com/acme");
    }

    #[test]
    fn test_missing_section_recovers_others() {
        let text = "Executive Summary: Quick intro call.\nCalendar: nothing scheduled\nWeb Search: none";
        let record = parse_sections(text);
        assert_eq!(record.summary, "Quick intro call.");
        assert!(record.action_items.is_empty());
        assert_eq!(record.calendar, "nothing scheduled");
        assert_eq!(record.web_search, "none");
    }

    #[test]
    fn test_sections_out_of_order() {
        let text = "Web Search: No results found.\nExecutive Summary: Renewal talk.";
        let record = parse_sections(text);
        assert_eq!(record.summary, "Renewal talk.");
        assert_eq!(record.web_search, "No results found.");
    }

    #[test]
    fn test_no_labels_gives_empty_record() {
        assert!(parse_response("I could not analyze this call.").is_empty());
    }

    #[test]
    fn test_action_item_bullets() {
        assert_eq!(
            split_action_items("- Call back Monday\n- Send pricing sheet\n"),
            vec!["Call back Monday", "Send pricing sheet"]
        );
        assert_eq!(
            split_action_items("1. Draft proposal\n\n2) Loop in legal\n* Share deck"),
            vec!["Draft proposal", "Loop in legal", "Share deck"]
        );
    }

    #[test]
    fn test_reparse_is_noop() {
        let record = parse_sections(FULL_RESPONSE);
        assert_eq!(parse_sections(&record.to_string()), record);

        let items = split_action_items("- Call back Monday\n- Send pricing sheet");
        assert_eq!(split_action_items(&items.join("\n")), items);
    }

    #[test]
    fn test_structured_json_response() {
        let text = r#"```json
{"executive_summary": "Pilot agreed.", "action_items": ["Send contract", "- Schedule kickoff"], "calendar": "Event created: https://calendar.google.com/e", "web_search": ["A: https://a.example", "B: https://b.example"]}
```"#;
        let record = parse_response(text);
        assert_eq!(record.summary, "Pilot agreed.");
        assert_eq!(record.action_items, vec!["Send contract", "Schedule kickoff"]);
        assert_eq!(record.calendar, "Event created: https://calendar.google.com/e");
        assert_eq!(record.web_search, "A: https://a.example\nB: https://b.example");
    }

    #[test]
    fn test_braces_in_prose_use_section_parser() {
        let text = "Executive Summary: They asked about {custom fields}.\nCalendar: none";
        let record = parse_response(text);
        assert_eq!(record.summary, "They asked about {custom fields}.");
        assert_eq!(record.calendar, "none");
    }

    #[test]
    fn test_json_without_summary_falls_back() {
        assert!(parse_structured(r#"{"calendar": "x"}"#).is_none());
    }
}
