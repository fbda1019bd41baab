//! Prompt templates for callbrief.
//!
//! The agent prompts can be customized by pointing `agent.prompt_file` at a
//! TOML file with any of the fields of [`AgentPrompts`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub agent: AgentPrompts,
}

/// Prompts for the sales call agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
    /// Main instruction template. Receives `{{response_format}}` and `{{transcript}}`.
    pub instructions: String,
    /// Response format block asking for the four labeled sections.
    pub sections_format: String,
    /// Response format block asking for a JSON object.
    pub json_format: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: "You are an expert AI sales assistant. You have a Calendar tool for scheduling \
meetings and a Web Search tool for researching competitors, products and market trends. \
Call tools whenever the instructions require it, then give your final answer."
                .to_string(),

            instructions: r#"Analyze the following sales call transcription and:
1. Provide a concise executive summary
2. Extract a list of specific action items
3. If a meeting/demo/follow-up is mentioned or needed:
   - ALWAYS use the Calendar tool to schedule it
   - Format the date and time EXACTLY like this: 2025-06-26T14:00:00
   - Include a clear summary of what the meeting is about
   - Example Calendar tool usage: calendar(summary="Sales Demo Follow-up", start_time="2025-06-26T14:00:00")
4. If a competitor, product, or market trend is mentioned, use the Web Search tool to find relevant info

IMPORTANT CALENDAR INSTRUCTIONS:
- If any meeting, demo, or follow-up is discussed, you MUST schedule it
- Always use ISO 8601 format for dates (YYYY-MM-DDTHH:MM:SS)
- The Calendar section of your response should only contain the result from the Calendar tool
- Do not include any other text in the Calendar section

IMPORTANT WEB SEARCH INSTRUCTIONS:
- If you use the Web Search tool, include the search results in the Web Search section
- Format the Web Search section as a list of links and short descriptions

{{response_format}}

Here is the transcription:
{{transcript}}"#
                .to_string(),

            sections_format: r#"Return your results in this format:
Executive Summary: ...
Action Items: ...
Calendar: ...
Web Search: ..."#
                .to_string(),

            json_format: r#"Return your results as a single JSON object and nothing else:
{"executive_summary": "...", "action_items": ["...", "..."], "calendar": "...", "web_search": "..."}
Use an empty string or empty array for anything that does not apply."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, applying an optional TOML override file.
    pub fn load(prompt_file: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(file) = prompt_file {
            let path = shellexpand::tilde(file).to_string();
            let content = std::fs::read_to_string(&path)?;
            prompts.agent = toml::from_str(&content)?;
        }

        Ok(prompts)
    }

    /// Build the user instruction for a transcript.
    pub fn agent_instruction(&self, transcript: &str, structured: bool) -> String {
        let format = if structured {
            &self.agent.json_format
        } else {
            &self.agent.sections_format
        };

        let mut vars = HashMap::new();
        vars.insert("response_format".to_string(), format.clone());
        Self::render(&self.agent.instructions, &vars)
            // The transcript goes in last so its own braces are never treated as variables.
            .replace("{{transcript}}", transcript)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.agent.system.is_empty());
        assert!(prompts.agent.instructions.contains("{{transcript}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_instruction_lists_sections_in_order() {
        let prompt = Prompts::default().agent_instruction("We talked pricing.", false);
        let positions: Vec<usize> = ["Executive Summary:", "Action Items:", "Calendar:", "Web Search:"]
            .iter()
            .map(|label| prompt.find(label).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.ends_with("We talked pricing."));
        assert!(prompt.contains("2025-06-26T14:00:00"));
    }

    #[test]
    fn test_structured_instruction_asks_for_json() {
        let prompt = Prompts::default().agent_instruction("hi", true);
        assert!(prompt.contains("\"action_items\""));
        assert!(!prompt.contains("{{response_format}}"));
    }

    #[test]
    fn test_transcript_braces_left_alone() {
        let prompt = Prompts::default()
            .agent_instruction("they said {{response_format}} out loud", false);
        assert!(prompt.contains("they said {{response_format}} out loud"));
    }

    #[test]
    fn test_load_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(&path, "system = \"Be brief.\"\n").unwrap();

        let prompts = Prompts::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(prompts.agent.system, "Be brief.");
        // Unspecified fields keep their defaults.
        assert!(prompts.agent.instructions.contains("{{transcript}}"));
    }
}
