//! Agent runner with tool calling loop.

use super::model::{ChatModel, Message, ModelReply, ToolInvocation};
use super::tools::{parse_tool_call, ToolContext};
use crate::config::Prompts;
use crate::error::{CallBriefError, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default bound on model turns per run.
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Where the conversation is between model turns.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationState {
    /// The next step is a model call.
    AwaitingModel,
    /// The model asked for tools; their observations go back before the next turn.
    RunningTools(Vec<ToolInvocation>),
    /// The model produced its final text.
    Done(String),
}

impl ConversationState {
    /// Transition driven by a model reply.
    pub fn after_reply(reply: &ModelReply) -> Self {
        if reply.tool_calls.is_empty() {
            ConversationState::Done(reply.content.clone().unwrap_or_default())
        } else {
            ConversationState::RunningTools(reply.tool_calls.clone())
        }
    }
}

/// Agent that reads a call transcript and uses tools to follow up on it.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolContext,
    prompts: Prompts,
    max_iterations: usize,
    structured_output: bool,
}

impl Agent {
    /// Create a new agent with the given model, tool context and prompts.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolContext, prompts: Prompts) -> Self {
        Self {
            model,
            tools,
            prompts,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            structured_output: false,
        }
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Ask the model for a JSON object instead of labeled sections.
    pub fn with_structured_output(mut self, structured: bool) -> Self {
        self.structured_output = structured;
        self
    }

    /// Run the agent over one transcript and return its final text.
    #[instrument(skip(self, transcript), fields(transcript_len = transcript.len()))]
    pub async fn run(&self, transcript: &str) -> Result<AgentRun> {
        let mut messages = vec![
            Message::System(self.prompts.agent.system.clone()),
            Message::User(
                self.prompts
                    .agent_instruction(transcript, self.structured_output),
            ),
        ];
        let tool_specs = self.tools.definitions();

        let mut state = ConversationState::AwaitingModel;
        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            state = match state {
                ConversationState::AwaitingModel => {
                    iterations += 1;
                    if iterations > self.max_iterations {
                        return Err(CallBriefError::AgentProcessing(format!(
                            "Agent exceeded maximum iterations ({})",
                            self.max_iterations
                        )));
                    }

                    debug!("Agent iteration {}", iterations);

                    let reply = self
                        .model
                        .complete(&messages, &tool_specs)
                        .await
                        .map_err(|e| match e {
                            CallBriefError::AgentProcessing(_) => e,
                            other => CallBriefError::AgentProcessing(other.to_string()),
                        })?;

                    let next = ConversationState::after_reply(&reply);
                    if let ConversationState::RunningTools(_) = next {
                        messages.push(Message::Assistant {
                            content: reply.content,
                            tool_calls: reply.tool_calls,
                        });
                    }
                    next
                }
                ConversationState::RunningTools(calls) => {
                    for call in &calls {
                        let record = self.execute_tool_call(call).await;
                        messages.push(Message::Tool {
                            call_id: call.id.clone(),
                            content: record.result.clone(),
                        });
                        tool_calls_made.push(record);
                    }
                    ConversationState::AwaitingModel
                }
                ConversationState::Done(content) => {
                    info!(
                        iterations,
                        tool_calls = tool_calls_made.len(),
                        "Agent finished"
                    );
                    return Ok(AgentRun {
                        content,
                        tool_calls: tool_calls_made,
                        iterations,
                    });
                }
            };
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, call: &ToolInvocation) -> ToolCallRecord {
        info!("Agent calling tool: {} with args: {}", call.name, call.arguments);

        let result = match parse_tool_call(&call.name, &call.arguments) {
            Ok(tool) => match self.tools.execute(&tool).await {
                Ok(output) => output,
                Err(e) => {
                    warn!("Tool {} failed: {}", call.name, e);
                    format!("Tool error: {}", e)
                }
            },
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result,
        }
    }
}

/// Result of an agent run.
#[derive(Debug)]
pub struct AgentRun {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model turns used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub name: String,
    /// Raw arguments passed to the tool.
    pub arguments: String,
    /// Observation returned to the model.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{invocation, ScriptedModel};
    use super::*;
    use crate::tools::testing::{RecordingCalendar, StaticSearch};
    use crate::tools::{Scheduler, SearchResult};
    use chrono::{TimeZone, Utc};

    fn context(calendar: Arc<RecordingCalendar>) -> ToolContext {
        let now = Utc.with_ymd_and_hms(2025, 6, 25, 10, 0, 0).unwrap();
        ToolContext::new(
            Some(Arc::new(StaticSearch::new(SearchResult::Empty))),
            Some(Scheduler::new(calendar).with_now(now)),
        )
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "web_search".to_string(),
            arguments: r#"{"query": "test"}"#.to_string(),
            result: "No results found.".to_string(),
        };
        assert_eq!(format!("{}", record), r#"web_search({"query": "test"})"#);
    }

    #[test]
    fn test_state_transition_from_reply() {
        assert_eq!(
            ConversationState::after_reply(&ModelReply::text("done")),
            ConversationState::Done("done".to_string())
        );
        let calls = vec![invocation("1", "web_search", "{}")];
        assert_eq!(
            ConversationState::after_reply(&ModelReply::tools(calls.clone())),
            ConversationState::RunningTools(calls)
        );
    }

    #[tokio::test]
    async fn test_direct_answer_without_tools() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(ModelReply::text(
            "Executive Summary: short call",
        ))]));
        let agent = Agent::new(model.clone(), ToolContext::default(), Prompts::default());

        let run = agent.run("Hi, just checking in.").await.unwrap();
        assert_eq!(run.content, "Executive Summary: short call");
        assert_eq!(run.iterations, 1);
        assert!(run.tool_calls.is_empty());

        let seen = model.seen();
        match &seen[0][1] {
            Message::User(text) => assert!(text.contains("Hi, just checking in.")),
            other => panic!("Expected user message, got {:?}", other),
        }
        assert!(model.offered()[0].is_empty());
    }

    #[tokio::test]
    async fn test_tool_observation_fed_back() {
        let calendar = Arc::new(RecordingCalendar::default());
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(ModelReply::tools(vec![invocation(
                "call_1",
                "calendar",
                r#"{"summary": "Demo", "start_time": "2025-07-02T15:00:00"}"#,
            )])),
            Ok(ModelReply::text("Calendar: Event created")),
        ]));
        let agent = Agent::new(model.clone(), context(calendar.clone()), Prompts::default());

        let run = agent.run("Let's schedule a demo").await.unwrap();
        assert_eq!(run.iterations, 2);
        assert_eq!(run.tool_calls.len(), 1);
        assert_eq!(
            run.tool_calls[0].result,
            "Event created: https://calendar.google.com/event?eid=test"
        );
        assert_eq!(calendar.submitted().len(), 1);

        let second_turn = &model.seen()[1];
        assert!(matches!(second_turn[2], Message::Assistant { .. }));
        assert_eq!(
            second_turn[3],
            Message::Tool {
                call_id: "call_1".to_string(),
                content: run.tool_calls[0].result.clone(),
            }
        );
        assert_eq!(model.offered()[0], vec!["web_search", "calendar"]);
    }

    #[tokio::test]
    async fn test_bad_tool_call_does_not_abort() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(ModelReply::tools(vec![
                invocation("a", "send_email", "{}"),
                invocation("b", "web_search", r#"{"query": "acme"}"#),
            ])),
            Ok(ModelReply::text("done")),
        ]));
        let agent = Agent::new(model, ToolContext::default(), Prompts::default());

        let run = agent.run("transcript").await.unwrap();
        assert!(run.tool_calls[0].result.starts_with("Failed to parse tool call"));
        assert!(run.tool_calls[1].result.starts_with("Tool error:"));
        assert_eq!(run.content, "done");
    }

    #[tokio::test]
    async fn test_model_failure_is_agent_error() {
        let model = Arc::new(ScriptedModel::new(vec![Err(CallBriefError::OpenAI(
            "rate limited".to_string(),
        ))]));
        let agent = Agent::new(model, ToolContext::default(), Prompts::default());

        let err = agent.run("transcript").await.unwrap_err();
        assert!(matches!(err, CallBriefError::AgentProcessing(_)));
        assert!(err
            .to_string()
            .starts_with("Failed to process transcription with agent:"));
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let looping: Vec<_> = (0..5)
            .map(|i| {
                Ok(ModelReply::tools(vec![invocation(
                    &i.to_string(),
                    "web_search",
                    r#"{"query": "again"}"#,
                )]))
            })
            .collect();
        let calendar = Arc::new(RecordingCalendar::default());
        let agent = Agent::new(
            Arc::new(ScriptedModel::new(looping)),
            context(calendar),
            Prompts::default(),
        )
        .with_max_iterations(3);

        let err = agent.run("transcript").await.unwrap_err();
        assert!(err.to_string().contains("maximum iterations (3)"));
    }
}
