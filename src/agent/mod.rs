//! LLM agent that reads a sales call transcript and follows up with tools.
//!
//! The agent runs a conversation against a [`ChatModel`], dispatching the
//! model's tool calls to web search and calendar scheduling until the model
//! returns its final text.

mod model;
mod runner;
mod tools;

pub use model::{ChatModel, Message, ModelReply, OpenAiChatModel, ToolInvocation, ToolSpec};
pub use runner::{Agent, AgentRun, ConversationState, ToolCallRecord, DEFAULT_MAX_ITERATIONS};
pub use tools::{
    parse_tool_call, tool_definitions, ToolCall, ToolContext, CALENDAR_TOOL, WEB_SEARCH_TOOL,
};

#[cfg(test)]
pub(crate) use runner::testing;
