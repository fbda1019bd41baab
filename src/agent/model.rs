//! Chat model boundary for the agent.
//!
//! The agent talks to the model through [`ChatModel`] using its own message
//! types; [`OpenAiChatModel`] translates them to the OpenAI chat completions
//! API with function calling.

use crate::error::{CallBriefError, Result};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolChoiceOption, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, FunctionCall, FunctionObject,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    System(String),
    User(String),
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolInvocation>,
    },
    Tool {
        call_id: String,
        content: String,
    },
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    /// Raw argument payload, normally a JSON object.
    pub arguments: String,
}

/// What the model said on one turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
}

impl ModelReply {
    /// A reply with final text and no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A reply that only requests tools.
    pub fn tools(tool_calls: Vec<ToolInvocation>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }
}

/// A tool offered to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

/// Trait for chat completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one model turn over the whole conversation so far.
    async fn complete(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelReply>;
}

/// OpenAI chat completions backend.
pub struct OpenAiChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiChatModel {
    pub fn new(
        client: async_openai::Client<async_openai::config::OpenAIConfig>,
        model: &str,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature,
        }
    }

    fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
        let built: ChatCompletionRequestMessage = match message {
            Message::System(content) => ChatCompletionRequestSystemMessageArgs::default()
                .content(content.clone())
                .build()
                .map_err(|e| CallBriefError::AgentProcessing(e.to_string()))?
                .into(),
            Message::User(content) => ChatCompletionRequestUserMessageArgs::default()
                .content(content.clone())
                .build()
                .map_err(|e| CallBriefError::AgentProcessing(e.to_string()))?
                .into(),
            Message::Assistant {
                content,
                tool_calls,
            } => {
                let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                if let Some(text) = content {
                    args.content(text.clone());
                }
                if !tool_calls.is_empty() {
                    args.tool_calls(
                        tool_calls
                            .iter()
                            .map(|call| ChatCompletionMessageToolCall {
                                id: call.id.clone(),
                                r#type: ChatCompletionToolType::Function,
                                function: FunctionCall {
                                    name: call.name.clone(),
                                    arguments: call.arguments.clone(),
                                },
                            })
                            .collect::<Vec<_>>(),
                    );
                }
                args.build()
                    .map_err(|e| CallBriefError::AgentProcessing(e.to_string()))?
                    .into()
            }
            Message::Tool { call_id, content } => ChatCompletionRequestToolMessageArgs::default()
                .tool_call_id(call_id.clone())
                .content(content.clone())
                .build()
                .map_err(|e| CallBriefError::AgentProcessing(e.to_string()))?
                .into(),
        };
        Ok(built)
    }

    fn to_tool(spec: &ToolSpec) -> ChatCompletionTool {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: spec.name.to_string(),
                description: Some(spec.description.to_string()),
                parameters: Some(spec.parameters.clone()),
                strict: None,
            },
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelReply> {
        let messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature);

        // The API rejects an empty tools array.
        if !tools.is_empty() {
            request
                .tools(tools.iter().map(Self::to_tool).collect::<Vec<_>>())
                .tool_choice(ChatCompletionToolChoiceOption::Auto);
        }

        let request = request
            .build()
            .map_err(|e| CallBriefError::AgentProcessing(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| CallBriefError::OpenAI(format!("Agent API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CallBriefError::AgentProcessing("No response from model".to_string()))?;

        debug!(finish_reason = ?choice.finish_reason, "model turn complete");

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolInvocation {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(ModelReply {
            content: choice.message.content,
            tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_tool_call_message_converts() {
        let message = Message::Assistant {
            content: None,
            tool_calls: vec![ToolInvocation {
                id: "call_1".to_string(),
                name: "web_search".to_string(),
                arguments: r#"{"query": "acme"}"#.to_string(),
            }],
        };
        let converted = OpenAiChatModel::to_request_message(&message).unwrap();
        match converted {
            ChatCompletionRequestMessage::Assistant(msg) => {
                let calls = msg.tool_calls.unwrap();
                assert_eq!(calls[0].id, "call_1");
                assert_eq!(calls[0].function.name, "web_search");
            }
            other => panic!("Expected assistant message, got {:?}", other),
        }
    }

    #[test]
    fn test_tool_spec_converts() {
        let spec = ToolSpec {
            name: "calendar",
            description: "Schedules a meeting",
            parameters: serde_json::json!({"type": "object"}),
        };
        let tool = OpenAiChatModel::to_tool(&spec);
        assert_eq!(tool.function.name, "calendar");
        assert_eq!(tool.function.description.as_deref(), Some("Schedules a meeting"));
    }
}
