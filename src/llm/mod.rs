//! LLM provider access.
//!
//! Conversation and wire types for OpenAI-compatible chat completions, the
//! [`LlmClient`] seam the planner talks through, and the Groq-backed client.

mod groq;

pub use groq::GroqClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code the provider uses for models it no longer serves.
pub const MODEL_DECOMMISSIONED_CODE: &str = "model_decommissioned";

/// Message role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool call emitted by the assistant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

/// Name and JSON-encoded arguments of a requested function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

/// One message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content.into())
    }

    /// Assistant message as it goes back into the conversation.
    pub fn assistant(reply: &AssistantReply) -> Self {
        match reply {
            AssistantReply::Content(text) => Self::plain(Role::Assistant, text.clone()),
            AssistantReply::ToolCalls { content, calls } => Self {
                role: Role::Assistant,
                content: content.clone(),
                tool_calls: Some(calls.clone()),
                tool_call_id: None,
                name: None,
            },
        }
    }

    /// Tool result answering the call with `tool_call_id`.
    pub fn tool_result(tool_call_id: &str, name: &str, content: String) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.to_string()),
            name: Some(name.to_string()),
        }
    }

    fn plain(role: Role, content: String) -> Self {
        Self {
            role,
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }
}

/// Ordered, append-only message history shared by both provider calls.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Content of the most recent assistant message.
    pub fn last_assistant_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .and_then(|m| m.content.as_deref())
    }
}

/// Function tool definition in the provider's schema format.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    pub fn function(name: &str, description: &str, parameters: serde_json::Value) -> Self {
        Self {
            tool_type: "function",
            function: FunctionDefinition {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }
}

/// Chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<&'static str>,
    pub temperature: f32,
}

impl<'a> ChatRequest<'a> {
    /// Request that offers `tools` with the choice left to the model.
    pub fn with_tools(
        model: &'a str,
        messages: &'a [ChatMessage],
        tools: &'a [ToolDefinition],
        temperature: f32,
    ) -> Self {
        Self {
            model,
            messages,
            tools: Some(tools),
            tool_choice: Some("auto"),
            temperature,
        }
    }

    /// Request without any tools on offer.
    pub fn without_tools(model: &'a str, messages: &'a [ChatMessage], temperature: f32) -> Self {
        Self {
            model,
            messages,
            tools: None,
            tool_choice: None,
            temperature,
        }
    }
}

/// The assistant's reply, decoded once at the provider boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantReply {
    /// Final text with no tool requests.
    Content(String),
    /// One or more tool requests, optionally with interim text.
    ToolCalls {
        content: Option<String>,
        calls: Vec<ToolCall>,
    },
}

impl AssistantReply {
    /// Decode a raw assistant message.
    pub fn from_message(message: ChatMessage) -> Result<Self, LlmError> {
        match message.tool_calls {
            Some(calls) if !calls.is_empty() => Ok(Self::ToolCalls {
                content: message.content,
                calls,
            }),
            _ => message.content.map(Self::Content).ok_or_else(|| {
                LlmError::InvalidResponse(
                    "assistant message has neither content nor tool calls".to_string(),
                )
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Model '{model}' has been decommissioned. Update GROQ_MODEL with a currently served model. Error: {message}")]
    ModelDecommissioned { model: String, message: String },

    #[error("Provider API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Chat-completion provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat_completion(&self, request: &ChatRequest<'_>) -> Result<AssistantReply, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_content_only_reply() {
        let message: ChatMessage =
            serde_json::from_value(json!({"role": "assistant", "content": "Day 1: ..."})).unwrap();
        assert_eq!(
            AssistantReply::from_message(message).unwrap(),
            AssistantReply::Content("Day 1: ...".to_string())
        );
    }

    #[test]
    fn decode_tool_call_reply() {
        let message: ChatMessage = serde_json::from_value(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "get_weather", "arguments": "{\"location\":\"Paris\"}"}
            }]
        }))
        .unwrap();
        match AssistantReply::from_message(message).unwrap() {
            AssistantReply::ToolCalls { content, calls } => {
                assert!(content.is_none());
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].id, "call_1");
                assert_eq!(calls[0].function.name, "get_weather");
            }
            other => panic!("expected tool calls, got {:?}", other),
        }
    }

    #[test]
    fn empty_tool_call_list_is_treated_as_content() {
        let message: ChatMessage = serde_json::from_value(
            json!({"role": "assistant", "content": "done", "tool_calls": []}),
        )
        .unwrap();
        assert_eq!(
            AssistantReply::from_message(message).unwrap(),
            AssistantReply::Content("done".to_string())
        );
    }

    #[test]
    fn reply_without_content_or_calls_is_rejected() {
        let message: ChatMessage =
            serde_json::from_value(json!({"role": "assistant", "content": null})).unwrap();
        assert!(matches!(
            AssistantReply::from_message(message),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn tool_result_message_serializes_with_call_id_and_name() {
        let message = ChatMessage::tool_result("call_9", "web_search", "Summary: x".to_string());
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "call_9");
        assert_eq!(value["name"], "web_search");
        assert_eq!(value["content"], "Summary: x");
        assert!(value.get("tool_calls").is_none());
    }

    #[test]
    fn request_without_tools_omits_tool_fields() {
        let messages = vec![ChatMessage::user("hi")];
        let request = ChatRequest::without_tools("m", &messages, 0.7);
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("tool_choice").is_none());
        assert_eq!(value["model"], "m");
    }

    #[test]
    fn last_assistant_content_skips_tool_messages() {
        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::user("goal"));
        conversation.push(ChatMessage::assistant(&AssistantReply::Content("plan".into())));
        conversation.push(ChatMessage::tool_result("c", "get_weather", "sunny".into()));
        assert_eq!(conversation.last_assistant_content(), Some("plan"));
    }
}
