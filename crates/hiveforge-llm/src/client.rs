// hiveforge-llm/src/client.rs
// ============================================================================
// Module: LLM Client Contract
// Description: The provider-agnostic chat interface every worker calls through (§6.5).
// Purpose: Let the orchestrator depend on a capability trait, not a concrete provider.
// Dependencies: async_trait, serde_json
// ============================================================================

//! ## Overview
//! "The core consumes an `LLMClient` capability (`chat(messages, tools) →
//! response`)" (§1). Concrete OpenAI/Anthropic HTTP bodies are explicitly
//! out of scope (§1 Non-goals); this module defines only the contract and a
//! deterministic in-memory stub used by tests and by callers that have not
//! wired a real provider yet.

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::error::LlmError;

/// A chat role, mirroring the OpenAI-style conversation shape §6.5 assumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The fixed system prompt.
    System,
    /// A prior user turn.
    User,
    /// A prior assistant turn.
    Assistant,
    /// A tool result turn.
    Tool,
}

/// One message in a chat request (§6.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The speaker of this turn.
    pub role: Role,
    /// The message text, absent for a pure tool-call turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// The tool call this message responds to, when `role == Tool`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool calls requested by the assistant in this turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl ChatMessage {
    /// Builds a plain-text message with no tool calls.
    #[must_use]
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: Some(content.into()), tool_call_id: None, tool_calls: Vec::new() }
    }
}

/// A tool invocation requested by the model, or the record of one already made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque id correlating this call with its eventual `Tool` response.
    pub id: String,
    /// The tool's name.
    pub name: String,
    /// The tool's arguments, as a JSON value.
    pub arguments: serde_json::Value,
}

/// A tool's JSON-schema declaration, passed to [`LlmClient::chat`] as an
/// available-tools list (§6.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// The tool's name.
    pub name: String,
    /// A human-readable description shown to the model.
    pub description: String,
    /// The tool's parameter JSON schema.
    pub parameters: serde_json::Value,
}

/// Controls whether/which tool the model must call (§6.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model decides whether to call a tool.
    Auto,
    /// The model must not call a tool.
    None,
    /// The model must call the named tool.
    Named(String),
}

/// Token accounting for one chat call (§6.5 `usage`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt (messages + tool schemas).
    pub prompt_tokens: u64,
    /// Tokens consumed by the completion.
    pub completion_tokens: u64,
    /// `prompt_tokens + completion_tokens`.
    pub total_tokens: u64,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model produced a complete response.
    Stop,
    /// The model requested one or more tool calls.
    ToolCalls,
    /// The response was truncated at the token limit.
    Length,
    /// Generation was stopped by content filtering.
    ContentFilter,
}

/// The result of one [`LlmClient::chat`] call (§6.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's text content, absent for a pure tool-call response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls the model requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Why generation stopped.
    pub finish_reason: FinishReason,
    /// Token accounting for this call.
    pub usage: Usage,
}

/// The provider-agnostic chat capability (§6.5, §1). Workers depend on this
/// trait, never on a concrete HTTP client, so that provider wiring stays
/// outside the coordination core.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends one chat turn and returns the provider's response.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] on transport failure, a non-2xx status, or a
    /// response that cannot be parsed into [`ChatResponse`].
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSchema],
        tool_choice: ToolChoice,
    ) -> Result<ChatResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_text_has_no_tool_calls() {
        let message = ChatMessage::text(Role::User, "hello");
        assert_eq!(message.content.as_deref(), Some("hello"));
        assert!(message.tool_calls.is_empty());
    }
}
