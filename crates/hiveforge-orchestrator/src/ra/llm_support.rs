// hiveforge-orchestrator/src/ra/llm_support.rs
// ============================================================================
// Module: RA Worker LLM Support
// Description: Shared request/parse plumbing for the fixed-system-prompt RA workers (§4.5.2).
// Dependencies: hiveforge_llm::LlmClient, serde_json
// ============================================================================

use hiveforge_llm::ChatMessage;
use hiveforge_llm::LlmClient;
use hiveforge_llm::Role;
use hiveforge_llm::ToolChoice;
use serde::de::DeserializeOwned;

use crate::error::OrchestratorError;

/// Sends a fixed system prompt plus user content, demanding a JSON response
/// with no tool calls, and parses the content into `T` (§4.5.2: "a fixed
/// system-prompt, a structured JSON response schema").
///
/// # Errors
///
/// Returns [`OrchestratorError::Llm`] on transport failure, or
/// [`OrchestratorError::MalformedResponse`] when the response carries no
/// content or the content does not parse as `T`.
pub async fn call_structured<T: DeserializeOwned>(
    llm: &dyn LlmClient,
    system_prompt: &str,
    user_content: &str,
) -> Result<T, OrchestratorError> {
    let messages = [
        ChatMessage::text(Role::System, system_prompt),
        ChatMessage::text(Role::User, user_content),
    ];
    let response = llm.chat(&messages, &[], ToolChoice::None).await?;
    let Some(content) = response.content else {
        return Err(OrchestratorError::MalformedResponse(
            "worker response carried no content".to_string(),
        ));
    };
    serde_json::from_str(&content)
        .map_err(|err| OrchestratorError::MalformedResponse(format!("{err}: {content}")))
}
