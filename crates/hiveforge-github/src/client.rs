// hiveforge-github/src/client.rs
// ============================================================================
// Module: GitHub Client Contract
// Description: The capability boundary the projector depends on (§4.13).
// Purpose: Keep the projection logic testable without a real HTTP transport,
//          the same way `hiveforge_llm::LlmClient` isolates LLM calls.
// Dependencies: async-trait
// ============================================================================

use async_trait::async_trait;

use crate::error::GithubError;

/// Everything the projector needs from a GitHub repository.
#[async_trait]
pub trait GithubClient: Send + Sync {
    /// Creates an issue and returns its number.
    async fn create_issue(&self, title: &str, body: &str) -> Result<u64, GithubError>;

    /// Adds a comment to an existing issue.
    async fn add_comment(&self, issue_number: u64, body: &str) -> Result<(), GithubError>;

    /// Closes an issue.
    async fn close_issue(&self, issue_number: u64) -> Result<(), GithubError>;

    /// Applies a label to an issue, creating the label first if needed.
    async fn apply_label(&self, issue_number: u64, label: &str) -> Result<(), GithubError>;
}
