// hiveforge-github/src/error.rs
// ============================================================================
// Module: GitHub Projection Errors
// Description: Failure modes for the GitHub client boundary and the projector.
// Dependencies: thiserror
// ============================================================================

use thiserror::Error;

/// Failure talking to the GitHub API (§4.13).
#[derive(Debug, Error)]
pub enum GithubError {
    /// The HTTP transport failed or returned a non-2xx status.
    #[error("github api error: {0}")]
    Api(String),
    /// The response body could not be parsed as expected.
    #[error("github response parse error: {0}")]
    InvalidResponse(String),
}
