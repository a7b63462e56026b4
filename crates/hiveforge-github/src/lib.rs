// hiveforge-github/src/lib.rs
// ============================================================================
// Crate: hiveforge-github
// Description: Idempotent projection of core Akashic Record events onto
//              GitHub Issues, Comments, and Labels (§4.13).
// ============================================================================

#![forbid(unsafe_code)]

mod client;
mod error;
mod projection;

pub use client::GithubClient;
pub use error::GithubError;
pub use projection::GitHubProjection;
