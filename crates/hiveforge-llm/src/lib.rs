// hiveforge-llm/src/lib.rs
// ============================================================================
// Crate: hiveforge-llm
// Description: The provider-agnostic LLM client contract, rate limiter, and
//              process-wide limiter registry (§4.10, §6.5).
// ============================================================================

#![forbid(unsafe_code)]

mod client;
mod error;
mod rate_limiter;
mod registry;

pub use client::ChatMessage;
pub use client::ChatResponse;
pub use client::FinishReason;
pub use client::LlmClient;
pub use client::Role;
pub use client::ToolCall;
pub use client::ToolChoice;
pub use client::ToolSchema;
pub use client::Usage;
pub use error::LlmError;
pub use rate_limiter::RateLimitPermit;
pub use rate_limiter::RateLimiter;
pub use registry::RateLimiterRegistry;
