// hiveforge-llm/src/error.rs
// ============================================================================
// Module: LLM Errors
// Description: Failure kinds for LLM calls and rate limiting (§7).
// Purpose: Distinguish recoverable (429/5xx, bounded retry) from fatal failures.
// Dependencies: thiserror
// ============================================================================

use thiserror::Error;

/// Errors raised by [`crate::LlmClient`] implementations and the rate
/// limiter (§4.10, §7).
#[derive(Debug, Error)]
pub enum LlmError {
    /// The caller exceeded a configured rate limit and must wait before
    /// retrying (§4.10 `wait`).
    #[error("rate limit exceeded; retry after {retry_after_secs}s")]
    RateLimitExceeded {
        /// Seconds the caller should wait before retrying.
        retry_after_secs: u64,
    },
    /// The provider returned HTTP 429. Carries the `Retry-After` value when
    /// the provider supplied one.
    #[error("provider returned 429; retry after {retry_after_secs}s")]
    TooManyRequests {
        /// Seconds to wait before retrying, from the provider's response.
        retry_after_secs: u64,
    },
    /// The provider returned a 5xx server error.
    #[error("provider server error: {status}")]
    ServerError {
        /// The HTTP status code returned.
        status: u16,
    },
    /// The provider's response could not be parsed into the expected shape.
    #[error("invalid llm response: {0}")]
    InvalidResponse(String),
    /// A bounded retry budget was exhausted (§5 `MAX_429_RETRIES` /
    /// `MAX_SERVER_ERROR_RETRIES`).
    #[error("exceeded {max_retries} retries calling the llm provider: {source}")]
    MaxRetriesExceeded {
        /// The retry cap that was exceeded.
        max_retries: u32,
        /// The last error observed before giving up.
        source: Box<LlmError>,
    },
    /// The underlying transport failed (connection, timeout, TLS, ...).
    #[error("llm transport error: {0}")]
    Transport(String),
    /// The rate limiter's concurrency semaphore was closed before a permit
    /// could be acquired. The limiter never closes its own semaphore, so
    /// this only surfaces if the limiter itself was dropped mid-acquire.
    #[error("rate limiter concurrency gate closed before a permit was acquired")]
    ConcurrencyGateClosed,
}
