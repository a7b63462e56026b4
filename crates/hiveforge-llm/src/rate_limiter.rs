// hiveforge-llm/src/rate_limiter.rs
// ============================================================================
// Module: Rate Limiter
// Description: Token-bucket + windowed-counter + concurrency-gated limiter (§4.10).
// Purpose: Guard LLM calls against provider rate limits and runaway local bursts.
// Dependencies: hiveforge_config::RateLimitConfig, tokio::sync::{Mutex, Semaphore}
// ============================================================================

//! ## Overview
//! One [`RateLimiter`] instance guards one `provider:model` pair (§4.10).
//! State is a token bucket refilled at `burst_limit / 60s`, capped at
//! `burst_limit`, plus rolling per-minute and per-day request/token
//! counters, plus a `tokio::sync::Semaphore` bounding concurrent in-flight
//! calls. A single mutex protects every counter (§5 "one mutex protects all
//! counters per limiter instance").

use std::sync::Arc;
use std::time::Duration;

use hiveforge_config::RateLimitConfig;
use tokio::sync::Mutex;
use tokio::sync::OwnedSemaphorePermit;
use tokio::sync::Semaphore;
use tokio::time::Instant;

use crate::error::LlmError;

const MINUTE: Duration = Duration::from_secs(60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Mutable limiter state, guarded by one mutex (§5).
struct State {
    /// Tokens currently available in the bucket.
    tokens: f64,
    /// Start of the current minute window.
    minute_start: Instant,
    /// Requests admitted within the current minute window.
    request_count_minute: u32,
    /// Tokens admitted within the current minute window.
    token_count_minute: u32,
    /// Start of the current day window.
    day_start: Instant,
    /// Requests admitted within the current day window.
    request_count_day: u32,
}

impl State {
    /// Builds a freshly-filled bucket at the given instant.
    fn new(burst_limit: u32, now: Instant) -> Self {
        Self {
            tokens: f64::from(burst_limit),
            minute_start: now,
            request_count_minute: 0,
            token_count_minute: 0,
            day_start: now,
            request_count_day: 0,
        }
    }

    /// Resets the minute/day windows if they have elapsed (§4.10 `wait` step 1).
    fn roll_windows(&mut self, now: Instant) {
        if now.duration_since(self.minute_start) >= MINUTE {
            self.minute_start = now;
            self.request_count_minute = 0;
            self.token_count_minute = 0;
        }
        if now.duration_since(self.day_start) >= DAY {
            self.day_start = now;
            self.request_count_day = 0;
        }
    }

    /// Refills the bucket at `burst_limit / 60s`, capped at `burst_limit`
    /// (§4.10 `wait` step 3).
    fn refill(&mut self, burst_limit: u32, now: Instant, last_refill: Instant) {
        let elapsed = now.duration_since(last_refill).as_secs_f64();
        let rate = f64::from(burst_limit) / 60.0;
        self.tokens = (self.tokens + elapsed * rate).min(f64::from(burst_limit));
    }
}

/// A held concurrency permit. Releases its slot on drop (§4.10
/// `acquireWithTokens`).
pub struct RateLimitPermit {
    _permit: OwnedSemaphorePermit,
}

/// Per-key token-bucket rate limiter guarding LLM calls (§4.10).
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Mutex<State>,
    last_refill: Mutex<Instant>,
    concurrency: Arc<Semaphore>,
}

impl RateLimiter {
    /// Builds a new limiter from `config`, with a freshly-filled bucket.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        let now = Instant::now();
        let max_concurrent = usize::try_from(config.max_concurrent.max(1)).unwrap_or(usize::MAX);
        Self {
            state: Mutex::new(State::new(config.burst_limit, now)),
            last_refill: Mutex::new(now),
            concurrency: Arc::new(Semaphore::new(max_concurrent)),
            config,
        }
    }

    /// Waits until `tokens` are available, admitting the call (§4.10 `wait`).
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::RateLimitExceeded`] if the daily request ceiling
    /// has already been reached.
    pub async fn wait(&self, tokens: u32) -> Result<(), LlmError> {
        loop {
            let now = Instant::now();
            let mut state = self.state.lock().await;
            state.roll_windows(now);

            if self.config.requests_per_day > 0 && state.request_count_day >= self.config.requests_per_day {
                let retry_after = DAY.saturating_sub(now.duration_since(state.day_start));
                return Err(LlmError::RateLimitExceeded { retry_after_secs: retry_after.as_secs() });
            }

            let mut last_refill = self.last_refill.lock().await;
            state.refill(self.config.burst_limit, now, *last_refill);
            *last_refill = now;

            let available = state.tokens;
            if f64::from(tokens) > available {
                let rate = f64::from(self.config.burst_limit) / 60.0;
                let deficit = f64::from(tokens) - available;
                let wait_secs = if rate > 0.0 { deficit / rate } else { 1.0 };
                drop(last_refill);
                drop(state);
                tokio::time::sleep(Duration::from_secs_f64(wait_secs.max(0.0))).await;
                continue;
            }

            state.tokens -= f64::from(tokens);
            state.request_count_minute += 1;
            state.request_count_day += 1;
            state.token_count_minute += tokens;
            return Ok(());
        }
    }

    /// As [`RateLimiter::wait`], plus acquires a concurrency permit held by
    /// the returned guard (§4.10 `acquireWithTokens`).
    ///
    /// # Errors
    ///
    /// Propagates [`RateLimiter::wait`]'s errors, or
    /// [`LlmError::ConcurrencyGateClosed`] if the semaphore was closed
    /// before a permit could be acquired.
    pub async fn acquire_with_tokens(self: &Arc<Self>, tokens: u32) -> Result<RateLimitPermit, LlmError> {
        self.wait(tokens).await?;
        let permit = Arc::clone(&self.concurrency)
            .acquire_owned()
            .await
            .map_err(|_| LlmError::ConcurrencyGateClosed)?;
        Ok(RateLimitPermit { _permit: permit })
    }

    /// Handles a provider 429: zeros the bucket and blocks `retry_after`
    /// before allowing refill to resume (§4.10 `handle429`).
    pub async fn handle_429(&self, retry_after: Duration) {
        {
            let mut state = self.state.lock().await;
            state.tokens = 0.0;
        }
        tokio::time::sleep(retry_after).await;
        let mut last_refill = self.last_refill.lock().await;
        *last_refill = Instant::now();
    }

    /// Returns the configured default back-off for a 429 with no
    /// provider-supplied `Retry-After`.
    #[must_use]
    pub const fn default_retry_after(&self) -> Duration {
        Duration::from_secs(self.config.retry_after_429)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RateLimitConfig {
        RateLimitConfig {
            requests_per_minute: 60,
            requests_per_day: 0,
            tokens_per_minute: 100_000,
            max_concurrent: 2,
            burst_limit: 5,
            retry_after_429: 1,
        }
    }

    #[tokio::test]
    async fn wait_admits_within_burst_without_blocking() {
        let limiter = RateLimiter::new(test_config());
        for _ in 0 .. 5 {
            limiter.wait(1).await.expect("admit within burst");
        }
    }

    #[tokio::test]
    async fn daily_ceiling_rejects_once_exhausted() {
        let mut config = test_config();
        config.requests_per_day = 1;
        let limiter = RateLimiter::new(config);
        limiter.wait(1).await.expect("first request admitted");
        let err = limiter.wait(1).await.expect_err("daily ceiling hit");
        assert!(matches!(err, LlmError::RateLimitExceeded { .. }));
    }

    #[tokio::test]
    async fn acquire_with_tokens_releases_permit_on_drop() {
        let limiter = Arc::new(RateLimiter::new(test_config()));
        let permit = limiter.acquire_with_tokens(1).await.expect("acquire");
        drop(permit);
        limiter.acquire_with_tokens(1).await.expect("reacquire after release");
    }

    #[tokio::test]
    async fn handle_429_zeros_bucket() {
        let limiter = RateLimiter::new(test_config());
        limiter.handle_429(Duration::from_millis(10)).await;
        let state = limiter.state.lock().await;
        assert!(state.tokens < 1.0);
    }
}
