// hiveforge-llm/src/registry.rs
// ============================================================================
// Module: Rate Limiter Registry
// Description: Process-wide, lazily-memoized limiter lookup keyed by provider:model.
// Purpose: Share one bucket across every caller targeting the same model (§4.10).
// Dependencies: crate::rate_limiter, std::sync::Mutex
// ============================================================================

//! ## Overview
//! "A process-wide `RateLimiterRegistry` vends limiters keyed by
//! `provider:model`; creation is lazy and memoized." (§4.10)

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use hiveforge_config::RateLimitConfig;

use crate::rate_limiter::RateLimiter;

/// Lazily-memoized [`RateLimiter`] lookup, keyed by `"<provider>:<model>"`.
#[derive(Default)]
pub struct RateLimiterRegistry {
    limiters: Mutex<HashMap<String, Arc<RateLimiter>>>,
}

impl RateLimiterRegistry {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the limiter for `provider:model`, creating it from `config`
    /// on first use. Subsequent calls for the same key return the same
    /// instance regardless of the `config` passed.
    #[must_use]
    pub fn get_or_create(&self, provider: &str, model: &str, config: &RateLimitConfig) -> Arc<RateLimiter> {
        let key = format!("{provider}:{model}");
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier holder panicked mid-insert")]
        let mut limiters = self.limiters.lock().unwrap();
        limiters.entry(key).or_insert_with(|| Arc::new(RateLimiter::new(config.clone()))).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RateLimitConfig {
        RateLimitConfig {
            requests_per_minute: 60,
            requests_per_day: 0,
            tokens_per_minute: 1000,
            max_concurrent: 1,
            burst_limit: 5,
            retry_after_429: 1,
        }
    }

    #[test]
    fn same_key_returns_same_instance() {
        let registry = RateLimiterRegistry::new();
        let a = registry.get_or_create("openai", "gpt-5", &test_config());
        let b = registry.get_or_create("openai", "gpt-5", &test_config());
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_keys_return_different_instances() {
        let registry = RateLimiterRegistry::new();
        let a = registry.get_or_create("openai", "gpt-5", &test_config());
        let b = registry.get_or_create("anthropic", "claude", &test_config());
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
