// hiveforge-orchestrator/src/pipeline/retry.rs
// ============================================================================
// Module: Retry Manager
// Description: Exponential backoff retry bookkeeping per task (§4.6).
// Dependencies: hiveforge_config::GovernanceConfig
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use hiveforge_core::TaskId;

/// Base delay before the first retry.
const BASE_DELAY: Duration = Duration::from_secs(2);

/// Ceiling on the computed backoff, regardless of attempt count.
const MAX_DELAY: Duration = Duration::from_secs(5 * 60);

/// Outcome of asking the retry manager whether a failed task may run again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry is allowed; wait the given backoff before redispatching.
    Retry {
        /// Delay to wait before the next attempt.
        delay: Duration,
        /// The attempt number about to start, 1-indexed.
        attempt: u32,
    },
    /// The task has exhausted its retry budget and should be marked failed.
    Exhausted,
}

/// Per-task retry bookkeeping.
#[derive(Debug, Clone, Default)]
struct TaskRetryState {
    /// Number of attempts already made, including the first.
    attempts: u32,
}

/// Tracks retry attempts per task and computes exponential backoff delays
/// (§4.6 "retries use exponential backoff up to a configured ceiling").
pub struct RetryManager {
    /// Cap on retry attempts per task, independent of the initial attempt.
    max_retries: u32,
    /// Per-task attempt counters.
    tasks: BTreeMap<TaskId, TaskRetryState>,
}

impl RetryManager {
    /// Builds a manager allowing up to `max_retries` retries per task, on
    /// top of the task's initial attempt.
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries, tasks: BTreeMap::new() }
    }

    /// Records a failed attempt for `task_id` and decides whether another
    /// attempt is permitted.
    pub fn record_failure(&mut self, task_id: &TaskId) -> RetryDecision {
        let state = self.tasks.entry(task_id.clone()).or_default();
        state.attempts += 1;

        if state.attempts > self.max_retries {
            return RetryDecision::Exhausted;
        }

        let exponent = state.attempts.min(16);
        let delay = BASE_DELAY.saturating_mul(1u32 << exponent).min(MAX_DELAY);
        RetryDecision::Retry { delay, attempt: state.attempts + 1 }
    }

    /// Clears retry state for a task that completed successfully.
    pub fn clear(&mut self, task_id: &TaskId) {
        self.tasks.remove(task_id);
    }

    /// Returns the number of attempts already recorded for `task_id`.
    #[must_use]
    pub fn attempts(&self, task_id: &TaskId) -> u32 {
        self.tasks.get(task_id).map_or(0, |state| state.attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_until_the_configured_ceiling() {
        let mut manager = RetryManager::new(2);
        let task_id = TaskId::new("task-1");

        let first = manager.record_failure(&task_id);
        assert!(matches!(first, RetryDecision::Retry { attempt: 2, .. }));

        let second = manager.record_failure(&task_id);
        assert!(matches!(second, RetryDecision::Retry { attempt: 3, .. }));

        let third = manager.record_failure(&task_id);
        assert_eq!(third, RetryDecision::Exhausted);
    }

    #[test]
    fn backoff_grows_and_is_capped() {
        let mut manager = RetryManager::new(10);
        let task_id = TaskId::new("task-1");

        let RetryDecision::Retry { delay: first, .. } = manager.record_failure(&task_id) else {
            unreachable!("retry budget not exhausted")
        };
        let RetryDecision::Retry { delay: second, .. } = manager.record_failure(&task_id) else {
            unreachable!("retry budget not exhausted")
        };
        assert!(second > first);
        assert!(second <= MAX_DELAY);
    }

    #[test]
    fn clear_resets_attempt_count() {
        let mut manager = RetryManager::new(3);
        let task_id = TaskId::new("task-1");
        manager.record_failure(&task_id);
        manager.clear(&task_id);
        assert_eq!(manager.attempts(&task_id), 0);
    }
}
