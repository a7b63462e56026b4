// hiveforge-scout/src/recorder.rs
// ============================================================================
// Module: Episode Recorder
// Description: Derives a Honeycomb episode from a completed run's events (§4.14).
// Dependencies: hiveforge_core::{Event, Episode, honeycomb_domain}
// ============================================================================

use hiveforge_core::ColonyId;
use hiveforge_core::Episode;
use hiveforge_core::EpisodeId;
use hiveforge_core::EventType;
use hiveforge_core::FailureClass;
use hiveforge_core::KpiScores;
use hiveforge_core::Outcome;
use hiveforge_core::PayloadValue;
use hiveforge_core::RunId;

fn payload_str<'a>(event: &'a hiveforge_core::Event, key: &str) -> Option<&'a str> {
    match event.payload.get(key) {
        Some(PayloadValue::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn payload_int(event: &hiveforge_core::Event, key: &str) -> Option<i64> {
    match event.payload.get(key) {
        Some(PayloadValue::Int(n)) => Some(*n),
        _ => None,
    }
}

/// Classifies a failure reason string by substring match against the
/// `FailureClass` vocabulary (§4.14). Falls back to `ImplementationError`
/// when no keyword matches, since an unclassified bug is the most common
/// residual case.
fn classify_failure(reason: &str) -> FailureClass {
    let lower = reason.to_lowercase();
    if lower.contains("timeout") {
        FailureClass::Timeout
    } else if lower.contains("environment") || lower.contains("infra") {
        FailureClass::EnvironmentError
    } else if lower.contains("integration") || lower.contains("dependency") {
        FailureClass::IntegrationError
    } else if lower.contains("spec") || lower.contains("requirement") {
        FailureClass::SpecificationError
    } else if lower.contains("design") {
        FailureClass::DesignError
    } else {
        FailureClass::ImplementationError
    }
}

/// Derives the episode `outcome` and an optional `failure_class` from a
/// run's terminal event and its tasks' individual outcomes (§4.14).
fn derive_outcome(events: &[hiveforge_core::Event]) -> (Outcome, Option<FailureClass>) {
    let terminal = events.iter().rev().find(|e| {
        matches!(
            e.event_type,
            EventType::RunCompleted | EventType::RunFailed | EventType::RunAborted
        )
    });

    let Some(terminal) = terminal else {
        return (Outcome::Partial, None);
    };

    match terminal.event_type {
        EventType::RunCompleted => (Outcome::Success, None),
        EventType::RunAborted => {
            let reason = last_failure_reason(events).unwrap_or_else(|| "aborted".to_string());
            (Outcome::Failure, Some(classify_failure(&reason)))
        }
        EventType::RunFailed => {
            let completed_tasks = events
                .iter()
                .filter(|e| e.event_type == EventType::TaskCompleted)
                .count();
            let failed_tasks = events
                .iter()
                .filter(|e| e.event_type == EventType::TaskFailed)
                .count();
            let reason = last_failure_reason(events).unwrap_or_default();
            let failure_class = Some(classify_failure(&reason));
            if completed_tasks > 0 && failed_tasks > 0 {
                (Outcome::Partial, failure_class)
            } else {
                (Outcome::Failure, failure_class)
            }
        }
        _ => (Outcome::Partial, None),
    }
}

fn last_failure_reason(events: &[hiveforge_core::Event]) -> Option<String> {
    events
        .iter()
        .rev()
        .find(|e| matches!(e.event_type, EventType::TaskFailed | EventType::RunFailed))
        .and_then(|e| payload_str(e, "error_message").or_else(|| payload_str(e, "reason")))
        .map(str::to_string)
}

/// Sums `tokens_used` across every event carrying a `worker_id` (§4.14).
fn total_token_count(events: &[hiveforge_core::Event]) -> u64 {
    events
        .iter()
        .filter(|e| e.worker_id.is_some())
        .filter_map(|e| payload_int(e, "tokens_used"))
        .filter(|&n| n > 0)
        .map(|n| n as u64)
        .sum()
}

/// Derives a [`Episode`] from a completed run's replayed events (§4.14).
/// Returns `None` if `events` is empty (there is nothing to record).
#[must_use]
pub fn record_episode(
    episode_id: EpisodeId,
    run_id: RunId,
    colony_id: ColonyId,
    template_used: Option<String>,
    goal: String,
    events: &[hiveforge_core::Event],
) -> Option<Episode> {
    let first = events.first()?;
    let last = events.last()?;
    let duration_seconds = last.timestamp.elapsed_since(&first.timestamp).as_seconds_f64();
    let (outcome, failure_class) = derive_outcome(events);

    Some(Episode {
        episode_id,
        run_id,
        colony_id,
        template_used,
        task_features: std::collections::BTreeMap::new(),
        outcome,
        duration_seconds,
        token_count: total_token_count(events),
        failure_class,
        kpi_scores: KpiScores::default(),
        parent_episode_ids: Vec::new(),
        goal,
        metadata: std::collections::BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use hiveforge_core::Actor;
    use hiveforge_core::EventId;
    use hiveforge_core::Payload;
    use hiveforge_core::Timestamp;

    use super::*;

    fn event(event_type: EventType, offset_secs: i64) -> hiveforge_core::Event {
        hiveforge_core::Event {
            id: EventId::new("e"),
            event_type,
            timestamp: Timestamp::new(time::OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(offset_secs)),
            run_id: Some(RunId::new("run-1")),
            hive_id: None,
            colony_id: None,
            task_id: None,
            worker_id: None,
            actor: Actor::system(),
            payload: Payload::new(),
            prev_hash: None,
            parents: Vec::new(),
            hash: String::new(),
        }
    }

    #[test]
    fn completed_run_is_success() {
        let events = vec![event(EventType::RunStarted, 0), event(EventType::RunCompleted, 10)];
        let episode = record_episode(
            EpisodeId::new("ep-1"),
            RunId::new("run-1"),
            ColonyId::new("colony-1"),
            Some("balanced".to_string()),
            "demo".to_string(),
            &events,
        )
        .expect("episode");
        assert_eq!(episode.outcome, Outcome::Success);
        assert!((episode.duration_seconds - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mixed_outcomes_on_failure_is_partial() {
        let events = vec![
            event(EventType::RunStarted, 0),
            event(EventType::TaskCompleted, 1),
            event(EventType::TaskFailed, 2),
            event(EventType::RunFailed, 3),
        ];
        let episode = record_episode(
            EpisodeId::new("ep-2"),
            RunId::new("run-1"),
            ColonyId::new("colony-1"),
            None,
            "demo".to_string(),
            &events,
        )
        .expect("episode");
        assert_eq!(episode.outcome, Outcome::Partial);
    }

    #[test]
    fn uniform_failure_is_failure() {
        let events = vec![
            event(EventType::RunStarted, 0),
            event(EventType::TaskFailed, 1),
            event(EventType::RunFailed, 2),
        ];
        let episode = record_episode(
            EpisodeId::new("ep-3"),
            RunId::new("run-1"),
            ColonyId::new("colony-1"),
            None,
            "demo".to_string(),
            &events,
        )
        .expect("episode");
        assert_eq!(episode.outcome, Outcome::Failure);
    }
}
