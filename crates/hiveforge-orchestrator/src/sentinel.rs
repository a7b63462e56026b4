// hiveforge-orchestrator/src/sentinel.rs
// ============================================================================
// Module: Sentinel Hornet
// Description: Stateless anomaly analyzer over event streams — loop,
//              runaway, cost, and security detectors (§4.8).
// Dependencies: hiveforge_core::{Event, EventType, classify_tool, ActionClass}
// ============================================================================

use hiveforge_core::ActionClass;
use hiveforge_core::AlertId;
use hiveforge_core::ColonyId;
use hiveforge_core::Event;
use hiveforge_core::EventType;
use hiveforge_core::PayloadValue;
use hiveforge_core::Timestamp;
use hiveforge_core::classify_tool;

/// Severity of a raised alert. Every detector in this module only ever
/// raises `Critical` (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    /// Requires a colony suspension.
    Critical,
}

/// The condition an alert reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertKind {
    /// A task repeatedly failed past `max_loop_count`.
    LoopDetected {
        /// The task stuck in the loop.
        task_id: String,
    },
    /// The trailing event-type window alternates between exactly two types.
    CyclicPattern,
    /// Too many events landed within `rate_window_seconds`.
    RunawayDetected {
        /// Events observed in the window.
        count: usize,
    },
    /// Cumulative LLM cost crossed `max_cost`.
    CostExceeded {
        /// Total cost observed.
        total_cost: f64,
    },
    /// A worker started an irreversible tool without confirmation.
    SecurityViolation {
        /// The unconfirmed tool name.
        tool_name: String,
    },
}

/// One alert raised by a detector pass (§4.8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Identifier assigned by the caller when persisting this alert.
    pub alert_id: Option<AlertId>,
    /// Colony the alert concerns.
    pub colony_id: ColonyId,
    /// What was detected.
    pub kind: AlertKind,
    /// How severe the condition is.
    pub severity: AlertSeverity,
}

/// Thresholds the four detectors compare against (§4.8). Carries no
/// recognized config key in §6.4's configuration surface, so it is
/// constructed directly by the caller rather than loaded from
/// `hiveforge_config`.
#[derive(Debug, Clone, Copy)]
pub struct SentinelConfig {
    /// Per-task failure count that trips `loop_detected`.
    pub max_loop_count: usize,
    /// Trailing window, in seconds, the runaway detector scans.
    pub rate_window_seconds: i64,
    /// Event count within the window that trips `runaway_detected`.
    pub max_event_rate: usize,
    /// Cumulative LLM cost that trips `cost_exceeded`.
    pub max_cost: f64,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self { max_loop_count: 3, rate_window_seconds: 60, max_event_rate: 100, max_cost: 10.0 }
    }
}

/// Stateless anomaly analyzer: every check takes the events it needs as
/// arguments and carries no state of its own between calls (§4.8).
pub struct SentinelHornet {
    config: SentinelConfig,
}

impl SentinelHornet {
    /// Builds a Sentinel Hornet against the given thresholds.
    #[must_use]
    pub const fn new(config: SentinelConfig) -> Self {
        Self { config }
    }

    /// Runs all four detectors over `events` in order and returns every
    /// alert raised, for the given `colony_id` (§4.8).
    #[must_use]
    pub fn check_events(&self, events: &[Event], colony_id: &ColonyId) -> Vec<Alert> {
        let mut alerts = Vec::new();
        alerts.extend(self.detect_loops(events, colony_id));
        alerts.extend(self.detect_runaway(events, colony_id));
        alerts.extend(self.detect_cost(events, colony_id));
        alerts.extend(self.detect_security(events, colony_id));
        alerts
    }

    fn detect_loops(&self, events: &[Event], colony_id: &ColonyId) -> Vec<Alert> {
        let mut alerts = Vec::new();

        let mut failure_counts = std::collections::BTreeMap::<String, usize>::new();
        for event in events {
            if !matches!(event.event_type, EventType::TaskFailed | EventType::ColonyFailed) {
                continue;
            }
            let Some(task_id) = &event.task_id else { continue };
            let count = failure_counts.entry(task_id.as_str().to_string()).or_insert(0);
            *count += 1;
            if *count == self.max_loop_count_threshold() {
                alerts.push(Alert {
                    alert_id: None,
                    colony_id: colony_id.clone(),
                    kind: AlertKind::LoopDetected { task_id: task_id.as_str().to_string() },
                    severity: AlertSeverity::Critical,
                });
            }
        }

        let window_len = 2 * self.config.max_loop_count;
        if events.len() >= window_len && window_len >= 2 {
            let window = &events[events.len() - window_len ..];
            if is_two_element_cycle(window) {
                alerts.push(Alert {
                    alert_id: None,
                    colony_id: colony_id.clone(),
                    kind: AlertKind::CyclicPattern,
                    severity: AlertSeverity::Critical,
                });
            }
        }

        alerts
    }

    const fn max_loop_count_threshold(&self) -> usize {
        self.config.max_loop_count
    }

    fn detect_runaway(&self, events: &[Event], colony_id: &ColonyId) -> Vec<Alert> {
        let Some(latest) = events.last() else { return Vec::new() };
        let cutoff = latest.timestamp.as_offset_date_time() - time::Duration::seconds(self.config.rate_window_seconds);
        let count = events.iter().filter(|event| event.timestamp.as_offset_date_time() >= cutoff).count();

        if count > self.config.max_event_rate {
            vec![Alert {
                alert_id: None,
                colony_id: colony_id.clone(),
                kind: AlertKind::RunawayDetected { count },
                severity: AlertSeverity::Critical,
            }]
        } else {
            Vec::new()
        }
    }

    fn detect_cost(&self, events: &[Event], colony_id: &ColonyId) -> Vec<Alert> {
        let total_cost: f64 = events
            .iter()
            .filter(|event| event.event_type == EventType::LlmResponse)
            .map(|event| payload_float(event, "cost"))
            .sum();

        if total_cost > self.config.max_cost {
            vec![Alert {
                alert_id: None,
                colony_id: colony_id.clone(),
                kind: AlertKind::CostExceeded { total_cost },
                severity: AlertSeverity::Critical,
            }]
        } else {
            Vec::new()
        }
    }

    fn detect_security(&self, events: &[Event], colony_id: &ColonyId) -> Vec<Alert> {
        let mut alerts = Vec::new();
        for event in events {
            if event.event_type != EventType::WorkerStarted {
                continue;
            }
            let Some(tool_name) = payload_str(event, "tool_name") else { continue };
            if classify_tool(&tool_name) != ActionClass::Irreversible {
                continue;
            }
            let confirmed = matches!(event.payload.get("confirmed"), Some(PayloadValue::Bool(true)));
            if !confirmed {
                alerts.push(Alert {
                    alert_id: None,
                    colony_id: colony_id.clone(),
                    kind: AlertKind::SecurityViolation { tool_name },
                    severity: AlertSeverity::Critical,
                });
            }
        }
        alerts
    }
}

/// True iff exactly two distinct event types appear in `window` and every
/// even-indexed entry shares one type while every odd-indexed entry shares
/// the other (§4.8 "two-element cycle detector").
fn is_two_element_cycle(window: &[Event]) -> bool {
    let distinct: std::collections::BTreeSet<&EventType> = window.iter().map(|event| &event.event_type).collect();
    if distinct.len() != 2 {
        return false;
    }
    let even_distinct: std::collections::BTreeSet<&EventType> =
        window.iter().step_by(2).map(|event| &event.event_type).collect();
    let odd_distinct: std::collections::BTreeSet<&EventType> =
        window.iter().skip(1).step_by(2).map(|event| &event.event_type).collect();
    even_distinct.len() == 1 && odd_distinct.len() == 1
}

fn payload_str(event: &Event, key: &str) -> Option<String> {
    match event.payload.get(key) {
        Some(PayloadValue::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn payload_float(event: &Event, key: &str) -> f64 {
    match event.payload.get(key) {
        Some(PayloadValue::Float(f)) => *f,
        Some(PayloadValue::Int(i)) => precise_as_f64(*i),
        _ => 0.0,
    }
}

#[allow(clippy::cast_precision_loss, reason = "cost/token counters are small enough to round-trip exactly")]
const fn precise_as_f64(value: i64) -> f64 {
    value as f64
}

/// Elapsed-time helper retained for callers that only have a
/// [`Timestamp`] pair and want the same window comparison this module uses
/// internally.
#[must_use]
pub fn within_window(earlier: Timestamp, later: Timestamp, window_seconds: i64) -> bool {
    later.as_offset_date_time() - earlier.as_offset_date_time() <= time::Duration::seconds(window_seconds)
}

#[cfg(test)]
mod tests {
    use hiveforge_core::Actor;
    use hiveforge_core::EventId;
    use hiveforge_core::Payload;
    use hiveforge_core::RunId;
    use hiveforge_core::TaskId;

    use super::*;

    fn event_at(event_type: EventType, offset_seconds: i64, task_id: Option<&str>, payload: Payload) -> Event {
        let timestamp = Timestamp::new(time::OffsetDateTime::now_utc() + time::Duration::seconds(offset_seconds));
        Event {
            id: EventId::new(""),
            event_type,
            timestamp,
            run_id: Some(RunId::new("run-1")),
            hive_id: None,
            colony_id: None,
            task_id: task_id.map(TaskId::new),
            worker_id: None,
            actor: Actor::system(),
            payload,
            prev_hash: None,
            parents: Vec::new(),
            hash: String::new(),
        }
    }

    #[test]
    fn loop_detected_once_failure_count_reaches_threshold() {
        let sentinel = SentinelHornet::new(SentinelConfig { max_loop_count: 2, ..SentinelConfig::default() });
        let events = vec![
            event_at(EventType::TaskFailed, 0, Some("t1"), Payload::new()),
            event_at(EventType::TaskFailed, 1, Some("t1"), Payload::new()),
        ];
        let alerts = sentinel.check_events(&events, &ColonyId::new("c1"));
        assert!(alerts.iter().any(|a| matches!(a.kind, AlertKind::LoopDetected { .. })));
    }

    #[test]
    fn runaway_detected_when_window_exceeds_rate() {
        let sentinel = SentinelHornet::new(SentinelConfig {
            rate_window_seconds: 60,
            max_event_rate: 1,
            ..SentinelConfig::default()
        });
        let events = vec![
            event_at(EventType::RunStarted, 0, None, Payload::new()),
            event_at(EventType::RunStarted, 1, None, Payload::new()),
            event_at(EventType::RunStarted, 2, None, Payload::new()),
        ];
        let alerts = sentinel.check_events(&events, &ColonyId::new("c1"));
        assert!(alerts.iter().any(|a| matches!(a.kind, AlertKind::RunawayDetected { .. })));
    }

    #[test]
    fn cost_exceeded_sums_across_llm_responses() {
        let sentinel = SentinelHornet::new(SentinelConfig { max_cost: 1.0, ..SentinelConfig::default() });
        let mut payload_a = Payload::new();
        payload_a.insert("cost".to_string(), PayloadValue::float(0.8).expect("finite"));
        let mut payload_b = Payload::new();
        payload_b.insert("cost".to_string(), PayloadValue::float(0.8).expect("finite"));
        let events =
            vec![event_at(EventType::LlmResponse, 0, None, payload_a), event_at(EventType::LlmResponse, 1, None, payload_b)];
        let alerts = sentinel.check_events(&events, &ColonyId::new("c1"));
        assert!(alerts.iter().any(|a| matches!(a.kind, AlertKind::CostExceeded { .. })));
    }

    #[test]
    fn cost_exceeded_ignores_token_counts() {
        let sentinel = SentinelHornet::new(SentinelConfig { max_cost: 1.0, ..SentinelConfig::default() });
        let mut payload = Payload::new();
        payload.insert("cost".to_string(), PayloadValue::float(0.1).expect("finite"));
        payload.insert("tokens_used".to_string(), PayloadValue::float(5000.0).expect("finite"));
        let events = vec![event_at(EventType::LlmResponse, 0, None, payload)];
        let alerts = sentinel.check_events(&events, &ColonyId::new("c1"));
        assert!(!alerts.iter().any(|a| matches!(a.kind, AlertKind::CostExceeded { .. })));
    }

    #[test]
    fn security_violation_for_unconfirmed_irreversible_tool() {
        let sentinel = SentinelHornet::new(SentinelConfig::default());
        let mut payload = Payload::new();
        payload.insert("tool_name".to_string(), PayloadValue::String("deploy".to_string()));
        let events = vec![event_at(EventType::WorkerStarted, 0, None, payload)];
        let alerts = sentinel.check_events(&events, &ColonyId::new("c1"));
        assert!(alerts.iter().any(|a| matches!(a.kind, AlertKind::SecurityViolation { .. })));
    }

    #[test]
    fn read_only_tools_never_raise_security_alerts() {
        let sentinel = SentinelHornet::new(SentinelConfig::default());
        let mut payload = Payload::new();
        payload.insert("tool_name".to_string(), PayloadValue::String("read_file".to_string()));
        let events = vec![event_at(EventType::WorkerStarted, 0, None, payload)];
        assert!(sentinel.check_events(&events, &ColonyId::new("c1")).is_empty());
    }
}
