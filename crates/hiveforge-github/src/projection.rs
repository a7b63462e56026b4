// hiveforge-github/src/projection.rs
// ============================================================================
// Module: GitHub Projection
// Description: Idempotent mapping of Akashic Record events to Issues/Comments/Labels (§4.13).
// Dependencies: crate::client, hiveforge_core, hiveforge_config
// ============================================================================

//! ## Overview
//! [`GitHubProjection`] is itself a `Projector` in spirit (§4.3): it folds
//! events one at a time, but unlike the in-memory projections in
//! `hiveforge_core`, applying an event here has an external side effect (an
//! API call) and the fold is asynchronous. Idempotence is enforced the same
//! way AR replay is: an event id already recorded in `synced_event_ids` is a
//! no-op on a second application (§8 property 10).

use std::collections::HashMap;
use std::collections::HashSet;

use hiveforge_config::GithubConfig;
use hiveforge_core::Event;
use hiveforge_core::EventType;
use hiveforge_core::PayloadValue;
use tracing::debug;
use tracing::warn;

use crate::client::GithubClient;
use crate::error::GithubError;

fn payload_str(event: &Event, key: &str) -> Option<String> {
    match event.payload.get(key) {
        Some(PayloadValue::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Idempotent GitHub Issues/Comments/Labels projector (§4.13).
pub struct GitHubProjection {
    config: GithubConfig,
    client: Box<dyn GithubClient>,
    synced_event_ids: HashSet<String>,
    run_issue_map: HashMap<String, u64>,
    last_synced_event_id: Option<String>,
}

impl GitHubProjection {
    /// Creates a fresh projection state over `client`.
    #[must_use]
    pub fn new(config: GithubConfig, client: Box<dyn GithubClient>) -> Self {
        Self {
            config,
            client,
            synced_event_ids: HashSet::new(),
            run_issue_map: HashMap::new(),
            last_synced_event_id: None,
        }
    }

    /// The run-id to issue-number mapping built up so far.
    #[must_use]
    pub fn run_issue_map(&self) -> &HashMap<String, u64> {
        &self.run_issue_map
    }

    /// The id of the most recently synced event, if any.
    #[must_use]
    pub fn last_synced_event_id(&self) -> Option<&str> {
        self.last_synced_event_id.as_deref()
    }

    fn label(&self, suffix: &str) -> String {
        format!("{}:{}", self.config.label_prefix, suffix)
    }

    /// Applies a single event, following the mapping rules of §4.13.
    ///
    /// Idempotent: re-applying an event whose id was already synced is a
    /// no-op. Unknown event types are no-ops. An event that references a
    /// run with no stored issue (because its `RUN_STARTED` was never
    /// synced) is skipped silently.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError`] if the underlying client call fails.
    pub async fn apply(&mut self, event: &Event) -> Result<(), GithubError> {
        let event_id = event.id.as_str().to_string();
        if self.synced_event_ids.contains(&event_id) {
            debug!(event_id = %event_id, "github projection: already synced, skipping");
            return Ok(());
        }

        self.handle(event).await?;

        self.synced_event_ids.insert(event_id.clone());
        self.last_synced_event_id = Some(event_id);
        Ok(())
    }

    async fn handle(&mut self, event: &Event) -> Result<(), GithubError> {
        match &event.event_type {
            EventType::RunStarted => {
                let Some(run_id) = event.run_id.as_ref() else {
                    return Ok(());
                };
                let goal = payload_str(event, "goal").unwrap_or_default();
                let title = format!("HiveForge run {}", run_id.as_str());
                let issue_number = self.client.create_issue(&title, &goal).await?;
                self.run_issue_map.insert(run_id.as_str().to_string(), issue_number);
            }
            EventType::RunCompleted => {
                if let Some(issue_number) = self.issue_for(event) {
                    self.client.add_comment(issue_number, "Run completed.").await?;
                    self.client.close_issue(issue_number).await?;
                }
            }
            EventType::TaskCompleted => {
                if let Some(issue_number) = self.issue_for(event) {
                    let task_id = event
                        .task_id
                        .as_ref()
                        .map(|id| id.as_str().to_string())
                        .unwrap_or_default();
                    self.client
                        .add_comment(issue_number, &format!("Task {task_id} completed."))
                        .await?;
                }
            }
            EventType::GuardPassed | EventType::GuardConditionalPassed | EventType::GuardFailed => {
                if let Some(issue_number) = self.issue_for(event) {
                    let verdict = match event.event_type {
                        EventType::GuardPassed => "pass",
                        EventType::GuardConditionalPassed => "conditional pass",
                        _ => "fail",
                    };
                    self.client
                        .add_comment(issue_number, &format!("Guard Bee verdict: {verdict}."))
                        .await?;
                    if event.event_type == EventType::GuardFailed {
                        self.client.apply_label(issue_number, &self.label("failure")).await?;
                    }
                }
            }
            EventType::SentinelAlertRaised => {
                if let Some(issue_number) = self.issue_for(event) {
                    self.client.apply_label(issue_number, &self.label("sentinel")).await?;
                    let kind = payload_str(event, "alert_type").unwrap_or_else(|| "alert".to_string());
                    self.client
                        .add_comment(issue_number, &format!("Sentinel alert: {kind}."))
                        .await?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn issue_for(&self, event: &Event) -> Option<u64> {
        let run_id = event.run_id.as_ref()?;
        self.run_issue_map.get(run_id.as_str()).copied()
    }

    /// Applies every event in order, continuing past individual failures
    /// (§4.13 `batch_apply`). Returns the events whose application failed,
    /// paired with the error, in encounter order. The last
    /// successfully-synced id is always persisted via
    /// [`GitHubProjection::last_synced_event_id`] regardless of later
    /// failures.
    pub async fn batch_apply(&mut self, events: &[Event]) -> Vec<(String, GithubError)> {
        let mut failures = Vec::new();
        for event in events {
            if let Err(err) = self.apply(event).await {
                warn!(event_id = %event.id.as_str(), error = %err, "github projection: apply failed");
                failures.push((event.id.as_str().to_string(), err));
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use hiveforge_core::Actor;
    use hiveforge_core::EventId;
    use hiveforge_core::Payload;
    use hiveforge_core::RunId;
    use hiveforge_core::Timestamp;

    use super::*;

    struct FakeClient {
        next_issue: Mutex<u64>,
        create_calls: Mutex<u32>,
    }

    impl FakeClient {
        fn new(first_issue: u64) -> Self {
            Self {
                next_issue: Mutex::new(first_issue),
                create_calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl GithubClient for FakeClient {
        async fn create_issue(&self, _title: &str, _body: &str) -> Result<u64, GithubError> {
            *self.create_calls.lock().expect("lock") += 1;
            Ok(*self.next_issue.lock().expect("lock"))
        }

        async fn add_comment(&self, _issue_number: u64, _body: &str) -> Result<(), GithubError> {
            Ok(())
        }

        async fn close_issue(&self, _issue_number: u64) -> Result<(), GithubError> {
            Ok(())
        }

        async fn apply_label(&self, _issue_number: u64, _label: &str) -> Result<(), GithubError> {
            Ok(())
        }
    }

    fn run_started(run_id: &str) -> Event {
        let mut payload = Payload::new();
        payload.insert("goal".to_string(), PayloadValue::String("g".to_string()));
        Event {
            id: EventId::new("e1"),
            event_type: EventType::RunStarted,
            timestamp: Timestamp::new(time::OffsetDateTime::UNIX_EPOCH),
            run_id: Some(RunId::new(run_id)),
            hive_id: None,
            colony_id: None,
            task_id: None,
            worker_id: None,
            actor: Actor::system(),
            payload,
            prev_hash: None,
            parents: Vec::new(),
            hash: String::new(),
        }
    }

    #[tokio::test]
    async fn applying_run_started_twice_creates_issue_once() {
        let client = FakeClient::new(42);
        let mut projection = GitHubProjection::new(GithubConfig::default(), Box::new(client));
        let event = run_started("R");

        projection.apply(&event).await.expect("first apply");
        projection.apply(&event).await.expect("second apply");

        assert_eq!(projection.run_issue_map()["R"], 42);
    }

    #[tokio::test]
    async fn unknown_run_is_skipped_silently() {
        let client = FakeClient::new(1);
        let mut projection = GitHubProjection::new(GithubConfig::default(), Box::new(client));
        let mut event = run_started("R");
        event.event_type = EventType::TaskCompleted;
        event.id = EventId::new("e2");

        projection.apply(&event).await.expect("no-op on unknown run");
        assert!(projection.run_issue_map().is_empty());
    }

    #[tokio::test]
    async fn batch_apply_continues_past_individual_failures() {
        struct FailingClient;
        #[async_trait]
        impl GithubClient for FailingClient {
            async fn create_issue(&self, _title: &str, _body: &str) -> Result<u64, GithubError> {
                Err(GithubError::Api("boom".to_string()))
            }
            async fn add_comment(&self, _issue_number: u64, _body: &str) -> Result<(), GithubError> {
                Ok(())
            }
            async fn close_issue(&self, _issue_number: u64) -> Result<(), GithubError> {
                Ok(())
            }
            async fn apply_label(&self, _issue_number: u64, _label: &str) -> Result<(), GithubError> {
                Ok(())
            }
        }

        let mut projection = GitHubProjection::new(GithubConfig::default(), Box::new(FailingClient));
        let mut second = run_started("R2");
        second.id = EventId::new("e3");
        let failures = projection.batch_apply(&[run_started("R1"), second]).await;
        assert_eq!(failures.len(), 2);
    }
}
