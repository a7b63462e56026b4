// hiveforge-core/src/core/projections.rs
// ============================================================================
// Module: Akashic Record Projections
// Description: Deterministic left-folds over an event stream (§3.2, §4.3).
// Purpose: Provide pure, replayable read models that are never a source of truth.
// Dependencies: serde, std::collections::BTreeMap
// ============================================================================

//! ## Overview
//! A projection is a deterministic fold of an event stream into a read
//! model. Projections never write back to the Akashic Record; every
//! `Projector::apply` call mutates only the in-memory view it owns.
//! `buildProjection(events, id) == replay then fold` is an equivalence
//! enforced by the `Projector` trait: building from scratch or folding one
//! event at a time onto an existing projection must agree (§4.3).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::event::Event;
use crate::core::event::EventType;
use crate::core::identifiers::ColonyId;
use crate::core::identifiers::ConferenceId;
use crate::core::identifiers::HiveId;
use crate::core::identifiers::RequirementId;
use crate::core::identifiers::RunId;
use crate::core::identifiers::TaskId;
use crate::core::identifiers::WorkerId;
use crate::core::payload::PayloadValue;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Projector Trait
// ============================================================================

/// A deterministic, order-sensitive fold over an event stream (§4.3).
///
/// Implementors own a mutable view and update it one event at a time via
/// `apply`. Event types the projection does not recognize are ignored.
pub trait Projector: Sized {
    /// Creates the projection's initial (pre-fold) state.
    fn empty(id: &str) -> Self;

    /// Folds a single event into the projection. Unknown event types are a
    /// no-op.
    fn apply(&mut self, event: &Event);

    /// Builds a projection from a full event slice, equivalent to folding
    /// each event in order onto `Self::empty` (§4.3's replay-then-fold
    /// equivalence).
    fn build(id: &str, events: &[Event]) -> Self {
        let mut state = Self::empty(id);
        for event in events {
            state.apply(event);
        }
        state
    }
}

fn payload_str(event: &Event, key: &str) -> Option<String> {
    match event.payload.get(key) {
        Some(PayloadValue::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn payload_int(event: &Event, key: &str) -> Option<i64> {
    match event.payload.get(key) {
        Some(PayloadValue::Int(n)) => Some(*n),
        _ => None,
    }
}

// ============================================================================
// SECTION: Run Projection
// ============================================================================

/// Run lifecycle state (§3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStateView {
    /// The run is actively executing.
    Running,
    /// The run completed successfully.
    Completed,
    /// The run failed.
    Failed,
    /// The run was aborted.
    Aborted,
}

/// Read model for a single run (§3.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunProjection {
    /// Run identifier.
    pub id: RunId,
    /// Human-readable run goal.
    pub goal: String,
    /// Current lifecycle state.
    pub state: RunStateView,
    /// Tasks belonging to this run, keyed by task id.
    pub tasks: BTreeMap<String, TaskProjection>,
    /// Requirements belonging to this run, keyed by requirement id.
    pub requirements: BTreeMap<String, RequirementProjection>,
    /// When the run started.
    pub started_at: Option<Timestamp>,
    /// When the run reached a terminal state.
    pub completed_at: Option<Timestamp>,
    /// Timestamp of the most recent heartbeat-bearing event.
    pub last_heartbeat: Option<Timestamp>,
    /// Total number of events folded into this projection.
    pub event_count: u64,
}

impl Projector for RunProjection {
    fn empty(id: &str) -> Self {
        Self {
            id: RunId::new(id),
            goal: String::new(),
            state: RunStateView::Running,
            tasks: BTreeMap::new(),
            requirements: BTreeMap::new(),
            started_at: None,
            completed_at: None,
            last_heartbeat: None,
            event_count: 0,
        }
    }

    fn apply(&mut self, event: &Event) {
        self.event_count += 1;
        match &event.event_type {
            EventType::RunStarted => {
                self.started_at = Some(event.timestamp);
                if let Some(goal) = payload_str(event, "goal") {
                    self.goal = goal;
                }
            }
            EventType::RunCompleted => {
                self.state = RunStateView::Completed;
                self.completed_at = Some(event.timestamp);
            }
            EventType::RunFailed => {
                self.state = RunStateView::Failed;
                self.completed_at = Some(event.timestamp);
            }
            EventType::RunAborted => {
                self.state = RunStateView::Aborted;
                self.completed_at = Some(event.timestamp);
            }
            EventType::SystemHeartbeat => {
                self.last_heartbeat = Some(event.timestamp);
            }
            _ => {}
        }
        if let Some(task_id) = event.task_id.as_ref() {
            self.tasks
                .entry(task_id.as_str().to_string())
                .or_insert_with(|| TaskProjection::empty(task_id.as_str()))
                .apply(event);
        }
        if event.event_type == EventType::RequirementCreated
            || event.event_type == EventType::RequirementApproved
            || event.event_type == EventType::RequirementRejected
        {
            if let Some(requirement_id) = payload_str(event, "requirement_id") {
                self.requirements
                    .entry(requirement_id.clone())
                    .or_insert_with(|| RequirementProjection::empty(&requirement_id))
                    .apply(event);
            }
        }
    }
}

// ============================================================================
// SECTION: Task Projection
// ============================================================================

/// Task lifecycle state (§3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStateView {
    /// Not yet started.
    Pending,
    /// Currently being worked.
    InProgress,
    /// Blocked on a dependency.
    Blocked,
    /// Completed successfully.
    Completed,
    /// Failed.
    Failed,
}

/// Read model for a single task (§3.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskProjection {
    /// Task identifier.
    pub id: TaskId,
    /// Human-readable task title.
    pub title: String,
    /// Current lifecycle state.
    pub state: TaskStateView,
    /// Worker currently assigned, if any.
    pub assignee: Option<WorkerId>,
    /// Completion percentage in `[0, 100]`.
    pub progress: u8,
    /// When the task was created.
    pub created_at: Option<Timestamp>,
    /// When the task was last updated.
    pub updated_at: Option<Timestamp>,
    /// When the task reached a terminal state.
    pub completed_at: Option<Timestamp>,
    /// Error message from the most recent failure, if any.
    pub error_message: Option<String>,
}

impl Projector for TaskProjection {
    fn empty(id: &str) -> Self {
        Self {
            id: TaskId::new(id),
            title: String::new(),
            state: TaskStateView::Pending,
            assignee: None,
            progress: 0,
            created_at: None,
            updated_at: None,
            completed_at: None,
            error_message: None,
        }
    }

    fn apply(&mut self, event: &Event) {
        self.updated_at = Some(event.timestamp);
        match &event.event_type {
            EventType::TaskCreated => {
                self.created_at = Some(event.timestamp);
                if let Some(title) = payload_str(event, "title") {
                    self.title = title;
                }
            }
            EventType::TaskAssigned => {
                self.state = TaskStateView::InProgress;
                self.assignee = event.worker_id.clone();
            }
            EventType::TaskProgressed => {
                self.state = TaskStateView::InProgress;
                if let Some(progress) = payload_int(event, "progress") {
                    self.progress = progress.clamp(0, 100) as u8;
                }
            }
            EventType::TaskCompleted => {
                self.state = TaskStateView::Completed;
                self.progress = 100;
                self.completed_at = Some(event.timestamp);
            }
            EventType::TaskFailed => {
                self.state = TaskStateView::Failed;
                self.completed_at = Some(event.timestamp);
                self.error_message = payload_str(event, "error_message");
            }
            EventType::TaskBlocked => {
                self.state = TaskStateView::Blocked;
            }
            EventType::TaskUnblocked => {
                self.state = TaskStateView::InProgress;
            }
            _ => {}
        }
    }
}

// ============================================================================
// SECTION: Requirement Projection
// ============================================================================

/// Requirement lifecycle state (§3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementStateView {
    /// Awaiting a decision.
    Pending,
    /// Approved.
    Approved,
    /// Rejected.
    Rejected,
}

/// Read model for a single requirement (§3.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementProjection {
    /// Requirement identifier.
    pub id: RequirementId,
    /// Requirement description.
    pub description: String,
    /// Current lifecycle state.
    pub state: RequirementStateView,
    /// When the requirement was created.
    pub created_at: Option<Timestamp>,
    /// When the requirement was decided.
    pub decided_at: Option<Timestamp>,
    /// Actor who decided the requirement.
    pub decided_by: Option<String>,
}

impl Projector for RequirementProjection {
    fn empty(id: &str) -> Self {
        Self {
            id: RequirementId::new(id),
            description: String::new(),
            state: RequirementStateView::Pending,
            created_at: None,
            decided_at: None,
            decided_by: None,
        }
    }

    fn apply(&mut self, event: &Event) {
        match &event.event_type {
            EventType::RequirementCreated => {
                self.created_at = Some(event.timestamp);
                if let Some(description) = payload_str(event, "description") {
                    self.description = description;
                }
            }
            EventType::RequirementApproved => {
                self.state = RequirementStateView::Approved;
                self.decided_at = Some(event.timestamp);
                self.decided_by = Some(event.actor.as_str().to_string());
            }
            EventType::RequirementRejected => {
                self.state = RequirementStateView::Rejected;
                self.decided_at = Some(event.timestamp);
                self.decided_by = Some(event.actor.as_str().to_string());
            }
            _ => {}
        }
    }
}

// ============================================================================
// SECTION: Hive / Colony Projections
// ============================================================================

/// Hive lifecycle state (§3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiveStateView {
    /// At least one colony is in progress.
    Active,
    /// No colony is currently in progress.
    Idle,
    /// The hive was explicitly closed; terminal.
    Closed,
}

/// Colony lifecycle state (§3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColonyStateView {
    /// Not yet started.
    Pending,
    /// Actively executing.
    InProgress,
    /// Completed successfully.
    Completed,
    /// Failed.
    Failed,
    /// Suspended, typically by the Sentinel.
    Suspended,
}

/// Read model for a single colony within a hive (§3.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonyView {
    /// Colony identifier.
    pub colony_id: ColonyId,
    /// Current lifecycle state.
    pub state: ColonyStateView,
    /// Colony goal.
    pub goal: String,
    /// Free-form string metadata.
    pub metadata: BTreeMap<String, String>,
}

/// Read model for a hive and its colonies (§3.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiveAggregate {
    /// Hive identifier.
    pub hive_id: HiveId,
    /// Human-readable hive name.
    pub name: String,
    /// Current lifecycle state.
    pub state: HiveStateView,
    /// Colonies belonging to this hive, keyed by colony id.
    pub colonies: BTreeMap<String, ColonyView>,
}

impl Projector for HiveAggregate {
    fn empty(id: &str) -> Self {
        Self {
            hive_id: HiveId::new(id),
            name: String::new(),
            state: HiveStateView::Active,
            colonies: BTreeMap::new(),
        }
    }

    fn apply(&mut self, event: &Event) {
        match &event.event_type {
            EventType::HiveCreated => {
                if let Some(name) = payload_str(event, "name") {
                    self.name = name;
                }
            }
            EventType::HiveClosed => {
                self.state = HiveStateView::Closed;
            }
            _ => {}
        }
        if let Some(colony_id) = event.colony_id.as_ref() {
            let colony_id = colony_id.clone();
            let view = self
                .colonies
                .entry(colony_id.as_str().to_string())
                .or_insert_with(|| ColonyView {
                    colony_id: colony_id.clone(),
                    state: ColonyStateView::Pending,
                    goal: String::new(),
                    metadata: BTreeMap::new(),
                });
            match &event.event_type {
                EventType::ColonyCreated => {
                    if let Some(goal) = payload_str(event, "goal") {
                        view.goal = goal;
                    }
                }
                EventType::ColonyStarted => view.state = ColonyStateView::InProgress,
                EventType::ColonyCompleted => view.state = ColonyStateView::Completed,
                EventType::ColonyFailed => view.state = ColonyStateView::Failed,
                EventType::ColonySuspended => view.state = ColonyStateView::Suspended,
                _ => {}
            }
            if self.state == HiveStateView::Closed {
                // terminal; ignore further activity-derived state changes
            } else {
                self.state = if self
                    .colonies
                    .values()
                    .any(|c| c.state == ColonyStateView::InProgress)
                {
                    HiveStateView::Active
                } else {
                    HiveStateView::Idle
                };
            }
        }
    }
}

// ============================================================================
// SECTION: Worker Projections
// ============================================================================

/// Worker lifecycle state (§3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStateView {
    /// Idle, available for assignment.
    Idle,
    /// Actively working a task.
    Working,
    /// Finished its most recent task.
    Completed,
    /// Failed its most recent task.
    Failed,
    /// In an unrecoverable error state.
    Error,
}

/// Read model for a single worker (§3.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerProjection {
    /// Worker identifier.
    pub worker_id: WorkerId,
    /// Current lifecycle state.
    pub state: WorkerStateView,
    /// Task currently assigned, if any.
    pub current_task_id: Option<TaskId>,
    /// Run the current task belongs to, if any.
    pub current_run_id: Option<RunId>,
    /// Progress on the current task, in `[0, 100]`.
    pub progress: u8,
    /// Task ids completed by this worker.
    pub completed_tasks: Vec<TaskId>,
    /// Task ids failed by this worker.
    pub failed_tasks: Vec<TaskId>,
}

/// Read model for the worker pool as a whole (§3.2).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkerPoolProjection {
    /// Individual worker projections, keyed by worker id.
    pub workers: BTreeMap<String, WorkerProjection>,
}

impl Projector for WorkerPoolProjection {
    fn empty(_id: &str) -> Self {
        Self::default()
    }

    fn apply(&mut self, event: &Event) {
        let Some(worker_id) = event.worker_id.clone() else {
            return;
        };
        let worker = self
            .workers
            .entry(worker_id.as_str().to_string())
            .or_insert_with(|| WorkerProjection {
                worker_id: worker_id.clone(),
                state: WorkerStateView::Idle,
                current_task_id: None,
                current_run_id: None,
                progress: 0,
                completed_tasks: Vec::new(),
                failed_tasks: Vec::new(),
            });
        match &event.event_type {
            EventType::WorkerAssigned => {
                worker.state = WorkerStateView::Working;
                worker.current_task_id = event.task_id.clone();
                worker.current_run_id = event.run_id.clone();
                worker.progress = 0;
            }
            EventType::WorkerProgress => {
                if let Some(progress) = payload_int(event, "progress") {
                    worker.progress = progress.clamp(0, 100) as u8;
                }
            }
            EventType::WorkerCompleted => {
                worker.state = WorkerStateView::Completed;
                if let Some(task_id) = worker.current_task_id.take() {
                    worker.completed_tasks.push(task_id);
                }
                worker.current_run_id = None;
                worker.progress = 100;
            }
            EventType::WorkerFailed => {
                worker.state = WorkerStateView::Failed;
                if let Some(task_id) = worker.current_task_id.take() {
                    worker.failed_tasks.push(task_id);
                }
                worker.current_run_id = None;
            }
            _ => {}
        }
    }
}

// ============================================================================
// SECTION: Conference Projection
// ============================================================================

/// Conference lifecycle state (§3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConferenceStateView {
    /// Currently underway.
    Active,
    /// Concluded.
    Ended,
}

/// Read model for a conference (§3.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConferenceProjection {
    /// Conference identifier.
    pub conference_id: ConferenceId,
    /// Hive this conference belongs to.
    pub hive_id: Option<HiveId>,
    /// Conference topic.
    pub topic: String,
    /// Participant actor strings.
    pub participants: Vec<String>,
    /// Current lifecycle state.
    pub state: ConferenceStateView,
    /// When the conference started.
    pub started_at: Option<Timestamp>,
    /// When the conference ended.
    pub ended_at: Option<Timestamp>,
    /// Duration between `started_at` and `ended_at`, in seconds.
    pub duration_seconds: Option<f64>,
    /// Number of decisions recorded during the conference.
    pub decisions_made: u32,
    /// Free-form textual summary.
    pub summary: Option<String>,
}

impl Projector for ConferenceProjection {
    fn empty(id: &str) -> Self {
        Self {
            conference_id: ConferenceId::new(id),
            hive_id: None,
            topic: String::new(),
            participants: Vec::new(),
            state: ConferenceStateView::Active,
            started_at: None,
            ended_at: None,
            duration_seconds: None,
            decisions_made: 0,
            summary: None,
        }
    }

    fn apply(&mut self, event: &Event) {
        match &event.event_type {
            EventType::ConferenceStarted => {
                self.started_at = Some(event.timestamp);
                self.hive_id = event.hive_id.clone();
                if let Some(topic) = payload_str(event, "topic") {
                    self.topic = topic;
                }
            }
            EventType::ConferenceEnded => {
                self.state = ConferenceStateView::Ended;
                self.ended_at = Some(event.timestamp);
                self.summary = payload_str(event, "summary");
                if let Some(started_at) = self.started_at {
                    self.duration_seconds = Some(
                        event
                            .timestamp
                            .elapsed_since(&started_at)
                            .as_seconds_f64(),
                    );
                }
            }
            EventType::DecisionRecorded => {
                self.decisions_made += 1;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifiers::Actor;
    use crate::core::identifiers::RunId;

    fn event(event_type: EventType) -> Event {
        Event {
            id: crate::core::identifiers::EventId::new("e"),
            event_type,
            timestamp: Timestamp::new(time::OffsetDateTime::UNIX_EPOCH),
            run_id: Some(RunId::new("run-1")),
            hive_id: None,
            colony_id: None,
            task_id: None,
            worker_id: None,
            actor: Actor::system(),
            payload: crate::core::payload::Payload::new(),
            prev_hash: None,
            parents: Vec::new(),
            hash: String::new(),
        }
    }

    #[test]
    fn build_equals_incremental_fold() {
        let events = vec![
            event(EventType::RunStarted),
            event(EventType::RunCompleted),
        ];
        let built = RunProjection::build("run-1", &events);
        let mut folded = RunProjection::empty("run-1");
        for e in &events {
            folded.apply(e);
        }
        assert_eq!(built.state, folded.state);
        assert_eq!(built.event_count, folded.event_count);
    }

    #[test]
    fn unknown_event_type_is_ignored() {
        let mut projection = RunProjection::empty("run-1");
        projection.apply(&event(EventType::Unknown("bespoke.thing".to_string())));
        assert_eq!(projection.state, RunStateView::Running);
        assert_eq!(projection.event_count, 1);
    }
}
