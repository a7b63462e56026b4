// hiveforge-orchestrator/src/pipeline/execution.rs
// ============================================================================
// Module: Task Pipeline Execution
// Description: Drives a validated task plan layer by layer, dispatching to
//              workers, retrying failures, and recording every step to the
//              Akashic Record (§4.6).
// Dependencies: hiveforge_core::{WorkerPoolProjection, Projector}, hiveforge_storage::AkashicRecord
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use hiveforge_core::Actor;
use hiveforge_core::Clock;
use hiveforge_core::ColonyId;
use hiveforge_core::Event;
use hiveforge_core::EventType;
use hiveforge_core::Payload;
use hiveforge_core::PayloadValue;
use hiveforge_core::Projector;
use hiveforge_core::RunId;
use hiveforge_core::TaskId;
use hiveforge_core::WorkerId;
use hiveforge_core::WorkerPoolProjection;
use hiveforge_storage::AkashicRecord;

use crate::error::OrchestratorError;
use crate::eventlog::append_event;
use crate::pipeline::TaskPlan;
use crate::pipeline::dispatcher::Dispatcher;
use crate::pipeline::retry::RetryDecision;
use crate::pipeline::retry::RetryManager;

/// Result a [`TaskExecutor`] reports for one dispatched task.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// The worker finished the task successfully.
    Completed {
        /// Free-form summary of what the worker did.
        summary: String,
    },
    /// The worker failed the task.
    Failed {
        /// Why the task failed.
        reason: String,
    },
}

/// External capability that performs the actual work a task describes.
/// The coordination core never executes task goals itself; it delegates to
/// whatever Worker Bee agent the caller wires in, mirroring the
/// [`hiveforge_llm::LlmClient`] capability-trait pattern used for LLM calls.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Executes `goal` on behalf of `worker_id` and reports the outcome.
    async fn execute(&self, worker_id: &WorkerId, task_id: &TaskId, goal: &str) -> TaskOutcome;
}

/// Per-run status of one task as the pipeline sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunStatus {
    /// Completed successfully.
    Completed,
    /// Exhausted its retry budget.
    Failed,
}

/// Outcome of running a full plan to exhaustion (§4.6).
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    /// Tasks that completed successfully, in completion order.
    pub completed: Vec<TaskId>,
    /// Tasks that exhausted their retry budget, in failure order.
    pub failed: Vec<TaskId>,
    /// Tasks never dispatched because no worker became available.
    pub undispatched: Vec<TaskId>,
}

/// Drives a [`TaskPlan`] through dispatch and retry, one dependency layer at
/// a time (§4.6).
pub struct TaskPipeline<'a> {
    /// Run this pipeline's events are appended under.
    run_id: RunId,
    /// Colony the dispatched tasks belong to.
    colony_id: ColonyId,
    /// Event log the pipeline appends `worker.*`/`task.*` events to.
    record: Arc<AkashicRecord>,
    /// Clock used to timestamp emitted events.
    clock: Arc<dyn Clock>,
    /// External executor performing the task goals.
    executor: &'a dyn TaskExecutor,
    /// Retry bookkeeping, shared across the whole plan.
    retry: RetryManager,
}

impl<'a> TaskPipeline<'a> {
    /// Builds a pipeline bounded by `max_retries` retries per task.
    #[must_use]
    pub fn new(
        run_id: RunId,
        colony_id: ColonyId,
        record: Arc<AkashicRecord>,
        clock: Arc<dyn Clock>,
        executor: &'a dyn TaskExecutor,
        max_retries: u32,
    ) -> Self {
        Self { run_id, colony_id, record, clock, executor, retry: RetryManager::new(max_retries) }
    }

    fn emit(
        &self,
        event_type: EventType,
        task_id: Option<TaskId>,
        worker_id: Option<WorkerId>,
        payload: Payload,
    ) -> Result<Event, OrchestratorError> {
        append_event(
            &self.record,
            self.clock.as_ref(),
            &self.run_id,
            event_type,
            Some(self.colony_id.clone()),
            task_id,
            worker_id,
            Actor::system(),
            payload,
        )
    }

    /// Runs `plan` to exhaustion: each dependency layer is dispatched to the
    /// least-loaded available workers, retried on failure with exponential
    /// backoff up to the configured ceiling, and marked failed once that
    /// budget is spent. A task with no available worker is returned
    /// unretried via [`PipelineOutcome::undispatched`] for the caller to
    /// retry once the pool projection reflects newly idle workers.
    ///
    /// # Errors
    ///
    /// Propagates [`OrchestratorError::Storage`] if event persistence fails.
    pub async fn run(&mut self, plan: &TaskPlan, pool: &AkashicRecord) -> Result<PipelineOutcome, OrchestratorError> {
        let mut outcome = PipelineOutcome::default();

        for layer in plan.execution_order() {
            let mut remaining = layer;
            while !remaining.is_empty() {
                let worker_pool = rebuild_worker_pool(pool, self.run_id.as_str())?;
                let assignments = Dispatcher::assign(&worker_pool, &remaining);
                if assignments.is_empty() {
                    outcome.undispatched.extend(remaining.iter().cloned());
                    break;
                }

                let assigned_ids: Vec<TaskId> = assignments.iter().map(|(task_id, _)| task_id.clone()).collect();
                remaining.retain(|task_id| !assigned_ids.contains(task_id));

                for (task_id, worker_id) in assignments {
                    let goal =
                        plan.tasks.iter().find(|task| task.id == task_id).map_or("", |task| task.goal.as_str());
                    self.dispatch_one(&mut outcome, &mut remaining, task_id, worker_id, goal).await?;
                }
            }
        }

        Ok(outcome)
    }

    async fn dispatch_one(
        &mut self,
        outcome: &mut PipelineOutcome,
        remaining: &mut Vec<TaskId>,
        task_id: TaskId,
        worker_id: WorkerId,
        goal: &str,
    ) -> Result<(), OrchestratorError> {
        let mut payload = Payload::new();
        payload.insert("goal".to_string(), PayloadValue::String(goal.to_string()));
        self.emit(EventType::WorkerAssigned, Some(task_id.clone()), Some(worker_id.clone()), payload)?;
        self.emit(EventType::WorkerStarted, Some(task_id.clone()), Some(worker_id.clone()), Payload::new())?;

        match self.executor.execute(&worker_id, &task_id, goal).await {
            TaskOutcome::Completed { summary } => {
                let mut payload = Payload::new();
                payload.insert("summary".to_string(), PayloadValue::String(summary));
                self.emit(EventType::WorkerCompleted, Some(task_id.clone()), Some(worker_id), payload)?;
                self.emit(EventType::TaskCompleted, Some(task_id.clone()), None, Payload::new())?;
                self.retry.clear(&task_id);
                outcome.completed.push(task_id);
            }
            TaskOutcome::Failed { reason } => {
                let mut payload = Payload::new();
                payload.insert("reason".to_string(), PayloadValue::String(reason));
                self.emit(EventType::WorkerFailed, Some(task_id.clone()), Some(worker_id), payload)?;

                match self.retry.record_failure(&task_id) {
                    RetryDecision::Retry { attempt, .. } => {
                        let mut payload = Payload::new();
                        payload.insert("attempt".to_string(), PayloadValue::Int(i64::from(attempt)));
                        self.emit(EventType::TaskCreated, Some(task_id.clone()), None, payload)?;
                        remaining.push(task_id);
                    }
                    RetryDecision::Exhausted => {
                        self.emit(EventType::TaskFailed, Some(task_id.clone()), None, Payload::new())?;
                        outcome.failed.push(task_id);
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns this pipeline's retry manager so the caller can inspect
    /// attempt counts outside the main run loop.
    #[must_use]
    pub fn retry_manager(&self) -> &RetryManager {
        &self.retry
    }
}

fn rebuild_worker_pool(record: &AkashicRecord, run_id: &str) -> Result<WorkerPoolProjection, OrchestratorError> {
    let events = record.replay(run_id)?;
    Ok(WorkerPoolProjection::build(run_id, &events))
}
