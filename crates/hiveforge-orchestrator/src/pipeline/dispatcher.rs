// hiveforge-orchestrator/src/pipeline/dispatcher.rs
// ============================================================================
// Module: Task Dispatcher
// Description: Experience-heuristic worker assignment over a dependency
//              layer (§4.6).
// Dependencies: hiveforge_core::WorkerPoolProjection
// ============================================================================

use std::cmp::Reverse;

use hiveforge_core::TaskId;
use hiveforge_core::WorkerId;
use hiveforge_core::WorkerPoolProjection;
use hiveforge_core::WorkerStateView;

/// Picks a worker for each task in a dependency layer (§4.6
/// "dispatch assigns the least-loaded available worker within a layer").
///
/// A worker is available if the pool's last-known state for it is
/// [`WorkerStateView::Idle`] or [`WorkerStateView::Completed`]: the pool
/// projection never folds a worker back to `Idle` after it finishes a task,
/// so `Completed` is this dispatcher's reading of "available" alongside the
/// literal idle state.
pub struct Dispatcher;

impl Dispatcher {
    /// Assigns each task in `layer` to the least-loaded available worker in
    /// `pool`, breaking ties by worker id for determinism. Workers already
    /// claimed earlier in the same call are excluded from later picks, so
    /// one layer never double-books a worker. Tasks past the number of
    /// available workers are left unassigned; the caller should hold them
    /// for the next round.
    #[must_use]
    pub fn assign(pool: &WorkerPoolProjection, layer: &[TaskId]) -> Vec<(TaskId, WorkerId)> {
        let mut claimed: Vec<&str> = Vec::new();
        let mut assignments = Vec::with_capacity(layer.len());

        for task_id in layer {
            let pick = pool
                .workers
                .values()
                .filter(|worker| is_available(worker.state))
                .filter(|worker| !claimed.contains(&worker.worker_id.as_str()))
                .min_by_key(|worker| (Reverse(load_rank(worker)), worker.worker_id.as_str().to_string()));

            let Some(worker) = pick else { continue };
            claimed.push(worker.worker_id.as_str());
            assignments.push((task_id.clone(), worker.worker_id.clone()));
        }

        assignments
    }
}

fn is_available(state: WorkerStateView) -> bool {
    matches!(state, WorkerStateView::Idle | WorkerStateView::Completed)
}

/// Experience heuristic: fewer completed tasks and more failures both lower
/// a worker's priority, reflecting less-proven throughput.
fn load_rank(worker: &hiveforge_core::WorkerProjection) -> i64 {
    let completed = i64::try_from(worker.completed_tasks.len()).unwrap_or(i64::MAX);
    let failed = i64::try_from(worker.failed_tasks.len()).unwrap_or(i64::MAX);
    completed - failed
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use hiveforge_core::WorkerProjection;

    use super::*;

    fn worker(id: &str, state: WorkerStateView, completed: usize, failed: usize) -> WorkerProjection {
        WorkerProjection {
            worker_id: WorkerId::new(id),
            state,
            current_task_id: None,
            current_run_id: None,
            progress: 0,
            completed_tasks: (0 .. completed).map(|n| TaskId::new(format!("done-{n}"))).collect(),
            failed_tasks: (0 .. failed).map(|n| TaskId::new(format!("fail-{n}"))).collect(),
        }
    }

    #[test]
    fn prefers_the_most_experienced_available_worker() {
        let mut pool = WorkerPoolProjection::default();
        pool.workers.insert("a".to_string(), worker("a", WorkerStateView::Idle, 1, 0));
        pool.workers.insert("b".to_string(), worker("b", WorkerStateView::Completed, 5, 0));
        pool.workers.insert("c".to_string(), worker("c", WorkerStateView::Working, 9, 0));

        let layer = vec![TaskId::new("t1")];
        let assignments = Dispatcher::assign(&pool, &layer);
        assert_eq!(assignments, vec![(TaskId::new("t1"), WorkerId::new("b"))]);
    }

    #[test]
    fn never_double_books_a_worker_within_one_layer() {
        let mut pool = WorkerPoolProjection::default();
        pool.workers.insert("a".to_string(), worker("a", WorkerStateView::Idle, 0, 0));

        let layer = vec![TaskId::new("t1"), TaskId::new("t2")];
        let assignments = Dispatcher::assign(&pool, &layer);
        assert_eq!(assignments.len(), 1);
    }

    #[test]
    fn skips_workers_that_are_not_available() {
        let mut pool = WorkerPoolProjection::default();
        pool.workers.insert("a".to_string(), worker("a", WorkerStateView::Failed, 0, 0));
        pool.workers.insert("b".to_string(), worker("b", WorkerStateView::Error, 0, 0));

        let layer = vec![TaskId::new("t1")];
        assert!(Dispatcher::assign(&pool, &layer).is_empty());
    }
}
