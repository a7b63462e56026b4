// hiveforge-orchestrator/src/eventlog.rs
// ============================================================================
// Module: Event Log Helper
// Description: Shared append-with-chaining helper for orchestrator modules
//              that write directly to the Akashic Record outside the RA
//              driver (Sentinel Hornet, Guard Bee, conflict resolver, task
//              pipeline, silence detector).
// Dependencies: hiveforge_core::{Event, Clock}, hiveforge_storage::AkashicRecord
// ============================================================================

use hiveforge_core::Actor;
use hiveforge_core::ColonyId;
use hiveforge_core::Event;
use hiveforge_core::EventType;
use hiveforge_core::Clock;
use hiveforge_core::Payload;
use hiveforge_core::RunId;
use hiveforge_core::TaskId;
use hiveforge_core::WorkerId;
use hiveforge_storage::AkashicRecord;

use crate::error::OrchestratorError;

/// Appends one event to `run_id`'s stream, resolving `prev_hash` from the
/// stream's current tail and finalizing the hash chain, mirroring the RA
/// driver's `record_event` (§4.5, §3.1).
///
/// # Errors
///
/// Propagates [`OrchestratorError::Storage`] and
/// [`OrchestratorError::Persistence`] if hashing fails.
#[allow(clippy::too_many_arguments, reason = "mirrors the Event struct's own field count")]
pub(crate) fn append_event(
    record: &AkashicRecord,
    clock: &dyn Clock,
    run_id: &RunId,
    event_type: EventType,
    colony_id: Option<ColonyId>,
    task_id: Option<TaskId>,
    worker_id: Option<WorkerId>,
    actor: Actor,
    payload: Payload,
) -> Result<Event, OrchestratorError> {
    let prev_hash = record.last_event(run_id.as_str())?.map(|event| event.hash);
    let event = Event {
        id: hiveforge_storage::new_event_id(),
        event_type,
        timestamp: clock.now(),
        run_id: Some(run_id.clone()),
        hive_id: None,
        colony_id,
        task_id,
        worker_id,
        actor,
        payload,
        prev_hash,
        parents: Vec::new(),
        hash: String::new(),
    }
    .finalized()
    .map_err(|err| OrchestratorError::Persistence(err.to_string()))?;
    Ok(record.append(event)?)
}
