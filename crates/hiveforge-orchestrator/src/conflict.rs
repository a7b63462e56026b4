// hiveforge-orchestrator/src/conflict.rs
// ============================================================================
// Module: Conflict Detection & Resolution
// Description: Resource-claim registry, synchronous conflict notification,
//              and pluggable resolution strategies (§4.12).
// Dependencies: hiveforge_core::conflict::{ResourceClaim, Conflict, ...}
// ============================================================================

//! ## Overview
//! Colonies declare intent to touch a resource by registering a
//! [`ResourceClaim`] with the [`ConflictDetector`]. Every claim is compared
//! against prior claims on the same resource from a *different* colony
//! (§4.12); a conflicting pair is folded into one [`Conflict`] covering
//! every claim involved and broadcast synchronously to registered
//! listeners. A listener that returns an error has it logged and swallowed
//! — "listener exceptions are swallowed" (§4.12, §7) — so one misbehaving
//! observer can never cascade into a second failure.
//!
//! The [`ConflictResolver`] is a separate, stateless-per-call component:
//! given a [`Conflict`] and a [`ResolutionStrategy`], it decides a winner,
//! a queue, an abort, or an escalation. It never touches the claims
//! registry itself.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Mutex;

use hiveforge_core::ColonyId;
use hiveforge_core::Conflict;
use hiveforge_core::ConflictType;
use hiveforge_core::ResourceClaim;
use hiveforge_core::ResourceId;
use hiveforge_core::claims_conflict;
use hiveforge_core::infer_severity;

/// A listener invoked synchronously whenever [`ConflictDetector::register_claim`]
/// detects a new conflict. Returning `Err` only causes the message to be
/// logged; it never aborts the registration (§4.12).
pub type ConflictListener = Box<dyn Fn(&Conflict) -> Result<(), String> + Send + Sync>;

/// Registry of outstanding resource claims, keyed by `resource_id` (§4.12).
#[derive(Default)]
pub struct ConflictDetector {
    /// Claims registered so far, keyed by resource id, in registration order.
    claims: Mutex<BTreeMap<String, Vec<ResourceClaim>>>,
    /// Listeners notified synchronously whenever a conflict is detected.
    listeners: Mutex<Vec<ConflictListener>>,
}

impl ConflictDetector {
    /// Builds an empty registry with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a synchronous conflict listener.
    pub fn subscribe(&self, listener: ConflictListener) {
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier listener call panicked while holding the lock")]
        self.listeners.lock().unwrap().push(listener);
    }

    /// Registers `claim`, compares it against every prior claim on the same
    /// resource from a different colony, and returns the resulting
    /// [`Conflict`] if any prior claim conflicts (§4.12). The new claim is
    /// stored regardless of the outcome.
    #[must_use]
    pub fn register_claim(&self, claim: ResourceClaim) -> Option<Conflict> {
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
        let mut claims = self.claims.lock().unwrap();
        let bucket = claims.entry(claim.resource_id.as_str().to_string()).or_default();

        let mut conflicting: Vec<ResourceClaim> = bucket
            .iter()
            .filter(|prior| prior.colony_id != claim.colony_id && claims_conflict(prior, &claim))
            .cloned()
            .collect();

        bucket.push(claim.clone());
        drop(claims);

        if conflicting.is_empty() {
            return None;
        }
        conflicting.push(claim.clone());

        let conflict = Conflict {
            resource_id: claim.resource_id.clone(),
            conflict_type: ConflictType::from(claim.resource_type),
            severity: infer_severity(&conflicting),
            claims: conflicting,
        };
        self.notify(&conflict);
        Some(conflict)
    }

    /// Returns every claim currently registered for `resource_id`, in
    /// registration order.
    #[must_use]
    pub fn claims_for(&self, resource_id: &ResourceId) -> Vec<ResourceClaim> {
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
        let claims = self.claims.lock().unwrap();
        claims.get(resource_id.as_str()).cloned().unwrap_or_default()
    }

    /// Removes every claim `colony_id` holds on `resource_id`, e.g. once
    /// the colony's work on that resource has completed. Returns `true` if
    /// any claim was removed.
    pub fn release_claim(&self, colony_id: &ColonyId, resource_id: &ResourceId) -> bool {
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier caller panicked while holding the lock")]
        let mut claims = self.claims.lock().unwrap();
        let Some(bucket) = claims.get_mut(resource_id.as_str()) else { return false };
        let before = bucket.len();
        bucket.retain(|claim| claim.colony_id != *colony_id);
        bucket.len() < before
    }

    fn notify(&self, conflict: &Conflict) {
        #[expect(clippy::unwrap_used, reason = "poisoned only if an earlier listener call panicked while holding the lock")]
        let listeners = self.listeners.lock().unwrap();
        for listener in listeners.iter() {
            if let Err(message) = listener(conflict) {
                tracing::warn!(resource_id = %conflict.resource_id, error = %message, "conflict listener failed");
            }
        }
    }
}

/// Strategy the [`ConflictResolver`] applies to a detected [`Conflict`] (§4.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// The claim with the earliest timestamp wins.
    FirstCome,
    /// The colony with the highest configured priority wins.
    PriorityBased,
    /// A registered merge rule is applied; escalates if none is registered
    /// or the rule declines to merge.
    Merge,
    /// Every involved colony is aborted.
    AbortAll,
    /// The earliest claim wins the lock; the rest are queued.
    LockAndQueue,
    /// Every involved colony is asked to retry later.
    RetryLater,
    /// Always escalates for a human decision.
    Manual,
}

/// Result of resolving one [`Conflict`] (§4.12).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// `winner` proceeds; every other colony in the conflict backs off.
    Resolved {
        /// The colony allowed to proceed.
        winner: ColonyId,
        /// Every other colony involved, in conflict order.
        losers: Vec<ColonyId>,
    },
    /// The merge rule successfully reconciled every claim; no colony loses.
    Merged {
        /// Every colony whose claim was merged.
        colonies: Vec<ColonyId>,
    },
    /// `winner` holds the resource lock; the rest wait in `queued`.
    Locked {
        /// The colony holding the lock.
        winner: ColonyId,
        /// Colonies queued behind the lock, in conflict order.
        queued: Vec<ColonyId>,
    },
    /// Every involved colony is aborted.
    Aborted {
        /// Every aborted colony.
        colonies: Vec<ColonyId>,
    },
    /// Every involved colony should retry after a delay.
    RetryScheduled {
        /// Every colony asked to retry.
        colonies: Vec<ColonyId>,
    },
    /// No automatic decision was made; a human must resolve this conflict.
    Escalated {
        /// Why automatic resolution did not apply.
        reason: String,
    },
}

/// A callback invoked when [`ResolutionStrategy::Merge`] applies: given the
/// conflict, returns whether every claim was successfully reconciled.
pub type MergeRule = Box<dyn Fn(&Conflict) -> bool + Send + Sync>;

/// Resolves detected conflicts according to a configured strategy (§4.12).
/// Holds no claims registry state of its own.
#[derive(Default)]
pub struct ConflictResolver {
    /// Configured priority per colony id; colonies absent here default to `0`.
    priorities: HashMap<String, u8>,
    /// Registered merge rule per conflict type.
    merge_rules: HashMap<ConflictType, MergeRule>,
}

impl ConflictResolver {
    /// Builds a resolver with no configured priorities or merge rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the priority (higher wins) used by [`ResolutionStrategy::PriorityBased`]
    /// for `colony_id`. Colonies with no configured priority default to `0`.
    pub fn set_priority(&mut self, colony_id: &ColonyId, priority: u8) {
        self.priorities.insert(colony_id.as_str().to_string(), priority);
    }

    /// Registers the merge rule applied by [`ResolutionStrategy::Merge`]
    /// for conflicts of kind `conflict_type`.
    pub fn register_merge_rule(&mut self, conflict_type: ConflictType, rule: MergeRule) {
        self.merge_rules.insert(conflict_type, rule);
    }

    /// Resolves `conflict` under `strategy` (§4.12).
    #[must_use]
    pub fn resolve(&self, conflict: &Conflict, strategy: ResolutionStrategy) -> ResolutionOutcome {
        match strategy {
            ResolutionStrategy::FirstCome => self.first_come(conflict),
            ResolutionStrategy::PriorityBased => self.priority_based(conflict),
            ResolutionStrategy::Merge => self.merge(conflict),
            ResolutionStrategy::AbortAll => ResolutionOutcome::Aborted { colonies: distinct_colonies(conflict) },
            ResolutionStrategy::LockAndQueue => self.lock_and_queue(conflict),
            ResolutionStrategy::RetryLater => ResolutionOutcome::RetryScheduled { colonies: distinct_colonies(conflict) },
            ResolutionStrategy::Manual => {
                ResolutionOutcome::Escalated { reason: "manual resolution strategy always escalates".to_string() }
            }
        }
    }

    fn first_come(&self, conflict: &Conflict) -> ResolutionOutcome {
        let winner = earliest_claim(conflict).colony_id.clone();
        let losers = distinct_colonies(conflict).into_iter().filter(|colony| *colony != winner).collect();
        ResolutionOutcome::Resolved { winner, losers }
    }

    fn priority_based(&self, conflict: &Conflict) -> ResolutionOutcome {
        let winner = conflict
            .claims
            .iter()
            .max_by_key(|claim| {
                (self.priorities.get(claim.colony_id.as_str()).copied().unwrap_or(0), std::cmp::Reverse(&claim.claimed_at))
            })
            .map_or_else(|| earliest_claim(conflict).colony_id.clone(), |claim| claim.colony_id.clone());
        let losers = distinct_colonies(conflict).into_iter().filter(|colony| *colony != winner).collect();
        ResolutionOutcome::Resolved { winner, losers }
    }

    fn merge(&self, conflict: &Conflict) -> ResolutionOutcome {
        match self.merge_rules.get(&conflict.conflict_type) {
            Some(rule) if rule(conflict) => ResolutionOutcome::Merged { colonies: distinct_colonies(conflict) },
            Some(_) => ResolutionOutcome::Escalated { reason: "merge rule declined to reconcile the conflict".to_string() },
            None => ResolutionOutcome::Escalated {
                reason: format!("no merge rule registered for {:?} conflicts", conflict.conflict_type),
            },
        }
    }

    fn lock_and_queue(&self, conflict: &Conflict) -> ResolutionOutcome {
        let winner = earliest_claim(conflict).colony_id.clone();
        let queued = distinct_colonies(conflict).into_iter().filter(|colony| *colony != winner).collect();
        ResolutionOutcome::Locked { winner, queued }
    }
}

/// Returns the claim with the earliest `claimed_at`, ties broken by colony
/// id for determinism.
fn earliest_claim(conflict: &Conflict) -> &ResourceClaim {
    conflict
        .claims
        .iter()
        .min_by(|a, b| a.claimed_at.cmp(&b.claimed_at).then_with(|| a.colony_id.cmp(&b.colony_id)))
        .unwrap_or_else(|| &conflict.claims[0])
}

/// Every distinct colony involved in `conflict`, sorted for determinism.
fn distinct_colonies(conflict: &Conflict) -> Vec<ColonyId> {
    let mut colonies: Vec<ColonyId> = conflict.claims.iter().map(|claim| claim.colony_id.clone()).collect();
    colonies.sort();
    colonies.dedup();
    colonies
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use hiveforge_core::ClaimOperation;
    use hiveforge_core::ResourceType;
    use hiveforge_core::Timestamp;

    use super::*;

    fn claim(colony: &str, op: ClaimOperation, offset_seconds: i64) -> ResourceClaim {
        ResourceClaim {
            colony_id: ColonyId::new(colony),
            resource_type: ResourceType::File,
            resource_id: ResourceId::new("shared.rs"),
            operation: op,
            claimed_at: Timestamp::new(time::OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(offset_seconds)),
        }
    }

    #[test]
    fn write_write_from_different_colonies_conflicts() {
        let detector = ConflictDetector::new();
        assert!(detector.register_claim(claim("c1", ClaimOperation::Write, 0)).is_none());
        let conflict = detector.register_claim(claim("c2", ClaimOperation::Write, 1)).expect("conflict detected");
        assert_eq!(conflict.claims.len(), 2);
    }

    #[test]
    fn same_colony_never_conflicts_with_itself() {
        let detector = ConflictDetector::new();
        assert!(detector.register_claim(claim("c1", ClaimOperation::Write, 0)).is_none());
        assert!(detector.register_claim(claim("c1", ClaimOperation::Write, 1)).is_none());
    }

    #[test]
    fn listeners_are_notified_synchronously() {
        let detector = ConflictDetector::new();
        let seen = std::sync::Arc::new(AtomicUsize::new(0));
        let seen_clone = std::sync::Arc::clone(&seen);
        detector.subscribe(Box::new(move |_conflict| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        detector.register_claim(claim("c1", ClaimOperation::Write, 0));
        detector.register_claim(claim("c2", ClaimOperation::Write, 1));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn a_failing_listener_does_not_prevent_the_conflict_from_being_returned() {
        let detector = ConflictDetector::new();
        detector.subscribe(Box::new(|_conflict| Err("boom".to_string())));
        detector.register_claim(claim("c1", ClaimOperation::Write, 0));
        let conflict = detector.register_claim(claim("c2", ClaimOperation::Write, 1));
        assert!(conflict.is_some());
    }

    #[test]
    fn first_come_strategy_picks_the_earliest_claim() {
        let detector = ConflictDetector::new();
        detector.register_claim(claim("c1", ClaimOperation::Write, 5));
        let conflict = detector.register_claim(claim("c2", ClaimOperation::Write, 0)).expect("conflict");
        let resolver = ConflictResolver::new();
        let outcome = resolver.resolve(&conflict, ResolutionStrategy::FirstCome);
        assert_eq!(outcome, ResolutionOutcome::Resolved { winner: ColonyId::new("c2"), losers: vec![ColonyId::new("c1")] });
    }

    #[test]
    fn priority_based_strategy_picks_the_highest_priority_colony() {
        let detector = ConflictDetector::new();
        detector.register_claim(claim("c1", ClaimOperation::Write, 0));
        let conflict = detector.register_claim(claim("c2", ClaimOperation::Write, 1)).expect("conflict");
        let mut resolver = ConflictResolver::new();
        resolver.set_priority(&ColonyId::new("c1"), 10);
        let outcome = resolver.resolve(&conflict, ResolutionStrategy::PriorityBased);
        assert_eq!(outcome, ResolutionOutcome::Resolved { winner: ColonyId::new("c1"), losers: vec![ColonyId::new("c2")] });
    }

    #[test]
    fn merge_without_a_registered_rule_escalates() {
        let detector = ConflictDetector::new();
        detector.register_claim(claim("c1", ClaimOperation::Write, 0));
        let conflict = detector.register_claim(claim("c2", ClaimOperation::Write, 1)).expect("conflict");
        let resolver = ConflictResolver::new();
        assert!(matches!(resolver.resolve(&conflict, ResolutionStrategy::Merge), ResolutionOutcome::Escalated { .. }));
    }

    #[test]
    fn any_delete_yields_critical_severity() {
        let detector = ConflictDetector::new();
        detector.register_claim(claim("c1", ClaimOperation::Write, 0));
        let conflict = detector.register_claim(claim("c2", ClaimOperation::Delete, 1)).expect("conflict");
        assert_eq!(conflict.severity, hiveforge_core::ConflictSeverity::Critical);
    }

    #[test]
    fn releasing_a_claim_lets_the_colony_claim_again_without_conflict() {
        let detector = ConflictDetector::new();
        let resource_id = ResourceId::new("shared.rs");
        detector.register_claim(claim("c1", ClaimOperation::Write, 0));
        assert!(detector.release_claim(&ColonyId::new("c1"), &resource_id));
        assert!(detector.claims_for(&resource_id).is_empty());
        assert!(!detector.release_claim(&ColonyId::new("c1"), &resource_id));
    }
}
