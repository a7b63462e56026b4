// hiveforge-core/src/core/conflict.rs
// ============================================================================
// Module: Conflict Domain Entities
// Description: Resource claims and the conflict they may form (§4.12).
// Purpose: Give the conflict detector/resolver (hiveforge-orchestrator) a shared vocabulary.
// Dependencies: serde
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ColonyId;
use crate::core::identifiers::ResourceId;
use crate::core::time::Timestamp;

/// The operation a colony intends to perform on a resource (§4.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOperation {
    /// A non-mutating read.
    Read,
    /// A mutating write.
    Write,
    /// A deletion.
    Delete,
}

/// The kind of resource a claim targets, used to infer `ConflictType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// A filesystem path.
    File,
    /// An advisory lock name.
    Lock,
    /// A piece of shared in-memory or persisted state.
    State,
}

/// A colony's declared intent to operate on a resource (§4.12).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceClaim {
    /// The claiming colony.
    pub colony_id: ColonyId,
    /// The kind of resource.
    pub resource_type: ResourceType,
    /// The claimed resource's identifier.
    pub resource_id: ResourceId,
    /// The intended operation.
    pub operation: ClaimOperation,
    /// When the claim was registered.
    pub claimed_at: Timestamp,
}

/// Two claims conflict iff both are writes, one is a delete and the other a
/// write, or both are deletes (§4.12). Reads never conflict.
#[must_use]
pub fn claims_conflict(a: &ResourceClaim, b: &ResourceClaim) -> bool {
    use ClaimOperation::{Delete, Write};
    matches!(
        (a.operation, b.operation),
        (Write, Write) | (Write, Delete) | (Delete, Write) | (Delete, Delete)
    )
}

/// The resource category a conflict is inferred to be about (§4.12),
/// mirroring [`ResourceType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// A file conflict.
    File,
    /// A lock conflict.
    Lock,
    /// A state conflict.
    State,
}

impl From<ResourceType> for ConflictType {
    fn from(value: ResourceType) -> Self {
        match value {
            ResourceType::File => Self::File,
            ResourceType::Lock => Self::Lock,
            ResourceType::State => Self::State,
        }
    }
}

/// Severity of a detected conflict (§4.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConflictSeverity {
    /// Default severity.
    Medium,
    /// More than two colonies involved.
    High,
    /// Any claim involved is a delete.
    Critical,
}

/// Infers severity from the involved claims (§4.12): CRITICAL if any claim
/// is a delete, HIGH if more than two distinct colonies are involved,
/// otherwise MEDIUM.
#[must_use]
pub fn infer_severity(claims: &[ResourceClaim]) -> ConflictSeverity {
    let has_delete = claims.iter().any(|c| c.operation == ClaimOperation::Delete);
    if has_delete {
        return ConflictSeverity::Critical;
    }
    let mut colonies: Vec<&str> = claims.iter().map(|c| c.colony_id.as_str()).collect();
    colonies.sort_unstable();
    colonies.dedup();
    if colonies.len() > 2 {
        ConflictSeverity::High
    } else {
        ConflictSeverity::Medium
    }
}

/// A detected conflict between two or more claims on the same resource
/// (§4.12).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// The resource under contention.
    pub resource_id: ResourceId,
    /// Every claim involved.
    pub claims: Vec<ResourceClaim>,
    /// Inferred conflict category.
    pub conflict_type: ConflictType,
    /// Inferred severity.
    pub severity: ConflictSeverity,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(colony: &str, op: ClaimOperation) -> ResourceClaim {
        ResourceClaim {
            colony_id: ColonyId::new(colony),
            resource_type: ResourceType::File,
            resource_id: ResourceId::new("res-1"),
            operation: op,
            claimed_at: Timestamp::new(time::OffsetDateTime::UNIX_EPOCH),
        }
    }

    #[test]
    fn reads_never_conflict() {
        let a = claim("c1", ClaimOperation::Read);
        let b = claim("c2", ClaimOperation::Read);
        assert!(!claims_conflict(&a, &b));
    }

    #[test]
    fn write_write_conflicts() {
        let a = claim("c1", ClaimOperation::Write);
        let b = claim("c2", ClaimOperation::Write);
        assert!(claims_conflict(&a, &b));
    }

    #[test]
    fn any_delete_is_critical() {
        let claims = vec![claim("c1", ClaimOperation::Write), claim("c2", ClaimOperation::Delete)];
        assert_eq!(infer_severity(&claims), ConflictSeverity::Critical);
    }

    #[test]
    fn three_colonies_is_high() {
        let claims = vec![
            claim("c1", ClaimOperation::Write),
            claim("c2", ClaimOperation::Write),
            claim("c3", ClaimOperation::Write),
        ];
        assert_eq!(infer_severity(&claims), ConflictSeverity::High);
    }
}
