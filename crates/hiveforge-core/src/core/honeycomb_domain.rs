// hiveforge-core/src/core/honeycomb_domain.rs
// ============================================================================
// Module: Honeycomb Domain Entities
// Description: Recorded run episodes and their KPI scores (§3.5).
// Purpose: Give the Scout Bee recommender (hiveforge-scout) a shared vocabulary.
// Dependencies: serde, std::collections::BTreeMap
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ColonyId;
use crate::core::identifiers::EpisodeId;
use crate::core::identifiers::RunId;

/// How an episode concluded (§3.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The run succeeded.
    Success,
    /// The run failed.
    Failure,
    /// The run partially succeeded.
    Partial,
}

/// Coarse classification of why an episode failed (§3.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// The requirement itself was wrong or incomplete.
    SpecificationError,
    /// The chosen approach was flawed.
    DesignError,
    /// The approach was sound but the implementation was not.
    ImplementationError,
    /// A dependency or integration point broke.
    IntegrationError,
    /// The execution environment was at fault.
    EnvironmentError,
    /// The run exceeded its time budget.
    Timeout,
}

/// Outcome-quality measurements for one episode (§3.5). Every field is
/// optional because not every episode produces every measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct KpiScores {
    /// Fraction of acceptance criteria satisfied, in `[0, 1]`.
    pub correctness: Option<f64>,
    /// How many attempts were required before success (≥ 0).
    pub repeatability: Option<f64>,
    /// Wall-clock time from intake to completion, in seconds (≥ 0).
    pub lead_time_seconds: Option<f64>,
    /// Fraction of related episodes that required intervention, in `[0, 1]`.
    pub incident_rate: Option<f64>,
    /// Fraction of similar episodes that recurred after resolution, in `[0, 1]`.
    pub recurrence_rate: Option<f64>,
}

/// A single recorded run outcome, the unit Scout Bee reasons over (§3.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    /// Episode identifier.
    pub episode_id: EpisodeId,
    /// Run this episode was derived from.
    pub run_id: RunId,
    /// Colony this episode was derived from.
    pub colony_id: ColonyId,
    /// Name of the task template used, if any.
    pub template_used: Option<String>,
    /// Numeric feature vector describing the task.
    pub task_features: BTreeMap<String, f64>,
    /// How the episode concluded.
    pub outcome: Outcome,
    /// Wall-clock duration, in seconds (≥ 0).
    pub duration_seconds: f64,
    /// Total LLM tokens consumed (≥ 0).
    pub token_count: u64,
    /// Failure classification, present only when `outcome != Success`.
    pub failure_class: Option<FailureClass>,
    /// Outcome-quality measurements.
    pub kpi_scores: KpiScores,
    /// Episodes this one descended from (e.g. retries).
    pub parent_episode_ids: Vec<EpisodeId>,
    /// The goal text this episode pursued.
    pub goal: String,
    /// Free-form string metadata.
    pub metadata: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kpi_scores_default_to_absent() {
        let scores = KpiScores::default();
        assert!(scores.correctness.is_none());
        assert!(scores.lead_time_seconds.is_none());
    }
}
