// hiveforge-scout/src/scout_bee.rs
// ============================================================================
// Module: Scout Bee Recommender
// Description: Template recommendation from Honeycomb history (§4.14).
// Dependencies: hiveforge_core::{Episode, Outcome}
// ============================================================================

use std::collections::BTreeMap;

use hiveforge_core::Episode;
use hiveforge_core::Outcome;
use serde::Deserialize;
use serde::Serialize;

/// Default minimum episode count below which Scout Bee refuses to
/// recommend and instead reports a cold start (§4.14).
pub const DEFAULT_MIN_EPISODES: usize = 5;
/// Default similarity floor a candidate episode must clear to be considered.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.5;
/// Default number of top-similarity episodes considered for recommendation.
pub const DEFAULT_TOP_K: usize = 10;
/// Fallback template name used while the system is cold-starting.
pub const COLD_START_TEMPLATE: &str = "balanced";

/// A proposed template switch, with the evidence behind it (§3.5, §4.14).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationProposal {
    /// The recommended template name.
    pub template: String,
    /// Observed success rate of this template among similar episodes.
    pub success_rate: f64,
    /// Mean duration, in seconds, among similar episodes using this template.
    pub avg_duration: f64,
    /// Human-readable justification.
    pub reason: String,
    /// Number of similar episodes the recommendation is based on.
    pub similar_count: usize,
}

/// The outcome of a recommendation request (§4.14).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Recommendation {
    /// Too little history to recommend confidently; use the default template.
    ColdStart {
        /// The fallback template to use.
        template: String,
    },
    /// A template is recommended on the strength of similar past episodes.
    Recommended(OptimizationProposal),
}

/// Tunable thresholds for [`recommend`] (§4.14).
#[derive(Debug, Clone, Copy)]
pub struct ScoutBeeConfig {
    /// Minimum episode count before recommending anything.
    pub min_episodes: usize,
    /// Similarity floor a candidate must clear.
    pub min_similarity: f64,
    /// Number of top-similarity episodes to consider.
    pub top_k: usize,
}

impl Default for ScoutBeeConfig {
    fn default() -> Self {
        Self {
            min_episodes: DEFAULT_MIN_EPISODES,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Inverse-distance similarity over the keys `target` and `features` share
/// (§4.14). Identical vectors score `1.0`; a pair with no shared keys scores
/// `0.0`.
fn similarity(target: &BTreeMap<String, f64>, features: &BTreeMap<String, f64>) -> f64 {
    let shared: Vec<(f64, f64)> = target
        .iter()
        .filter_map(|(key, value)| features.get(key).map(|other| (*value, *other)))
        .collect();
    if shared.is_empty() {
        return 0.0;
    }
    let squared_distance: f64 = shared.iter().map(|(a, b)| (a - b).powi(2)).sum();
    let distance = squared_distance.sqrt();
    1.0 / (1.0 + distance)
}

/// Recommends a task template based on similarity to past episodes (§4.14).
#[must_use]
pub fn recommend(
    target_features: &BTreeMap<String, f64>,
    episodes: &[Episode],
    config: ScoutBeeConfig,
) -> Recommendation {
    if episodes.len() < config.min_episodes {
        return Recommendation::ColdStart {
            template: COLD_START_TEMPLATE.to_string(),
        };
    }

    let mut scored: Vec<(f64, &Episode)> = episodes
        .iter()
        .map(|episode| (similarity(target_features, &episode.task_features), episode))
        .filter(|(score, _)| *score >= config.min_similarity)
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(config.top_k);

    if scored.is_empty() {
        return Recommendation::ColdStart {
            template: COLD_START_TEMPLATE.to_string(),
        };
    }

    let mut by_template: BTreeMap<String, (u32, u32, f64)> = BTreeMap::new();
    for (_, episode) in &scored {
        let Some(template) = episode.template_used.clone() else {
            continue;
        };
        let entry = by_template.entry(template).or_insert((0, 0, 0.0));
        entry.1 += 1;
        entry.2 += episode.duration_seconds;
        if episode.outcome == Outcome::Success {
            entry.0 += 1;
        }
    }

    let best = by_template.into_iter().max_by(|a, b| {
        let rate_a = f64::from(a.1.0) / f64::from(a.1.1);
        let rate_b = f64::from(b.1.0) / f64::from(b.1.1);
        rate_a
            .partial_cmp(&rate_b)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                let duration_a = a.1.2 / f64::from(a.1.1);
                let duration_b = b.1.2 / f64::from(b.1.1);
                duration_b.partial_cmp(&duration_a).unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    let Some((template, (success, total, total_duration))) = best else {
        return Recommendation::ColdStart {
            template: COLD_START_TEMPLATE.to_string(),
        };
    };

    let success_rate = f64::from(success) / f64::from(total);
    let avg_duration = total_duration / f64::from(total);
    Recommendation::Recommended(OptimizationProposal {
        template: template.clone(),
        success_rate,
        avg_duration,
        reason: format!(
            "{template} succeeded in {success}/{total} of the {} most similar past episodes",
            scored.len()
        ),
        similar_count: scored.len(),
    })
}
