// hiveforge-scout/src/kpi.rs
// ============================================================================
// Module: KPI Calculator
// Description: Aggregate quality measurements over a set of episodes (§4.14).
// Dependencies: hiveforge_core::{Episode, Outcome, KpiScores}
// ============================================================================

use std::collections::HashMap;

use hiveforge_core::Episode;
use hiveforge_core::KpiScores;
use hiveforge_core::Outcome;

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_stdev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Computes aggregate [`KpiScores`] over `episodes` (§4.14). Returns the
/// default (all-`None`) scores for an empty slice.
#[must_use]
pub fn compute_kpi_scores(episodes: &[Episode]) -> KpiScores {
    if episodes.is_empty() {
        return KpiScores::default();
    }

    let total = episodes.len() as f64;
    let success_count = episodes.iter().filter(|e| e.outcome == Outcome::Success).count() as f64;
    let incident_count = episodes
        .iter()
        .filter(|e| matches!(e.outcome, Outcome::Failure | Outcome::Partial))
        .count() as f64;

    let correctness = Some(success_count / total);
    let incident_rate = Some(incident_count / total);
    let lead_time_seconds = Some(mean(
        &episodes.iter().map(|e| e.duration_seconds).collect::<Vec<_>>(),
    ));
    let repeatability = repeatability_across_templates(episodes);
    let recurrence_rate = recurrence_rate(episodes);

    KpiScores {
        correctness,
        repeatability,
        lead_time_seconds,
        incident_rate,
        recurrence_rate,
    }
}

/// Sample standard deviation of per-template success rates; undefined
/// (`None`) when fewer than two distinct templates are represented (§4.14).
fn repeatability_across_templates(episodes: &[Episode]) -> Option<f64> {
    let mut by_template: HashMap<&str, (u32, u32)> = HashMap::new();
    for episode in episodes {
        let Some(template) = episode.template_used.as_deref() else {
            continue;
        };
        let entry = by_template.entry(template).or_insert((0, 0));
        entry.1 += 1;
        if episode.outcome == Outcome::Success {
            entry.0 += 1;
        }
    }
    if by_template.len() < 2 {
        return None;
    }
    let rates: Vec<f64> = by_template
        .values()
        .map(|&(success, total)| f64::from(success) / f64::from(total))
        .collect();
    sample_stdev(&rates)
}

/// `Σ max(0, count(failure_class) − 1) / Σ count(failure_class)` (§4.14).
/// `None` when no episode carries a `failure_class`.
fn recurrence_rate(episodes: &[Episode]) -> Option<f64> {
    let mut counts: HashMap<hiveforge_core::FailureClass, u32> = HashMap::new();
    for episode in episodes {
        if let Some(class) = episode.failure_class {
            *counts.entry(class).or_insert(0) += 1;
        }
    }
    if counts.is_empty() {
        return None;
    }
    let total: u32 = counts.values().sum();
    let recurring: u32 = counts.values().map(|&c| c.saturating_sub(1)).sum();
    Some(f64::from(recurring) / f64::from(total))
}
