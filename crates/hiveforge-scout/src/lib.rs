// hiveforge-scout/src/lib.rs
// ============================================================================
// Crate: hiveforge-scout
// Description: Episode recording, KPI aggregation, and the Scout Bee
//              template recommender that learns from Honeycomb history (§4.14).
// ============================================================================

#![forbid(unsafe_code)]

mod error;
mod kpi;
mod recorder;
mod scout_bee;

pub use error::ScoutError;
pub use kpi::compute_kpi_scores;
pub use recorder::record_episode;
pub use scout_bee::COLD_START_TEMPLATE;
pub use scout_bee::DEFAULT_MIN_EPISODES;
pub use scout_bee::DEFAULT_MIN_SIMILARITY;
pub use scout_bee::DEFAULT_TOP_K;
pub use scout_bee::OptimizationProposal;
pub use scout_bee::Recommendation;
pub use scout_bee::ScoutBeeConfig;
pub use scout_bee::recommend;
