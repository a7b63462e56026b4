// hiveforge-config/src/lib.rs
// ============================================================================
// Module: HiveForge Config Library
// Description: Public API surface for configuration loading and validation.
// Purpose: Expose the validated configuration tree and its search-path loader.
// Dependencies: crate::{error, loader, model}
// ============================================================================

//! ## Overview
//! `hiveforge-config` owns the YAML-backed configuration tree recognized at
//! spec §6.4. It has no knowledge of how configuration is used downstream;
//! every HiveForge process constructs a [`HiveForgeConfig`] once (via
//! [`load_from_environment`] or [`load`]) and threads it through
//! constructors explicitly — there is no process-global accessor.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod error;
mod loader;
mod model;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::ConfigError;
pub use loader::find_config_file;
pub use loader::load;
pub use loader::load_from_environment;
pub use loader::load_from_path;
pub use model::AgentConfig;
pub use model::AgentsConfig;
pub use model::AuthConfig;
pub use model::ConferenceConfig;
pub use model::ConflictConfig;
pub use model::CorsConfig;
pub use model::GithubConfig;
pub use model::GovernanceConfig;
pub use model::HiveConfig;
pub use model::HiveForgeConfig;
pub use model::LlmConfig;
pub use model::LlmOverride;
pub use model::LoggingConfig;
pub use model::RateLimitConfig;
pub use model::ServerConfig;
pub use model::TrustLevelName;
