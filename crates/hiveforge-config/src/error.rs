// hiveforge-config/src/error.rs
// ============================================================================
// Module: Config Errors
// Description: The single error enum returned by loading and validation.
// Purpose: Give callers one typed, non-panicking failure shape (§6.4, §7).
// Dependencies: thiserror, std::io
// ============================================================================

use thiserror::Error;

/// Errors raised while locating, reading, parsing, or validating
/// configuration (§6.4). Validation is fail-closed: any violated bound
/// produces `Invalid` rather than silently clamping.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file's contents were not valid YAML for this schema.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
    /// A validated field violated its documented bound.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
