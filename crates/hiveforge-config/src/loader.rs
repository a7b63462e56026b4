// hiveforge-config/src/loader.rs
// ============================================================================
// Module: Config Search-Path Loader
// Description: Locates, reads, parses, and validates hiveforge.config.yaml|yml.
// Purpose: Give every HiveForge process one explicit construction path instead
//          of a global `get_settings()` accessor (§9 Design Notes).
// Dependencies: dirs, serde_yaml, std::fs, crate::{error, model}
// ============================================================================

//! ## Overview
//! Config loading searches the current working directory, then the user's
//! home directory, for `hiveforge.config.yaml` or `hiveforge.config.yml`
//! (§6.4). Unlike the Python original's module-level `get_settings()`
//! singleton, every caller here constructs (or is handed) a
//! `HiveForgeConfig` explicitly, so tests can substitute arbitrary search
//! roots without touching process-global state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::model::HiveForgeConfig;

/// File names searched, in order, within each candidate directory.
const CANDIDATE_FILE_NAMES: [&str; 2] = ["hiveforge.config.yaml", "hiveforge.config.yml"];

/// Searches `cwd` then `home` for a recognized config file name, returning
/// the first match.
#[must_use]
pub fn find_config_file(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    for dir in std::iter::once(cwd).chain(home) {
        for name in CANDIDATE_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Loads and validates configuration from an explicit file path.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read,
/// [`ConfigError::Parse`] if it is not valid YAML for this schema, or
/// [`ConfigError::Invalid`] if validation fails.
pub fn load_from_path(path: &Path) -> Result<HiveForgeConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config: HiveForgeConfig = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads configuration by searching `cwd` then `home` (§6.4). Returns the
/// validated default configuration when no file is found anywhere on the
/// search path — an absent config file is not an error.
///
/// # Errors
///
/// Returns [`ConfigError::Io`]/[`ConfigError::Parse`]/[`ConfigError::Invalid`]
/// when a file is found but cannot be read, parsed, or validated.
pub fn load(cwd: &Path, home: Option<&Path>) -> Result<HiveForgeConfig, ConfigError> {
    match find_config_file(cwd, home) {
        Some(path) => load_from_path(&path),
        None => Ok(HiveForgeConfig::default()),
    }
}

/// Loads configuration using the real process working directory and the
/// platform home directory (via `dirs::home_dir`).
///
/// # Errors
///
/// See [`load`].
pub fn load_from_environment() -> Result<HiveForgeConfig, ConfigError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    load(&cwd, dirs::home_dir().as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_anywhere_yields_defaults() {
        let cwd = tempfile::tempdir().expect("tempdir");
        let home = tempfile::tempdir().expect("tempdir");
        let config = load(cwd.path(), Some(home.path())).expect("load defaults");
        assert_eq!(config, HiveForgeConfig::default());
    }

    #[test]
    fn cwd_takes_precedence_over_home() {
        let cwd = tempfile::tempdir().expect("tempdir");
        let home = tempfile::tempdir().expect("tempdir");
        std::fs::write(cwd.path().join("hiveforge.config.yaml"), "hive:\n  name: cwd-hive\n")
            .expect("write cwd config");
        std::fs::write(home.path().join("hiveforge.config.yaml"), "hive:\n  name: home-hive\n")
            .expect("write home config");
        let config = load(cwd.path(), Some(home.path())).expect("load");
        assert_eq!(config.hive.name, "cwd-hive");
    }

    #[test]
    fn falls_back_to_home_when_cwd_has_no_config() {
        let cwd = tempfile::tempdir().expect("tempdir");
        let home = tempfile::tempdir().expect("tempdir");
        std::fs::write(home.path().join("hiveforge.config.yml"), "hive:\n  name: home-hive\n")
            .expect("write home config");
        let config = load(cwd.path(), Some(home.path())).expect("load");
        assert_eq!(config.hive.name, "home-hive");
    }

    #[test]
    fn invalid_yaml_surfaces_parse_error() {
        let cwd = tempfile::tempdir().expect("tempdir");
        std::fs::write(cwd.path().join("hiveforge.config.yaml"), "hive: [unterminated\n")
            .expect("write bad config");
        let err = load(cwd.path(), None).expect_err("must fail to parse");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn invalid_values_surface_validation_error() {
        let cwd = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            cwd.path().join("hiveforge.config.yaml"),
            "governance:\n  max_retries: 9999\n",
        )
        .expect("write bad config");
        let err = load(cwd.path(), None).expect_err("must fail validation");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
