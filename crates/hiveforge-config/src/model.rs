// hiveforge-config/src/model.rs
// ============================================================================
// Module: HiveForge Configuration Model
// Description: The nested configuration schema recognized at §6.4 and its validation.
// Purpose: Give every HiveForge process one typed, validated configuration tree.
// Dependencies: serde, hiveforge_core::TrustLevel
// ============================================================================

//! ## Overview
//! `HiveForgeConfig` mirrors §6.4's nested key map field-for-field. Every
//! nested section carries its own `MIN_*`/`MAX_*`/`DEFAULT_*` constants and a
//! `validate()` method, following this corpus's cascading validation idiom
//! (each section validates itself; the top-level `validate()` just threads
//! through). Defaults apply per-field via `#[serde(default)]`, so a config
//! file only needs to name the keys it overrides.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

// ============================================================================
// SECTION: Top-Level Configuration
// ============================================================================

/// The full recognized configuration tree (§6.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HiveForgeConfig {
    /// `hive.*`
    pub hive: HiveConfig,
    /// `governance.*`
    pub governance: GovernanceConfig,
    /// `llm.*`
    pub llm: LlmConfig,
    /// `agents.*`
    pub agents: AgentsConfig,
    /// `auth.*`
    pub auth: AuthConfig,
    /// `server.*`
    pub server: ServerConfig,
    /// `logging.*`
    pub logging: LoggingConfig,
    /// `conflict.*`
    pub conflict: ConflictConfig,
    /// `conference.*`
    pub conference: ConferenceConfig,
    /// `github.*`
    pub github: GithubConfig,
}

impl Default for HiveForgeConfig {
    fn default() -> Self {
        Self {
            hive: HiveConfig::default(),
            governance: GovernanceConfig::default(),
            llm: LlmConfig::default(),
            agents: AgentsConfig::default(),
            auth: AuthConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            conflict: ConflictConfig::default(),
            conference: ConferenceConfig::default(),
            github: GithubConfig::default(),
        }
    }
}

impl HiveForgeConfig {
    /// Validates every nested section, fail-closed on the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first section and
    /// field that violates its documented bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hive.validate()?;
        self.governance.validate()?;
        self.llm.validate()?;
        self.agents.validate(&self.llm)?;
        self.server.validate()?;
        self.conflict.validate()?;
        self.conference.validate()?;
        self.github.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: hive.*
// ============================================================================

/// `hive.{name, vault_path}` (§6.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HiveConfig {
    /// Human-readable hive name.
    pub name: String,
    /// Filesystem root for the Akashic Record vault (§6.3).
    pub vault_path: String,
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            name: "default-hive".to_string(),
            vault_path: "./vault".to_string(),
        }
    }
}

impl HiveConfig {
    /// Validates that `name` and `vault_path` are non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when either field is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("hive.name must not be empty".to_string()));
        }
        if self.vault_path.trim().is_empty() {
            return Err(ConfigError::Invalid("hive.vault_path must not be empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: governance.*
// ============================================================================

/// Minimum permitted `max_retries` (§6.4).
pub const MIN_MAX_RETRIES: u32 = 0;
/// Maximum permitted `max_retries`.
pub const MAX_MAX_RETRIES: u32 = 20;
/// Default `max_retries`.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default `max_oscillations` (§4.4's `k`).
pub const DEFAULT_MAX_OSCILLATIONS: u32 = 3;
/// Default `max_concurrent_tasks`.
pub const DEFAULT_MAX_CONCURRENT_TASKS: u32 = 4;
/// Default `task_timeout_seconds`.
pub const DEFAULT_TASK_TIMEOUT_SECONDS: u64 = 600;
/// Default `heartbeat_interval_seconds` (§4.11).
pub const DEFAULT_HEARTBEAT_INTERVAL_SECONDS: u64 = 30;
/// Default `approval_timeout_hours`.
pub const DEFAULT_APPROVAL_TIMEOUT_HOURS: u64 = 24;
/// Default `archive_after_days`.
pub const DEFAULT_ARCHIVE_AFTER_DAYS: u64 = 90;

/// `governance.*` (§6.4): global bounds shared by state machines, the
/// retry manager, and the silence detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Default cap on retry attempts per task (§4.6).
    pub max_retries: u32,
    /// Oscillation detector window `k` (§4.4).
    pub max_oscillations: u32,
    /// Maximum tasks dispatched concurrently within one DAG layer (§4.6).
    pub max_concurrent_tasks: u32,
    /// Per-task execution timeout.
    pub task_timeout_seconds: u64,
    /// Silence detector polling interval (§4.11).
    pub heartbeat_interval_seconds: u64,
    /// How long a pending approval request stays live before expiring.
    pub approval_timeout_hours: u64,
    /// Age at which completed runs become eligible for archival.
    pub archive_after_days: u64,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            max_oscillations: DEFAULT_MAX_OSCILLATIONS,
            max_concurrent_tasks: DEFAULT_MAX_CONCURRENT_TASKS,
            task_timeout_seconds: DEFAULT_TASK_TIMEOUT_SECONDS,
            heartbeat_interval_seconds: DEFAULT_HEARTBEAT_INTERVAL_SECONDS,
            approval_timeout_hours: DEFAULT_APPROVAL_TIMEOUT_HOURS,
            archive_after_days: DEFAULT_ARCHIVE_AFTER_DAYS,
        }
    }
}

impl GovernanceConfig {
    /// Validates `max_retries` against `[MIN_MAX_RETRIES, MAX_MAX_RETRIES]`
    /// and that the remaining fields are non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on the first out-of-bound field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_MAX_RETRIES ..= MAX_MAX_RETRIES).contains(&self.max_retries) {
            return Err(ConfigError::Invalid(format!(
                "governance.max_retries must be within [{MIN_MAX_RETRIES}, {MAX_MAX_RETRIES}], got {}",
                self.max_retries
            )));
        }
        if self.max_oscillations == 0 {
            return Err(ConfigError::Invalid(
                "governance.max_oscillations must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_tasks == 0 {
            return Err(ConfigError::Invalid(
                "governance.max_concurrent_tasks must be at least 1".to_string(),
            ));
        }
        if self.task_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "governance.task_timeout_seconds must be at least 1".to_string(),
            ));
        }
        if self.heartbeat_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "governance.heartbeat_interval_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: llm.* and llm.rate_limit.*
// ============================================================================

/// Default `requests_per_minute`.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;
/// Default `requests_per_day` (0 = unlimited, §4.10).
pub const DEFAULT_REQUESTS_PER_DAY: u32 = 0;
/// Default `tokens_per_minute`.
pub const DEFAULT_TOKENS_PER_MINUTE: u32 = 90_000;
/// Default `max_concurrent`.
pub const DEFAULT_MAX_CONCURRENT: u32 = 4;
/// Default `burst_limit` (token bucket capacity).
pub const DEFAULT_BURST_LIMIT: u32 = 10;
/// Default `retry_after_429`, in seconds.
pub const DEFAULT_RETRY_AFTER_429_SECONDS: u64 = 20;

/// `llm.rate_limit.*` (§4.10, §6.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests-per-minute ceiling.
    pub requests_per_minute: u32,
    /// Requests-per-day ceiling; `0` means unlimited.
    pub requests_per_day: u32,
    /// Tokens-per-minute ceiling.
    pub tokens_per_minute: u32,
    /// Maximum number of concurrent in-flight calls.
    pub max_concurrent: u32,
    /// Token bucket capacity.
    pub burst_limit: u32,
    /// Seconds to block after a 429 before resuming refill.
    pub retry_after_429: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            requests_per_day: DEFAULT_REQUESTS_PER_DAY,
            tokens_per_minute: DEFAULT_TOKENS_PER_MINUTE,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            burst_limit: DEFAULT_BURST_LIMIT,
            retry_after_429: DEFAULT_RETRY_AFTER_429_SECONDS,
        }
    }
}

impl RateLimitConfig {
    /// Validates that every bound except the explicitly unlimited
    /// `requests_per_day == 0` is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on the first zero-valued bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.requests_per_minute == 0 {
            return Err(ConfigError::Invalid(
                "llm.rate_limit.requests_per_minute must be at least 1".to_string(),
            ));
        }
        if self.tokens_per_minute == 0 {
            return Err(ConfigError::Invalid(
                "llm.rate_limit.tokens_per_minute must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "llm.rate_limit.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.burst_limit == 0 {
            return Err(ConfigError::Invalid(
                "llm.rate_limit.burst_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Merges `self` as a base with `override_cfg`'s explicitly-set fields.
    /// Because this type has no optionality of its own, per-agent override
    /// happens one level up in [`LlmConfig::merged_with`], which tracks
    /// which scalar fields were actually present in the override document.
    #[must_use]
    pub const fn unchanged(&self) -> Self {
        *self
    }
}

/// Default provider name.
pub const DEFAULT_LLM_PROVIDER: &str = "anthropic";
/// Default model name.
pub const DEFAULT_LLM_MODEL: &str = "claude-sonnet";
/// Default environment variable name holding the provider API key.
pub const DEFAULT_API_KEY_ENV: &str = "HIVEFORGE_LLM_API_KEY";
/// Default `max_tokens`.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
/// Default `temperature`.
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// `llm.*` (§6.4, §6.5): the global LLM client configuration, inherited by
/// every agent unless overridden field-by-field (§B.5 of `SPEC_FULL.md`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider identifier (e.g. `"anthropic"`, `"openai"`).
    pub provider: String,
    /// Model identifier.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Maximum tokens requested per completion.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Nested rate-limit configuration.
    pub rate_limit: RateLimitConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_LLM_PROVIDER.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl LlmConfig {
    /// Validates provider/model non-emptiness, `temperature` within
    /// `[0.0, 2.0]`, `max_tokens` non-zero, and the nested rate limit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on the first violated bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.provider must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".to_string()));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid("llm.max_tokens must be at least 1".to_string()));
        }
        if !(0.0 ..= 2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "llm.temperature must be within [0.0, 2.0], got {}",
                self.temperature
            )));
        }
        self.rate_limit.validate()
    }
}

/// A sparse per-agent override of [`LlmConfig`]; every field is optional and
/// inherits from the global `llm` block when absent (§6.4, §B.5).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmOverride {
    /// Overrides `provider`.
    pub provider: Option<String>,
    /// Overrides `model`.
    pub model: Option<String>,
    /// Overrides `api_key_env`.
    pub api_key_env: Option<String>,
    /// Overrides `max_tokens`.
    pub max_tokens: Option<u32>,
    /// Overrides `temperature`.
    pub temperature: Option<f64>,
    /// Overrides `rate_limit.requests_per_minute`.
    pub requests_per_minute: Option<u32>,
    /// Overrides `rate_limit.requests_per_day`.
    pub requests_per_day: Option<u32>,
    /// Overrides `rate_limit.tokens_per_minute`.
    pub tokens_per_minute: Option<u32>,
    /// Overrides `rate_limit.max_concurrent`.
    pub max_concurrent: Option<u32>,
    /// Overrides `rate_limit.burst_limit`.
    pub burst_limit: Option<u32>,
    /// Overrides `rate_limit.retry_after_429`.
    pub retry_after_429: Option<u64>,
}

impl LlmOverride {
    /// Resolves this sparse override against a `base` [`LlmConfig`],
    /// inheriting any field left unset (§B.5's field-by-field merge).
    #[must_use]
    pub fn resolve(&self, base: &LlmConfig) -> LlmConfig {
        LlmConfig {
            provider: self.provider.clone().unwrap_or_else(|| base.provider.clone()),
            model: self.model.clone().unwrap_or_else(|| base.model.clone()),
            api_key_env: self.api_key_env.clone().unwrap_or_else(|| base.api_key_env.clone()),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            temperature: self.temperature.unwrap_or(base.temperature),
            rate_limit: RateLimitConfig {
                requests_per_minute: self
                    .requests_per_minute
                    .unwrap_or(base.rate_limit.requests_per_minute),
                requests_per_day: self.requests_per_day.unwrap_or(base.rate_limit.requests_per_day),
                tokens_per_minute: self
                    .tokens_per_minute
                    .unwrap_or(base.rate_limit.tokens_per_minute),
                max_concurrent: self.max_concurrent.unwrap_or(base.rate_limit.max_concurrent),
                burst_limit: self.burst_limit.unwrap_or(base.rate_limit.burst_limit),
                retry_after_429: self.retry_after_429.unwrap_or(base.rate_limit.retry_after_429),
            },
        }
    }
}

// ============================================================================
// SECTION: agents.*
// ============================================================================

/// Configuration-layer mirror of [`hiveforge_core::TrustLevel`], serializable
/// as the snake_case names §4.7 and §6.4 use on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevelName {
    /// `report_only`
    ReportOnly,
    /// `propose_confirm`
    ProposeConfirm,
    /// `auto_notify`
    AutoNotify,
    /// `full_delegation`
    FullDelegation,
}

impl TrustLevelName {
    /// Converts to the core domain's [`hiveforge_core::TrustLevel`].
    #[must_use]
    pub const fn to_core(self) -> hiveforge_core::TrustLevel {
        match self {
            Self::ReportOnly => hiveforge_core::TrustLevel::ReportOnly,
            Self::ProposeConfirm => hiveforge_core::TrustLevel::ProposeConfirm,
            Self::AutoNotify => hiveforge_core::TrustLevel::AutoNotify,
            Self::FullDelegation => hiveforge_core::TrustLevel::FullDelegation,
        }
    }
}

/// One agent role's tunables (§6.4's `agents.{beekeeper,queen_bee,worker_bee}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Whether this agent role is active.
    pub enabled: bool,
    /// Default trust level this agent is granted (§4.7).
    pub trust_level_default: TrustLevelName,
    /// Maximum concurrent actions this agent may have in flight.
    pub max_concurrent_actions: u32,
    /// Optional sparse override of the global `llm` block.
    pub llm: Option<LlmOverride>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trust_level_default: TrustLevelName::ProposeConfirm,
            max_concurrent_actions: 1,
            llm: None,
        }
    }
}

impl AgentConfig {
    /// Resolves this agent's effective [`LlmConfig`] against the global
    /// block, inheriting unset fields (§B.5).
    #[must_use]
    pub fn effective_llm(&self, global: &LlmConfig) -> LlmConfig {
        match &self.llm {
            Some(overrides) => overrides.resolve(global),
            None => global.clone(),
        }
    }

    /// Validates `max_concurrent_actions` is non-zero when the agent is
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an enabled agent has a zero
    /// concurrency bound.
    pub fn validate(&self, role: &str) -> Result<(), ConfigError> {
        if self.enabled && self.max_concurrent_actions == 0 {
            return Err(ConfigError::Invalid(format!(
                "agents.{role}.max_concurrent_actions must be at least 1 when enabled"
            )));
        }
        Ok(())
    }
}

/// `agents.{beekeeper, queen_bee, worker_bee}` (§6.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// Beekeeper role configuration.
    pub beekeeper: AgentConfig,
    /// Queen Bee role configuration.
    pub queen_bee: AgentConfig,
    /// Worker Bee role configuration.
    pub worker_bee: AgentConfig,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            beekeeper: AgentConfig {
                trust_level_default: TrustLevelName::ProposeConfirm,
                ..AgentConfig::default()
            },
            queen_bee: AgentConfig {
                trust_level_default: TrustLevelName::AutoNotify,
                max_concurrent_actions: 4,
                ..AgentConfig::default()
            },
            worker_bee: AgentConfig {
                trust_level_default: TrustLevelName::AutoNotify,
                max_concurrent_actions: 1,
                ..AgentConfig::default()
            },
        }
    }
}

impl AgentsConfig {
    /// Validates each agent role and the LLM overrides it carries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] from the first agent or override
    /// that violates its bound.
    pub fn validate(&self, global_llm: &LlmConfig) -> Result<(), ConfigError> {
        for (role, agent) in [
            ("beekeeper", &self.beekeeper),
            ("queen_bee", &self.queen_bee),
            ("worker_bee", &self.worker_bee),
        ] {
            agent.validate(role)?;
            agent.effective_llm(global_llm).validate()?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: auth.*
// ============================================================================

/// `auth.{enabled, api_key_env}` (§6.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Whether inbound request authentication is enforced.
    pub enabled: bool,
    /// Environment variable name holding the inbound API key.
    pub api_key_env: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key_env: "HIVEFORGE_AUTH_API_KEY".to_string(),
        }
    }
}

// ============================================================================
// SECTION: server.* and server.cors.*
// ============================================================================

/// Default bind host.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
/// Default bind port.
pub const DEFAULT_SERVER_PORT: u16 = 8787;

/// `server.cors.*` (§6.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Whether CORS is enabled.
    pub enabled: bool,
    /// Allowed origins; empty means none are allowed even if `enabled`.
    pub allow_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allow_origins: Vec::new(),
        }
    }
}

/// `server.{host, port, cors}` (§6.4). Out of this core's scope to bind
/// (the HTTP surface is an adapter, §1), but the config tree is validated
/// here so adapters inherit one source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Nested CORS configuration.
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Validates `host` is non-empty and CORS origins are only meaningful
    /// when enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `host` is blank, or when CORS
    /// is enabled with no allowed origins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".to_string()));
        }
        if self.cors.enabled && self.cors.allow_origins.is_empty() {
            return Err(ConfigError::Invalid(
                "server.cors.allow_origins must be non-empty when cors.enabled is true".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: logging.*
// ============================================================================

/// Default `tracing`-compatible log level filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default maximum AR stream file size before rotation advice, in MiB.
pub const DEFAULT_EVENTS_MAX_FILE_SIZE_MB: u64 = 256;

/// `logging.{level, events_max_file_size_mb}` (§6.4, §B.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter`-compatible level string.
    pub level: String,
    /// Advisory ceiling on a single AR stream file's size before an
    /// operator should archive it (§6.4's `archive_after_days` is the
    /// time-based counterpart).
    pub events_max_file_size_mb: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            events_max_file_size_mb: DEFAULT_EVENTS_MAX_FILE_SIZE_MB,
        }
    }
}

// ============================================================================
// SECTION: conflict.*
// ============================================================================

/// `conflict.{detection_enabled, auto_resolve_low_severity, escalation_timeout_minutes}`
/// (§4.12, §6.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictConfig {
    /// Whether the conflict detector observes new resource claims.
    pub detection_enabled: bool,
    /// Whether `MEDIUM`-or-lower conflicts auto-resolve via `first_come`.
    pub auto_resolve_low_severity: bool,
    /// Minutes before an unresolved conflict escalates.
    pub escalation_timeout_minutes: u64,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            detection_enabled: true,
            auto_resolve_low_severity: true,
            escalation_timeout_minutes: 30,
        }
    }
}

impl ConflictConfig {
    /// Validates `escalation_timeout_minutes` is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.escalation_timeout_minutes == 0 {
            return Err(ConfigError::Invalid(
                "conflict.escalation_timeout_minutes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: conference.*
// ============================================================================

/// `conference.{enabled, max_participants, voting_timeout_minutes, quorum_percentage}`
/// (§3.2, §6.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConferenceConfig {
    /// Whether multi-participant conferences may be started.
    pub enabled: bool,
    /// Maximum participants in a single conference.
    pub max_participants: u32,
    /// Minutes before an open vote times out.
    pub voting_timeout_minutes: u64,
    /// Fraction of participants, in `[0.0, 1.0]`, required for quorum.
    pub quorum_percentage: f64,
}

impl Default for ConferenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_participants: 8,
            voting_timeout_minutes: 15,
            quorum_percentage: 0.5,
        }
    }
}

impl ConferenceConfig {
    /// Validates `max_participants` is non-zero and `quorum_percentage`
    /// is within `[0.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on the first violated bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_participants == 0 {
            return Err(ConfigError::Invalid(
                "conference.max_participants must be at least 1".to_string(),
            ));
        }
        if !(0.0 ..= 1.0).contains(&self.quorum_percentage) {
            return Err(ConfigError::Invalid(format!(
                "conference.quorum_percentage must be within [0.0, 1.0], got {}",
                self.quorum_percentage
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: github.*
// ============================================================================

/// Default GitHub API base URL.
pub const DEFAULT_GITHUB_BASE_URL: &str = "https://api.github.com";
/// Default label prefix applied to HiveForge-managed labels (§4.13).
pub const DEFAULT_GITHUB_LABEL_PREFIX: &str = "hiveforge";

/// `github.{enabled, owner, repo, project_number?, base_url, label_prefix, token_env}`
/// (§4.13, §6.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// Whether the GitHub projection is active.
    pub enabled: bool,
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Optional GitHub Projects (v2) project number to also sync to.
    pub project_number: Option<u64>,
    /// API base URL (overridable for GitHub Enterprise).
    pub base_url: String,
    /// Prefix applied to all labels this projection creates.
    pub label_prefix: String,
    /// Environment variable name holding the GitHub access token.
    pub token_env: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            owner: String::new(),
            repo: String::new(),
            project_number: None,
            base_url: DEFAULT_GITHUB_BASE_URL.to_string(),
            label_prefix: DEFAULT_GITHUB_LABEL_PREFIX.to_string(),
            token_env: "HIVEFORGE_GITHUB_TOKEN".to_string(),
        }
    }
}

impl GithubConfig {
    /// Validates that `owner` and `repo` are set whenever the projection is
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when enabled without an owner/repo.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && (self.owner.trim().is_empty() || self.repo.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "github.owner and github.repo must be set when github.enabled is true".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        HiveForgeConfig::default().validate().expect("defaults must validate");
    }

    #[test]
    fn max_retries_out_of_bound_is_rejected() {
        let mut config = HiveForgeConfig::default();
        config.governance.max_retries = MAX_MAX_RETRIES + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn agent_llm_override_inherits_unset_fields() {
        let global = LlmConfig {
            model: "claude-sonnet".to_string(),
            max_tokens: 4096,
            ..LlmConfig::default()
        };
        let agent = AgentConfig {
            llm: Some(LlmOverride {
                model: Some("claude-haiku".to_string()),
                ..LlmOverride::default()
            }),
            ..AgentConfig::default()
        };
        let effective = agent.effective_llm(&global);
        assert_eq!(effective.model, "claude-haiku");
        assert_eq!(effective.max_tokens, 4096, "unset fields must inherit from the global block");
    }

    #[test]
    fn cors_enabled_without_origins_is_rejected() {
        let mut config = HiveForgeConfig::default();
        config.server.cors.enabled = true;
        assert!(matches!(config.server.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn github_enabled_without_owner_is_rejected() {
        let mut config = HiveForgeConfig::default();
        config.github.enabled = true;
        assert!(matches!(config.github.validate(), Err(ConfigError::Invalid(_))));
    }
}
