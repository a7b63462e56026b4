// hiveforge-core/src/core/policy.rs
// ============================================================================
// Module: Action Class x Trust Level Policy
// Description: Tool classification and the confirmation matrix (§4.7).
// Purpose: Decide, for a given tool invocation and trust level, whether confirmation is required.
// Dependencies: none beyond std
// ============================================================================

//! ## Overview
//! Every tool name is classified into one of three [`ActionClass`]es via a
//! frozen allow-list; an unrecognized tool defaults to `Reversible`, the
//! conservative middle ground (§4.7). [`confirmation_outcome`] applies the
//! fixed trust-level × action-class matrix.

// ============================================================================
// SECTION: Action Class
// ============================================================================

/// Reversibility classification of a tool action (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionClass {
    /// Has no side effects.
    ReadOnly,
    /// Has side effects that can be undone.
    Reversible,
    /// Has side effects that cannot be undone.
    Irreversible,
}

/// Frozen allow-list of read-only tool names.
const READ_ONLY_TOOLS: &[&str] = &[
    "read_file",
    "grep_search",
    "semantic_search",
    "file_search",
    "list_dir",
    "get_errors",
    "terminal_selection",
    "terminal_last_command",
];

/// Frozen allow-list of irreversible tool names.
const IRREVERSIBLE_TOOLS: &[&str] = &[
    "run_sql",
    "deploy",
    "publish",
    "delete_production",
    "send_email",
    "external_api_call",
];

/// Classifies a tool by name. Unrecognized tools default to `Reversible`,
/// the conservative choice (§4.7).
#[must_use]
pub fn classify_tool(tool_name: &str) -> ActionClass {
    if READ_ONLY_TOOLS.contains(&tool_name) {
        ActionClass::ReadOnly
    } else if IRREVERSIBLE_TOOLS.contains(&tool_name) {
        ActionClass::Irreversible
    } else {
        ActionClass::Reversible
    }
}

// ============================================================================
// SECTION: Trust Level
// ============================================================================

/// Degree of autonomy granted to an agent (§4.7), ordered from least to
/// most trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TrustLevel {
    /// Only reports; nothing executes without confirmation.
    ReportOnly = 0,
    /// Proposes actions; all non-read actions require confirmation.
    ProposeConfirm = 1,
    /// Notifies after acting; reversible actions auto-execute.
    AutoNotify = 2,
    /// Full autonomy; only irreversible actions confirm by default.
    FullDelegation = 3,
}

/// The outcome of evaluating a tool call against the confirmation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Execute without asking.
    Auto,
    /// Execute, but notify after the fact.
    AutoNotify,
    /// Block until the user confirms.
    Confirm,
}

/// Evaluates the confirmation matrix from §4.7.
///
/// | TL \ AC | READ_ONLY | REVERSIBLE | IRREVERSIBLE |
/// |---|---|---|---|
/// | REPORT_ONLY | auto | confirm | confirm |
/// | PROPOSE_CONFIRM | auto | confirm | confirm |
/// | AUTO_NOTIFY | auto | auto+notify | confirm |
/// | FULL_DELEGATION | auto | auto | confirm (unless `allow_irreversible_skip`) |
#[must_use]
pub fn confirmation_outcome(
    trust_level: TrustLevel,
    action_class: ActionClass,
    allow_irreversible_skip: bool,
) -> ConfirmationOutcome {
    match (trust_level, action_class) {
        (_, ActionClass::ReadOnly) => ConfirmationOutcome::Auto,
        (TrustLevel::ReportOnly | TrustLevel::ProposeConfirm, ActionClass::Reversible) => {
            ConfirmationOutcome::Confirm
        }
        (TrustLevel::AutoNotify, ActionClass::Reversible) => ConfirmationOutcome::AutoNotify,
        (TrustLevel::FullDelegation, ActionClass::Reversible) => ConfirmationOutcome::Auto,
        (TrustLevel::FullDelegation, ActionClass::Irreversible) if allow_irreversible_skip => {
            ConfirmationOutcome::Auto
        }
        (_, ActionClass::Irreversible) => ConfirmationOutcome::Confirm,
    }
}
