// error.rs — Error types for the enforcement gate.
//
// Every runtime variant means the action is blocked. None of them carries a
// verdict; a caller that ignores the error must still not execute the action.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use ag_audit::{AuditAction, AuditEvent};
use ag_policy::{EntityRef, PolicyError, RequestError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The pipeline stage at which a gate operation failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reading or parsing configuration at construction.
    Load,
    /// Encoding the classified intent as a request.
    Build,
    /// Oracle evaluation (including timeouts).
    Evaluate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Build => "build",
            Stage::Evaluate => "evaluate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the enforcement gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// Policy, entity, or config source missing or unparseable. Fatal: no
    /// gate is created.
    #[error("failed to load {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    /// The classified intent cannot be safely encoded as a request.
    #[error("cannot encode request for action '{raw_action}': {source}")]
    InvalidIdentifier {
        raw_action: String,
        source: RequestError,
    },

    /// The oracle failed to produce a decision.
    #[error("policy evaluation failed for action '{raw_action}': {source}")]
    PolicyEvaluation {
        raw_action: String,
        source: PolicyError,
    },

    /// The oracle did not answer before the caller's deadline.
    #[error("policy evaluation for action '{raw_action}' exceeded deadline of {deadline:?}")]
    Timeout {
        raw_action: String,
        deadline: Duration,
    },
}

impl GateError {
    pub(crate) fn config_load(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        GateError::ConfigLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// The stage at which the failure occurred.
    pub fn stage(&self) -> Stage {
        match self {
            GateError::ConfigLoad { .. } => Stage::Load,
            GateError::InvalidIdentifier { .. } => Stage::Build,
            GateError::PolicyEvaluation { .. } | GateError::Timeout { .. } => Stage::Evaluate,
        }
    }

    /// The raw action being checked, for runtime failures.
    pub fn raw_action(&self) -> Option<&str> {
        match self {
            GateError::ConfigLoad { .. } => None,
            GateError::InvalidIdentifier { raw_action, .. }
            | GateError::PolicyEvaluation { raw_action, .. }
            | GateError::Timeout { raw_action, .. } => Some(raw_action),
        }
    }

    /// An `Error` audit event for this failure. Always not allowed.
    pub fn audit_event(&self, principal: &EntityRef) -> AuditEvent {
        let mut event = AuditEvent::new(principal.to_string(), AuditAction::Error)
            .with_stage(self.stage().as_str())
            .with_metadata(serde_json::json!({ "error": self.to_string() }));
        if let Some(raw) = self.raw_action() {
            event = event.with_raw_action(raw);
        }
        event
    }
}
