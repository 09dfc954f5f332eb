// event.rs — Audit event data model.
//
// One event per recorded gate check. The raw action itself is not stored
// in the event's indexed fields, only its hash; callers that want the full
// record attach it as metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hasher;

/// What kind of outcome this event records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// The gate produced a verdict (allowed or denied).
    Enforcement,
    /// The gate failed before producing a verdict; the action was blocked.
    Error,
}

/// A single line in the JSONL audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: Uuid,

    /// When the event was recorded (UTC).
    pub timestamp: DateTime<Utc>,

    /// The principal the request was made for, e.g. `Agent::"osworld-agent"`.
    pub principal: String,

    pub action: AuditAction,

    /// SHA-256 of the raw action string.
    pub raw_action_hash: Option<String>,

    /// Classified action kind (e.g., "execute_command").
    pub action_kind: Option<String>,

    /// Target resource, e.g. `App::"terminal"`.
    pub resource: Option<String>,

    /// Final verdict. Always false for `Error` events.
    pub allowed: bool,

    /// Pipeline stage that failed, for `Error` events.
    pub stage: Option<String>,

    /// Digest of the policy set and entity graph in force.
    pub config_digest: Option<String>,

    /// Hash of the previous line in the log; `None` for the first event.
    pub previous_hash: Option<String>,

    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl AuditEvent {
    /// New event stamped now with a random id. Starts as not allowed.
    pub fn new(principal: impl Into<String>, action: AuditAction) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            principal: principal.into(),
            action,
            raw_action_hash: None,
            action_kind: None,
            resource: None,
            allowed: false,
            stage: None,
            config_digest: None,
            previous_hash: None,
            metadata: serde_json::Value::Null,
        }
    }

    /// Record the hash of the raw action string.
    pub fn with_raw_action(mut self, raw_action: &str) -> Self {
        self.raw_action_hash = Some(hasher::hash_str(raw_action));
        self
    }

    pub fn with_intent(mut self, action_kind: impl Into<String>, resource: impl Into<String>) -> Self {
        self.action_kind = Some(action_kind.into());
        self.resource = Some(resource.into());
        self
    }

    pub fn with_verdict(mut self, allowed: bool) -> Self {
        self.allowed = allowed;
        self
    }

    /// Mark the failing stage. Error events are never allowed.
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self.allowed = false;
        self
    }

    pub fn with_config_digest(mut self, digest: impl Into<String>) -> Self {
        self.config_digest = Some(digest.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_is_not_allowed() {
        let event = AuditEvent::new("Agent::\"a\"", AuditAction::Enforcement);
        assert!(!event.allowed);
        assert!(event.previous_hash.is_none());
    }

    #[test]
    fn raw_action_is_hashed_not_stored() {
        let raw = r#"subprocess.run(["rm", "-rf", "/"])"#;
        let event = AuditEvent::new("p", AuditAction::Enforcement).with_raw_action(raw);
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("subprocess"));
        assert_eq!(event.raw_action_hash, Some(hasher::hash_str(raw)));
    }

    #[test]
    fn stage_forces_denied() {
        let event = AuditEvent::new("p", AuditAction::Error)
            .with_verdict(true)
            .with_stage("evaluate");
        assert!(!event.allowed);
        assert_eq!(event.stage.as_deref(), Some("evaluate"));
    }

    #[test]
    fn action_serializes_snake_case() {
        let json = serde_json::to_string(&AuditAction::Enforcement).unwrap();
        assert_eq!(json, "\"enforcement\"");
    }
}
