// result.rs — The enforcement record returned for every successful check.

use ag_audit::{AuditAction, AuditEvent};
use ag_classify::ActionKind;
use ag_policy::{AuthorizationRequest, Decision};
use serde::{Deserialize, Serialize};

/// Outcome of one gate check: the verdict plus everything needed to audit it.
///
/// Contains no timestamps or ids, so two checks of the same action against
/// the same configuration produce equal results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnforcementResult {
    /// True only when the oracle's effect was Allow.
    pub allowed: bool,
    /// The classified action kind.
    pub action: ActionKind,
    /// Identifier of the targeted resource (e.g., "terminal").
    pub resource: String,
    /// The oracle's decision, unmodified.
    pub decision: Decision,
    /// The action string exactly as the agent emitted it.
    pub raw_action: String,
    /// The request that was evaluated.
    pub request: AuthorizationRequest,
    /// Digest of the oracle, policy set, and entity graph in force.
    pub config_digest: String,
}

impl EnforcementResult {
    /// An `Enforcement` audit event describing this verdict.
    pub fn audit_event(&self) -> AuditEvent {
        AuditEvent::new(self.request.principal.to_string(), AuditAction::Enforcement)
            .with_raw_action(&self.raw_action)
            .with_intent(self.action.as_str(), self.request.resource.to_string())
            .with_verdict(self.allowed)
            .with_config_digest(&self.config_digest)
            .with_metadata(serde_json::json!({
                "effect": self.decision.effect,
                "diagnostics": self.decision.diagnostics,
            }))
    }
}
