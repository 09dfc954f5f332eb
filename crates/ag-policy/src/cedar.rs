// cedar.rs — Cedar-backed policy oracle.
//
// Policies are Cedar policy text; entities are the Cedar entity JSON format:
//
//   [{ "uid": { "type": "App", "id": "terminal" }, "attrs": {}, "parents": [] }]
//
// Effect mapping:
//   Allow                                          → Effect::Allow
//   Deny, no determining policy, ≥1 eval error     → Effect::Indeterminate
//   Deny otherwise                                 → Effect::Deny
//
// No schema is applied; requests carry an empty context.

use std::str::FromStr;

use cedar_policy::{Authorizer, Context, Entities, EntityUid, PolicySet, Request};

use crate::decision::{Decision, Diagnostics, Effect};
use crate::entity::EntityRef;
use crate::error::PolicyError;
use crate::oracle::PolicyOracle;
use crate::request::AuthorizationRequest;

/// Policy oracle backed by the Cedar authorizer.
pub struct CedarOracle {
    authorizer: Authorizer,
}

impl CedarOracle {
    pub fn new() -> Self {
        Self {
            authorizer: Authorizer::new(),
        }
    }
}

impl Default for CedarOracle {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an EntityRef to a Cedar uid by parsing its rendered form, so the
/// oracle sees exactly the text the request builder produced.
fn to_uid(entity: &EntityRef) -> Result<EntityUid, PolicyError> {
    let rendered = entity.to_string();
    EntityUid::from_str(&rendered).map_err(|e| PolicyError::InvalidRequest {
        entity: rendered,
        reason: e.to_string(),
    })
}

impl PolicyOracle for CedarOracle {
    type PolicySet = PolicySet;
    type Entities = Entities;

    fn name(&self) -> &str {
        "cedar"
    }

    fn load_policies(&self, source: &str) -> Result<PolicySet, PolicyError> {
        let policies =
            PolicySet::from_str(source).map_err(|e| PolicyError::PolicyParse(e.to_string()))?;
        tracing::debug!(count = policies.policies().count(), "cedar policies parsed");
        Ok(policies)
    }

    fn load_entities(&self, source: &str) -> Result<Entities, PolicyError> {
        Entities::from_json_str(source, None).map_err(|e| PolicyError::EntityParse(e.to_string()))
    }

    fn evaluate(
        &self,
        request: &AuthorizationRequest,
        policies: &PolicySet,
        entities: &Entities,
    ) -> Result<Decision, PolicyError> {
        let cedar_request = Request::new(
            to_uid(&request.principal)?,
            to_uid(&request.action)?,
            to_uid(&request.resource)?,
            Context::empty(),
            None,
        )
        .map_err(|e| PolicyError::Evaluation(e.to_string()))?;

        let response = self
            .authorizer
            .is_authorized(&cedar_request, policies, entities);

        let diagnostics = Diagnostics {
            reasons: response
                .diagnostics()
                .reason()
                .map(|id| id.to_string())
                .collect(),
            errors: response
                .diagnostics()
                .errors()
                .map(|e| e.to_string())
                .collect(),
        };

        let effect = match response.decision() {
            cedar_policy::Decision::Allow => Effect::Allow,
            cedar_policy::Decision::Deny
                if diagnostics.reasons.is_empty() && !diagnostics.errors.is_empty() =>
            {
                Effect::Indeterminate
            }
            cedar_policy::Decision::Deny => Effect::Deny,
        };

        if !diagnostics.errors.is_empty() {
            tracing::warn!(
                errors = diagnostics.errors.len(),
                %effect,
                "cedar reported evaluation errors"
            );
        }

        Ok(Decision {
            effect,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = r#"
        permit(principal, action, resource);

        forbid(
            principal == Agent::"osworld-agent",
            action == Action::"execute_command",
            resource == App::"terminal"
        );
    "#;

    const ENTITIES: &str = r#"[
        { "uid": { "type": "Agent", "id": "osworld-agent" }, "attrs": {}, "parents": [] },
        { "uid": { "type": "App", "id": "terminal" }, "attrs": {}, "parents": [] },
        { "uid": { "type": "App", "id": "chrome" }, "attrs": {}, "parents": [] }
    ]"#;

    fn request(action: &str, resource: &str) -> AuthorizationRequest {
        AuthorizationRequest::new(
            crate::request::default_principal(),
            EntityRef::new("Action", action).unwrap(),
            EntityRef::new("App", resource).unwrap(),
        )
    }

    #[test]
    fn forbid_overrides_permit() {
        let oracle = CedarOracle::new();
        let policies = oracle.load_policies(POLICY).unwrap();
        let entities = oracle.load_entities(ENTITIES).unwrap();

        let decision = oracle
            .evaluate(&request("execute_command", "terminal"), &policies, &entities)
            .unwrap();
        assert_eq!(decision.effect, Effect::Deny);
        assert_eq!(decision.diagnostics.reasons.len(), 1);

        let decision = oracle
            .evaluate(&request("click", "chrome"), &policies, &entities)
            .unwrap();
        assert_eq!(decision.effect, Effect::Allow);
    }

    #[test]
    fn empty_policy_set_denies() {
        let oracle = CedarOracle::new();
        let policies = oracle.load_policies("").unwrap();
        let entities = oracle.load_entities("[]").unwrap();

        let decision = oracle
            .evaluate(&request("click", "chrome"), &policies, &entities)
            .unwrap();
        assert_eq!(decision.effect, Effect::Deny);
        assert!(decision.diagnostics.reasons.is_empty());
        assert!(decision.diagnostics.errors.is_empty());
    }

    #[test]
    fn erroring_policy_is_indeterminate() {
        let oracle = CedarOracle::new();
        let policies = oracle
            .load_policies(r#"permit(principal, action, resource) when { resource.trusted };"#)
            .unwrap();
        let entities = oracle.load_entities(ENTITIES).unwrap();

        let decision = oracle
            .evaluate(&request("click", "chrome"), &policies, &entities)
            .unwrap();
        assert_eq!(decision.effect, Effect::Indeterminate);
        assert!(!decision.diagnostics.errors.is_empty());
    }

    #[test]
    fn malformed_policy_text_is_rejected() {
        let oracle = CedarOracle::new();
        match oracle.load_policies("permit(principal, action") {
            Err(PolicyError::PolicyParse(_)) => {}
            other => panic!("expected PolicyParse, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn malformed_entities_are_rejected() {
        let oracle = CedarOracle::new();
        match oracle.load_entities("{ not json") {
            Err(PolicyError::EntityParse(_)) => {}
            other => panic!("expected EntityParse, got {:?}", other.map(|_| ())),
        }
    }
}
