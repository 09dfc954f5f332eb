// request.rs — Request builder: ParsedIntent → AuthorizationRequest.
//
// The request has three entity references:
//
//   principal  the configured agent identity (never derived from the action)
//   action     Action::"<action_kind>"
//   resource   <resource_type>::"<resource_id>"
//
// Every part is validated against the request grammar. An intent that
// cannot be encoded fails with InvalidIdentifier; the caller must treat
// that as "not allowed".

use ag_classify::ParsedIntent;
use serde::{Deserialize, Serialize};

use crate::entity::EntityRef;
use crate::error::RequestError;

/// Entity type used for the action component of every request.
pub const ACTION_ENTITY_TYPE: &str = "Action";

/// Entity type of the default principal.
pub const DEFAULT_PRINCIPAL_TYPE: &str = "Agent";

/// Identifier of the default principal.
pub const DEFAULT_PRINCIPAL_ID: &str = "osworld-agent";

/// The default agent identity, `Agent::"osworld-agent"`.
pub fn default_principal() -> EntityRef {
    EntityRef::from_parts_unchecked(DEFAULT_PRINCIPAL_TYPE, DEFAULT_PRINCIPAL_ID)
}

/// A request submitted to the policy oracle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AuthorizationRequest {
    pub principal: EntityRef,
    pub action: EntityRef,
    pub resource: EntityRef,
}

impl AuthorizationRequest {
    /// Build a request directly from three entity references.
    pub fn new(principal: EntityRef, action: EntityRef, resource: EntityRef) -> Self {
        Self {
            principal,
            action,
            resource,
        }
    }
}

/// Build an authorization request for a classified intent.
pub fn build(
    intent: &ParsedIntent,
    principal: &EntityRef,
) -> Result<AuthorizationRequest, RequestError> {
    let action = EntityRef::new(ACTION_ENTITY_TYPE, intent.action_kind.as_str())
        .map_err(|e| e.in_field("action"))?;
    let resource = EntityRef::new(intent.resource_type.as_str(), intent.resource_id.as_str())
        .map_err(|e| e.in_field("resource"))?;

    let request = AuthorizationRequest::new(principal.clone(), action, resource);
    tracing::debug!(
        principal = %request.principal,
        action = %request.action,
        resource = %request.resource,
        "authorization request built"
    );
    Ok(request)
}
