// error.rs — Error types for request construction and policy evaluation.

use thiserror::Error;

/// Errors raised while encoding an intent into the oracle's request grammar.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// A type name or identifier cannot be safely encoded as `Type::"id"`.
    #[error("invalid {field} identifier '{value}': {reason}")]
    InvalidIdentifier {
        field: String,
        value: String,
        reason: String,
    },

    /// A textual entity reference does not have the `Type::"id"` shape.
    #[error("malformed entity reference '{0}': expected Type::\"id\"")]
    MalformedEntityRef(String),
}

impl RequestError {
    /// Re-label an identifier error with the request field it came from.
    pub(crate) fn in_field(self, field: &str) -> Self {
        match self {
            RequestError::InvalidIdentifier { value, reason, .. } => {
                RequestError::InvalidIdentifier {
                    field: field.to_string(),
                    value,
                    reason,
                }
            }
            other => other,
        }
    }
}

/// Errors raised by a policy oracle.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy text could not be parsed.
    #[error("failed to parse policy set: {0}")]
    PolicyParse(String),

    /// The entity document could not be parsed.
    #[error("failed to parse entities: {0}")]
    EntityParse(String),

    /// The oracle rejected one of the request entities.
    #[error("oracle rejected request entity '{entity}': {reason}")]
    InvalidRequest { entity: String, reason: String },

    /// The oracle failed to produce a decision.
    #[error("policy evaluation failed: {0}")]
    Evaluation(String),
}
