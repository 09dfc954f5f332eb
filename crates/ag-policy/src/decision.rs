// decision.rs — Oracle decisions and the decision interpreter.
//
// The interpreter matches exactly on the closed Effect enum. It never
// inspects a textual rendering of the decision: a diagnostic such as
// "disallowed by policy1" must not read as an allow. Only Effect::Allow
// allows; Deny, Indeterminate, and any effect added later deny.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The oracle's categorical verdict for a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Effect {
    Allow,
    Deny,
    /// The oracle could not reach a verdict (e.g., every applicable policy
    /// errored during evaluation).
    Indeterminate,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
            Effect::Indeterminate => "Indeterminate",
        };
        f.write_str(s)
    }
}

/// Oracle diagnostics: which policies determined the effect, and which
/// errors occurred while evaluating.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Diagnostics {
    /// Identifiers of the policies that determined the effect.
    #[serde(default)]
    pub reasons: Vec<String>,
    /// Evaluation errors reported by the oracle.
    #[serde(default)]
    pub errors: Vec<String>,
}

/// A decision returned by the policy oracle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Decision {
    pub effect: Effect,
    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl Decision {
    pub fn new(effect: Effect) -> Self {
        Self {
            effect,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn allow() -> Self {
        Self::new(Effect::Allow)
    }

    pub fn deny() -> Self {
        Self::new(Effect::Deny)
    }

    pub fn indeterminate() -> Self {
        Self::new(Effect::Indeterminate)
    }

    /// Add a determining policy id and return self (builder pattern).
    pub fn with_reason(mut self, policy_id: impl Into<String>) -> Self {
        self.diagnostics.reasons.push(policy_id.into());
        self
    }

    /// Add an evaluation error message and return self.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.diagnostics.errors.push(message.into());
        self
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.effect)?;
        if !self.diagnostics.reasons.is_empty() {
            write!(f, " (policies: {})", self.diagnostics.reasons.join(", "))?;
        }
        if !self.diagnostics.errors.is_empty() {
            write!(f, " [{} error(s)]", self.diagnostics.errors.len())?;
        }
        Ok(())
    }
}

/// Interpret a decision as a boolean verdict. Fails closed.
pub fn interpret(decision: &Decision) -> bool {
    matches!(decision.effect, Effect::Allow)
}
