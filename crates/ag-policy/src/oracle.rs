// oracle.rs — The policy evaluation oracle interface.
//
// The gate never evaluates policy itself. It hands a request plus the
// loaded policy set and entity graph to an oracle and receives a Decision.
// Oracles must be deterministic and side-effect free: the same three inputs
// always produce the same decision.
//
// Loading is part of the interface so that policy text and entity data are
// parsed exactly once (at gate construction) into the oracle's own
// representation, then shared read-only across every evaluation.

use crate::decision::Decision;
use crate::error::PolicyError;
use crate::request::AuthorizationRequest;

/// A policy evaluation engine.
///
/// `Send + Sync` so a single oracle can serve concurrent checks.
pub trait PolicyOracle: Send + Sync {
    /// Parsed policy set.
    type PolicySet: Send + Sync;
    /// Parsed entity graph.
    type Entities: Send + Sync;

    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Parse policy text.
    fn load_policies(&self, source: &str) -> Result<Self::PolicySet, PolicyError>;

    /// Parse an entity document.
    fn load_entities(&self, source: &str) -> Result<Self::Entities, PolicyError>;

    /// Evaluate a request. An `Err` means no decision was produced; callers
    /// must treat it as a deny.
    fn evaluate(
        &self,
        request: &AuthorizationRequest,
        policies: &Self::PolicySet,
        entities: &Self::Entities,
    ) -> Result<Decision, PolicyError>;
}
