//! # ag-policy
//!
//! Authorization requests and policy decisions for Agent Gate.
//!
//! Turns a classified intent into an [`AuthorizationRequest`], hands it to a
//! [`PolicyOracle`], and interprets the returned [`Decision`]. The oracle is
//! a trait so the pipeline can run against the Cedar engine
//! ([`CedarOracle`]) or a scripted fake in tests.
//!
//! ## Key invariants
//!
//! - **Grammar-safe requests**: every [`EntityRef`] renders as a single
//!   `Type::"id"` literal. Identifiers that could break out of the quotes are
//!   rejected with [`RequestError::InvalidIdentifier`].
//! - **Fail closed**: [`interpret`] allows only on [`Effect::Allow`]. Deny,
//!   Indeterminate, and oracle errors never allow.

pub mod cedar;
pub mod decision;
pub mod entity;
pub mod error;
pub mod oracle;
pub mod request;

pub use cedar::CedarOracle;
pub use decision::{interpret, Decision, Diagnostics, Effect};
pub use entity::EntityRef;
pub use error::{PolicyError, RequestError};
pub use oracle::PolicyOracle;
pub use request::{build, default_principal, AuthorizationRequest, ACTION_ENTITY_TYPE};
