//! # ag-gate
//!
//! Policy enforcement gate for autonomous agents.
//!
//! Sits in front of an agent that emits free-form action strings and decides,
//! before anything executes, whether each action is allowed:
//!
//! 1. classify the raw string into an intent ([`ag_classify`])
//! 2. build an authorization request for the configured principal
//! 3. evaluate it with the policy oracle (Cedar by default)
//! 4. interpret the effect into a verdict and return an [`EnforcementResult`]
//!
//! ## Key invariants
//!
//! - **Fail closed**: only an Allow effect allows. Indeterminate effects,
//!   unencodable requests, oracle errors, and timeouts all block the action.
//! - **Immutable configuration**: policies and entities are loaded once at
//!   construction and never re-read; checks are independent and may run
//!   concurrently.
//!
//! ```rust,no_run
//! use ag_gate::EnforcementGate;
//!
//! let gate = EnforcementGate::new(".ag/policy.cedar", ".ag/entities.json")?;
//! let result = gate.check("pyautogui.click(500, 300)")?;
//! if result.allowed {
//!     // execute the action
//! }
//! # Ok::<(), ag_gate::GateError>(())
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod result;

pub use config::{GateConfig, DEFAULT_EVALUATION_WORKERS, GATE_DIR};
pub use error::{GateError, Stage};
pub use gate::EnforcementGate;
pub use result::EnforcementResult;
