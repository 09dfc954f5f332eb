//! # ag-audit
//!
//! Append-only audit trail of enforcement verdicts for Agent Gate.
//!
//! Each gate check a caller records becomes one [`AuditEvent`] line in a
//! JSONL file. Events carry a SHA-256 of the raw action string and are
//! chained by `previous_hash`, so deleting, inserting, or editing a line is
//! detectable with [`AuditLog::verify_chain`].
//!
//! ```rust,no_run
//! use ag_audit::{AuditAction, AuditEvent, AuditLog};
//!
//! let mut log = AuditLog::open("/tmp/audit.jsonl").unwrap();
//! let mut event = AuditEvent::new(r#"Agent::"osworld-agent""#, AuditAction::Enforcement)
//!     .with_raw_action("pyautogui.click(1, 1)")
//!     .with_intent("click", r#"App::"chrome""#)
//!     .with_verdict(true);
//! log.append(&mut event).unwrap();
//! ```

pub mod error;
pub mod event;
pub mod hasher;
pub mod log;

pub use error::AuditError;
pub use event::{AuditAction, AuditEvent};
pub use log::AuditLog;
