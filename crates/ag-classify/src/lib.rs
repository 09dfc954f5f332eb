//! # ag-classify
//!
//! Lexical classification of raw agent actions for Agent Gate.
//!
//! Agents emit free-form action strings (usually UI automation calls such as
//! `pyautogui.click(500, 300)`). Before anything can be authorized, the
//! string is mapped to a [`ParsedIntent`]: an action kind plus the resource
//! it targets.
//!
//! ## Key invariants
//!
//! - **Total**: every input, including empty and non-ASCII strings, yields
//!   exactly one intent. There is no error path.
//! - **Deterministic**: the result depends only on the lower-cased input.
//! - **Ordered**: rules are evaluated in a fixed priority order and the first
//!   match wins. Higher-severity interpretations come first so a string that
//!   both runs a command and opens a terminal is never under-classified.
//!
//! ```rust
//! use ag_classify::{classify, ActionKind};
//!
//! let intent = classify(r#"os.system("gnome-terminal")"#);
//! assert_eq!(intent.action_kind, ActionKind::ExecuteCommand);
//! assert_eq!(intent.resource_id, "terminal");
//! ```

pub mod intent;
pub mod rules;

pub use intent::{ActionKind, ParsedIntent};
pub use rules::{classify, classify_with_rule, rules, Classification, ClassificationRule};
