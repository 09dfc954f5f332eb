// intent.rs — Structured intent produced by the classifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of action an agent is attempting.
///
/// The snake_case rendering doubles as the identifier of the `Action` entity
/// in authorization requests (e.g., `Action::"execute_command"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Runs a shell command or spawns a process.
    ExecuteCommand,
    /// Removes files or directories.
    DeleteFile,
    /// Launches an application (terminal, shell).
    OpenApp,
    /// Types text or sends key combinations.
    TypeText,
    /// Anything else; treated as a pointer click.
    Click,
}

impl ActionKind {
    /// All action kinds, in classifier priority order.
    pub const ALL: [ActionKind; 5] = [
        ActionKind::ExecuteCommand,
        ActionKind::DeleteFile,
        ActionKind::OpenApp,
        ActionKind::TypeText,
        ActionKind::Click,
    ];

    /// The stable identifier for this action kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::ExecuteCommand => "execute_command",
            ActionKind::DeleteFile => "delete_file",
            ActionKind::OpenApp => "open_app",
            ActionKind::TypeText => "type_text",
            ActionKind::Click => "click",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A classified action: what the agent wants to do, and to which resource.
///
/// Exactly one `ParsedIntent` is produced per raw action string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ParsedIntent {
    /// What kind of action was detected.
    pub action_kind: ActionKind,
    /// Entity type of the target resource (e.g., "App").
    pub resource_type: String,
    /// Identifier of the target resource (e.g., "terminal").
    pub resource_id: String,
}

impl ParsedIntent {
    pub fn new(
        action_kind: ActionKind,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            action_kind,
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }
}

impl fmt::Display for ParsedIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {}::{}",
            self.action_kind, self.resource_type, self.resource_id
        )
    }
}
