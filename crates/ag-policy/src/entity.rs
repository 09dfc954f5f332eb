// entity.rs — Entity references in the oracle's request grammar.
//
// An EntityRef renders as `Type::"identifier"`. The type is a `::`-separated
// path of identifiers; the identifier is a quoted string literal. Anything
// that could break out of the quotes (the `"` delimiter, the `\` escape
// character, control characters) is rejected at construction, so a rendered
// EntityRef is always a single well-formed literal.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;

static IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static identifier pattern"));

/// Words the policy grammar reserves; they may not appear as type segments.
const RESERVED: &[&str] = &[
    "true", "false", "if", "then", "else", "in", "is", "like", "has", "__cedar",
];

/// A reference to an entity: `(type_name, identifier)`.
///
/// Fields are private so every instance has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityRef {
    type_name: String,
    id: String,
}

impl EntityRef {
    /// Create a validated entity reference.
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Result<Self, RequestError> {
        let type_name = type_name.into();
        let id = id.into();
        validate_type_name(&type_name)?;
        validate_id(&id)?;
        Ok(Self { type_name, id })
    }

    /// Construct from parts known to be valid (compile-time constants).
    pub(crate) fn from_parts_unchecked(type_name: &str, id: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            id: id.to_string(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::\"{}\"", self.type_name, self.id)
    }
}

impl FromStr for EntityRef {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (type_name, rest) = s
            .split_once("::\"")
            .ok_or_else(|| RequestError::MalformedEntityRef(s.to_string()))?;
        let id = rest
            .strip_suffix('"')
            .ok_or_else(|| RequestError::MalformedEntityRef(s.to_string()))?;
        Self::new(type_name, id)
    }
}

impl TryFrom<String> for EntityRef {
    type Error = RequestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityRef> for String {
    fn from(value: EntityRef) -> Self {
        value.to_string()
    }
}

fn invalid(value: &str, reason: impl Into<String>) -> RequestError {
    RequestError::InvalidIdentifier {
        field: "entity".to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn validate_type_name(type_name: &str) -> Result<(), RequestError> {
    if type_name.is_empty() {
        return Err(invalid(type_name, "type name is empty"));
    }
    for segment in type_name.split("::") {
        if !IDENT.is_match(segment) {
            return Err(invalid(
                type_name,
                format!("type segment '{}' is not an identifier", segment),
            ));
        }
        if RESERVED.contains(&segment) {
            return Err(invalid(
                type_name,
                format!("type segment '{}' is a reserved word", segment),
            ));
        }
    }
    Ok(())
}

fn validate_id(id: &str) -> Result<(), RequestError> {
    if let Some(c) = id.chars().find(|c| *c == '"' || *c == '\\' || c.is_control()) {
        return Err(invalid(
            id,
            format!("contains forbidden character {:?}", c),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_in_request_grammar() {
        let e = EntityRef::new("Agent", "osworld-agent").unwrap();
        assert_eq!(e.to_string(), r#"Agent::"osworld-agent""#);
    }

    #[test]
    fn namespaced_type_names_allowed() {
        let e = EntityRef::new("Desktop::App", "chrome").unwrap();
        assert_eq!(e.to_string(), r#"Desktop::App::"chrome""#);
    }

    #[test]
    fn rejects_quote_in_identifier() {
        let err = EntityRef::new("App", r#"chrome" || true || ""#).unwrap_err();
        match err {
            RequestError::InvalidIdentifier { reason, .. } => {
                assert!(reason.contains("forbidden character"))
            }
            other => panic!("expected InvalidIdentifier, got {:?}", other),
        }
    }

    #[test]
    fn rejects_backslash_and_control_chars() {
        assert!(EntityRef::new("App", r"chrome\").is_err());
        assert!(EntityRef::new("App", "chr\nome").is_err());
    }

    #[test]
    fn rejects_bad_type_names() {
        assert!(EntityRef::new("", "x").is_err());
        assert!(EntityRef::new("1App", "x").is_err());
        assert!(EntityRef::new("App::", "x").is_err());
        assert!(EntityRef::new("App Name", "x").is_err());
        assert!(EntityRef::new("if", "x").is_err());
    }

    #[test]
    fn parses_rendered_form() {
        let e: EntityRef = r#"App::"terminal""#.parse().unwrap();
        assert_eq!(e.type_name(), "App");
        assert_eq!(e.id(), "terminal");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(matches!(
            "App:terminal".parse::<EntityRef>(),
            Err(RequestError::MalformedEntityRef(_))
        ));
        assert!(matches!(
            r#"App::"terminal"#.parse::<EntityRef>(),
            Err(RequestError::MalformedEntityRef(_))
        ));
        // A smuggled quote inside the literal is still caught.
        assert!(matches!(
            r#"App::"a"b""#.parse::<EntityRef>(),
            Err(RequestError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn serializes_as_string() {
        let e = EntityRef::new("App", "chrome").unwrap();
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, r#""App::\"chrome\"""#);
        let back: EntityRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
