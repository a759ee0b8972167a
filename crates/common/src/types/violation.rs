use std::fmt;

use serde::{Deserialize, Serialize};

/// Which check produced a violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationKind {
    /// Value is not of the declared type.
    Type,
    /// Number or string length outside `min`/`max`.
    Range,
    /// Value is not one of a select's options.
    Enumeration,
    Dependency,
    Exclusion,
    /// A provider-scoped custom rule rejected the value.
    Rule,
}

/// One diagnostic about a candidate parameter set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Offending parameter, when the check is about a single key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub message: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, key: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn for_key(kind: ViolationKind, key: &str, message: impl Into<String>) -> Self {
        Self::new(kind, Some(key), message)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
