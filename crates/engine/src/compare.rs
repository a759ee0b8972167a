use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use paramgate_common::types::{ParamValue, ParameterSet};

/// A key whose value differs between the two sets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangedParameter {
    pub key: String,
    pub old_value: ParamValue,
    pub new_value: ParamValue,
}

/// Structural difference between two parameter sets, keys sorted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterDiff {
    /// Keys only in the newer set.
    pub added: Vec<String>,
    /// Keys only in the older set.
    pub removed: Vec<String>,
    pub changed: Vec<ChangedParameter>,
    pub unchanged: Vec<String>,
}

impl ParameterDiff {
    /// No key was added, removed or changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Diff `old` against `new` over the union of their keys.
///
/// Values compare by value. `Json` values compare deeply, and `Text` equals
/// `Choice` with the same string.
pub fn diff(old: &ParameterSet, new: &ParameterSet) -> ParameterDiff {
    let keys: BTreeSet<&str> = old.keys().chain(new.keys()).collect();
    let mut result = ParameterDiff::default();

    for key in keys {
        match (old.get(key), new.get(key)) {
            (None, Some(_)) => result.added.push(key.to_string()),
            (Some(_), None) => result.removed.push(key.to_string()),
            (Some(a), Some(b)) if a == b => result.unchanged.push(key.to_string()),
            (Some(a), Some(b)) => result.changed.push(ChangedParameter {
                key: key.to_string(),
                old_value: a.clone(),
                new_value: b.clone(),
            }),
            (None, None) => {}
        }
    }

    result
}

/// Whether two sets hold the same keys with equal values.
pub fn equals(a: &ParameterSet, b: &ParameterSet) -> bool {
    diff(a, b).is_empty()
}

impl fmt::Display for ParameterDiff {
    /// One line per difference, for history and audit views.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("no changes");
        }

        let mut lines = Vec::new();
        for key in &self.added {
            lines.push(format!("+ {}", key));
        }
        for key in &self.removed {
            lines.push(format!("- {}", key));
        }
        for change in &self.changed {
            lines.push(format!(
                "~ {}: {} -> {}",
                change.key, change.old_value, change.new_value
            ));
        }
        f.write_str(&lines.join("\n"))
    }
}
