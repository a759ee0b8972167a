use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::ParamValue;

/// Declared type of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Number,
    String,
    Boolean,
    /// Closed set of legal values listed in `options`.
    #[serde(alias = "enumeration", alias = "enum")]
    Select,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Select => "select",
        };
        f.write_str(s)
    }
}

/// One tunable knob of one provider key.
///
/// `min`/`max` are overloaded by type: numeric bounds for `number`,
/// character-count bounds for `string`, ignored otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: ParamKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ParamValue>,
    #[serde(default)]
    pub description: String,
}

impl ParameterDefinition {
    fn bare(key: &str, kind: ParamKind) -> Self {
        Self {
            key: key.to_string(),
            kind,
            default_value: None,
            min: None,
            max: None,
            options: Vec::new(),
            description: String::new(),
        }
    }

    pub fn number(key: &str) -> Self {
        Self::bare(key, ParamKind::Number)
    }

    pub fn string(key: &str) -> Self {
        Self::bare(key, ParamKind::String)
    }

    pub fn boolean(key: &str) -> Self {
        Self::bare(key, ParamKind::Boolean)
    }

    pub fn select<I, V>(key: &str, options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        let mut def = Self::bare(key, ParamKind::Select);
        def.options = options.into_iter().map(Into::into).collect();
        def
    }

    pub fn with_default(mut self, value: impl Into<ParamValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Whether `value` has the shape this definition declares.
    pub fn accepts_type(&self, value: &ParamValue) -> bool {
        match self.kind {
            ParamKind::Number => matches!(value, ParamValue::Number(_)),
            ParamKind::String => matches!(value, ParamValue::Text(_) | ParamValue::Choice(_)),
            ParamKind::Boolean => matches!(value, ParamValue::Bool(_)),
            // Membership is checked separately; any scalar may be an option.
            ParamKind::Select => !matches!(value, ParamValue::Json(_)),
        }
    }

    /// Breaches of the definition's own invariants. Empty means well-formed.
    pub fn invariant_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.key.trim().is_empty() {
            errors.push("parameter key must not be empty".to_string());
        }

        for (label, bound) in [("min", self.min), ("max", self.max)] {
            if bound.is_some_and(|b| !b.is_finite()) {
                errors.push(format!("{}: {} is not a finite number", self.key, label));
            }
        }
        if let Some(ParamValue::Number(n)) = &self.default_value {
            if !n.is_finite() {
                errors.push(format!("{}: default is not a finite number", self.key));
            }
        }

        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                errors.push(format!("{}: min {} is greater than max {}", self.key, min, max));
            }
        }

        if self.kind == ParamKind::Select && self.options.is_empty() {
            errors.push(format!("{}: select parameter has no options", self.key));
        }

        if let Some(default) = &self.default_value {
            if !self.accepts_type(default) {
                errors.push(format!(
                    "{}: default {} is not a {}",
                    self.key, default, self.kind
                ));
            } else if self.kind == ParamKind::Select && !self.options.contains(default) {
                errors.push(format!(
                    "{}: default {} is not one of the options",
                    self.key, default
                ));
            }
        }

        errors
    }
}
