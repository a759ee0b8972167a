use paramgate_common::types::{
    ParamKind, ParamValue, ParameterDefinition, ParameterSet, Violation, ViolationKind,
};

use crate::suggest;

/// Default Jaro-Winkler threshold for "did you mean" hints.
pub const DEFAULT_SUGGESTION_THRESHOLD: f64 = 0.85;

/// Per-parameter type, range and enumeration checks.
///
/// Knows nothing about other parameters; cross-parameter rules belong to
/// [`ConstraintRegistry`](super::ConstraintRegistry).
#[derive(Clone, Copy, Debug)]
pub struct ValueValidator {
    suggestion_threshold: f64,
}

impl Default for ValueValidator {
    fn default() -> Self {
        Self::new(DEFAULT_SUGGESTION_THRESHOLD)
    }
}

impl ValueValidator {
    pub fn new(suggestion_threshold: f64) -> Self {
        Self {
            suggestion_threshold,
        }
    }

    /// Check one value against its definition. An absent value is valid:
    /// filling it in is the resolver's job.
    pub fn check(
        &self,
        value: Option<&ParamValue>,
        definition: &ParameterDefinition,
    ) -> Result<(), Violation> {
        let Some(value) = value else {
            return Ok(());
        };

        // A value of the wrong shape gets a type diagnostic here, including
        // text the lenient converter could not turn into a number.
        if !definition.accepts_type(value) {
            return Err(Violation::for_key(
                ViolationKind::Type,
                &definition.key,
                format!(
                    "{}: expected a {}, got {} {}",
                    definition.key,
                    definition.kind,
                    value.type_name(),
                    value
                ),
            ));
        }

        match definition.kind {
            ParamKind::Number => {
                let n = value.as_f64().unwrap_or_default();
                // NaN slips through both bound comparisons and serializes as null.
                if !n.is_finite() {
                    return Err(Violation::for_key(
                        ViolationKind::Range,
                        &definition.key,
                        format!("{}: {} is not a finite number", definition.key, value),
                    ));
                }
                check_bounds(definition, n, "")
            }
            ParamKind::String => {
                // Bounds count characters for strings, not bytes or value.
                let len = value.as_str().map(|s| s.chars().count()).unwrap_or_default();
                check_bounds(definition, len as f64, "length ")
            }
            ParamKind::Select => self.check_option(value, definition),
            ParamKind::Boolean => Ok(()),
        }
    }

    fn check_option(&self, value: &ParamValue, definition: &ParameterDefinition) -> Result<(), Violation> {
        if definition.options.contains(value) {
            return Ok(());
        }

        let legal = definition
            .options
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        let mut message = format!("{}: {} is not one of [{}]", definition.key, value, legal);

        if let Some(text) = value.as_str() {
            let textual: Vec<&str> = definition.options.iter().filter_map(ParamValue::as_str).collect();
            if let Some(hint) = suggest::closest(text, textual, self.suggestion_threshold) {
                message.push_str(&format!(" (did you mean \"{}\"?)", hint));
            }
        }

        Err(Violation::for_key(ViolationKind::Enumeration, &definition.key, message))
    }

    /// Run [`Self::check`] on every defined key that has a value, in
    /// definition order. All failures are collected.
    pub fn check_all(&self, set: &ParameterSet, definitions: &[ParameterDefinition]) -> Vec<Violation> {
        definitions
            .iter()
            .filter_map(|def| self.check(set.get(&def.key), def).err())
            .collect()
    }
}

fn check_bounds(definition: &ParameterDefinition, measured: f64, label: &str) -> Result<(), Violation> {
    if let Some(min) = definition.min {
        if measured < min {
            return Err(Violation::for_key(
                ViolationKind::Range,
                &definition.key,
                format!(
                    "{}: {}{} is below minimum {}",
                    definition.key,
                    label,
                    ParamValue::Number(measured),
                    ParamValue::Number(min)
                ),
            ));
        }
    }

    if let Some(max) = definition.max {
        if measured > max {
            return Err(Violation::for_key(
                ViolationKind::Range,
                &definition.key,
                format!(
                    "{}: {}{} is above maximum {}",
                    definition.key,
                    label,
                    ParamValue::Number(measured),
                    ParamValue::Number(max)
                ),
            ));
        }
    }

    Ok(())
}

/// Shorthand for [`ValueValidator::check`] with the default threshold.
pub fn check(value: Option<&ParamValue>, definition: &ParameterDefinition) -> Result<(), Violation> {
    ValueValidator::default().check(value, definition)
}
