use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use paramgate_common::types::{ParamValue, ParameterDefinition, ParameterSet, ProviderKey};

use crate::suggest;
use crate::validation::value::DEFAULT_SUGGESTION_THRESHOLD;

/// Provider-level default overrides, kept apart from the schemas so they
/// can be tuned at runtime (e.g. from defaults.toml) without editing them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderDefaults(HashMap<ProviderKey, ParameterSet>);

impl ProviderDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the override table for `provider`.
    pub fn set(&mut self, provider: ProviderKey, overrides: ParameterSet) {
        self.0.insert(provider, overrides);
    }

    pub fn set_value(&mut self, provider: ProviderKey, key: &str, value: impl Into<ParamValue>) {
        self.0.entry(provider).or_default().insert(key, value);
    }

    pub fn get(&self, provider: &ProviderKey) -> Option<&ParameterSet> {
        self.0.get(provider)
    }

    pub fn providers(&self) -> impl Iterator<Item = &ProviderKey> {
        self.0.keys()
    }

    /// Take every provider table from `other`, replacing tables already held.
    pub fn merge(&mut self, other: ProviderDefaults) {
        self.0.extend(other.0);
    }

    /// [`resolve`] with this table's overrides for `provider`.
    pub fn resolve(
        &self,
        provider: &ProviderKey,
        candidate: &ParameterSet,
        definitions: &[ParameterDefinition],
    ) -> ParameterSet {
        resolve(candidate, definitions, self.get(provider))
    }

    /// [`resolve_clean`] with this table's overrides for `provider`.
    pub fn resolve_clean(
        &self,
        provider: &ProviderKey,
        candidate: &ParameterSet,
        definitions: &[ParameterDefinition],
    ) -> ParameterSet {
        resolve_clean(candidate, definitions, self.get(provider))
    }
}

/// Fill every defined key from the highest-precedence source that has a
/// value: the caller's value, then the provider-level override, then the
/// schema default. Keys with no value anywhere stay absent.
///
/// Keys the schema does not define are passed through unchanged.
pub fn resolve(
    candidate: &ParameterSet,
    definitions: &[ParameterDefinition],
    overrides: Option<&ParameterSet>,
) -> ParameterSet {
    let mut merged = candidate.clone();
    fill_defaults(&mut merged, candidate, definitions, overrides);
    merged
}

/// Like [`resolve`], but keys the schema does not define are dropped.
///
/// Dropped keys are not violations; they are logged at debug level with
/// the closest defined key, if any.
pub fn resolve_clean(
    candidate: &ParameterSet,
    definitions: &[ParameterDefinition],
    overrides: Option<&ParameterSet>,
) -> ParameterSet {
    let mut merged = ParameterSet::new();

    for (key, value) in candidate.iter() {
        if definitions.iter().any(|d| &d.key == key) {
            merged.insert(key.clone(), value.clone());
        } else {
            let hint = suggest::closest(
                key,
                definitions.iter().map(|d| d.key.as_str()),
                DEFAULT_SUGGESTION_THRESHOLD,
            );
            tracing::debug!(key = %key, did_you_mean = ?hint, "Dropping unknown parameter");
        }
    }

    fill_defaults(&mut merged, candidate, definitions, overrides);
    merged
}

fn fill_defaults(
    merged: &mut ParameterSet,
    candidate: &ParameterSet,
    definitions: &[ParameterDefinition],
    overrides: Option<&ParameterSet>,
) {
    for def in definitions {
        if candidate.contains_key(&def.key) {
            continue;
        }

        let fallback = overrides
            .and_then(|o| o.get(&def.key))
            .or(def.default_value.as_ref());

        if let Some(value) = fallback {
            merged.insert(def.key.clone(), value.clone());
        }
    }
}
