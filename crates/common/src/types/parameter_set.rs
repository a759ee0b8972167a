use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::value::ParamValue;
use crate::error::{ParamGateError, Result};

/// Parameters submitted for one generation request, keyed by parameter name.
///
/// A key is either present with a value or absent; there is no "present but
/// undefined" state. `null` in JSON or TOML input is read as absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<String, ParamValue>);

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of `self` with every entry of `overrides` written on top.
    pub fn overlaid_with(&self, overrides: &ParameterSet) -> ParameterSet {
        let mut merged = self.clone();
        for (key, value) in overrides.iter() {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Build a set from a JSON object, skipping `null` members.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(map
                .into_iter()
                .filter_map(|(k, v)| ParamValue::from_json(v).map(|v| (k, v)))
                .collect()),
            Value::Null => Ok(Self::new()),
            other => Err(ParamGateError::Config(format!(
                "parameters must be a JSON object, got {}",
                other
            ))),
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for ParameterSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, Option<ParamValue>>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .filter_map(|(k, v)| v.map(|v| (k, v)))
                .collect(),
        ))
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for ParameterSet {
    type Item = (String, ParamValue);
    type IntoIter = btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<BTreeMap<String, ParamValue>> for ParameterSet {
    fn from(map: BTreeMap<String, ParamValue>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nulls_are_absent() {
        let set: ParameterSet =
            serde_json::from_value(json!({"style": null, "n": 2, "model": "dall-e-3"})).unwrap();
        assert_eq!(set.len(), 2);
        assert!(!set.contains_key("style"));

        let set = ParameterSet::from_json(json!({"seed": null})).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(ParameterSet::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_overlaid_with_prefers_overrides() {
        let base: ParameterSet = [("quality", "standard"), ("size", "1024x1024")]
            .into_iter()
            .collect();
        let overrides: ParameterSet = [("quality", "hd")].into_iter().collect();
        let merged = base.overlaid_with(&overrides);
        assert_eq!(merged.get("quality"), Some(&ParamValue::text("hd")));
        assert_eq!(merged.get("size"), Some(&ParamValue::text("1024x1024")));
    }

    #[test]
    fn test_json_roundtrip_keeps_integers() {
        let set: ParameterSet = [("n", 2)].into_iter().collect();
        assert_eq!(set.to_json(), json!({"n": 2}));
    }
}
