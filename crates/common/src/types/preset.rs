use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::parameter_set::ParameterSet;
use super::provider::ProviderKey;
use crate::ids::PresetId;

/// A named, reusable parameter bundle for one provider key.
///
/// At most one preset per provider key is the default; the preset store
/// enforces that, this record does not.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterPreset {
    pub id: PresetId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub provider: ProviderKey,
    #[serde(default)]
    pub parameters: ParameterSet,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ParameterPreset {
    pub fn new(id: impl Into<PresetId>, name: &str, provider: ProviderKey, parameters: ParameterSet) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            description: String::new(),
            provider,
            parameters,
            tags: BTreeSet::new(),
            is_default: false,
            created_by: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Partial update for a stored preset; `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Option<ParameterSet>,
    #[serde(default)]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default)]
    pub is_default: Option<bool>,
}

impl PresetUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.parameters.is_none()
            && self.tags.is_none()
            && self.is_default.is_none()
    }
}
