use std::collections::{BTreeSet, HashMap};

use chrono::Utc;

use paramgate_common::ids::PresetId;
use paramgate_common::types::{ParameterPreset, ParameterSet, PresetUpdate, ProviderKey};
use paramgate_common::{ParamGateError, Result};

/// In-memory presets per provider key, in insertion order.
///
/// Holds at most one default preset per provider key: a second default is
/// rejected instead of silently replacing the first. Persistence is the
/// host's job; it loads presets at start-up and writes back custom ones.
#[derive(Clone, Debug, Default)]
pub struct PresetStore {
    presets: HashMap<ProviderKey, Vec<ParameterPreset>>,
}

impl PresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a preset under its own provider key.
    pub fn add(&mut self, preset: ParameterPreset) -> Result<()> {
        let provider = preset.provider.clone();
        let existing = self.list_by_provider(&provider);

        if existing.iter().any(|p| p.id == preset.id) {
            tracing::warn!(provider = %provider, preset = %preset.id, "Rejected duplicate preset id");
            return Err(ParamGateError::DuplicatePreset {
                provider: provider.to_string(),
                id: preset.id.to_string(),
            });
        }

        if preset.is_default {
            if let Some(current) = existing.iter().find(|p| p.is_default) {
                tracing::warn!(
                    provider = %provider,
                    existing = %current.id,
                    rejected = %preset.id,
                    "Rejected second default preset"
                );
                return Err(ParamGateError::DefaultPresetConflict {
                    provider: provider.to_string(),
                    existing: current.id.to_string(),
                    rejected: preset.id.to_string(),
                });
            }
        }

        tracing::debug!(provider = %provider, preset = %preset.id, "Registered preset");
        self.presets.entry(provider).or_default().push(preset);
        Ok(())
    }

    pub fn list_by_provider(&self, provider: &ProviderKey) -> &[ParameterPreset] {
        self.presets
            .get(provider)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get_by_id(&self, provider: &ProviderKey, id: &str) -> Option<&ParameterPreset> {
        self.list_by_provider(provider)
            .iter()
            .find(|p| p.id.as_str() == id)
    }

    pub fn list_by_tag(&self, provider: &ProviderKey, tag: &str) -> Vec<&ParameterPreset> {
        self.list_by_provider(provider)
            .iter()
            .filter(|p| p.has_tag(tag))
            .collect()
    }

    pub fn get_default(&self, provider: &ProviderKey) -> Option<&ParameterPreset> {
        self.list_by_provider(provider).iter().find(|p| p.is_default)
    }

    /// Apply a partial update. `Ok(false)` when no such preset exists; an
    /// error when the update would make a second default.
    pub fn update(&mut self, provider: &ProviderKey, id: &str, update: PresetUpdate) -> Result<bool> {
        if self.get_by_id(provider, id).is_none() {
            return Ok(false);
        }
        if update.is_default == Some(true) {
            if let Some(current) = self.get_default(provider).filter(|p| p.id.as_str() != id) {
                return Err(ParamGateError::DefaultPresetConflict {
                    provider: provider.to_string(),
                    existing: current.id.to_string(),
                    rejected: id.to_string(),
                });
            }
        }

        let Some(preset) = self.find_mut(provider, id) else {
            return Ok(false);
        };

        if let Some(name) = update.name {
            preset.name = name;
        }
        if let Some(description) = update.description {
            preset.description = description;
        }
        if let Some(parameters) = update.parameters {
            preset.parameters = parameters;
        }
        if let Some(tags) = update.tags {
            preset.tags = tags;
        }
        if let Some(is_default) = update.is_default {
            preset.is_default = is_default;
        }
        preset.updated_at = Some(Utc::now());

        tracing::debug!(provider = %provider, preset = id, "Updated preset");
        Ok(true)
    }

    /// Make `id` the default, clearing the flag on whichever preset held it.
    /// `Ok(false)` when no such preset exists.
    pub fn set_default(&mut self, provider: &ProviderKey, id: &str) -> Result<bool> {
        if self.get_by_id(provider, id).is_none() {
            return Ok(false);
        }

        let now = Utc::now();
        for preset in self.presets.entry(provider.clone()).or_default() {
            let should_be_default = preset.id.as_str() == id;
            if preset.is_default != should_be_default {
                preset.is_default = should_be_default;
                preset.updated_at = Some(now);
            }
        }

        tracing::info!(provider = %provider, preset = id, "Default preset changed");
        Ok(true)
    }

    pub fn remove(&mut self, provider: &ProviderKey, id: &str) -> bool {
        let Some(presets) = self.presets.get_mut(provider) else {
            return false;
        };
        let before = presets.len();
        presets.retain(|p| p.id.as_str() != id);
        before != presets.len()
    }

    /// Create and store an ad-hoc preset with a generated id. Custom presets
    /// are never the default, so this cannot conflict.
    pub fn create_custom(
        &mut self,
        provider: &ProviderKey,
        name: &str,
        description: &str,
        parameters: ParameterSet,
        tags: BTreeSet<String>,
        created_by: Option<&str>,
    ) -> ParameterPreset {
        let preset = ParameterPreset {
            id: PresetId::generate(),
            name: name.to_string(),
            description: description.to_string(),
            provider: provider.clone(),
            parameters,
            tags,
            is_default: false,
            created_by: created_by.map(str::to_string),
            created_at: Utc::now(),
            updated_at: None,
        };

        metrics::counter!("presets.created", "provider" => provider.to_string()).increment(1);
        tracing::info!(provider = %provider, preset = %preset.id, name = name, "Created custom preset");

        self.presets
            .entry(provider.clone())
            .or_default()
            .push(preset.clone());
        preset
    }

    /// The preset's parameters with `overrides` written on top, ready to be
    /// fed into the prepare pipeline.
    pub fn apply(&self, provider: &ProviderKey, id: &str, overrides: &ParameterSet) -> Option<ParameterSet> {
        self.get_by_id(provider, id)
            .map(|preset| preset.parameters.overlaid_with(overrides))
    }

    pub fn providers(&self) -> impl Iterator<Item = &ProviderKey> {
        self.presets.keys()
    }

    pub fn len(&self) -> usize {
        self.presets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_mut(&mut self, provider: &ProviderKey, id: &str) -> Option<&mut ParameterPreset> {
        self.presets
            .get_mut(provider)?
            .iter_mut()
            .find(|p| p.id.as_str() == id)
    }
}
