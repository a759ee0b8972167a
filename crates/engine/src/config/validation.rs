use std::collections::{BTreeMap, BTreeSet, HashSet};

use paramgate_common::types::{ParameterDefinition, ParameterSet, ProviderKey};

use super::files::SchemaFile;
use super::loader::{ConfigError, EngineConfig};
use crate::pipeline::ParameterEngine;
use crate::validation::ValueValidator;

/// Validate the complete engine configuration.
///
/// Collects every problem rather than stopping at the first. Providers may
/// be referenced when they come from a schema file or a built-in catalog.
pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_pipeline(config, &mut errors);
    validate_preset_limits(config, &mut errors);
    validate_schemas(config, &mut errors);

    let mut known = crate::builtin::provider_keys();
    known.extend(config.schemas.iter().map(SchemaFile::key));

    validate_defaults(config, &known, &mut errors);
    validate_presets(config, &known, &mut errors);

    let definitions = effective_definitions(config, &mut errors);
    validate_values(config, &definitions, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.join("; ")))
    }
}

fn validate_pipeline(config: &EngineConfig, errors: &mut Vec<String>) {
    let p = &config.system.pipeline;

    if !(0.0..=1.0).contains(&p.suggestion_threshold) {
        errors.push("pipeline.suggestion_threshold must be between 0.0 and 1.0".into());
    }
}

fn validate_preset_limits(config: &EngineConfig, errors: &mut Vec<String>) {
    let l = &config.system.presets;

    if l.max_per_provider == 0 {
        errors.push("presets.max_per_provider must be > 0".into());
    }
    if l.max_tags == 0 {
        errors.push("presets.max_tags must be > 0".into());
    }
}

fn validate_schemas(config: &EngineConfig, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();

    for schema in &config.schemas {
        let key = schema.key();
        if schema.provider.trim().is_empty() || schema.provider.contains('/') {
            errors.push(format!("schema provider '{}' is not a valid name", schema.provider));
        }
        if !seen.insert(key.clone()) {
            errors.push(format!("{}: defined by more than one schema file", key));
        }

        let mut keys = HashSet::new();
        for def in &schema.parameters {
            if !keys.insert(def.key.as_str()) {
                errors.push(format!("{}: parameter '{}' defined twice", key, def.key));
            }
            for problem in def.invariant_errors() {
                errors.push(format!("{}: {}", key, problem));
            }
        }

        for spec in &schema.dependencies {
            if let Err(problem) = spec.to_dependency() {
                errors.push(format!("{}: {}", key, problem));
            }
            for name in [&spec.parameter, &spec.depends_on] {
                if !keys.contains(name.as_str()) {
                    errors.push(format!("{}: dependency references unknown parameter '{}'", key, name));
                }
            }
        }

        for exclusion in &schema.exclusions {
            if exclusion.parameters.len() < 2 {
                errors.push(format!("{}: mutual exclusion needs at least two parameters", key));
            }
            for name in &exclusion.parameters {
                if !keys.contains(name.as_str()) {
                    errors.push(format!("{}: exclusion references unknown parameter '{}'", key, name));
                }
            }
        }
    }
}

fn validate_defaults(config: &EngineConfig, known: &BTreeSet<ProviderKey>, errors: &mut Vec<String>) {
    for provider in config.defaults.providers() {
        if !known.contains(provider) {
            errors.push(format!("defaults.toml: unknown provider {}", provider));
        }
    }
}

/// Definitions the engine will hold once the config is applied: the
/// built-in catalogs with schema files replacing whole provider keys.
fn effective_definitions(
    config: &EngineConfig,
    errors: &mut Vec<String>,
) -> BTreeMap<ProviderKey, Vec<ParameterDefinition>> {
    let mut definitions = BTreeMap::new();

    match ParameterEngine::with_builtins(config.system.pipeline.clone()) {
        Ok(engine) => {
            for provider in engine.schemas.list_providers() {
                let defs = engine.schemas.lookup(&provider).to_vec();
                definitions.insert(provider, defs);
            }
        }
        Err(e) => errors.push(format!("built-in catalogs: {}", e)),
    }

    for schema in &config.schemas {
        definitions.insert(schema.key(), schema.parameters.clone());
    }
    definitions
}

/// Default overrides and preset parameters must pass the same value checks
/// a request would.
fn validate_values(
    config: &EngineConfig,
    definitions: &BTreeMap<ProviderKey, Vec<ParameterDefinition>>,
    errors: &mut Vec<String>,
) {
    let validator = ValueValidator::new(config.system.pipeline.suggestion_threshold);
    let mut check = |origin: String, provider: &ProviderKey, set: &ParameterSet| {
        let Some(defs) = definitions.get(provider) else {
            return;
        };
        for violation in validator.check_all(set, defs) {
            errors.push(format!("{}: {}", origin, violation.message));
        }
    };

    for provider in config.defaults.providers() {
        if let Some(set) = config.defaults.get(provider) {
            check(format!("defaults.toml {}", provider), provider, set);
        }
    }
    for preset in &config.presets {
        check(format!("preset '{}'", preset.id), &preset.provider, &preset.parameters);
    }
}

fn validate_presets(config: &EngineConfig, known: &BTreeSet<ProviderKey>, errors: &mut Vec<String>) {
    let limits = &config.system.presets;
    let mut per_provider: BTreeMap<&ProviderKey, Vec<&str>> = BTreeMap::new();
    let mut defaults: BTreeMap<&ProviderKey, Vec<&str>> = BTreeMap::new();

    for preset in &config.presets {
        let id = preset.id.as_str();
        if id.trim().is_empty() {
            errors.push(format!("{}: preset with empty id", preset.provider));
        }
        if preset.name.trim().is_empty() {
            errors.push(format!("preset '{}': name must not be empty", id));
        }
        if !known.contains(&preset.provider) {
            errors.push(format!("preset '{}': unknown provider {}", id, preset.provider));
        }
        if preset.tags.len() > limits.max_tags as usize {
            errors.push(format!(
                "preset '{}': {} tags exceeds presets.max_tags ({})",
                id,
                preset.tags.len(),
                limits.max_tags
            ));
        }

        let ids = per_provider.entry(&preset.provider).or_default();
        if ids.contains(&id) {
            errors.push(format!("{}: preset '{}' defined twice", preset.provider, id));
        }
        ids.push(id);

        if preset.is_default {
            defaults.entry(&preset.provider).or_default().push(id);
        }
    }

    for (provider, ids) in &per_provider {
        if ids.len() > limits.max_per_provider as usize {
            errors.push(format!(
                "{}: {} presets exceeds presets.max_per_provider ({})",
                provider,
                ids.len(),
                limits.max_per_provider
            ));
        }
    }

    for (provider, ids) in &defaults {
        if ids.len() > 1 {
            errors.push(format!(
                "{}: more than one default preset ({})",
                provider,
                ids.join(", ")
            ));
        }
    }
}
