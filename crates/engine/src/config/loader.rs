use std::path::{Path, PathBuf};

use paramgate_common::config::SystemConfig;
use paramgate_common::types::ParameterPreset;
use paramgate_common::ParamGateError;
use serde::de::DeserializeOwned;

use super::files::{PresetFile, SchemaFile};
use super::validation;
use crate::pipeline::ParameterEngine;
use crate::resolve::ProviderDefaults;

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "PARAMGATE_CONFIG_DIR";

/// Complete engine configuration loaded from the config directory.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Parsed system.toml.
    pub system: SystemConfig,
    /// Provider-level overrides from defaults.toml.
    pub defaults: ProviderDefaults,
    /// One entry per schemas/*.toml, in file name order.
    pub schemas: Vec<SchemaFile>,
    /// Every preset from presets/*.toml, in file name order.
    pub presets: Vec<ParameterPreset>,
    pub config_dir: PathBuf,
}

/// Config directory from `PARAMGATE_CONFIG_DIR`, or `config/`.
pub fn config_dir_from_env() -> PathBuf {
    std::env::var(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"))
}

/// Load all configuration from the given config directory.
///
/// Only system.toml is required. Every validation problem is reported in
/// a single [`ConfigError::Validation`].
pub fn load_config(config_dir: &Path) -> Result<EngineConfig, ConfigError> {
    tracing::info!(config_dir = %config_dir.display(), "Loading configuration");

    let system: SystemConfig = load_toml(&config_dir.join("system.toml"))?;

    let defaults_path = config_dir.join("defaults.toml");
    let defaults = if defaults_path.exists() {
        load_toml(&defaults_path)?
    } else {
        tracing::warn!(path = %defaults_path.display(), "No defaults.toml, provider defaults empty");
        ProviderDefaults::new()
    };

    let schemas = load_dir::<SchemaFile>(&config_dir.join("schemas"))?;

    let presets = load_dir::<PresetFile>(&config_dir.join("presets"))?
        .into_iter()
        .flat_map(|file| file.presets)
        .collect();

    let config = EngineConfig {
        system,
        defaults,
        schemas,
        presets,
        config_dir: config_dir.to_path_buf(),
    };

    validation::validate(&config)?;

    tracing::info!(
        schemas = config.schemas.len(),
        presets = config.presets.len(),
        "Configuration loaded successfully"
    );

    Ok(config)
}

impl EngineConfig {
    /// Install this configuration on `engine`.
    ///
    /// Schemas replace any registered schema with the same key, including
    /// its declarative dependencies and exclusions; custom rules stay.
    /// Presets replace registered presets with the same id. A config preset
    /// marked default takes the default flag from the current holder; one
    /// replacing the current default keeps the flag either way.
    pub fn apply(&self, engine: &mut ParameterEngine) -> Result<(), ConfigError> {
        engine.config = self.system.pipeline.clone();

        for schema in &self.schemas {
            let key = schema.key();
            engine.schemas.register(key.clone(), schema.parameters.clone());
            engine.constraints.clear_declarative(&key);
            for spec in &schema.dependencies {
                let dependency = spec.to_dependency().map_err(ParamGateError::Config)?;
                engine.constraints.add_dependency(key.clone(), dependency);
            }
            for exclusion in &schema.exclusions {
                engine.constraints.add_exclusion(key.clone(), exclusion.clone());
            }
        }

        engine.defaults.merge(self.defaults.clone());

        for preset in &self.presets {
            let id = preset.id.as_str();
            let was_default = engine
                .presets
                .get_by_id(&preset.provider, id)
                .is_some_and(|p| p.is_default);
            if engine.presets.remove(&preset.provider, id) {
                tracing::info!(provider = %preset.provider, preset = id, "Config preset replaces registered preset");
            }
            let mut incoming = preset.clone();
            incoming.is_default = false;
            engine.presets.add(incoming)?;
            if preset.is_default {
                engine.presets.set_default(&preset.provider, id)?;
            } else if was_default {
                tracing::warn!(
                    provider = %preset.provider,
                    preset = id,
                    "Replacement preset omits is_default; keeping it as the default"
                );
                engine.presets.set_default(&preset.provider, id)?;
            }
        }

        tracing::info!(
            schemas = self.schemas.len(),
            presets = self.presets.len(),
            "Applied configuration"
        );
        Ok(())
    }
}

fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Parse every `*.toml` directly under `dir`, sorted by file name.
fn load_dir<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, ConfigError> {
    if !dir.exists() {
        tracing::warn!(path = %dir.display(), "Config directory does not exist, nothing loaded");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::FileRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::FileRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        tracing::debug!(path = %path.display(), "Loading config file");
        loaded.push(load_toml(&path)?);
    }
    Ok(loaded)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Failed to apply configuration: {0}")]
    Apply(#[from] ParamGateError),
}
