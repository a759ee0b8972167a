use serde::{Deserialize, Serialize};

/// Top-level system configuration, deserialized from system.toml.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub presets: PresetLimits,
}

/// Behaviour of the prepare pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Drop keys the provider schema does not define before validation.
    /// Unknown keys are treated as non-actionable, not as hostile input.
    #[serde(default = "default_strip_unknown")]
    pub strip_unknown: bool,
    /// Minimum Jaro-Winkler similarity (0.0–1.0) for a "did you mean" hint.
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strip_unknown: default_strip_unknown(),
            suggestion_threshold: default_suggestion_threshold(),
        }
    }
}

const fn default_strip_unknown() -> bool {
    true
}

const fn default_suggestion_threshold() -> f64 {
    0.85
}

/// Limits applied when presets are loaded from configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetLimits {
    /// Max presets per provider key.
    #[serde(default = "default_max_per_provider")]
    pub max_per_provider: u32,
    /// Max tags on a single preset.
    #[serde(default = "default_max_tags")]
    pub max_tags: u32,
}

impl Default for PresetLimits {
    fn default() -> Self {
        Self {
            max_per_provider: default_max_per_provider(),
            max_tags: default_max_tags(),
        }
    }
}

const fn default_max_per_provider() -> u32 {
    64
}

const fn default_max_tags() -> u32 {
    16
}
