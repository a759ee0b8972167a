use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use paramgate_common::config::PipelineConfig;
use paramgate_common::types::{ParameterSet, ProviderKey, Violation};
use paramgate_common::{ParamGateError, Result};

use crate::convert;
use crate::presets::PresetStore;
use crate::resolve::ProviderDefaults;
use crate::schema::SchemaRegistry;
use crate::validation::{ConstraintRegistry, ValueValidator};

/// Outcome of preparing one parameter set for one provider key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreparedParameters {
    pub provider: ProviderKey,
    pub valid: bool,
    /// The normalized, default-filled set. Present even when invalid so
    /// interactive callers can show what would have been sent.
    pub parameters: ParameterSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl PreparedParameters {
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.message.clone()).collect()
    }

    /// For hosts that treat any violation as a hard rejection.
    pub fn into_result(self) -> std::result::Result<ParameterSet, Vec<Violation>> {
        if self.valid {
            Ok(self.parameters)
        } else {
            Err(self.violations)
        }
    }
}

/// The registries plus the pipeline that runs over them.
///
/// Constructed explicitly and passed by reference; for concurrent hosts,
/// wrap it in a [`SharedEngine`](crate::shared::SharedEngine).
#[derive(Clone, Debug, Default)]
pub struct ParameterEngine {
    pub schemas: SchemaRegistry,
    pub constraints: ConstraintRegistry,
    pub defaults: ProviderDefaults,
    pub presets: PresetStore,
    pub config: PipelineConfig,
}

impl ParameterEngine {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Engine preloaded with the built-in provider catalogs.
    pub fn with_builtins(config: PipelineConfig) -> Result<Self> {
        let mut engine = Self::new(config);
        crate::builtin::register_all(&mut engine)?;
        Ok(engine)
    }

    /// Normalize, fill defaults, then run value and constraint checks.
    /// Every problem is collected; value violations come first.
    pub fn prepare(&self, provider: &ProviderKey, candidate: ParameterSet) -> PreparedParameters {
        let definitions = self.schemas.lookup(provider);
        if definitions.is_empty() {
            tracing::debug!(provider = %provider, "No parameter definitions for provider");
        }

        let normalized = convert::normalize(candidate, definitions);
        let parameters = if self.config.strip_unknown {
            self.defaults.resolve_clean(provider, &normalized, definitions)
        } else {
            self.defaults.resolve(provider, &normalized, definitions)
        };

        let mut violations = ValueValidator::new(self.config.suggestion_threshold)
            .check_all(&parameters, definitions);
        violations.extend(
            self.constraints
                .evaluate(provider, &parameters, definitions)
                .violations,
        );

        let valid = violations.is_empty();

        metrics::counter!("params.prepare.count", "provider" => provider.to_string()).increment(1);
        if !valid {
            metrics::counter!("params.prepare.rejected", "provider" => provider.to_string())
                .increment(1);
            metrics::counter!("params.violations", "provider" => provider.to_string())
                .increment(violations.len() as u64);
        }

        tracing::debug!(
            provider = %provider,
            parameters = parameters.len(),
            violations = violations.len(),
            valid = valid,
            "Prepared parameters"
        );

        PreparedParameters {
            provider: provider.clone(),
            valid,
            parameters,
            violations,
        }
    }

    /// [`Self::prepare`] for all-text input such as query strings.
    pub fn prepare_raw(&self, provider: &ProviderKey, raw: &BTreeMap<String, String>) -> PreparedParameters {
        let converted = convert::convert(raw, self.schemas.lookup(provider));
        self.prepare(provider, converted)
    }

    /// Seed the candidate from a preset, let `overrides` win, then prepare.
    pub fn prepare_with_preset(
        &self,
        provider: &ProviderKey,
        preset_id: &str,
        overrides: ParameterSet,
    ) -> Result<PreparedParameters> {
        let seeded = self
            .presets
            .apply(provider, preset_id, &overrides)
            .ok_or_else(|| {
                ParamGateError::NotFound(format!("preset '{}' for {}", preset_id, provider))
            })?;
        Ok(self.prepare(provider, seeded))
    }

    /// Like [`Self::prepare_with_preset`] using the provider's default
    /// preset, or no preset at all when it has none.
    pub fn prepare_with_default_preset(&self, provider: &ProviderKey, overrides: ParameterSet) -> PreparedParameters {
        let seeded = match self.presets.get_default(provider) {
            Some(preset) => preset.parameters.overlaid_with(&overrides),
            None => overrides,
        };
        self.prepare(provider, seeded)
    }
}
