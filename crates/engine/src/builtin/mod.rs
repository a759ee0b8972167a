//! Built-in catalogs for the providers shipped with the engine.
//!
//! Each provider module registers its schemas, constraints and presets on
//! the engine it is given. Config files loaded afterwards can replace any
//! of these schemas.

mod anthropic;
mod openai;
mod runway;
mod stability;

use std::collections::BTreeSet;

use paramgate_common::types::ProviderKey;
use paramgate_common::Result;

use crate::pipeline::ParameterEngine;

/// Keys registered by [`register_all`].
pub fn provider_keys() -> BTreeSet<ProviderKey> {
    [
        ProviderKey::chat("openai"),
        ProviderKey::image("openai"),
        ProviderKey::chat("anthropic"),
        ProviderKey::image("stability"),
        ProviderKey::video("runway"),
    ]
    .into_iter()
    .collect()
}

/// Register every built-in provider.
pub fn register_all(engine: &mut ParameterEngine) -> Result<()> {
    openai::register(engine)?;
    anthropic::register(engine)?;
    stability::register(engine)?;
    runway::register(engine)?;

    tracing::info!(
        providers = engine.schemas.list_providers().len(),
        presets = engine.presets.len(),
        "Registered built-in provider catalogs"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramgate_common::config::PipelineConfig;
    use paramgate_common::types::{ParamValue, ParameterSet, ViolationKind};

    fn engine() -> ParameterEngine {
        ParameterEngine::with_builtins(PipelineConfig::default()).unwrap()
    }

    fn set<const N: usize>(pairs: [(&str, ParamValue); N]) -> ParameterSet {
        pairs.into_iter().collect()
    }

    #[test]
    fn test_provider_keys_match_registration() {
        assert_eq!(engine().schemas.list_providers(), provider_keys());
    }

    #[test]
    fn test_every_builtin_definition_is_well_formed() {
        let engine = engine();
        for provider in engine.schemas.list_providers() {
            for def in engine.schemas.lookup(&provider) {
                assert!(
                    def.invariant_errors().is_empty(),
                    "{}: {:?}",
                    provider,
                    def.invariant_errors()
                );
            }
        }
    }

    #[test]
    fn test_every_provider_has_one_default_preset() {
        let engine = engine();
        for provider in engine.schemas.list_providers() {
            let defaults = engine
                .presets
                .list_by_provider(&provider)
                .iter()
                .filter(|p| p.is_default)
                .count();
            assert_eq!(defaults, 1, "{}", provider);
        }
    }

    #[test]
    fn test_builtin_presets_prepare_cleanly() {
        let engine = engine();
        for provider in engine.schemas.list_providers() {
            for preset in engine.presets.list_by_provider(&provider) {
                let prepared = engine
                    .prepare_with_preset(&provider, preset.id.as_str(), ParameterSet::new())
                    .unwrap();
                assert!(prepared.valid, "{}: {:?}", preset.id, prepared.messages());
            }
        }
    }

    #[test]
    fn test_dalle_style_requires_dalle3() {
        let engine = engine();
        let key = ProviderKey::image("openai");

        let ok = engine.prepare(&key, set([("style", ParamValue::text("vivid"))]));
        assert!(ok.valid, "{:?}", ok.messages());

        let bad = engine.prepare(
            &key,
            set([
                ("model", ParamValue::text("dall-e-2")),
                ("style", ParamValue::text("vivid")),
                ("quality", ParamValue::text("hd")),
            ]),
        );
        let kinds: Vec<_> = bad.violations.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec![ViolationKind::Dependency, ViolationKind::Dependency]);
    }

    #[test]
    fn test_dalle3_single_image_and_sizes() {
        let engine = engine();
        let key = ProviderKey::image("openai");

        let bad = engine.prepare(&key, set([("n", ParamValue::from(3))]));
        assert_eq!(bad.violations.len(), 1);
        assert_eq!(bad.violations[0].key.as_deref(), Some("n"));

        let bad = engine.prepare(
            &key,
            set([
                ("model", ParamValue::text("dall-e-2")),
                ("size", ParamValue::text("1792x1024")),
            ]),
        );
        assert_eq!(bad.violations.len(), 1);
        assert_eq!(bad.violations[0].kind, ViolationKind::Rule);
        assert!(bad.violations[0].message.starts_with("size-for-model: "));
    }

    #[test]
    fn test_openai_chat_sampling_exclusion() {
        let engine = engine();
        let key = ProviderKey::chat("openai");

        let bad = engine.prepare(
            &key,
            set([
                ("temperature", ParamValue::from(0.5)),
                ("top_p", ParamValue::from(0.9)),
            ]),
        );
        assert_eq!(bad.violations.len(), 1);
        assert_eq!(bad.violations[0].kind, ViolationKind::Exclusion);
        assert_eq!(bad.violations[0].key, None);

        let bad = engine.prepare(&key, set([("reasoning_effort", ParamValue::text("high"))]));
        assert_eq!(bad.violations[0].kind, ViolationKind::Dependency);

        let ok = engine.prepare(
            &key,
            set([
                ("model", ParamValue::text("o1")),
                ("reasoning_effort", ParamValue::text("high")),
            ]),
        );
        assert!(ok.valid, "{:?}", ok.messages());
    }

    #[test]
    fn test_anthropic_thinking_budget() {
        let engine = engine();
        let key = ProviderKey::chat("anthropic");

        let bad = engine.prepare(&key, set([("thinking_budget", ParamValue::from(2048))]));
        assert!(!bad.valid);
        assert!(bad.messages()[0].contains("must be below max_tokens 1024"));
    }

    #[test]
    fn test_stability_pixel_budget() {
        let engine = engine();
        let key = ProviderKey::image("stability");

        let bad = engine.prepare(
            &key,
            set([
                ("width", ParamValue::from(1152)),
                ("height", ParamValue::from(1024)),
            ]),
        );
        assert_eq!(bad.violations.len(), 1);
        assert!(bad.violations[0].message.starts_with("pixel-budget: "));
    }

    #[test]
    fn test_runway_gen3_needs_image() {
        let engine = engine();
        let key = ProviderKey::video("runway");

        let bad = engine.prepare(&key, set([("model", ParamValue::text("gen3a_turbo"))]));
        assert_eq!(bad.violations[0].kind, ViolationKind::Dependency);

        let ok = engine.prepare(
            &key,
            set([
                ("model", ParamValue::text("gen3a_turbo")),
                ("prompt_image", ParamValue::text("https://example.com/frame.png")),
            ]),
        );
        assert!(ok.valid, "{:?}", ok.messages());
    }
}
