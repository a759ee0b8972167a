//! End-to-end tests of the prepare pipeline over the built-in catalogs.
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::thread;

use paramgate_common::config::PipelineConfig;
use paramgate_common::types::{
    ParamKind, ParamValue, ParameterDefinition, ParameterPreset, ParameterSet, ProviderKey,
    ViolationKind,
};
use paramgate_engine::compare;
use paramgate_engine::resolve;
use paramgate_engine::validation::{self, Condition, Dependency, MutualExclusion};
use paramgate_engine::{ParameterEngine, SharedEngine};

fn engine() -> ParameterEngine {
    ParameterEngine::with_builtins(PipelineConfig::default()).expect("builtins register")
}

fn acme() -> ProviderKey {
    ProviderKey::image("acme")
}

/// The small "acme" catalog used throughout the scenarios below.
fn acme_engine() -> ParameterEngine {
    let mut engine = ParameterEngine::new(PipelineConfig::default());
    engine.schemas.register(
        acme(),
        vec![
            ParameterDefinition::select("mode", ["fast", "slow"]).with_default("fast"),
            ParameterDefinition::number("n").with_range(1.0, 4.0),
            ParameterDefinition::string("batchId"),
            ParameterDefinition::select("model", ["basic", "pro"]),
            ParameterDefinition::select("style", ["vivid", "natural"]),
        ],
    );
    engine.constraints.add_exclusion(
        acme(),
        MutualExclusion::new(["n", "batchId"], "n and batchId cannot be combined"),
    );
    engine.constraints.add_dependency(
        acme(),
        Dependency::new(
            "style",
            "model",
            Condition::custom(|_, model| model.and_then(ParamValue::as_str) == Some("pro")),
            "style requires pro model",
        ),
    );
    engine
}

#[test]
fn test_number_bounds_hold_for_every_builtin_definition() {
    let engine = engine();
    for provider in engine.schemas.list_providers() {
        for def in engine.schemas.lookup(&provider) {
            if def.kind != ParamKind::Number {
                continue;
            }
            if let Some(min) = def.min {
                assert!(validation::check(Some(&ParamValue::Number(min)), def).is_ok());
                assert!(validation::check(Some(&ParamValue::Number(min - 1.0)), def).is_err());
            }
            if let Some(max) = def.max {
                assert!(validation::check(Some(&ParamValue::Number(max)), def).is_ok());
                assert!(validation::check(Some(&ParamValue::Number(max + 1.0)), def).is_err());
            }
        }
    }
}

#[test]
fn test_select_accepts_exactly_its_options() {
    let engine = engine();
    for provider in engine.schemas.list_providers() {
        for def in engine.schemas.lookup(&provider) {
            if def.kind != ParamKind::Select {
                continue;
            }
            for option in &def.options {
                assert!(validation::check(Some(option), def).is_ok(), "{} {}", def.key, option);
            }
            let outsider = ParamValue::text("definitely-not-an-option");
            let err = validation::check(Some(&outsider), def).unwrap_err();
            assert_eq!(err.kind, ViolationKind::Enumeration);
        }
    }
}

#[test]
fn test_resolve_is_idempotent_over_builtins() {
    let engine = engine();
    let candidate: ParameterSet = [
        ("temperature", ParamValue::from(0.4)),
        ("unknown", ParamValue::from(true)),
    ]
    .into_iter()
    .collect();

    for provider in engine.schemas.list_providers() {
        let defs = engine.schemas.lookup(&provider);
        let once = resolve::resolve(&candidate, defs, None);
        let twice = resolve::resolve(&once, defs, None);
        assert_eq!(once, twice, "{}", provider);
    }
}

#[test]
fn test_scenario_enumeration_default() {
    let prepared = acme_engine().prepare(&acme(), ParameterSet::new());
    assert!(prepared.valid);
    let expected: ParameterSet = [("mode", "fast")].into_iter().collect();
    assert_eq!(prepared.parameters, expected);
}

#[test]
fn test_scenario_exclusion_reported_once() {
    let candidate: ParameterSet = [
        ("n", ParamValue::from(2)),
        ("batchId", ParamValue::text("x")),
    ]
    .into_iter()
    .collect();

    let prepared = acme_engine().prepare(&acme(), candidate);
    assert_eq!(prepared.violations.len(), 1);
    assert_eq!(prepared.messages(), vec!["n and batchId cannot be combined"]);
}

#[test]
fn test_scenario_dependency_message() {
    let engine = acme_engine();
    let basic: ParameterSet = [("model", "basic"), ("style", "vivid")].into_iter().collect();
    let pro: ParameterSet = [("model", "pro"), ("style", "vivid")].into_iter().collect();

    assert_eq!(engine.prepare(&acme(), basic).messages(), vec!["style requires pro model"]);
    assert!(engine.prepare(&acme(), pro).valid);
}

#[test]
fn test_raw_query_parameters() {
    let engine = engine();
    let raw: BTreeMap<String, String> = [
        ("temperature", "0.9"),
        ("stream", "TRUE"),
        ("max_tokens", "512"),
        ("model", "gpt-4o"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let prepared = engine.prepare_raw(&ProviderKey::chat("openai"), &raw);
    assert!(prepared.valid, "{:?}", prepared.messages());
    assert_eq!(prepared.parameters.get("temperature"), Some(&ParamValue::Number(0.9)));
    assert_eq!(prepared.parameters.get("stream"), Some(&ParamValue::Bool(true)));
    assert_eq!(prepared.parameters.get("model"), Some(&ParamValue::text("gpt-4o")));
}

#[test]
fn test_unparseable_number_is_a_type_violation() {
    let raw: BTreeMap<String, String> =
        [("temperature".to_string(), "warm".to_string())].into_iter().collect();
    let prepared = engine().prepare_raw(&ProviderKey::chat("openai"), &raw);
    assert!(!prepared.valid);
    assert_eq!(prepared.violations[0].kind, ViolationKind::Type);
    assert_eq!(prepared.violations[0].key.as_deref(), Some("temperature"));
}

#[test]
fn test_typo_gets_a_suggestion() {
    let candidate: ParameterSet = [("quality", "hdd")].into_iter().collect();
    let prepared = engine().prepare(&ProviderKey::image("openai"), candidate);
    assert!(!prepared.valid);
    assert!(
        prepared.messages()[0].contains("did you mean \"hd\"?"),
        "{:?}",
        prepared.messages()
    );
}

#[test]
fn test_default_preset_regardless_of_registration_order() {
    let mut engine = ParameterEngine::default();
    let params = ParameterSet::new();
    engine
        .presets
        .add(ParameterPreset::new("a", "A", acme(), params.clone()))
        .unwrap();
    engine
        .presets
        .add(ParameterPreset::new("b", "B", acme(), params.clone()).as_default())
        .unwrap();
    engine
        .presets
        .add(ParameterPreset::new("c", "C", acme(), params))
        .unwrap();

    assert_eq!(engine.presets.get_default(&acme()).unwrap().id.as_str(), "b");
}

#[test]
fn test_second_builtin_default_is_rejected() {
    let mut engine = engine();
    let key = ProviderKey::image("openai");
    let err = engine
        .presets
        .add(ParameterPreset::new("mine", "Mine", key.clone(), ParameterSet::new()).as_default())
        .unwrap_err();
    assert!(err.is_preset_conflict());
    assert_eq!(
        engine.presets.get_default(&key).unwrap().id.as_str(),
        "openai-image-standard"
    );
}

#[test]
fn test_custom_preset_round_trip_through_pipeline() {
    let mut engine = engine();
    let key = ProviderKey::image("openai");
    let params: ParameterSet = [("quality", "hd"), ("style", "natural")].into_iter().collect();
    let tags: BTreeSet<String> = ["favourite".to_string()].into_iter().collect();

    let custom = engine
        .presets
        .create_custom(&key, "My HD", "", params, tags, Some("user-42"));
    assert!(!custom.is_default);
    assert_eq!(engine.presets.list_by_tag(&key, "favourite").len(), 1);

    let prepared = engine
        .prepare_with_preset(&key, custom.id.as_str(), ParameterSet::new())
        .unwrap();
    assert!(prepared.valid, "{:?}", prepared.messages());

    let baseline = engine.prepare_with_default_preset(&key, ParameterSet::new());
    let diff = compare::diff(&baseline.parameters, &prepared.parameters);
    assert_eq!(diff.added, vec!["style"]);
    assert_eq!(diff.changed.len(), 1);
    assert_eq!(diff.changed[0].key, "quality");
}

#[test]
fn test_prepared_parameters_serialize_for_the_wire() {
    let candidate: ParameterSet = [("n", ParamValue::from(2))].into_iter().collect();
    let prepared = engine().prepare(&ProviderKey::image("openai"), candidate);
    let json = serde_json::to_value(&prepared).unwrap();

    assert_eq!(json["provider"], "openai/image");
    assert_eq!(json["valid"], false);
    assert_eq!(json["parameters"]["n"], 2);
    assert_eq!(json["violations"][0]["kind"], "dependency");
}

#[test]
fn test_shared_engine_readers_see_consistent_snapshots() {
    let shared = Arc::new(SharedEngine::new(engine()));
    let key = ProviderKey::video("runway");

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            let key = key.clone();
            thread::spawn(move || {
                let snapshot = shared.snapshot();
                let first = snapshot.prepare(&key, ParameterSet::new());
                let second = snapshot.prepare(&key, ParameterSet::new());
                assert_eq!(first, second);
            })
        })
        .collect();

    shared
        .update(|engine| {
            engine.defaults.set_value(key.clone(), "duration", 10);
            Ok::<_, paramgate_common::ParamGateError>(())
        })
        .unwrap();

    for reader in readers {
        reader.join().unwrap();
    }

    let after = shared.snapshot().prepare(&key, ParameterSet::new());
    assert_eq!(after.parameters.get("duration"), Some(&ParamValue::Number(10.0)));
}
