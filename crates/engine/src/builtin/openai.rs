use paramgate_common::types::{
    ParamValue, ParameterDefinition, ParameterPreset, ParameterSet, ProviderKey,
};
use paramgate_common::Result;

use crate::pipeline::ParameterEngine;
use crate::validation::{Condition, Dependency, FnRule, MutualExclusion};

const DALL_E_2: &str = "dall-e-2";
const DALL_E_3: &str = "dall-e-3";
const REASONING_MODELS: [&str; 2] = ["o1", "o3-mini"];

pub fn register(engine: &mut ParameterEngine) -> Result<()> {
    register_chat(engine)?;
    register_image(engine)?;
    Ok(())
}

fn register_chat(engine: &mut ParameterEngine) -> Result<()> {
    let key = ProviderKey::chat("openai");

    engine.schemas.register(
        key.clone(),
        vec![
            ParameterDefinition::select("model", ["gpt-4o", "gpt-4o-mini", "o1", "o3-mini"])
                .with_default("gpt-4o-mini")
                .with_description("Chat model"),
            // No defaults: a defaulted temperature would trip the
            // temperature/top_p exclusion whenever a caller sets top_p.
            ParameterDefinition::number("temperature")
                .with_range(0.0, 2.0)
                .with_description("Sampling temperature"),
            ParameterDefinition::number("top_p")
                .with_range(0.0, 1.0)
                .with_description("Nucleus sampling mass"),
            ParameterDefinition::number("max_tokens")
                .with_range(1.0, 16384.0)
                .with_default(1024)
                .with_description("Upper bound on generated tokens"),
            ParameterDefinition::number("frequency_penalty").with_range(-2.0, 2.0),
            ParameterDefinition::number("presence_penalty").with_range(-2.0, 2.0),
            ParameterDefinition::number("seed"),
            ParameterDefinition::boolean("stream").with_default(false),
            ParameterDefinition::select("reasoning_effort", ["low", "medium", "high"])
                .with_description("Reasoning depth for o-series models"),
        ],
    );

    engine.constraints.add_dependency(
        key.clone(),
        Dependency::new(
            "reasoning_effort",
            "model",
            Condition::RequiresOneOf(REASONING_MODELS.iter().map(|m| ParamValue::text(*m)).collect()),
            "reasoning_effort is only supported by o1 and o3-mini",
        ),
    );

    engine.constraints.add_exclusion(
        key.clone(),
        MutualExclusion::new(
            ["temperature", "top_p"],
            "set either temperature or top_p, not both",
        ),
    );

    engine.constraints.add_rule(
        key.clone(),
        FnRule::new(
            "reasoning-sampling",
            "o-series models ignore sampling controls",
            |_, def, set| {
                let model = set.get("model").and_then(ParamValue::as_str).unwrap_or_default();
                let is_sampling = def.key == "temperature" || def.key == "top_p";
                if is_sampling && REASONING_MODELS.contains(&model) {
                    return Err(format!("{} is not supported by {}", def.key, model));
                }
                Ok(())
            },
        ),
    );

    let preset = |id: &str, name: &str, params: ParameterSet| {
        ParameterPreset::new(id, name, key.clone(), params)
    };

    engine.presets.add(
        preset("openai-chat-balanced", "Balanced", [("temperature", 0.7)].into_iter().collect())
            .with_description("General purpose conversation")
            .with_tags(["general"])
            .as_default(),
    )?;
    engine.presets.add(
        preset(
            "openai-chat-creative",
            "Creative",
            [("temperature", 1.2), ("presence_penalty", 0.6)].into_iter().collect(),
        )
        .with_description("Looser sampling for brainstorming and fiction")
        .with_tags(["creative", "writing"]),
    )?;
    engine.presets.add(
        preset("openai-chat-precise", "Precise", [("temperature", 0.2)].into_iter().collect())
            .with_description("Low temperature for factual answers and code")
            .with_tags(["factual", "code"]),
    )?;

    Ok(())
}

fn register_image(engine: &mut ParameterEngine) -> Result<()> {
    let key = ProviderKey::image("openai");

    engine.schemas.register(
        key.clone(),
        vec![
            ParameterDefinition::select("model", [DALL_E_2, DALL_E_3]).with_default(DALL_E_3),
            ParameterDefinition::select(
                "size",
                ["256x256", "512x512", "1024x1024", "1792x1024", "1024x1792"],
            )
            .with_default("1024x1024"),
            ParameterDefinition::select("quality", ["standard", "hd"]).with_default("standard"),
            ParameterDefinition::select("style", ["vivid", "natural"])
                .with_description("Rendering style, dall-e-3 only"),
            ParameterDefinition::number("n")
                .with_range(1.0, 10.0)
                .with_default(1)
                .with_description("Number of images"),
            ParameterDefinition::select("response_format", ["url", "b64_json"]).with_default("url"),
        ],
    );

    engine.constraints.add_dependency(
        key.clone(),
        Dependency::new(
            "style",
            "model",
            Condition::RequiresOneOf(vec![ParamValue::text(DALL_E_3)]),
            "style requires the dall-e-3 model",
        ),
    );
    engine.constraints.add_dependency(
        key.clone(),
        Dependency::new(
            "quality",
            "model",
            Condition::custom(|quality, model| {
                quality.as_str() != Some("hd") || model.and_then(ParamValue::as_str) == Some(DALL_E_3)
            }),
            "quality=hd requires the dall-e-3 model",
        ),
    );
    engine.constraints.add_dependency(
        key.clone(),
        Dependency::new(
            "n",
            "model",
            Condition::custom(|n, model| {
                n.as_f64().is_some_and(|n| n <= 1.0)
                    || model.and_then(ParamValue::as_str) == Some(DALL_E_2)
            }),
            "dall-e-3 generates one image per request; use dall-e-2 for n > 1",
        ),
    );

    engine.constraints.add_rule(
        key.clone(),
        FnRule::new("size-for-model", "each model supports its own sizes", |value, def, set| {
            if def.key != "size" {
                return Ok(());
            }
            let model = set.get("model").and_then(ParamValue::as_str).unwrap_or(DALL_E_3);
            let allowed: &[&str] = match model {
                DALL_E_2 => &["256x256", "512x512", "1024x1024"],
                _ => &["1024x1024", "1792x1024", "1024x1792"],
            };
            match value.as_str() {
                Some(size) if allowed.contains(&size) => Ok(()),
                _ => Err(format!("{} is not available for {}", value, model)),
            }
        }),
    );

    let preset = |id: &str, name: &str, params: ParameterSet| {
        ParameterPreset::new(id, name, key.clone(), params)
    };

    engine.presets.add(
        preset(
            "openai-image-standard",
            "Standard",
            [("model", DALL_E_3), ("quality", "standard"), ("size", "1024x1024")]
                .into_iter()
                .collect(),
        )
        .with_tags(["general"])
        .as_default(),
    )?;
    engine.presets.add(
        preset(
            "openai-image-hd-vivid",
            "HD Vivid",
            [("model", DALL_E_3), ("quality", "hd"), ("style", "vivid")]
                .into_iter()
                .collect(),
        )
        .with_description("Highest fidelity, saturated rendering")
        .with_tags(["hd", "vivid"]),
    )?;
    engine.presets.add(
        preset(
            "openai-image-drafts",
            "Draft batch",
            [
                ("model", ParamValue::text(DALL_E_2)),
                ("size", ParamValue::text("512x512")),
                ("n", ParamValue::from(4)),
            ]
            .into_iter()
            .collect(),
        )
        .with_description("Several cheap low-resolution drafts")
        .with_tags(["draft", "batch"]),
    )?;

    Ok(())
}
