use paramgate_common::types::{ParamValue, ParameterDefinition, ParameterPreset, ProviderKey};
use paramgate_common::Result;

use crate::pipeline::ParameterEngine;
use crate::validation::{Condition, Dependency, FnRule, MutualExclusion};

pub fn register(engine: &mut ParameterEngine) -> Result<()> {
    let key = ProviderKey::chat("anthropic");

    engine.schemas.register(
        key.clone(),
        vec![
            ParameterDefinition::select(
                "model",
                [
                    "claude-3-5-sonnet-latest",
                    "claude-3-5-haiku-latest",
                    "claude-3-opus-latest",
                ],
            )
            .with_default("claude-3-5-sonnet-latest"),
            ParameterDefinition::number("max_tokens")
                .with_range(1.0, 8192.0)
                .with_default(1024),
            ParameterDefinition::number("temperature").with_range(0.0, 1.0),
            ParameterDefinition::number("top_p").with_range(0.0, 1.0),
            ParameterDefinition::number("top_k").with_min(1.0),
            ParameterDefinition::number("thinking_budget")
                .with_min(1024.0)
                .with_description("Token budget for extended thinking"),
            ParameterDefinition::string("system").with_description("System prompt"),
        ],
    );

    engine.constraints.add_dependency(
        key.clone(),
        Dependency::new(
            "thinking_budget",
            "model",
            Condition::ForbidsOneOf(vec![
                ParamValue::text("claude-3-5-haiku-latest"),
                ParamValue::text("claude-3-opus-latest"),
            ]),
            "extended thinking is not available for this model",
        ),
    );
    engine.constraints.add_exclusion(
        key.clone(),
        MutualExclusion::new(
            ["thinking_budget", "temperature"],
            "temperature cannot be set while extended thinking is enabled",
        ),
    );
    engine.constraints.add_rule(
        key.clone(),
        FnRule::new(
            "thinking-within-max-tokens",
            "thinking budget must leave room for the answer",
            |value, def, set| {
                if def.key != "thinking_budget" {
                    return Ok(());
                }
                let budget = value.as_f64().unwrap_or_default();
                let max_tokens = set.get("max_tokens").and_then(ParamValue::as_f64);
                match max_tokens {
                    Some(max) if budget >= max => Err(format!(
                        "thinking_budget {} must be below max_tokens {}",
                        value,
                        ParamValue::Number(max)
                    )),
                    _ => Ok(()),
                }
            },
        ),
    );

    engine.presets.add(
        ParameterPreset::new(
            "anthropic-chat-balanced",
            "Balanced",
            key.clone(),
            [("temperature", 0.7)].into_iter().collect(),
        )
        .with_tags(["general"])
        .as_default(),
    )?;
    engine.presets.add(
        ParameterPreset::new(
            "anthropic-chat-deep-thinking",
            "Deep thinking",
            key.clone(),
            [("thinking_budget", 4096), ("max_tokens", 8192)]
                .into_iter()
                .collect(),
        )
        .with_description("Extended thinking for multi-step problems")
        .with_tags(["reasoning"]),
    )?;

    Ok(())
}
