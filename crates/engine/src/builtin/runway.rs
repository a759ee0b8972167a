use paramgate_common::types::{ParamValue, ParameterDefinition, ParameterPreset, ProviderKey};
use paramgate_common::Result;

use crate::pipeline::ParameterEngine;
use crate::validation::{Condition, Dependency, FnRule};

const GEN3: &str = "gen3a_turbo";
const GEN4: &str = "gen4_turbo";

pub fn register(engine: &mut ParameterEngine) -> Result<()> {
    let key = ProviderKey::video("runway");

    engine.schemas.register(
        key.clone(),
        vec![
            ParameterDefinition::select("model", [GEN3, GEN4]).with_default(GEN4),
            ParameterDefinition::select("duration", [5, 10])
                .with_default(5)
                .with_description("Clip length in seconds"),
            ParameterDefinition::select("ratio", ["1280:720", "720:1280", "1104:832", "960:960"])
                .with_default("1280:720"),
            ParameterDefinition::number("seed").with_range(0.0, 4_294_967_295.0),
            ParameterDefinition::boolean("watermark").with_default(false),
            ParameterDefinition::string("prompt_image")
                .with_description("URL of the first frame"),
        ],
    );

    // gen3a_turbo is image-to-video only.
    engine.constraints.add_dependency(
        key.clone(),
        Dependency::new(
            "model",
            "prompt_image",
            Condition::custom(|model, image| model.as_str() != Some(GEN3) || image.is_some()),
            "gen3a_turbo requires prompt_image",
        ),
    );
    engine.constraints.add_rule(
        key.clone(),
        FnRule::new("ratio-for-model", "gen3a_turbo only renders landscape and portrait", |value, def, set| {
            if def.key != "ratio" {
                return Ok(());
            }
            let model = set.get("model").and_then(ParamValue::as_str);
            match (model, value.as_str()) {
                (Some(GEN3), Some(ratio)) if ratio != "1280:720" && ratio != "720:1280" => {
                    Err(format!("{} is not available for {}", value, GEN3))
                }
                _ => Ok(()),
            }
        }),
    );

    engine.presets.add(
        ParameterPreset::new(
            "runway-video-short",
            "Short clip",
            key.clone(),
            [("duration", ParamValue::from(5)), ("model", ParamValue::text(GEN4))]
                .into_iter()
                .collect(),
        )
        .as_default(),
    )?;
    engine.presets.add(
        ParameterPreset::new(
            "runway-video-vertical",
            "Vertical",
            key.clone(),
            [("ratio", ParamValue::text("720:1280")), ("duration", ParamValue::from(10))]
                .into_iter()
                .collect(),
        )
        .with_description("Portrait clips for mobile feeds")
        .with_tags(["social", "portrait"]),
    )?;

    Ok(())
}
