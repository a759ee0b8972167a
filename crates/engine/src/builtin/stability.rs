use paramgate_common::types::{ParamValue, ParameterDefinition, ParameterPreset, ProviderKey};
use paramgate_common::Result;

use crate::pipeline::ParameterEngine;
use crate::validation::{Condition, Dependency, FnRule};

/// Upper bound on width * height accepted by the SDXL endpoints.
const MAX_PIXELS: f64 = 1024.0 * 1024.0;

const DIMENSIONS: [i64; 6] = [512, 640, 768, 896, 1024, 1152];

pub fn register(engine: &mut ParameterEngine) -> Result<()> {
    let key = ProviderKey::image("stability");

    engine.schemas.register(
        key.clone(),
        vec![
            ParameterDefinition::number("steps")
                .with_range(10.0, 50.0)
                .with_default(30),
            ParameterDefinition::number("cfg_scale")
                .with_range(0.0, 35.0)
                .with_default(7)
                .with_description("Prompt adherence"),
            ParameterDefinition::select("width", DIMENSIONS).with_default(1024),
            ParameterDefinition::select("height", DIMENSIONS).with_default(1024),
            ParameterDefinition::select(
                "sampler",
                ["DDIM", "DPMPP_2M", "K_EULER", "K_EULER_ANCESTRAL", "K_DPMPP_2S_ANCESTRAL"],
            ),
            ParameterDefinition::number("seed").with_range(0.0, 4_294_967_295.0),
            ParameterDefinition::select(
                "style_preset",
                ["photographic", "digital-art", "cinematic", "anime", "line-art"],
            ),
            ParameterDefinition::string("negative_prompt").with_max(10_000.0),
            ParameterDefinition::number("samples").with_range(1.0, 10.0).with_default(1),
        ],
    );

    engine.constraints.add_dependency(
        key.clone(),
        Dependency::new(
            "style_preset",
            "sampler",
            Condition::ForbidsOneOf(vec![ParamValue::text("DDIM")]),
            "style presets are not supported with the DDIM sampler",
        ),
    );
    engine.constraints.add_rule(
        key.clone(),
        FnRule::new("pixel-budget", "width times height is capped", |_, def, set| {
            if def.key != "width" {
                return Ok(());
            }
            let dim = |k: &str| set.get(k).and_then(ParamValue::as_f64);
            match (dim("width"), dim("height")) {
                (Some(w), Some(h)) if w * h > MAX_PIXELS => Err(format!(
                    "{}x{} exceeds the {} pixel limit",
                    w, h, MAX_PIXELS
                )),
                _ => Ok(()),
            }
        }),
    );

    engine.presets.add(
        ParameterPreset::new(
            "stability-image-detailed",
            "Detailed",
            key.clone(),
            [("steps", 40), ("cfg_scale", 8)].into_iter().collect(),
        )
        .with_tags(["quality"])
        .as_default(),
    )?;
    engine.presets.add(
        ParameterPreset::new(
            "stability-image-quick-draft",
            "Quick draft",
            key.clone(),
            [
                ("steps", ParamValue::from(15)),
                ("width", ParamValue::from(512)),
                ("height", ParamValue::from(512)),
            ]
            .into_iter()
            .collect(),
        )
        .with_description("Fast low-resolution previews")
        .with_tags(["draft"]),
    )?;
    engine.presets.add(
        ParameterPreset::new(
            "stability-image-photo",
            "Photographic",
            key.clone(),
            [
                ("style_preset", ParamValue::text("photographic")),
                ("cfg_scale", ParamValue::from(6)),
            ]
            .into_iter()
            .collect(),
        )
        .with_tags(["photo", "style"]),
    )?;

    Ok(())
}
