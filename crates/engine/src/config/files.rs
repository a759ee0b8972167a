use serde::{Deserialize, Serialize};

use paramgate_common::types::{Capability, ParamValue, ParameterDefinition, ParameterPreset, ProviderKey};

use crate::validation::{Condition, Dependency, MutualExclusion};

/// One `schemas/*.toml` file: the full catalog for one provider key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    pub provider: String,
    pub capability: Capability,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
    #[serde(default)]
    pub exclusions: Vec<MutualExclusion>,
}

impl SchemaFile {
    pub fn key(&self) -> ProviderKey {
        ProviderKey::new(&self.provider, self.capability)
    }
}

/// Declarative form of a [`Dependency`]. Exactly one of the condition
/// fields must be set.
///
/// ```toml
/// [[dependencies]]
/// parameter = "style"
/// depends_on = "model"
/// requires_one_of = ["dall-e-3"]
/// message = "style requires dall-e-3"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub parameter: String,
    pub depends_on: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_one_of: Option<Vec<ParamValue>>,
    #[serde(default)]
    pub requires_present: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbids_one_of: Option<Vec<ParamValue>>,
    #[serde(default)]
    pub message: String,
}

impl DependencySpec {
    pub fn to_dependency(&self) -> Result<Dependency, String> {
        let condition = match (&self.requires_one_of, self.requires_present, &self.forbids_one_of) {
            (Some(values), false, None) => Condition::RequiresOneOf(values.clone()),
            (None, true, None) => Condition::RequiresPresent,
            (None, false, Some(values)) => Condition::ForbidsOneOf(values.clone()),
            (None, false, None) => {
                return Err(format!(
                    "dependency {} -> {} has no condition",
                    self.parameter, self.depends_on
                ))
            }
            _ => {
                return Err(format!(
                    "dependency {} -> {} sets more than one condition",
                    self.parameter, self.depends_on
                ))
            }
        };

        let message = if self.message.is_empty() {
            format!("{} is not allowed with the current {}", self.parameter, self.depends_on)
        } else {
            self.message.clone()
        };

        Ok(Dependency::new(&self.parameter, &self.depends_on, condition, &message))
    }
}

/// One `presets/*.toml` file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetFile {
    #[serde(default)]
    pub presets: Vec<ParameterPreset>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramgate_common::types::ParamKind;

    #[test]
    fn test_parse_schema_file() {
        let schema: SchemaFile = toml::from_str(
            r#"
            provider = "acme"
            capability = "image"

            [[parameters]]
            key = "mode"
            type = "select"
            options = ["fast", "slow"]
            default_value = "fast"

            [[parameters]]
            key = "steps"
            type = "number"
            min = 1
            max = 100

            [[dependencies]]
            parameter = "steps"
            depends_on = "mode"
            requires_one_of = ["slow"]

            [[exclusions]]
            parameters = ["steps", "mode"]
            message = "pick one"
            "#,
        )
        .unwrap();

        assert_eq!(schema.key(), ProviderKey::image("acme"));
        assert_eq!(schema.parameters[0].kind, ParamKind::Select);
        assert_eq!(schema.parameters[1].min, Some(1.0));
        assert_eq!(schema.exclusions[0].parameters.len(), 2);

        let dep = schema.dependencies[0].to_dependency().unwrap();
        assert!(dep.condition.holds(&ParamValue::Number(5.0), Some(&ParamValue::text("slow"))));
        assert!(!dep.condition.holds(&ParamValue::Number(5.0), Some(&ParamValue::text("fast"))));
        assert_eq!(dep.message, "steps is not allowed with the current mode");
    }

    #[test]
    fn test_dependency_needs_exactly_one_condition() {
        let none = DependencySpec {
            parameter: "a".into(),
            depends_on: "b".into(),
            ..Default::default()
        };
        assert!(none.to_dependency().unwrap_err().contains("no condition"));

        let both = DependencySpec {
            requires_present: true,
            forbids_one_of: Some(vec![ParamValue::text("x")]),
            ..none
        };
        assert!(both.to_dependency().unwrap_err().contains("more than one"));
    }

    #[test]
    fn test_parse_preset_file() {
        let file: PresetFile = toml::from_str(
            r#"
            [[presets]]
            id = "acme-fast"
            name = "Fast"
            provider = "acme/image"
            tags = ["draft"]
            is_default = true

            [presets.parameters]
            mode = "fast"
            steps = 10
            "#,
        )
        .unwrap();

        let preset = &file.presets[0];
        assert_eq!(preset.provider, ProviderKey::image("acme"));
        assert!(preset.is_default);
        assert!(preset.has_tag("draft"));
        assert_eq!(preset.parameters.get("steps"), Some(&ParamValue::Number(10.0)));
    }
}
