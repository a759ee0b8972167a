use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use paramgate_common::types::{
    ParamValue, ParameterDefinition, ParameterSet, ProviderKey, Violation, ViolationKind,
};

/// Predicate over `(value of parameter, value of depends_on)`.
/// The second argument is `None` when `depends_on` is absent.
pub type ConditionFn = Arc<dyn Fn(&ParamValue, Option<&ParamValue>) -> bool + Send + Sync>;

/// When a dependency holds.
#[derive(Clone)]
pub enum Condition {
    /// `depends_on` is present and equal to one of the values.
    RequiresOneOf(Vec<ParamValue>),
    /// `depends_on` has any value.
    RequiresPresent,
    /// `depends_on` is absent or not equal to any of the values.
    ForbidsOneOf(Vec<ParamValue>),
    Custom(ConditionFn),
}

impl Condition {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&ParamValue, Option<&ParamValue>) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    pub fn holds(&self, value: &ParamValue, other: Option<&ParamValue>) -> bool {
        match self {
            Self::RequiresOneOf(allowed) => other.is_some_and(|o| allowed.contains(o)),
            Self::RequiresPresent => other.is_some(),
            Self::ForbidsOneOf(forbidden) => !other.is_some_and(|o| forbidden.contains(o)),
            Self::Custom(f) => f(value, other),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequiresOneOf(values) => f.debug_tuple("RequiresOneOf").field(values).finish(),
            Self::RequiresPresent => f.write_str("RequiresPresent"),
            Self::ForbidsOneOf(values) => f.debug_tuple("ForbidsOneOf").field(values).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// `parameter` is only legal when `condition` holds against `depends_on`.
#[derive(Clone, Debug)]
pub struct Dependency {
    pub parameter: String,
    pub depends_on: String,
    pub condition: Condition,
    pub message: String,
}

impl Dependency {
    pub fn new(parameter: &str, depends_on: &str, condition: Condition, message: &str) -> Self {
        Self {
            parameter: parameter.to_string(),
            depends_on: depends_on.to_string(),
            condition,
            message: message.to_string(),
        }
    }
}

/// At most one of `parameters` may have a value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutualExclusion {
    pub parameters: BTreeSet<String>,
    pub message: String,
}

impl MutualExclusion {
    pub fn new<I, S>(parameters: I, message: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parameters: parameters.into_iter().map(Into::into).collect(),
            message: message.to_string(),
        }
    }
}

/// Provider-scoped check run once per defined parameter, with the whole
/// candidate set in view so it can look at sibling values.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn validate(
        &self,
        value: &ParamValue,
        definition: &ParameterDefinition,
        set: &ParameterSet,
    ) -> Result<(), String>;
}

type RuleFn =
    dyn Fn(&ParamValue, &ParameterDefinition, &ParameterSet) -> Result<(), String> + Send + Sync;

/// Closure-backed [`ValidationRule`].
pub struct FnRule {
    name: String,
    description: String,
    check: Box<RuleFn>,
}

impl FnRule {
    pub fn new<F>(name: &str, description: &str, check: F) -> Self
    where
        F: Fn(&ParamValue, &ParameterDefinition, &ParameterSet) -> Result<(), String>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            check: Box::new(check),
        }
    }
}

impl ValidationRule for FnRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn validate(
        &self,
        value: &ParamValue,
        definition: &ParameterDefinition,
        set: &ParameterSet,
    ) -> Result<(), String> {
        (self.check)(value, definition, set)
    }
}

/// Outcome of cross-parameter evaluation. Never an error: callers decide
/// whether violations are a hard rejection or a warning.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintReport {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ConstraintReport {
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.message.clone()).collect()
    }
}

/// Dependencies, mutual exclusions and custom rules per provider key.
#[derive(Clone, Default)]
pub struct ConstraintRegistry {
    dependencies: HashMap<ProviderKey, Vec<Dependency>>,
    exclusions: HashMap<ProviderKey, Vec<MutualExclusion>>,
    rules: HashMap<ProviderKey, Vec<Arc<dyn ValidationRule>>>,
}

impl ConstraintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dependency(&mut self, provider: ProviderKey, dependency: Dependency) {
        tracing::debug!(
            provider = %provider,
            parameter = %dependency.parameter,
            depends_on = %dependency.depends_on,
            "Registered dependency"
        );
        self.dependencies.entry(provider).or_default().push(dependency);
    }

    pub fn add_exclusion(&mut self, provider: ProviderKey, exclusion: MutualExclusion) {
        tracing::debug!(
            provider = %provider,
            parameters = ?exclusion.parameters,
            "Registered mutual exclusion"
        );
        self.exclusions.entry(provider).or_default().push(exclusion);
    }

    pub fn add_rule<R: ValidationRule + 'static>(&mut self, provider: ProviderKey, rule: R) {
        self.add_shared_rule(provider, Arc::new(rule));
    }

    /// Register a rule object that may also be shared with other providers.
    pub fn add_shared_rule(&mut self, provider: ProviderKey, rule: Arc<dyn ValidationRule>) {
        tracing::debug!(provider = %provider, rule = rule.name(), "Registered custom rule");
        self.rules.entry(provider).or_default().push(rule);
    }

    /// Drop declarative dependencies and exclusions for `provider`, keeping
    /// custom rules. Used when a config file replaces a provider's schema.
    pub fn clear_declarative(&mut self, provider: &ProviderKey) {
        self.dependencies.remove(provider);
        self.exclusions.remove(provider);
    }

    pub fn dependencies(&self, provider: &ProviderKey) -> &[Dependency] {
        self.dependencies
            .get(provider)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn exclusions(&self, provider: &ProviderKey) -> &[MutualExclusion] {
        self.exclusions
            .get(provider)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn rules(&self, provider: &ProviderKey) -> &[Arc<dyn ValidationRule>] {
        self.rules.get(provider).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Evaluate every cross-parameter constraint of `provider` against
    /// `candidate`. Violations are ordered: dependencies, then exclusions,
    /// then custom rules.
    pub fn evaluate(
        &self,
        provider: &ProviderKey,
        candidate: &ParameterSet,
        definitions: &[ParameterDefinition],
    ) -> ConstraintReport {
        let mut violations = Vec::new();

        for dep in self.dependencies(provider) {
            let Some(value) = candidate.get(&dep.parameter) else {
                continue;
            };
            if !dep.condition.holds(value, candidate.get(&dep.depends_on)) {
                violations.push(Violation::for_key(
                    ViolationKind::Dependency,
                    &dep.parameter,
                    dep.message.clone(),
                ));
            }
        }

        for exclusion in self.exclusions(provider) {
            let present = exclusion
                .parameters
                .iter()
                .filter(|key| candidate.contains_key(key))
                .count();
            // One message per violated group, not per pair.
            if present > 1 {
                violations.push(Violation::new(
                    ViolationKind::Exclusion,
                    None,
                    exclusion.message.clone(),
                ));
            }
        }

        for definition in definitions {
            let Some(value) = candidate.get(&definition.key) else {
                continue;
            };
            for rule in self.rules(provider) {
                if let Err(message) = rule.validate(value, definition, candidate) {
                    violations.push(Violation::for_key(
                        ViolationKind::Rule,
                        &definition.key,
                        format!("{}: {}", rule.name(), message),
                    ));
                }
            }
        }

        if !violations.is_empty() {
            tracing::debug!(
                provider = %provider,
                violations = violations.len(),
                "Constraint evaluation found violations"
            );
        }

        ConstraintReport {
            valid: violations.is_empty(),
            violations,
        }
    }
}

impl fmt::Debug for ConstraintRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule_names: HashMap<String, Vec<&str>> = self
            .rules
            .iter()
            .map(|(k, rules)| (k.to_string(), rules.iter().map(|r| r.name()).collect()))
            .collect();
        f.debug_struct("ConstraintRegistry")
            .field("dependencies", &self.dependencies)
            .field("exclusions", &self.exclusions)
            .field("rules", &rule_names)
            .finish()
    }
}
