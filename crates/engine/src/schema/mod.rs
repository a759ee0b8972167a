use std::collections::{BTreeSet, HashMap};

use paramgate_common::types::{ParameterDefinition, ProviderKey};

/// Ordered parameter definitions per provider key.
///
/// A plain store: registration replaces, lookups never fail, nothing is
/// validated here. Definition invariants are checked by the config loader.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<ProviderKey, Vec<ParameterDefinition>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the definition list for `provider`. Last write wins.
    pub fn register(&mut self, provider: ProviderKey, definitions: Vec<ParameterDefinition>) {
        tracing::info!(
            provider = %provider,
            parameters = definitions.len(),
            "Registered parameter schema"
        );
        self.schemas.insert(provider, definitions);
    }

    /// Definitions for `provider`, empty when the provider is unknown.
    ///
    /// An empty slice is also what a provider with no tunable parameters
    /// returns; callers that need to tell the two apart use [`Self::contains`].
    pub fn lookup(&self, provider: &ProviderKey) -> &[ParameterDefinition] {
        self.schemas
            .get(provider)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn find_definition(&self, provider: &ProviderKey, key: &str) -> Option<&ParameterDefinition> {
        self.lookup(provider).iter().find(|d| d.key == key)
    }

    pub fn contains(&self, provider: &ProviderKey) -> bool {
        self.schemas.contains_key(provider)
    }

    pub fn list_providers(&self) -> BTreeSet<ProviderKey> {
        self.schemas.keys().cloned().collect()
    }
}
