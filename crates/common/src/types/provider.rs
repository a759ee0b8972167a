use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParamGateError;

/// Kind of generation a provider offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Chat,
    Image,
    Video,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ParamGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            _ => Err(ParamGateError::InvalidProviderKey(s.to_string())),
        }
    }
}

/// Scope of every registry: one provider plus one capability.
///
/// Text form is `"<provider>/<capability>"`, e.g. `"openai/image"`; that is
/// also how it serializes, so it can key TOML tables and JSON maps.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderKey {
    pub provider: String,
    pub capability: Capability,
}

impl ProviderKey {
    pub fn new(provider: &str, capability: Capability) -> Self {
        Self {
            provider: provider.to_string(),
            capability,
        }
    }

    pub fn chat(provider: &str) -> Self {
        Self::new(provider, Capability::Chat)
    }

    pub fn image(provider: &str) -> Self {
        Self::new(provider, Capability::Image)
    }

    pub fn video(provider: &str) -> Self {
        Self::new(provider, Capability::Video)
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.capability)
    }
}

impl FromStr for ProviderKey {
    type Err = ParamGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, capability) = s
            .split_once('/')
            .ok_or_else(|| ParamGateError::InvalidProviderKey(s.to_string()))?;

        let provider = provider.trim();
        if provider.is_empty() {
            return Err(ParamGateError::InvalidProviderKey(s.to_string()));
        }

        let capability = capability
            .parse::<Capability>()
            .map_err(|_| ParamGateError::InvalidProviderKey(s.to_string()))?;

        Ok(Self::new(provider, capability))
    }
}

impl Serialize for ProviderKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProviderKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
