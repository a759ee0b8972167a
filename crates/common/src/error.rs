use thiserror::Error;

/// Top-level error type for paramgate operations.
///
/// Data problems in a parameter set are never errors; they are reported as
/// [`Violation`](crate::types::Violation)s. This type covers registration and
/// configuration mistakes only.
#[derive(Debug, Error)]
pub enum ParamGateError {
    // --- Preset registration ---
    #[error("Preset '{existing}' is already the default for {provider}; refusing to register '{rejected}' as a second default")]
    DefaultPresetConflict {
        provider: String,
        existing: String,
        rejected: String,
    },

    #[error("Preset '{id}' is already registered for {provider}")]
    DuplicatePreset { provider: String, id: String },

    // --- Lookup / parsing ---
    #[error("Invalid provider key '{0}': expected \"<provider>/<chat|image|video>\"")]
    InvalidProviderKey(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // --- Operational errors ---
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ParamGateError {
    /// Whether this error came from breaking a preset-store invariant.
    pub fn is_preset_conflict(&self) -> bool {
        matches!(
            self,
            Self::DefaultPresetConflict { .. } | Self::DuplicatePreset { .. }
        )
    }
}

/// Result type alias for paramgate operations.
pub type Result<T> = std::result::Result<T, ParamGateError>;
