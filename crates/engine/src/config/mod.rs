mod files;
mod loader;
mod validation;

pub use files::{DependencySpec, PresetFile, SchemaFile};
pub use loader::{config_dir_from_env, load_config, ConfigError, EngineConfig, CONFIG_DIR_ENV};
