use std::io::Read;
use std::process::ExitCode;

use serde::Deserialize;

use paramgate_common::types::{ParameterSet, ProviderKey};
use paramgate_engine::config;
use paramgate_engine::ParameterEngine;

/// One request read from stdin.
#[derive(Debug, Deserialize)]
struct PrepareRequest {
    provider: ProviderKey,
    #[serde(default)]
    parameters: ParameterSet,
    /// Preset id to seed the parameters from.
    #[serde(default)]
    preset: Option<String>,
}

fn main() -> ExitCode {
    // stdout carries the result; logs go to stderr.
    tracing_subscriber::fmt()
        .json()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let engine = match build_engine() {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build engine, refusing to start");
            return ExitCode::from(1);
        }
    };

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        tracing::error!(error = %e, "Failed to read request from stdin");
        return ExitCode::from(1);
    }

    let request: PrepareRequest = match serde_json::from_str(&input) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(error = %e, "Malformed request");
            return ExitCode::from(1);
        }
    };

    let prepared = match &request.preset {
        Some(preset) => {
            match engine.prepare_with_preset(&request.provider, preset, request.parameters) {
                Ok(prepared) => prepared,
                Err(e) => {
                    tracing::error!(error = %e, provider = %request.provider, "Preset lookup failed");
                    return ExitCode::from(1);
                }
            }
        }
        None => engine.prepare(&request.provider, request.parameters),
    };

    match serde_json::to_string_pretty(&prepared) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize result");
            return ExitCode::from(1);
        }
    }

    if prepared.valid {
        ExitCode::SUCCESS
    } else {
        tracing::info!(
            provider = %prepared.provider,
            violations = prepared.violations.len(),
            "Parameters rejected"
        );
        ExitCode::from(2)
    }
}

fn build_engine() -> Result<ParameterEngine, config::ConfigError> {
    let config_dir = config::config_dir_from_env();
    let loaded = config::load_config(&config_dir)?;

    let mut engine = ParameterEngine::with_builtins(loaded.system.pipeline.clone())?;
    loaded.apply(&mut engine)?;

    tracing::info!(
        providers = engine.schemas.list_providers().len(),
        presets = engine.presets.len(),
        "Engine ready"
    );
    Ok(engine)
}
