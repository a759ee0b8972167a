//! Parameter constraint and normalization engine for AI generation providers.
//!
//! A caller hands [`ParameterEngine::prepare`] a candidate parameter set for
//! one provider key and gets back the normalized, default-filled set along
//! with every violation found.

pub mod builtin;
pub mod compare;
pub mod config;
pub mod convert;
pub mod pipeline;
pub mod presets;
pub mod resolve;
pub mod schema;
pub mod shared;
pub mod suggest;
pub mod validation;

pub use pipeline::{ParameterEngine, PreparedParameters};
pub use shared::SharedEngine;
