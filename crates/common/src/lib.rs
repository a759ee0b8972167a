pub mod config;
pub mod error;
pub mod ids;
pub mod types;

pub use error::{ParamGateError, Result};
pub use ids::*;
pub use types::*;
