mod definition;
mod parameter_set;
mod preset;
mod provider;
mod value;
mod violation;

pub use definition::*;
pub use parameter_set::*;
pub use preset::*;
pub use provider::*;
pub use value::*;
pub use violation::*;
