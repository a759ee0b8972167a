mod constraints;
pub mod value;

pub use constraints::{
    Condition, ConditionFn, ConstraintRegistry, ConstraintReport, Dependency, FnRule,
    MutualExclusion, ValidationRule,
};
pub use value::{check, ValueValidator};
