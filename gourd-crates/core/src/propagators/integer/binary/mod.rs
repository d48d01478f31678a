//! Contains the primitive comparisons of integer variables.
mod equals;
mod equals_constant;
mod less_than;
mod not_equals;

pub use equals::*;
pub use equals_constant::*;
pub use less_than::*;
pub use not_equals::*;
