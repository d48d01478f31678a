//! Numeric foundations: integer division helpers, directed rounding of doubles and the interval
//! arithmetic built on top of it.
mod interval;
mod num_ext;
mod precision;
pub mod rounding;

pub use interval::Interval;
pub(crate) use interval::MAX_PERIODIC_ARGUMENT;
pub(crate) use num_ext::NumExt;
pub use precision::*;
