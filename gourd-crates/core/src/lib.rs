//! # Gourd
//! Gourd is the propagation core of a constraint solver over finite integer domains and real
//! intervals. It consists of:
//! - A [`Store`] of variables whose domains only shrink, organised in decision levels which can
//!   be removed again to backtrack.
//! - The [`Constraint`](propagation::Constraint) protocol through which relations remove
//!   impossible values, and a library of integer, float and logical relations in
//!   [`propagators`].
//! - Interval arithmetic with directed rounding in [`math`], so that narrowing float domains
//!   never removes a real solution.
//! - An interval Newton solver for systems of non-linear equations, with automatically
//!   synthesized derivatives ([`propagators::nonlinear`]).
//!
//! The search layer which decides on values, and any modelling front-end, live outside of this
//! crate: they drive the store through [`Store::new_level`], narrowing, [`Store::consistency`]
//! and [`Store::remove_level`].
//!
//! # Usage
//! ```rust
//! # use gourd_core::Store;
//! # use gourd_core::propagation::ReadDomains;
//! # use gourd_core::propagators::float::PplusQeqR;
//! let mut store = Store::default();
//! let p = store.new_float_variable(0.0, 10.0).unwrap();
//! let q = store.new_float_variable(2.0, 3.0).unwrap();
//! let r = store.new_float_variable(-100.0, 4.0).unwrap();
//!
//! let _ = store.impose(PplusQeqR::new(p, q, r));
//! assert!(store.consistency().is_ok());
//!
//! // p + q <= 4 and q >= 2 leave p <= 2
//! assert!(store.float_bounds(p).upper() <= 2.0 + 1e-9);
//! ```
#[doc(hidden)]
pub mod asserts;

pub mod containers;
pub mod engine;
pub mod math;
pub mod propagation;
pub mod propagators;
pub mod statistics;

mod basic_types;

pub use convert_case;

pub use crate::basic_types::ConstraintOperationError;
pub use crate::basic_types::EmptyDomain;
pub use crate::basic_types::Inconsistency;
pub use crate::basic_types::ModelConstructionError;
pub use crate::basic_types::PropagationStatus;
pub use crate::engine::domains;
pub use crate::engine::variables;
pub use crate::engine::Store;
pub use crate::math::configure_float_precision;
pub use crate::math::FloatPrecision;
pub use crate::math::PrecisionError;
