//! Contains the relations which can be imposed on the [`Store`](crate::engine::Store).
//!
//! - [`integer`]: comparisons, arithmetic, weighted sums, maximum and element over integer
//!   variables.
//! - [`float`]: comparisons, arithmetic and transcendental functions over float variables, and
//!   the relations linking integer and float variables.
//! - [`logical`]: reification, negation and exclusive or over primitive constraints.
//! - [`nonlinear`]: systems of non-linear equations pruned with the interval Newton method.
pub mod float;
pub mod integer;
pub mod logical;
pub mod nonlinear;
