//! Contains the interval Newton method for systems of non-linear equations, and the machinery it
//! relies on: automatically synthesized derivatives and interval Gauss-Seidel.
//!
//! A [`NonlinearSystem`] is imposed over functions `f_1, ..., f_n` and unknowns
//! `x_1, ..., x_n`, and enforces `f_i = 0` for every function. The functions are ordinary float
//! variables defined through relations such as [`PmulQeqR`] or [`SinPeqR`] which implement
//! [`DifferentiableRelation`]. When the system is imposed, the [`DerivativeEngine`] walks these
//! relations to build a variable for every entry of the Jacobian `df_i / dx_j`, defined through
//! helper relations which never propagate on their own.
//!
//! Every round of the Newton method evaluates the functions at the midpoint `m` of the box of the
//! unknowns and the Jacobian `J` over the whole box, solves `J * d = -f(m)` with interval
//! Gauss-Seidel, and narrows the unknowns to `m + d`.
//!
//! [`PmulQeqR`]: crate::propagators::float::PmulQeqR
//! [`SinPeqR`]: crate::propagators::float::SinPeqR
mod derivative;
mod evaluation;
mod gauss_seidel;
mod newton;
mod system;

use thiserror::Error;

pub use derivative::DerivativeEngine;
pub(crate) use evaluation::ExpressionGraph;
pub use gauss_seidel::*;
pub use newton::*;
pub use system::NonlinearSystem;

use crate::engine::variables::FloatVar;
use crate::math::Interval;

/// The functional view of a relation `output = g(inputs)`, which allows the derivative engine to
/// differentiate it and the Newton method to evaluate it.
pub trait DifferentiableRelation {
    /// The variable which is defined by the relation.
    fn output(&self) -> FloatVar;

    /// The variables the output is a function of, in the order expected by
    /// [`DifferentiableRelation::evaluate`].
    fn inputs(&self) -> Vec<FloatVar>;

    /// Evaluates the output over the given enclosures of the inputs, or returns `None` if the
    /// function is undefined everywhere on them.
    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval>;

    /// Returns a variable equal to the derivative of the output with respect to `wrt`, built
    /// through the helpers of the [`DerivativeEngine`].
    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure>;
}

/// The derivative engine or the Newton method encountered a model shape it cannot handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedStructure {
    #[error("no relation defines `{variable}`")]
    NoDefinition { variable: String },
    #[error("{candidates} relations define `{variable}`; declare one through `Store::define`")]
    AmbiguousDefinition { variable: String, candidates: usize },
    #[error("the relation does not define `{variable}`")]
    NotADefinition { variable: String },
    #[error("the relation `{relation}` cannot be differentiated")]
    NotDifferentiable { relation: String },
    #[error("a system of {functions} functions over {unknowns} unknowns is not square")]
    NotSquare { functions: usize, unknowns: usize },
}
