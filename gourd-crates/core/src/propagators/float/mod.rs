//! Relations over float variables.
//!
//! Every relation narrows with outward rounded [`Interval`] arithmetic, so no real solution is
//! ever removed. The functional relations (`R = g(P, ...)`) also implement
//! [`DifferentiableRelation`], which lets them define the functions of a
//! [`NonlinearSystem`](crate::propagators::nonlinear::NonlinearSystem).
mod comparison;
mod conversion;
mod division;
mod elementary;
mod multiplication;
mod periodic;
mod plus;

use itertools::Itertools;

pub use comparison::*;
pub use conversion::*;
pub use division::*;
pub use elementary::*;
pub use multiplication::*;
pub use periodic::*;
pub use plus::*;

use crate::basic_types::ModelConstructionError;
use crate::math::Interval;
use crate::propagation::Domains;
use crate::propagation::ReadDomains;
use crate::propagators::nonlinear::DifferentiableRelation;

/// A functional relation is satisfied when its variables are ground and the output overlaps the
/// image of the inputs.
fn is_functionally_satisfied(domains: &Domains<'_>, relation: &dyn DifferentiableRelation) -> bool {
    let inputs = relation.inputs();
    let output = relation.output();
    if !domains.is_ground(output.id()) || inputs.iter().any(|input| !domains.is_ground(input.id())) {
        return false;
    }
    let values = inputs
        .iter()
        .map(|&input| domains.float_bounds(input))
        .collect_vec();
    relation
        .evaluate(&values)
        .and_then(|image| image.intersect(domains.float_bounds(output)))
        .is_some()
}

fn check_finite(constraint: &'static str, value: f64) -> Result<(), ModelConstructionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ModelConstructionError::ConstantOutOfRange {
            constraint,
            value: value.to_string(),
        })
    }
}

/// The non-negative half line.
fn non_negative() -> Interval {
    Interval::new(0.0, f64::INFINITY)
}
