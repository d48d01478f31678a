//! Combinators over [`PrimitiveConstraint`]s: reification, negation and exclusive or.
//!
//! Booleans are integer variables restricted to `{0, 1}`; a combinator narrows its boolean to
//! that range when it is first run.
mod negation;
mod reified;
mod xor;

pub use negation::*;
pub use reified::*;
pub use xor::*;

use crate::basic_types::PropagationStatus;
use crate::engine::variables::IntVar;
use crate::propagation::Domains;
use crate::propagation::PrimitiveConstraint;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// Enforces `b = holds` if and only if `constraint` holds.
fn propagate_equivalence<C: PrimitiveConstraint>(
    constraint: &mut C,
    b: IntVar,
    holds: i32,
    context: &mut PropagationContext<'_>,
) -> PropagationStatus {
    context.in_int(b, 0, 1)?;

    match context.fixed_value(b) {
        Some(value) if value == holds => constraint.consistency(context),
        Some(_) => constraint.not_consistency(context),
        None => {
            let (satisfied, violated) = {
                let domains = context.domains();
                (
                    constraint.satisfied(&domains),
                    constraint.not_satisfied(&domains),
                )
            };
            if satisfied {
                context.in_int_value(b, holds)?;
            } else if violated {
                context.in_int_value(b, 1 - holds)?;
            }
            Ok(())
        }
    }
}

/// Whether `b = holds` if and only if `constraint` holds, for every value in the domains.
fn is_equivalence_entailed<C: PrimitiveConstraint>(
    constraint: &C,
    b: IntVar,
    holds: i32,
    domains: &Domains<'_>,
) -> bool {
    match domains.fixed_value(b) {
        Some(value) if value == holds => constraint.satisfied(domains),
        Some(value) if value == 1 - holds => constraint.not_satisfied(domains),
        _ => false,
    }
}
