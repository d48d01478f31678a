use std::fmt::Display;

use itertools::Itertools;

use super::bounds;
use crate::basic_types::Inconsistency;
use crate::basic_types::ModelConstructionError;
use crate::basic_types::PropagationStatus;
use crate::engine::domains::DomainEvent;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarId;
use crate::math::NumExt;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::PrimitiveConstraint;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// The comparison between the weighted sum and the right-hand side of a [`LinearInt`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinearRelation {
    Equal,
    NotEqual,
    LessOrEqual,
    GreaterOrEqual,
}

impl LinearRelation {
    fn negated(self) -> LinearRelation {
        match self {
            LinearRelation::Equal => LinearRelation::NotEqual,
            LinearRelation::NotEqual => LinearRelation::Equal,
            LinearRelation::LessOrEqual => LinearRelation::GreaterOrEqual,
            LinearRelation::GreaterOrEqual => LinearRelation::LessOrEqual,
        }
    }
}

impl Display for LinearRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinearRelation::Equal => write!(f, "="),
            LinearRelation::NotEqual => write!(f, "!="),
            LinearRelation::LessOrEqual => write!(f, "<="),
            LinearRelation::GreaterOrEqual => write!(f, ">="),
        }
    }
}

/// The constraint `sum(w_i * x_i) ~ c` where `~` is one of the [`LinearRelation`]s.
///
/// Inequalities and equality are maintained with bounds consistency. Disequality waits until all
/// but one variable are fixed.
#[derive(Clone, Debug)]
pub struct LinearInt {
    terms: Box<[(i64, IntVar)]>,
    relation: LinearRelation,
    rhs: i64,
}

impl LinearInt {
    /// Creates the constraint, verifying that no weighted sum over the current domains can
    /// overflow. Since domains only shrink, this holds for the lifetime of the constraint.
    pub fn new(
        domains: &impl ReadDomains,
        variables: Vec<IntVar>,
        weights: Vec<i64>,
        relation: LinearRelation,
        rhs: i64,
    ) -> Result<Self, ModelConstructionError> {
        if variables.is_empty() {
            return Err(ModelConstructionError::EmptyScope {
                constraint: "LinearInt",
            });
        }
        if variables.len() != weights.len() {
            return Err(ModelConstructionError::MismatchedLengths {
                constraint: "LinearInt",
                expected: variables.len(),
                actual: weights.len(),
            });
        }

        let terms = weights
            .into_iter()
            .zip(variables)
            .filter(|&(weight, _)| weight != 0)
            .collect::<Box<[_]>>();

        check_overflow(domains, &terms, rhs)
            .ok_or(ModelConstructionError::ArithmeticOverflow {
                constraint: "LinearInt",
            })?;

        Ok(LinearInt {
            terms,
            relation,
            rhs,
        })
    }

    fn propagate(
        &self,
        context: &mut PropagationContext<'_>,
        relation: LinearRelation,
    ) -> PropagationStatus {
        match relation {
            LinearRelation::LessOrEqual => propagate_at_most(context, &self.terms, self.rhs, 1),
            LinearRelation::GreaterOrEqual => {
                propagate_at_most(context, &self.terms, -self.rhs, -1)
            }
            LinearRelation::Equal => loop {
                let changes = context.changes();
                propagate_at_most(context, &self.terms, self.rhs, 1)?;
                propagate_at_most(context, &self.terms, -self.rhs, -1)?;
                if changes == context.changes() {
                    return Ok(());
                }
            },
            LinearRelation::NotEqual => propagate_not_equal(context, &self.terms, self.rhs),
        }
    }

    fn holds(&self, domains: &Domains<'_>, relation: LinearRelation) -> bool {
        let (min, max) = sum_bounds(domains, &self.terms);
        match relation {
            LinearRelation::LessOrEqual => max <= self.rhs,
            LinearRelation::GreaterOrEqual => min >= self.rhs,
            LinearRelation::Equal => min == self.rhs && max == self.rhs,
            LinearRelation::NotEqual => max < self.rhs || min > self.rhs,
        }
    }

    fn event_for(relation: LinearRelation) -> DomainEvent {
        match relation {
            LinearRelation::NotEqual => DomainEvent::Ground,
            _ => DomainEvent::Bound,
        }
    }
}

/// Every sum over a subset of term bounds, offset by the right-hand side, fits in an `i64`.
fn check_overflow(domains: &impl ReadDomains, terms: &[(i64, IntVar)], rhs: i64) -> Option<()> {
    let mut magnitude = rhs.checked_abs()?.checked_add(1)?;
    for &(weight, var) in terms {
        // the inequalities are propagated with negated weights
        let _ = weight.checked_neg()?;
        let (lower, upper) = bounds(domains, var);
        let a = weight.checked_mul(lower)?.checked_abs()?;
        let b = weight.checked_mul(upper)?.checked_abs()?;
        magnitude = magnitude.checked_add(a.max(b))?;
    }
    Some(())
}

fn term_bounds(domains: &impl ReadDomains, weight: i64, var: IntVar) -> (i64, i64) {
    let (lower, upper) = bounds(domains, var);
    if weight >= 0 {
        (weight * lower, weight * upper)
    } else {
        (weight * upper, weight * lower)
    }
}

fn sum_bounds(domains: &impl ReadDomains, terms: &[(i64, IntVar)]) -> (i64, i64) {
    terms
        .iter()
        .map(|&(weight, var)| term_bounds(domains, weight, var))
        .fold((0, 0), |(min, max), (lower, upper)| (min + lower, max + upper))
}

/// Enforces `sign * sum(w_i * x_i) <= rhs` until its fixpoint.
fn propagate_at_most(
    context: &mut PropagationContext<'_>,
    terms: &[(i64, IntVar)],
    rhs: i64,
    sign: i64,
) -> PropagationStatus {
    loop {
        let changes = context.changes();

        let minimums = terms
            .iter()
            .map(|&(weight, var)| term_bounds(context, sign * weight, var).0)
            .collect_vec();
        let total: i64 = minimums.iter().sum();

        for (&(weight, var), minimum) in terms.iter().zip(&minimums) {
            let weight = sign * weight;
            let slack = rhs - (total - minimum);
            if weight > 0 {
                context.in_int_max(var, slack.floor_div(weight))?;
            } else {
                context.in_int_min(var, slack.ceil_div(weight))?;
            }
        }

        if changes == context.changes() {
            return Ok(());
        }
    }
}

/// Removes the only remaining value which makes the sum equal to `rhs`, or fails when all
/// variables are fixed to such values.
fn propagate_not_equal(
    context: &mut PropagationContext<'_>,
    terms: &[(i64, IntVar)],
    rhs: i64,
) -> PropagationStatus {
    let mut unfixed = terms
        .iter()
        .filter(|(_, var)| context.fixed_value(*var).is_none());
    let remaining = unfixed.next().copied();
    if unfixed.next().is_some() {
        return Ok(());
    }

    let fixed_sum: i64 = terms
        .iter()
        .filter_map(|&(weight, var)| context.fixed_value(var).map(|v| weight * i64::from(v)))
        .sum();

    match remaining {
        None if fixed_sum == rhs => Err(Inconsistency::Conflict),
        None => Ok(()),
        Some((weight, var)) => {
            let target = rhs - fixed_sum;
            if target.checked_rem(weight) == Some(0) {
                if let Some(value) = target
                    .checked_div(weight)
                    .and_then(|value| i32::try_from(value).ok())
                {
                    context.in_int_complement(var, value)?;
                }
            }
            Ok(())
        }
    }
}

impl Constraint for LinearInt {
    fn name(&self) -> &str {
        "LinearInt"
    }

    fn scope(&self) -> Vec<VarId> {
        self.terms.iter().map(|(_, var)| var.id()).collect()
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        self.propagate(context, self.relation)
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        self.holds(domains, self.relation)
    }

    fn consistency_pruning_event(&self, _var: VarId) -> DomainEvent {
        LinearInt::event_for(self.relation)
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }
}

impl PrimitiveConstraint for LinearInt {
    fn not_consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        // the negation of an inequality is strict, which over integers shifts the right-hand side
        let negation = LinearInt {
            terms: self.terms.clone(),
            relation: self.relation.negated(),
            rhs: match self.relation {
                LinearRelation::LessOrEqual => self.rhs + 1,
                LinearRelation::GreaterOrEqual => self.rhs - 1,
                _ => self.rhs,
            },
        };
        negation.propagate(context, negation.relation)
    }

    fn not_satisfied(&self, domains: &Domains<'_>) -> bool {
        let (min, max) = sum_bounds(domains, &self.terms);
        match self.relation {
            LinearRelation::LessOrEqual => min > self.rhs,
            LinearRelation::GreaterOrEqual => max < self.rhs,
            LinearRelation::Equal => max < self.rhs || min > self.rhs,
            LinearRelation::NotEqual => min == self.rhs && max == self.rhs,
        }
    }

    fn not_consistency_pruning_event(&self, _var: VarId) -> DomainEvent {
        LinearInt::event_for(self.relation.negated())
    }
}

impl Display for LinearInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sum = self
            .terms
            .iter()
            .map(|(weight, var)| format!("{weight}*{var}"))
            .join(" + ");
        write!(f, "LinearInt({sum} {} {})", self.relation, self.rhs)
    }
}
