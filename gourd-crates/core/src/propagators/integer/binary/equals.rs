use std::fmt::Display;

use crate::basic_types::PropagationStatus;
use crate::engine::domains::DomainEvent;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarId;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::PrimitiveConstraint;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// The constraint `x = y`, maintained with domain consistency.
#[derive(Clone, Debug)]
pub struct XeqY {
    x: IntVar,
    y: IntVar,
}

impl XeqY {
    pub fn new(x: IntVar, y: IntVar) -> Self {
        XeqY { x, y }
    }
}

/// Narrows both variables to the values they share.
pub(super) fn propagate_equal(
    context: &mut PropagationContext<'_>,
    x: IntVar,
    y: IntVar,
) -> PropagationStatus {
    let y_domain = context.int_domain(y).clone();
    context.in_int_domain(x, &y_domain)?;
    let x_domain = context.int_domain(x).clone();
    context.in_int_domain(y, &x_domain)?;
    Ok(())
}

/// Once either variable is fixed, removes its value from the other.
pub(super) fn propagate_not_equal(
    context: &mut PropagationContext<'_>,
    x: IntVar,
    y: IntVar,
) -> PropagationStatus {
    if let Some(value) = context.fixed_value(x) {
        context.in_int_complement(y, value)?;
    }
    if let Some(value) = context.fixed_value(y) {
        context.in_int_complement(x, value)?;
    }
    Ok(())
}

pub(super) fn are_equal(domains: &Domains<'_>, x: IntVar, y: IntVar) -> bool {
    match (domains.fixed_value(x), domains.fixed_value(y)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

pub(super) fn are_disjoint(domains: &Domains<'_>, x: IntVar, y: IntVar) -> bool {
    domains.int_domain(x).is_disjoint_from(domains.int_domain(y))
}

impl Constraint for XeqY {
    fn name(&self) -> &str {
        "XeqY"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.x.id(), self.y.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_equal(context, self.x, self.y)
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        are_equal(domains, self.x, self.y)
    }

    fn consistency_pruning_event(&self, _var: VarId) -> DomainEvent {
        DomainEvent::Any
    }

    fn priority(&self) -> Priority {
        Priority::High
    }
}

impl PrimitiveConstraint for XeqY {
    fn not_consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_not_equal(context, self.x, self.y)
    }

    fn not_satisfied(&self, domains: &Domains<'_>) -> bool {
        are_disjoint(domains, self.x, self.y)
    }

    fn not_consistency_pruning_event(&self, _var: VarId) -> DomainEvent {
        DomainEvent::Ground
    }
}

impl Display for XeqY {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "XeqY({}, {})", self.x, self.y)
    }
}
