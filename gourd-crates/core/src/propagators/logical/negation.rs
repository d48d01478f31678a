use std::fmt::Display;

use crate::basic_types::PropagationStatus;
use crate::engine::domains::DomainEvent;
use crate::engine::variables::VarId;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::PrimitiveConstraint;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;

/// The negation `¬c` of a primitive constraint. It is primitive itself, so negations can be
/// nested and reified.
#[derive(Clone, Debug)]
pub struct Not<C> {
    constraint: C,
}

impl<C: PrimitiveConstraint> Not<C> {
    pub fn new(constraint: C) -> Self {
        Not { constraint }
    }
}

impl<C: PrimitiveConstraint + Clone> Constraint for Not<C> {
    fn name(&self) -> &str {
        "Not"
    }

    fn scope(&self) -> Vec<VarId> {
        self.constraint.scope()
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        self.constraint.not_consistency(context)
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        self.constraint.not_satisfied(domains)
    }

    fn consistency_pruning_event(&self, var: VarId) -> DomainEvent {
        self.constraint.not_consistency_pruning_event(var)
    }

    fn priority(&self) -> Priority {
        self.constraint.priority()
    }

    fn is_stateful(&self) -> bool {
        self.constraint.is_stateful()
    }

    fn remove_level(&mut self, level: usize) {
        self.constraint.remove_level(level);
    }
}

impl<C: PrimitiveConstraint + Clone> PrimitiveConstraint for Not<C> {
    fn not_consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        self.constraint.consistency(context)
    }

    fn not_satisfied(&self, domains: &Domains<'_>) -> bool {
        self.constraint.satisfied(domains)
    }

    fn not_consistency_pruning_event(&self, var: VarId) -> DomainEvent {
        self.constraint.consistency_pruning_event(var)
    }
}

impl<C: Display> Display for Not<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Not({})", self.constraint)
    }
}
