use std::fmt::Display;

use super::is_equivalence_entailed;
use super::propagate_equivalence;
use crate::basic_types::PropagationStatus;
use crate::engine::domains::DomainEvent;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarId;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::PrimitiveConstraint;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;

/// The constraint `c ⊕ b`: the primitive constraint `c` holds exactly when the boolean `b` is 0.
#[derive(Clone, Debug)]
pub struct Xor<C> {
    constraint: C,
    b: IntVar,
}

impl<C: PrimitiveConstraint> Xor<C> {
    pub fn new(constraint: C, b: IntVar) -> Self {
        Xor { constraint, b }
    }
}

impl<C: PrimitiveConstraint + Clone> Constraint for Xor<C> {
    fn name(&self) -> &str {
        "Xor"
    }

    fn scope(&self) -> Vec<VarId> {
        let mut scope = self.constraint.scope();
        if !scope.contains(&self.b.id()) {
            scope.push(self.b.id());
        }
        scope
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_equivalence(&mut self.constraint, self.b, 0, context)
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        is_equivalence_entailed(&self.constraint, self.b, 0, domains)
    }

    fn consistency_pruning_event(&self, var: VarId) -> DomainEvent {
        if var == self.b.id() {
            DomainEvent::Ground
        } else {
            DomainEvent::Any
        }
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

impl<C: Display> Display for Xor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Xor({}, {})", self.constraint, self.b)
    }
}
