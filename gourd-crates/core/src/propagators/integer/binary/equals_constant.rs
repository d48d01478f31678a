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

/// The constraint `x = c`.
#[derive(Clone, Debug)]
pub struct XeqC {
    x: IntVar,
    c: i32,
}

impl XeqC {
    pub fn new(x: IntVar, c: i32) -> Self {
        XeqC { x, c }
    }
}

impl Constraint for XeqC {
    fn name(&self) -> &str {
        "XeqC"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.x.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        context.in_int_value(self.x, self.c)?;
        Ok(())
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        domains.fixed_value(self.x) == Some(self.c)
    }

    fn consistency_pruning_event(&self, _var: VarId) -> DomainEvent {
        DomainEvent::Any
    }

    fn priority(&self) -> Priority {
        Priority::High
    }
}

impl PrimitiveConstraint for XeqC {
    fn not_consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        context.in_int_complement(self.x, self.c)?;
        Ok(())
    }

    fn not_satisfied(&self, domains: &Domains<'_>) -> bool {
        !domains.contains(self.x, self.c)
    }

    fn not_consistency_pruning_event(&self, _var: VarId) -> DomainEvent {
        DomainEvent::Any
    }
}

impl Display for XeqC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "XeqC({}, {})", self.x, self.c)
    }
}
