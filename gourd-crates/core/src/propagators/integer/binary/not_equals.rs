use std::fmt::Display;

use super::equals::are_disjoint;
use super::equals::are_equal;
use super::equals::propagate_equal;
use super::equals::propagate_not_equal;
use crate::basic_types::PropagationStatus;
use crate::engine::domains::DomainEvent;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarId;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::PrimitiveConstraint;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;

/// The constraint `x != y`.
#[derive(Clone, Debug)]
pub struct XneqY {
    x: IntVar,
    y: IntVar,
}

impl XneqY {
    pub fn new(x: IntVar, y: IntVar) -> Self {
        XneqY { x, y }
    }
}

impl Constraint for XneqY {
    fn name(&self) -> &str {
        "XneqY"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.x.id(), self.y.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_not_equal(context, self.x, self.y)
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        are_disjoint(domains, self.x, self.y)
    }

    fn consistency_pruning_event(&self, _var: VarId) -> DomainEvent {
        DomainEvent::Ground
    }

    fn priority(&self) -> Priority {
        Priority::High
    }
}

impl PrimitiveConstraint for XneqY {
    fn not_consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_equal(context, self.x, self.y)
    }

    fn not_satisfied(&self, domains: &Domains<'_>) -> bool {
        are_equal(domains, self.x, self.y)
    }

    fn not_consistency_pruning_event(&self, _var: VarId) -> DomainEvent {
        DomainEvent::Any
    }
}

impl Display for XneqY {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "XneqY({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Inconsistency;
    use crate::engine::test_store::TestStore;
    use crate::propagation::ReadDomains;

    #[test]
    fn fixed_value_is_removed_from_the_other_variable() {
        let mut store = TestStore::default();
        let x = store.new_int_variable(0, 10);
        let y = store.new_int_variable(10, 10);

        let handle = store.new_constraint(XneqY::new(x, y)).expect("no empty domains");

        store.assert_bounds(x, 0, 9);
        assert!(store.is_retired(handle.id()));
    }

    #[test]
    fn woken_when_a_variable_becomes_fixed() {
        let mut store = TestStore::default();
        let x = store.new_int_variable(0, 2);
        let y = store.new_int_variable(0, 2);
        let _ = store.new_constraint(XneqY::new(x, y)).expect("no empty domains");

        let _ = store.new_level();
        store.in_int_value(x, 1).expect("no empty domains");
        store.consistency().expect("no empty domains");

        assert!(!store.contains(y, 1));
    }

    #[test]
    fn equal_fixed_values_fail() {
        let mut store = TestStore::default();
        let x = store.new_int_variable(4, 4);
        let y = store.new_int_variable(4, 4);

        let result = store.new_constraint(XneqY::new(x, y));
        assert_eq!(Some(Inconsistency::EmptyDomain), result.err());
    }
}
