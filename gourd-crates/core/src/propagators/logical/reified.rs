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

/// The constraint `b ⇔ c`: the boolean `b` is 1 exactly when the primitive constraint `c` holds.
///
/// Once `b` is ground the wrapped constraint, or its negation, is enforced. Before that `b` is
/// fixed as soon as `c` is entailed or disentailed by the domains of its scope.
#[derive(Clone, Debug)]
pub struct Reified<C> {
    constraint: C,
    b: IntVar,
}

impl<C: PrimitiveConstraint> Reified<C> {
    pub fn new(constraint: C, b: IntVar) -> Self {
        Reified { constraint, b }
    }
}

impl<C: PrimitiveConstraint + Clone> Constraint for Reified<C> {
    fn name(&self) -> &str {
        "Reified"
    }

    fn scope(&self) -> Vec<VarId> {
        let mut scope = self.constraint.scope();
        if !scope.contains(&self.b.id()) {
            scope.push(self.b.id());
        }
        scope
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_equivalence(&mut self.constraint, self.b, 1, context)
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        is_equivalence_entailed(&self.constraint, self.b, 1, domains)
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

impl<C: Display> Display for Reified<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Reified({}, {})", self.constraint, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Inconsistency;
    use crate::engine::test_store::TestStore;
    use crate::propagation::ReadDomains;
    use crate::propagators::float::PlteqQ;
    use crate::propagators::integer::XeqC;
    use crate::propagators::integer::XneqY;

    #[test]
    fn boolean_is_restricted_to_zero_and_one() {
        let mut store = TestStore::default();
        let x = store.new_int_variable(0, 10);
        let b = store.new_int_variable(-3, 5);

        let _ = store
            .new_constraint(Reified::new(XeqC::new(x, 3), b))
            .expect("no empty domains");

        store.assert_bounds(b, 0, 1);
        store.assert_bounds(x, 0, 10);
    }

    #[test]
    fn true_boolean_enforces_the_constraint() {
        let mut store = TestStore::default();
        let x = store.new_int_variable(0, 10);
        let b = store.new_int_variable(1, 1);

        let handle = store
            .new_constraint(Reified::new(XeqC::new(x, 3), b))
            .expect("no empty domains");

        store.assert_bounds(x, 3, 3);
        assert!(store.is_retired(handle.id()));
    }

    #[test]
    fn false_boolean_enforces_the_negation() {
        let mut store = TestStore::default();
        let x = store.new_int_variable(3, 5);
        let b = store.new_int_variable(0, 0);

        let _ = store
            .new_constraint(Reified::new(XeqC::new(x, 3), b))
            .expect("no empty domains");

        store.assert_bounds(x, 4, 5);
    }

    #[test]
    fn entailment_fixes_the_boolean() {
        let mut store = TestStore::default();
        let p = store.new_float_variable(0.0, 1.0);
        let q = store.new_float_variable(2.0, 3.0);
        let b = store.new_int_variable(0, 1);

        let _ = store
            .new_constraint(Reified::new(PlteqQ::new(p, q), b))
            .expect("no empty domains");

        store.assert_bounds(b, 1, 1);
    }

    #[test]
    fn disentailment_fixes_the_boolean() {
        let mut store = TestStore::default();
        let x = store.new_int_variable(4, 6);
        let b = store.new_int_variable(0, 1);

        let _ = store
            .new_constraint(Reified::new(XeqC::new(x, 3), b))
            .expect("no empty domains");

        store.assert_bounds(b, 0, 0);
    }

    #[test]
    fn boolean_is_fixed_once_the_scope_decides_the_constraint() {
        let mut store = TestStore::default();
        let x = store.new_int_variable(4, 6);
        let y = store.new_int_variable(5, 5);
        let b = store.new_int_variable(0, 1);

        let _ = store
            .new_constraint(Reified::new(XneqY::new(x, y), b))
            .expect("no empty domains");
        assert_eq!(None, store.fixed_value(b));

        let _ = store.new_level();
        store.in_int(x, 4, 4).expect("non-empty");
        store.consistency().expect("no empty domains");

        store.assert_bounds(b, 1, 1);
    }

    #[test]
    fn conflicting_boolean_fails() {
        let mut store = TestStore::default();
        let x = store.new_int_variable(4, 6);
        let b = store.new_int_variable(1, 1);

        let result = store.new_constraint(Reified::new(XeqC::new(x, 3), b));
        assert_eq!(Some(Inconsistency::EmptyDomain), result.err());
    }
}
