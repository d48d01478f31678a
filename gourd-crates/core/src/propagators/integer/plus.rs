use std::fmt::Display;

use super::bounds;
use crate::basic_types::PropagationStatus;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarId;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// The constraint `x + y = z`, maintained with bounds consistency.
#[derive(Clone, Debug)]
pub struct XplusYeqZ {
    x: IntVar,
    y: IntVar,
    z: IntVar,
}

impl XplusYeqZ {
    pub fn new(x: IntVar, y: IntVar, z: IntVar) -> Self {
        XplusYeqZ { x, y, z }
    }
}

impl Constraint for XplusYeqZ {
    fn name(&self) -> &str {
        "XplusYeqZ"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.x.id(), self.y.id(), self.z.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        loop {
            let changes = context.changes();

            let (y_min, y_max) = bounds(context, self.y);
            let (z_min, z_max) = bounds(context, self.z);
            context.in_int(self.x, z_min - y_max, z_max - y_min)?;

            let (x_min, x_max) = bounds(context, self.x);
            context.in_int(self.y, z_min - x_max, z_max - x_min)?;

            let (y_min, y_max) = bounds(context, self.y);
            context.in_int(self.z, x_min + y_min, x_max + y_max)?;

            if changes == context.changes() {
                return Ok(());
            }
        }
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        match (
            domains.fixed_value(self.x),
            domains.fixed_value(self.y),
            domains.fixed_value(self.z),
        ) {
            (Some(x), Some(y), Some(z)) => i64::from(x) + i64::from(y) == i64::from(z),
            _ => false,
        }
    }

    fn priority(&self) -> Priority {
        Priority::High
    }
}

impl Display for XplusYeqZ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "XplusYeqZ({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Inconsistency;
    use crate::engine::test_store::TestStore;

    #[test]
    fn sum_bounds_are_propagated() {
        let mut store = TestStore::default();
        let x = store.new_int_variable(1, 5);
        let y = store.new_int_variable(2, 3);
        let z = store.new_int_variable(0, 100);

        let _ = store.new_constraint(XplusYeqZ::new(x, y, z)).expect("no empty domains");

        store.assert_bounds(z, 3, 8);
    }

    #[test]
    fn operands_are_narrowed_from_the_result() {
        let mut store = TestStore::default();
        let x = store.new_int_variable(0, 10);
        let y = store.new_int_variable(0, 10);
        let z = store.new_int_variable(12, 14);

        let _ = store.new_constraint(XplusYeqZ::new(x, y, z)).expect("no empty domains");

        store.assert_bounds(x, 2, 10);
        store.assert_bounds(y, 2, 10);
    }

    #[test]
    fn unreachable_sum_fails() {
        let mut store = TestStore::default();
        let x = store.new_int_variable(0, 2);
        let y = store.new_int_variable(0, 2);
        let z = store.new_int_variable(5, 8);

        let result = store.new_constraint(XplusYeqZ::new(x, y, z));
        assert_eq!(Some(Inconsistency::EmptyDomain), result.err());
    }
}
