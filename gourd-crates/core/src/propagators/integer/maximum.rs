use std::fmt::Display;

use itertools::Itertools;

use crate::basic_types::ModelConstructionError;
use crate::basic_types::PropagationStatus;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarId;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// Bounds consistent constraint which enforces `max(array) = rhs`.
#[derive(Clone, Debug)]
pub struct Max {
    array: Box<[IntVar]>,
    rhs: IntVar,
}

impl Max {
    pub fn new(array: Vec<IntVar>, rhs: IntVar) -> Result<Self, ModelConstructionError> {
        if array.is_empty() {
            return Err(ModelConstructionError::EmptyScope { constraint: "Max" });
        }
        Ok(Max {
            array: array.into(),
            rhs,
        })
    }

    fn propagate_once(&self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        // UB(a_i) <= UB(rhs)
        let rhs_ub = context.upper_bound(self.rhs);
        for &var in self.array.iter() {
            context.in_int_max(var, i64::from(rhs_ub))?;
        }

        // max{LB(a_i)} <= rhs <= max{UB(a_i)}
        let max_lb = self
            .array
            .iter()
            .map(|&var| context.lower_bound(var))
            .max()
            .unwrap_or(i32::MIN);
        let max_ub = self
            .array
            .iter()
            .map(|&var| context.upper_bound(var))
            .max()
            .unwrap_or(i32::MAX);
        context.in_int(self.rhs, i64::from(max_lb), i64::from(max_ub))?;

        // a single element which can reach LB(rhs) must take at least that value
        let rhs_lb = context.lower_bound(self.rhs);
        let candidates = self
            .array
            .iter()
            .filter(|&&var| context.upper_bound(var) >= rhs_lb)
            .collect_vec();
        if let [&only] = candidates.as_slice() {
            context.in_int_min(only, i64::from(rhs_lb))?;
        }

        Ok(())
    }
}

impl Constraint for Max {
    fn name(&self) -> &str {
        "Max"
    }

    fn scope(&self) -> Vec<VarId> {
        self.array
            .iter()
            .map(|var| var.id())
            .chain(std::iter::once(self.rhs.id()))
            .collect()
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        loop {
            let changes = context.changes();
            self.propagate_once(context)?;
            if changes == context.changes() {
                return Ok(());
            }
        }
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        let Some(rhs) = domains.fixed_value(self.rhs) else {
            return false;
        };
        self.array
            .iter()
            .map(|&var| domains.fixed_value(var))
            .collect::<Option<Vec<_>>>()
            .and_then(|values| values.into_iter().max())
            == Some(rhs)
    }

    fn priority(&self) -> Priority {
        Priority::High
    }
}

impl Display for Max {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Max([{}], {})", self.array.iter().join(", "), self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Inconsistency;
    use crate::engine::test_store::TestStore;

    #[test]
    fn upper_bound_of_rhs_matches_maximum_upper_bound_of_array() {
        let mut store = TestStore::default();
        let a = store.new_int_variable(1, 3);
        let b = store.new_int_variable(1, 4);
        let c = store.new_int_variable(1, 5);
        let rhs = store.new_int_variable(1, 10);

        let _ = store
            .new_constraint(Max::new(vec![a, b, c], rhs).expect("non-empty array"))
            .expect("no empty domains");

        store.assert_bounds(rhs, 1, 5);
    }

    #[test]
    fn lower_bound_of_rhs_is_maximum_of_lower_bounds_in_array() {
        let mut store = TestStore::default();
        let a = store.new_int_variable(3, 10);
        let b = store.new_int_variable(4, 10);
        let c = store.new_int_variable(5, 10);
        let rhs = store.new_int_variable(1, 10);

        let _ = store
            .new_constraint(Max::new(vec![a, b, c], rhs).expect("non-empty array"))
            .expect("no empty domains");

        store.assert_bounds(rhs, 5, 10);
    }

    #[test]
    fn single_support_is_forced_to_the_lower_bound_of_rhs() {
        let mut store = TestStore::default();
        let a = store.new_int_variable(1, 3);
        let b = store.new_int_variable(1, 9);
        let rhs = store.new_int_variable(6, 10);

        let _ = store
            .new_constraint(Max::new(vec![a, b], rhs).expect("non-empty array"))
            .expect("no empty domains");

        store.assert_bounds(b, 6, 9);
        store.assert_bounds(rhs, 6, 9);
    }

    #[test]
    fn unreachable_rhs_fails() {
        let mut store = TestStore::default();
        let a = store.new_int_variable(1, 3);
        let rhs = store.new_int_variable(5, 10);

        let result = store.new_constraint(Max::new(vec![a], rhs).expect("non-empty array"));
        assert_eq!(Some(Inconsistency::EmptyDomain), result.err());
    }

    #[test]
    fn empty_array_is_rejected() {
        let mut store = TestStore::default();
        let rhs = store.new_int_variable(5, 10);

        assert!(Max::new(vec![], rhs).is_err());
    }
}
