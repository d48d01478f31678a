#![cfg(test)]
//! This module exposes helpers that aid testing of constraints. The [`TestStore`] allows setting
//! up specific scenarios under which to test the various operations of a constraint.
use std::ops::Deref;
use std::ops::DerefMut;

use super::Store;
use crate::basic_types::Inconsistency;
use crate::engine::variables::FloatVar;
use crate::engine::variables::IntVar;
use crate::propagation::Constraint;
use crate::propagation::ConstraintHandle;
use crate::propagation::ReadDomains;

/// A container for variables and constraints, with shortcuts for the common steps of a test.
#[derive(Debug, Default)]
pub(crate) struct TestStore {
    store: Store,
}

impl Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl DerefMut for TestStore {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store
    }
}

impl TestStore {
    pub(crate) fn new_int_variable(&mut self, lower: i32, upper: i32) -> IntVar {
        self.store
            .new_int_variable(lower, upper)
            .expect("valid bounds")
    }

    pub(crate) fn new_float_variable(&mut self, lower: f64, upper: f64) -> FloatVar {
        self.store
            .new_float_variable(lower, upper)
            .expect("valid bounds")
    }

    /// Imposes the constraint and runs consistency until the fixpoint.
    pub(crate) fn new_constraint<C: Constraint>(
        &mut self,
        constraint: C,
    ) -> Result<ConstraintHandle<C>, Inconsistency> {
        let handle = self.store.impose(constraint);
        self.store.consistency()?;
        Ok(handle)
    }

    pub(crate) fn assert_bounds(&self, var: IntVar, lower: i32, upper: i32) {
        let actual = (self.lower_bound(var), self.upper_bound(var));
        assert_eq!(
            (lower, upper),
            actual,
            "The expected bounds [{lower}, {upper}] did not match the actual bounds [{}, {}]",
            actual.0,
            actual.1
        );
    }

    /// Asserts that the bounds of `var` are within `tolerance` of `[lower, upper]` and enclose it.
    pub(crate) fn assert_float_bounds(&self, var: FloatVar, lower: f64, upper: f64, tolerance: f64) {
        let bounds = self.float_bounds(var);
        assert!(
            bounds.lower() <= lower && lower - bounds.lower() <= tolerance,
            "lower bound {} does not enclose {lower} within {tolerance}",
            bounds.lower()
        );
        assert!(
            bounds.upper() >= upper && bounds.upper() - upper <= tolerance,
            "upper bound {} does not enclose {upper} within {tolerance}",
            bounds.upper()
        );
    }
}
