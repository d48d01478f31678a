use std::fmt::Display;

use super::is_functionally_satisfied;
use crate::basic_types::PropagationStatus;
use crate::engine::variables::FloatVar;
use crate::engine::variables::VarId;
use crate::math::Interval;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;
use crate::propagators::nonlinear::DerivativeEngine;
use crate::propagators::nonlinear::DifferentiableRelation;
use crate::propagators::nonlinear::UnsupportedStructure;

/// The constraint `p / q = r`, propagated as `p = r * q`.
///
/// A divisor which is exactly zero has no quotient, so it fails unless the dividend may be zero
/// too, in which case nothing is known about the quotient.
#[derive(Clone, Debug)]
pub struct PdivQeqR {
    p: FloatVar,
    q: FloatVar,
    r: FloatVar,
}

impl PdivQeqR {
    pub fn new(p: FloatVar, q: FloatVar, r: FloatVar) -> Self {
        PdivQeqR { p, q, r }
    }
}

impl Constraint for PdivQeqR {
    fn name(&self) -> &str {
        "PdivQeqR"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.q.id(), self.r.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        loop {
            let changes = context.changes();

            let (p, q) = (context.float_bounds(self.p), context.float_bounds(self.q));
            context.in_float_intervals(self.r, p.div_relational(q))?;
            let r = context.float_bounds(self.r);
            context.in_float_interval(self.p, r.mul(q))?;
            let p = context.float_bounds(self.p);
            context.in_float_intervals(self.q, p.div_relational(r))?;

            if changes == context.changes() {
                return Ok(());
            }
        }
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        !domains.float_bounds(self.q).contains_zero() && is_functionally_satisfied(domains, self)
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn as_differentiable(&self) -> Option<&dyn DifferentiableRelation> {
        Some(self)
    }
}

impl DifferentiableRelation for PdivQeqR {
    fn output(&self) -> FloatVar {
        self.r
    }

    fn inputs(&self) -> Vec<FloatVar> {
        vec![self.p, self.q]
    }

    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval> {
        inputs[0].div(inputs[1])
    }

    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure> {
        // d(p / q) = (dp - r * dq) / q
        let dp = engine.derivative(self.p, wrt)?;
        let dq = engine.derivative(self.q, wrt)?;
        let r_dq = engine.mul(self.r, dq);
        let numerator = engine.sub(dp, r_dq);
        Ok(engine.div(numerator, self.q))
    }
}

impl Display for PdivQeqR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PdivQeqR({}, {}, {})", self.p, self.q, self.r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Inconsistency;
    use crate::engine::test_store::TestStore;

    #[test]
    fn quotient_of_positive_operands() {
        let mut store = TestStore::default();
        let p = store.new_float_variable(6.0, 8.0);
        let q = store.new_float_variable(2.0, 4.0);
        let r = store.new_float_variable(-100.0, 100.0);

        let _ = store
            .new_constraint(PdivQeqR::new(p, q, r))
            .expect("no empty domains");

        store.assert_float_bounds(r, 1.5, 4.0, 1e-9);
    }

    #[test]
    fn divisor_around_zero_splits_the_quotient() {
        let mut store = TestStore::default();
        let p = store.new_float_variable(1.0, 2.0);
        let q = store.new_float_variable(-1.0, 1.0);
        let r = store.new_float_variable(-10.0, 10.0);

        let _ = store
            .new_constraint(PdivQeqR::new(p, q, r))
            .expect("no empty domains");

        let domain = store.float_domain(r).clone();
        assert_eq!(2, domain.intervals().len());
        assert!(!domain.contains(0.5));
        assert!(domain.contains(1.0));
        assert!(domain.contains(-1.0));
    }

    #[test]
    fn zero_divisor_fails_for_non_zero_dividend() {
        let mut store = TestStore::default();
        let p = store.new_float_variable(1.0, 2.0);
        let q = store.new_float_variable(0.0, 0.0);
        let r = store.new_float_variable(-10.0, 10.0);

        let result = store.new_constraint(PdivQeqR::new(p, q, r));
        assert_eq!(Some(Inconsistency::EmptyDomain), result.err());
    }

    #[test]
    fn quotient_narrows_the_divisor() {
        let mut store = TestStore::default();
        let p = store.new_float_variable(6.0, 6.0);
        let q = store.new_float_variable(-100.0, 100.0);
        let r = store.new_float_variable(2.0, 3.0);

        let _ = store
            .new_constraint(PdivQeqR::new(p, q, r))
            .expect("no empty domains");

        store.assert_float_bounds(q, 2.0, 3.0, 1e-9);
    }
}
