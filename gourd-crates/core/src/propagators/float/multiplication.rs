use std::fmt::Display;

use super::check_finite;
use super::is_functionally_satisfied;
use crate::basic_types::ModelConstructionError;
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

/// The constraint `p * q = r`.
///
/// A factor is narrowed to the relational quotient of `r` by the other factor, which can split it
/// into two pieces when the other factor contains zero.
#[derive(Clone, Debug)]
pub struct PmulQeqR {
    p: FloatVar,
    q: FloatVar,
    r: FloatVar,
}

impl PmulQeqR {
    pub fn new(p: FloatVar, q: FloatVar, r: FloatVar) -> Self {
        PmulQeqR { p, q, r }
    }
}

impl Constraint for PmulQeqR {
    fn name(&self) -> &str {
        "PmulQeqR"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.q.id(), self.r.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        loop {
            let changes = context.changes();

            let (p, q) = (context.float_bounds(self.p), context.float_bounds(self.q));
            context.in_float_interval(self.r, p.mul(q))?;
            let r = context.float_bounds(self.r);
            context.in_float_intervals(self.p, r.div_relational(q))?;
            let p = context.float_bounds(self.p);
            context.in_float_intervals(self.q, r.div_relational(p))?;

            if changes == context.changes() {
                return Ok(());
            }
        }
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        is_functionally_satisfied(domains, self)
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn as_differentiable(&self) -> Option<&dyn DifferentiableRelation> {
        Some(self)
    }
}

impl DifferentiableRelation for PmulQeqR {
    fn output(&self) -> FloatVar {
        self.r
    }

    fn inputs(&self) -> Vec<FloatVar> {
        vec![self.p, self.q]
    }

    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval> {
        Some(inputs[0].mul(inputs[1]))
    }

    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure> {
        // d(pq) = dp * q + p * dq
        let dp = engine.derivative(self.p, wrt)?;
        let dq = engine.derivative(self.q, wrt)?;
        let left = engine.mul(dp, self.q);
        let right = engine.mul(self.p, dq);
        Ok(engine.add(left, right))
    }
}

impl Display for PmulQeqR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PmulQeqR({}, {}, {})", self.p, self.q, self.r)
    }
}

/// The constraint `p * c = r`.
#[derive(Clone, Debug)]
pub struct PmulCeqR {
    p: FloatVar,
    c: f64,
    r: FloatVar,
}

impl PmulCeqR {
    pub fn new(p: FloatVar, c: f64, r: FloatVar) -> Result<Self, ModelConstructionError> {
        check_finite("PmulCeqR", c)?;
        Ok(PmulCeqR { p, c, r })
    }
}

impl Constraint for PmulCeqR {
    fn name(&self) -> &str {
        "PmulCeqR"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.r.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        if self.c == 0.0 {
            context.in_float_interval(self.r, Interval::point(0.0))?;
            return Ok(());
        }

        let c = Interval::point(self.c);
        loop {
            let changes = context.changes();

            let p = context.float_bounds(self.p);
            context.in_float_interval(self.r, p.scale(self.c))?;
            let r = context.float_bounds(self.r);
            if let Some(quotient) = r.div(c) {
                context.in_float_interval(self.p, quotient)?;
            }

            if changes == context.changes() {
                return Ok(());
            }
        }
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        is_functionally_satisfied(domains, self)
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn as_differentiable(&self) -> Option<&dyn DifferentiableRelation> {
        Some(self)
    }
}

impl DifferentiableRelation for PmulCeqR {
    fn output(&self) -> FloatVar {
        self.r
    }

    fn inputs(&self) -> Vec<FloatVar> {
        vec![self.p]
    }

    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval> {
        Some(inputs[0].scale(self.c))
    }

    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure> {
        let dp = engine.derivative(self.p, wrt)?;
        engine.scale(dp, self.c)
    }
}

impl Display for PmulCeqR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PmulCeqR({}, {}, {})", self.p, self.c, self.r)
    }
}
