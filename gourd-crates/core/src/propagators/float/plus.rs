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

/// Bounds consistent constraint `p + q = r`.
#[derive(Clone, Debug)]
pub struct PplusQeqR {
    p: FloatVar,
    q: FloatVar,
    r: FloatVar,
}

impl PplusQeqR {
    pub fn new(p: FloatVar, q: FloatVar, r: FloatVar) -> Self {
        PplusQeqR { p, q, r }
    }
}

impl Constraint for PplusQeqR {
    fn name(&self) -> &str {
        "PplusQeqR"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.q.id(), self.r.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        loop {
            let changes = context.changes();

            let (p, q) = (context.float_bounds(self.p), context.float_bounds(self.q));
            context.in_float_interval(self.r, p.add(q))?;
            let r = context.float_bounds(self.r);
            context.in_float_interval(self.p, r.sub(q))?;
            let p = context.float_bounds(self.p);
            context.in_float_interval(self.q, r.sub(p))?;

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

impl DifferentiableRelation for PplusQeqR {
    fn output(&self) -> FloatVar {
        self.r
    }

    fn inputs(&self) -> Vec<FloatVar> {
        vec![self.p, self.q]
    }

    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval> {
        Some(inputs[0].add(inputs[1]))
    }

    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure> {
        let dp = engine.derivative(self.p, wrt)?;
        let dq = engine.derivative(self.q, wrt)?;
        Ok(engine.add(dp, dq))
    }
}

impl Display for PplusQeqR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PplusQeqR({}, {}, {})", self.p, self.q, self.r)
    }
}

/// Bounds consistent constraint `p - q = r`.
#[derive(Clone, Debug)]
pub struct PminusQeqR {
    p: FloatVar,
    q: FloatVar,
    r: FloatVar,
}

impl PminusQeqR {
    pub fn new(p: FloatVar, q: FloatVar, r: FloatVar) -> Self {
        PminusQeqR { p, q, r }
    }
}

impl Constraint for PminusQeqR {
    fn name(&self) -> &str {
        "PminusQeqR"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.q.id(), self.r.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        loop {
            let changes = context.changes();

            let (p, q) = (context.float_bounds(self.p), context.float_bounds(self.q));
            context.in_float_interval(self.r, p.sub(q))?;
            let r = context.float_bounds(self.r);
            context.in_float_interval(self.p, r.add(q))?;
            let p = context.float_bounds(self.p);
            context.in_float_interval(self.q, p.sub(r))?;

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

impl DifferentiableRelation for PminusQeqR {
    fn output(&self) -> FloatVar {
        self.r
    }

    fn inputs(&self) -> Vec<FloatVar> {
        vec![self.p, self.q]
    }

    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval> {
        Some(inputs[0].sub(inputs[1]))
    }

    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure> {
        let dp = engine.derivative(self.p, wrt)?;
        let dq = engine.derivative(self.q, wrt)?;
        Ok(engine.sub(dp, dq))
    }
}

impl Display for PminusQeqR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PminusQeqR({}, {}, {})", self.p, self.q, self.r)
    }
}

/// Bounds consistent constraint `p + c = r`.
#[derive(Clone, Debug)]
pub struct PplusCeqR {
    p: FloatVar,
    c: f64,
    r: FloatVar,
}

impl PplusCeqR {
    pub fn new(p: FloatVar, c: f64, r: FloatVar) -> Result<Self, ModelConstructionError> {
        check_finite("PplusCeqR", c)?;
        Ok(PplusCeqR { p, c, r })
    }
}

impl Constraint for PplusCeqR {
    fn name(&self) -> &str {
        "PplusCeqR"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.r.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        let c = Interval::point(self.c);
        loop {
            let changes = context.changes();

            let p = context.float_bounds(self.p);
            context.in_float_interval(self.r, p.add(c))?;
            let r = context.float_bounds(self.r);
            context.in_float_interval(self.p, r.sub(c))?;

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

impl DifferentiableRelation for PplusCeqR {
    fn output(&self) -> FloatVar {
        self.r
    }

    fn inputs(&self) -> Vec<FloatVar> {
        vec![self.p]
    }

    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval> {
        Some(inputs[0].add(Interval::point(self.c)))
    }

    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure> {
        engine.derivative(self.p, wrt)
    }
}

impl Display for PplusCeqR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PplusCeqR({}, {}, {})", self.p, self.c, self.r)
    }
}
