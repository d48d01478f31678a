use std::fmt::Display;

use super::is_functionally_satisfied;
use super::non_negative;
use crate::basic_types::EmptyDomain;
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

/// The constraint `exp(p) = r`.
#[derive(Clone, Debug)]
pub struct ExpPeqR {
    p: FloatVar,
    r: FloatVar,
}

impl ExpPeqR {
    pub fn new(p: FloatVar, r: FloatVar) -> Self {
        ExpPeqR { p, r }
    }
}

impl Constraint for ExpPeqR {
    fn name(&self) -> &str {
        "ExpPeqR"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.r.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        loop {
            let changes = context.changes();

            let p = context.float_bounds(self.p);
            context.in_float_interval(self.r, p.exp())?;
            // the exponential is never zero, so a logarithm must exist
            let logarithm = context.float_bounds(self.r).ln().ok_or(EmptyDomain)?;
            context.in_float_interval(self.p, logarithm)?;

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

impl DifferentiableRelation for ExpPeqR {
    fn output(&self) -> FloatVar {
        self.r
    }

    fn inputs(&self) -> Vec<FloatVar> {
        vec![self.p]
    }

    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval> {
        Some(inputs[0].exp())
    }

    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure> {
        let dp = engine.derivative(self.p, wrt)?;
        Ok(engine.mul(self.r, dp))
    }
}

impl Display for ExpPeqR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExpPeqR({}, {})", self.p, self.r)
    }
}

/// The constraint `ln(p) = r`.
#[derive(Clone, Debug)]
pub struct LnPeqR {
    p: FloatVar,
    r: FloatVar,
}

impl LnPeqR {
    pub fn new(p: FloatVar, r: FloatVar) -> Self {
        LnPeqR { p, r }
    }
}

impl Constraint for LnPeqR {
    fn name(&self) -> &str {
        "LnPeqR"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.r.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        context.in_float_interval(self.p, non_negative())?;
        loop {
            let changes = context.changes();

            let logarithm = context.float_bounds(self.p).ln().ok_or(EmptyDomain)?;
            context.in_float_interval(self.r, logarithm)?;
            let r = context.float_bounds(self.r);
            context.in_float_interval(self.p, r.exp())?;

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

impl DifferentiableRelation for LnPeqR {
    fn output(&self) -> FloatVar {
        self.r
    }

    fn inputs(&self) -> Vec<FloatVar> {
        vec![self.p]
    }

    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval> {
        inputs[0].ln()
    }

    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure> {
        let dp = engine.derivative(self.p, wrt)?;
        Ok(engine.div(dp, self.p))
    }
}

impl Display for LnPeqR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LnPeqR({}, {})", self.p, self.r)
    }
}

/// The constraint `sqrt(p) = r`, where `r` is the non-negative root.
#[derive(Clone, Debug)]
pub struct SqrtPeqR {
    p: FloatVar,
    r: FloatVar,
}

impl SqrtPeqR {
    pub fn new(p: FloatVar, r: FloatVar) -> Self {
        SqrtPeqR { p, r }
    }
}

impl Constraint for SqrtPeqR {
    fn name(&self) -> &str {
        "SqrtPeqR"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.r.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        context.in_float_interval(self.p, non_negative())?;
        context.in_float_interval(self.r, non_negative())?;
        loop {
            let changes = context.changes();

            let root = context.float_bounds(self.p).sqrt().ok_or(EmptyDomain)?;
            context.in_float_interval(self.r, root)?;
            let r = context.float_bounds(self.r);
            context.in_float_interval(self.p, r.sqr())?;

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

impl DifferentiableRelation for SqrtPeqR {
    fn output(&self) -> FloatVar {
        self.r
    }

    fn inputs(&self) -> Vec<FloatVar> {
        vec![self.p]
    }

    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval> {
        inputs[0].sqrt()
    }

    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure> {
        // d sqrt(p) = dp / (2 r)
        let dp = engine.derivative(self.p, wrt)?;
        let twice = engine.scale(self.r, 2.0)?;
        Ok(engine.div(dp, twice))
    }
}

impl Display for SqrtPeqR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqrtPeqR({}, {})", self.p, self.r)
    }
}
