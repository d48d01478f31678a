use std::fmt::Display;

use itertools::Itertools;

use super::is_functionally_satisfied;
use crate::basic_types::PropagationStatus;
use crate::engine::variables::FloatVar;
use crate::engine::variables::VarId;
use crate::math::rounding::*;
use crate::math::Interval;
use crate::math::MAX_PERIODIC_ARGUMENT;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;
use crate::propagators::nonlinear::DerivativeEngine;
use crate::propagators::nonlinear::DifferentiableRelation;
use crate::propagators::nonlinear::UnsupportedStructure;

/// An operand spanning at most this many lobes is narrowed to the exact union of its preimages;
/// wider operands only have their bounds narrowed.
const MAX_EXACT_LOBES: i64 = 8;
/// The number of lobes inspected from either end when only the bounds are narrowed.
const BOUND_SCAN_LOBES: i64 = 3;

/// The periodic functions, split into lobes `[(k + offset) * pi, (k + offset + 1) * pi]` on which
/// they are monotone.
#[derive(Clone, Copy, Debug)]
enum Periodic {
    Sine,
    Cosine,
    Tangent,
}

impl Periodic {
    fn lobe_offset(self) -> f64 {
        match self {
            Periodic::Sine | Periodic::Tangent => -0.5,
            Periodic::Cosine => 0.0,
        }
    }

    fn image(self, x: Interval) -> Interval {
        match self {
            Periodic::Sine => x.sin(),
            Periodic::Cosine => x.cos(),
            Periodic::Tangent => x.tan(),
        }
    }

    /// The values of lobe `k` which map into `values`.
    fn preimage(self, k: i64, values: Interval) -> Option<Interval> {
        let pi = Interval::new(PI_DOWN, PI_UP);
        let shift = Interval::point(k as f64).mul(pi);
        let even = k.rem_euclid(2) == 0;

        match self {
            Periodic::Sine => {
                // sin(k * pi + t) = (-1)^k * sin(t)
                let values = values.intersect(Interval::new(-1.0, 1.0))?;
                let principal = Interval::new(asin_down(values.lower()), asin_up(values.upper()));
                Some(shift.add(if even { principal } else { principal.neg() }))
            }
            Periodic::Cosine => {
                let values = values.intersect(Interval::new(-1.0, 1.0))?;
                let principal = Interval::new(acos_down(values.upper()), acos_up(values.lower()));
                if even {
                    Some(shift.add(principal))
                } else {
                    Some(Interval::point((k + 1) as f64).mul(pi).sub(principal))
                }
            }
            Periodic::Tangent => {
                let principal = Interval::new(atan_down(values.lower()), atan_up(values.upper()));
                Some(shift.add(principal))
            }
        }
    }

    /// Narrows the operand `p` to the values which map into `values`.
    fn narrow_operand(
        self,
        context: &mut PropagationContext<'_>,
        p: FloatVar,
        values: Interval,
    ) -> PropagationStatus {
        let x = context.float_bounds(p);
        if !x.is_bounded() || x.mag() > MAX_PERIODIC_ARGUMENT {
            return Ok(());
        }

        let slack = 1e-9 * x.mag().max(1.0);
        let first = ((x.lower() - slack) / PI_DOWN - self.lobe_offset()).floor() as i64;
        let last = ((x.upper() + slack) / PI_DOWN - self.lobe_offset()).floor() as i64;
        let piece = |k: i64| {
            self.preimage(k, values)
                .and_then(|preimage| preimage.intersect(x))
        };

        if last - first < MAX_EXACT_LOBES {
            let pieces = (first..=last).filter_map(piece).collect_vec();
            context.in_float_intervals(p, pieces)?;
            return Ok(());
        }

        let lower = (first..first + BOUND_SCAN_LOBES)
            .find_map(piece)
            .map_or(x.lower(), |piece| piece.lower());
        let upper = (last + 1 - BOUND_SCAN_LOBES..=last)
            .rev()
            .find_map(piece)
            .map_or(x.upper(), |piece| piece.upper());
        context.in_float_interval(p, Interval::new(lower, upper))?;
        Ok(())
    }

    fn propagate(
        self,
        context: &mut PropagationContext<'_>,
        p: FloatVar,
        r: FloatVar,
    ) -> PropagationStatus {
        loop {
            let changes = context.changes();

            let x = context.float_bounds(p);
            context.in_float_interval(r, self.image(x))?;
            let values = context.float_bounds(r);
            self.narrow_operand(context, p, values)?;

            if changes == context.changes() {
                return Ok(());
            }
        }
    }
}

/// The constraint `sin(p) = r`.
#[derive(Clone, Debug)]
pub struct SinPeqR {
    p: FloatVar,
    r: FloatVar,
}

impl SinPeqR {
    pub fn new(p: FloatVar, r: FloatVar) -> Self {
        SinPeqR { p, r }
    }
}

impl Constraint for SinPeqR {
    fn name(&self) -> &str {
        "SinPeqR"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.r.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        Periodic::Sine.propagate(context, self.p, self.r)
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        is_functionally_satisfied(domains, self)
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn as_differentiable(&self) -> Option<&dyn DifferentiableRelation> {
        Some(self)
    }
}

impl DifferentiableRelation for SinPeqR {
    fn output(&self) -> FloatVar {
        self.r
    }

    fn inputs(&self) -> Vec<FloatVar> {
        vec![self.p]
    }

    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval> {
        Some(inputs[0].sin())
    }

    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure> {
        let dp = engine.derivative(self.p, wrt)?;
        let cos = engine.cos(self.p);
        Ok(engine.mul(cos, dp))
    }
}

impl Display for SinPeqR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SinPeqR({}, {})", self.p, self.r)
    }
}

/// The constraint `cos(p) = r`.
#[derive(Clone, Debug)]
pub struct CosPeqR {
    p: FloatVar,
    r: FloatVar,
}

impl CosPeqR {
    pub fn new(p: FloatVar, r: FloatVar) -> Self {
        CosPeqR { p, r }
    }
}

impl Constraint for CosPeqR {
    fn name(&self) -> &str {
        "CosPeqR"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.r.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        Periodic::Cosine.propagate(context, self.p, self.r)
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        is_functionally_satisfied(domains, self)
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn as_differentiable(&self) -> Option<&dyn DifferentiableRelation> {
        Some(self)
    }
}

impl DifferentiableRelation for CosPeqR {
    fn output(&self) -> FloatVar {
        self.r
    }

    fn inputs(&self) -> Vec<FloatVar> {
        vec![self.p]
    }

    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval> {
        Some(inputs[0].cos())
    }

    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure> {
        let dp = engine.derivative(self.p, wrt)?;
        let sin = engine.sin(self.p);
        let negated = engine.scale(sin, -1.0)?;
        Ok(engine.mul(negated, dp))
    }
}

impl Display for CosPeqR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CosPeqR({}, {})", self.p, self.r)
    }
}

/// The constraint `tan(p) = r`.
#[derive(Clone, Debug)]
pub struct TanPeqR {
    p: FloatVar,
    r: FloatVar,
}

impl TanPeqR {
    pub fn new(p: FloatVar, r: FloatVar) -> Self {
        TanPeqR { p, r }
    }
}

impl Constraint for TanPeqR {
    fn name(&self) -> &str {
        "TanPeqR"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.r.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        Periodic::Tangent.propagate(context, self.p, self.r)
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        is_functionally_satisfied(domains, self)
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn as_differentiable(&self) -> Option<&dyn DifferentiableRelation> {
        Some(self)
    }
}

impl DifferentiableRelation for TanPeqR {
    fn output(&self) -> FloatVar {
        self.r
    }

    fn inputs(&self) -> Vec<FloatVar> {
        vec![self.p]
    }

    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval> {
        Some(inputs[0].tan())
    }

    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure> {
        // d tan(p) = (1 + tan(p)^2) dp
        let dp = engine.derivative(self.p, wrt)?;
        let square = engine.mul(self.r, self.r);
        let factor = engine.add_constant(square, 1.0)?;
        Ok(engine.mul(factor, dp))
    }
}

impl Display for TanPeqR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TanPeqR({}, {})", self.p, self.r)
    }
}
