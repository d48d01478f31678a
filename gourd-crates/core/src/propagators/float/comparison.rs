use std::fmt::Display;

use super::check_finite;
use crate::basic_types::ModelConstructionError;
use crate::basic_types::PropagationStatus;
use crate::engine::domains::DomainEvent;
use crate::engine::variables::FloatVar;
use crate::engine::variables::VarId;
use crate::math::rounding;
use crate::math::Interval;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::PrimitiveConstraint;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;
use crate::propagators::nonlinear::DerivativeEngine;
use crate::propagators::nonlinear::DifferentiableRelation;
use crate::propagators::nonlinear::UnsupportedStructure;

/// The constraint `p = c`, where `c` is snapped outward onto the rounding grid.
#[derive(Clone, Debug)]
pub struct PeqC {
    p: FloatVar,
    c: f64,
}

impl PeqC {
    pub fn new(p: FloatVar, c: f64) -> Result<Self, ModelConstructionError> {
        check_finite("PeqC", c)?;
        Ok(PeqC { p, c })
    }

    fn snapped(&self) -> Interval {
        Interval::new(rounding::down(self.c), rounding::up(self.c))
    }
}

impl Constraint for PeqC {
    fn name(&self) -> &str {
        "PeqC"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        context.in_float_interval(self.p, self.snapped())?;
        Ok(())
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        domains.float_bounds(self.p).is_subset_of(self.snapped())
    }

    fn priority(&self) -> Priority {
        Priority::High
    }
}

impl PrimitiveConstraint for PeqC {
    fn not_consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        let snapped = self.snapped();
        context.in_float_complement(self.p, snapped.lower(), snapped.upper())?;
        Ok(())
    }

    fn not_satisfied(&self, domains: &Domains<'_>) -> bool {
        !domains.float_domain(self.p).contains(self.c)
    }
}

impl Display for PeqC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PeqC({}, {})", self.p, self.c)
    }
}

/// The constraint `q = p`; as a function it defines `q`.
#[derive(Clone, Debug)]
pub struct PeqQ {
    p: FloatVar,
    q: FloatVar,
}

impl PeqQ {
    pub fn new(p: FloatVar, q: FloatVar) -> Self {
        PeqQ { p, q }
    }
}

impl Constraint for PeqQ {
    fn name(&self) -> &str {
        "PeqQ"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.q.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        let p = context.float_domain(self.p).clone();
        context.in_float_domain(self.q, &p)?;
        let q = context.float_domain(self.q).clone();
        context.in_float_domain(self.p, &q)?;
        Ok(())
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        super::is_functionally_satisfied(domains, self)
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn as_differentiable(&self) -> Option<&dyn DifferentiableRelation> {
        Some(self)
    }
}

impl PrimitiveConstraint for PeqQ {
    fn not_consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        if context.is_ground(self.p.id()) {
            let p = context.float_bounds(self.p);
            context.in_float_complement(self.q, p.lower(), p.upper())?;
        }
        if context.is_ground(self.q.id()) {
            let q = context.float_bounds(self.q);
            context.in_float_complement(self.p, q.lower(), q.upper())?;
        }
        Ok(())
    }

    fn not_satisfied(&self, domains: &Domains<'_>) -> bool {
        domains
            .float_domain(self.p)
            .intersect(domains.float_domain(self.q))
            .is_none()
    }

    fn not_consistency_pruning_event(&self, _var: VarId) -> DomainEvent {
        DomainEvent::Ground
    }
}

impl DifferentiableRelation for PeqQ {
    fn output(&self) -> FloatVar {
        self.q
    }

    fn inputs(&self) -> Vec<FloatVar> {
        vec![self.p]
    }

    fn evaluate(&self, inputs: &[Interval]) -> Option<Interval> {
        Some(inputs[0])
    }

    fn differentiate(
        &self,
        wrt: FloatVar,
        engine: &mut DerivativeEngine<'_>,
    ) -> Result<FloatVar, UnsupportedStructure> {
        engine.derivative(self.p, wrt)
    }
}

impl Display for PeqQ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PeqQ({}, {})", self.p, self.q)
    }
}

/// The constraint `p <= q`.
#[derive(Clone, Debug)]
pub struct PlteqQ {
    p: FloatVar,
    q: FloatVar,
}

impl PlteqQ {
    pub fn new(p: FloatVar, q: FloatVar) -> Self {
        PlteqQ { p, q }
    }
}

/// Narrows to `lhs <= rhs`, where `strict` lowers the bound on `lhs` by one ulp.
fn propagate_less_or_equal(
    context: &mut PropagationContext<'_>,
    lhs: FloatVar,
    rhs: FloatVar,
    strict: bool,
) -> PropagationStatus {
    let rhs_upper = context.float_bounds(rhs).upper();
    let lhs_lower = context.float_bounds(lhs).lower();
    if strict {
        context.in_float_max(lhs, rounding::next_down(rhs_upper))?;
        context.in_float_min(rhs, rounding::next_up(lhs_lower))?;
    } else {
        context.in_float_max(lhs, rhs_upper)?;
        context.in_float_min(rhs, lhs_lower)?;
    }
    Ok(())
}

impl Constraint for PlteqQ {
    fn name(&self) -> &str {
        "PlteqQ"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.q.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_less_or_equal(context, self.p, self.q, false)
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        domains.float_bounds(self.p).upper() <= domains.float_bounds(self.q).lower()
    }

    fn priority(&self) -> Priority {
        Priority::High
    }
}

impl PrimitiveConstraint for PlteqQ {
    /// On the reals the negation `p > q` is narrowed as its closure `q <= p`.
    fn not_consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_less_or_equal(context, self.q, self.p, false)
    }

    fn not_satisfied(&self, domains: &Domains<'_>) -> bool {
        self.satisfied(domains)
    }
}

impl Display for PlteqQ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PlteqQ({}, {})", self.p, self.q)
    }
}

/// The constraint `p < q`.
#[derive(Clone, Debug)]
pub struct PltQ {
    p: FloatVar,
    q: FloatVar,
}

impl PltQ {
    pub fn new(p: FloatVar, q: FloatVar) -> Self {
        PltQ { p, q }
    }
}

impl Constraint for PltQ {
    fn name(&self) -> &str {
        "PltQ"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.q.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_less_or_equal(context, self.p, self.q, true)
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        domains.float_bounds(self.p).upper() < domains.float_bounds(self.q).lower()
    }

    fn priority(&self) -> Priority {
        Priority::High
    }
}

impl PrimitiveConstraint for PltQ {
    fn not_consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_less_or_equal(context, self.q, self.p, false)
    }

    fn not_satisfied(&self, domains: &Domains<'_>) -> bool {
        self.satisfied(domains)
    }
}

impl Display for PltQ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PltQ({}, {})", self.p, self.q)
    }
}
