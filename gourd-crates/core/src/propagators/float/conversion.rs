use std::fmt::Display;

use itertools::Itertools;

use crate::basic_types::PropagationStatus;
use crate::engine::variables::FloatVar;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarId;
use crate::math::Interval;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// The smallest and largest integers in `[lower, upper]`; saturates for infinite bounds.
fn integer_bounds(bounds: Interval) -> (i64, i64) {
    (bounds.lower().ceil() as i64, bounds.upper().floor() as i64)
}

/// The constraint `x = p` between an integer and a float variable.
#[derive(Clone, Debug)]
pub struct XeqP {
    x: IntVar,
    p: FloatVar,
}

impl XeqP {
    pub fn new(x: IntVar, p: FloatVar) -> Self {
        XeqP { x, p }
    }
}

impl Constraint for XeqP {
    fn name(&self) -> &str {
        "XeqP"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.x.id(), self.p.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        loop {
            let changes = context.changes();

            let (lower, upper) = integer_bounds(context.float_bounds(self.p));
            context.in_int(self.x, lower, upper)?;
            let pieces = context
                .int_domain(self.x)
                .intervals()
                .into_iter()
                .map(|interval| Interval::new(f64::from(interval.min), f64::from(interval.max)))
                .collect_vec();
            context.in_float_intervals(self.p, pieces)?;

            if changes == context.changes() {
                return Ok(());
            }
        }
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        domains.fixed_value(self.x).is_some_and(|value| {
            domains.is_ground(self.p.id()) && domains.float_domain(self.p).contains(f64::from(value))
        })
    }

    fn priority(&self) -> Priority {
        Priority::High
    }
}

impl Display for XeqP {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "XeqP({}, {})", self.x, self.p)
    }
}

/// The constraint `x = round(p)`, where `x` is the integer nearest to `p`. At a tie both
/// neighbouring integers are accepted.
#[derive(Clone, Debug)]
pub struct RoundPeqX {
    p: FloatVar,
    x: IntVar,
}

impl RoundPeqX {
    pub fn new(p: FloatVar, x: IntVar) -> Self {
        RoundPeqX { p, x }
    }
}

impl Constraint for RoundPeqX {
    fn name(&self) -> &str {
        "RoundPeqX"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.p.id(), self.x.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        let half = Interval::new(-0.5, 0.5);
        loop {
            let changes = context.changes();

            let (lower, upper) = integer_bounds(context.float_bounds(self.p).add(half));
            context.in_int(self.x, lower, upper)?;
            let pieces = context
                .int_domain(self.x)
                .intervals()
                .into_iter()
                .map(|interval| {
                    Interval::new(f64::from(interval.min), f64::from(interval.max)).add(half)
                })
                .collect_vec();
            context.in_float_intervals(self.p, pieces)?;

            if changes == context.changes() {
                return Ok(());
            }
        }
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        let Some(value) = domains.fixed_value(self.x) else {
            return false;
        };
        let value = f64::from(value);
        domains
            .float_bounds(self.p)
            .is_subset_of(Interval::new(value - 0.5, value + 0.5))
    }

    fn priority(&self) -> Priority {
        Priority::High
    }
}

impl Display for RoundPeqX {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RoundPeqX({}, {})", self.p, self.x)
    }
}
