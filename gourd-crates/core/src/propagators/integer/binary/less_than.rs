use std::fmt::Display;

use crate::basic_types::PropagationStatus;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarId;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::PrimitiveConstraint;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// The constraint `x < y`.
#[derive(Clone, Debug)]
pub struct XltY {
    x: IntVar,
    y: IntVar,
}

/// The constraint `x <= y`.
#[derive(Clone, Debug)]
pub struct XlteqY {
    x: IntVar,
    y: IntVar,
}

impl XltY {
    pub fn new(x: IntVar, y: IntVar) -> Self {
        XltY { x, y }
    }
}

impl XlteqY {
    pub fn new(x: IntVar, y: IntVar) -> Self {
        XlteqY { x, y }
    }
}

/// Enforces `x + offset <= y`.
fn propagate_offset_less_or_equal(
    context: &mut PropagationContext<'_>,
    x: IntVar,
    y: IntVar,
    offset: i64,
) -> PropagationStatus {
    context.in_int_max(x, i64::from(context.upper_bound(y)) - offset)?;
    context.in_int_min(y, i64::from(context.lower_bound(x)) + offset)?;
    Ok(())
}

fn holds(domains: &Domains<'_>, x: IntVar, y: IntVar, offset: i64) -> bool {
    i64::from(domains.upper_bound(x)) + offset <= i64::from(domains.lower_bound(y))
}

fn violated(domains: &Domains<'_>, x: IntVar, y: IntVar, offset: i64) -> bool {
    i64::from(domains.lower_bound(x)) + offset > i64::from(domains.upper_bound(y))
}

impl Constraint for XltY {
    fn name(&self) -> &str {
        "XltY"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.x.id(), self.y.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_offset_less_or_equal(context, self.x, self.y, 1)
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        holds(domains, self.x, self.y, 1)
    }

    fn priority(&self) -> Priority {
        Priority::High
    }
}

impl PrimitiveConstraint for XltY {
    // not x < y is y <= x
    fn not_consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_offset_less_or_equal(context, self.y, self.x, 0)
    }

    fn not_satisfied(&self, domains: &Domains<'_>) -> bool {
        violated(domains, self.x, self.y, 1)
    }
}

impl Constraint for XlteqY {
    fn name(&self) -> &str {
        "XlteqY"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.x.id(), self.y.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_offset_less_or_equal(context, self.x, self.y, 0)
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        holds(domains, self.x, self.y, 0)
    }

    fn priority(&self) -> Priority {
        Priority::High
    }
}

impl PrimitiveConstraint for XlteqY {
    // not x <= y is y < x
    fn not_consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        propagate_offset_less_or_equal(context, self.y, self.x, 1)
    }

    fn not_satisfied(&self, domains: &Domains<'_>) -> bool {
        violated(domains, self.x, self.y, 0)
    }
}

impl Display for XltY {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "XltY({}, {})", self.x, self.y)
    }
}

impl Display for XlteqY {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "XlteqY({}, {})", self.x, self.y)
    }
}
