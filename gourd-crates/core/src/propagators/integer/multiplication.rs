use std::fmt::Display;

use super::bounds;
use crate::basic_types::PropagationStatus;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarId;
use crate::math::NumExt;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// The constraint `x * y = z`, maintained with bounds consistency.
#[derive(Clone, Debug)]
pub struct XmulYeqZ {
    x: IntVar,
    y: IntVar,
    z: IntVar,
}

impl XmulYeqZ {
    pub fn new(x: IntVar, y: IntVar, z: IntVar) -> Self {
        XmulYeqZ { x, y, z }
    }
}

impl Constraint for XmulYeqZ {
    fn name(&self) -> &str {
        "XmulYeqZ"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.x.id(), self.y.id(), self.z.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        loop {
            let changes = context.changes();

            let (z_min, z_max) = product_bounds(bounds(context, self.x), bounds(context, self.y));
            context.in_int(self.z, z_min, z_max)?;

            narrow_factor(context, self.x, self.y, self.z)?;
            narrow_factor(context, self.y, self.x, self.z)?;

            if changes == context.changes() {
                return Ok(());
            }
        }
    }

    fn satisfied(&self, domains: &Domains<'_>) -> bool {
        match (
            domains.fixed_value(self.x),
            domains.fixed_value(self.y),
            domains.fixed_value(self.z),
        ) {
            (Some(x), Some(y), Some(z)) => i64::from(x) * i64::from(y) == i64::from(z),
            _ => false,
        }
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }
}

/// Narrows `factor` using `factor * other = product`.
fn narrow_factor(
    context: &mut PropagationContext<'_>,
    factor: IntVar,
    other: IntVar,
    product: IntVar,
) -> PropagationStatus {
    let (p_min, p_max) = bounds(context, product);
    let (o_min, o_max) = bounds(context, other);

    if p_min <= 0 && 0 <= p_max && o_min <= 0 && 0 <= o_max {
        // 0 * anything is a valid product
        return Ok(());
    }

    // a zero product with a non-zero other factor
    if !(o_min <= 0 && 0 <= o_max) && p_min == 0 && p_max == 0 {
        context.in_int_value(factor, 0)?;
        return Ok(());
    }

    // the quotient over the negative and positive parts of the other factor, zero excluded
    let parts = [(o_min, o_max.min(-1)), (o_min.max(1), o_max)];
    let mut lower = i64::MAX;
    let mut upper = i64::MIN;
    for (part_min, part_max) in parts {
        if part_min > part_max {
            continue;
        }
        let (q_min, q_max) = quotient_bounds((p_min, p_max), (part_min, part_max));
        lower = lower.min(q_min);
        upper = upper.max(q_max);
    }

    // an empty range when the other factor can only be zero
    context.in_int(factor, lower, upper)?;
    Ok(())
}

fn product_bounds(a: (i64, i64), b: (i64, i64)) -> (i64, i64) {
    let products = [a.0 * b.0, a.0 * b.1, a.1 * b.0, a.1 * b.1];
    (
        products.iter().copied().min().unwrap_or(i64::MIN),
        products.iter().copied().max().unwrap_or(i64::MAX),
    )
}

/// The integer bounds of `n / d` for `n` and `d` in the given ranges, where `d` excludes zero.
fn quotient_bounds(n: (i64, i64), d: (i64, i64)) -> (i64, i64) {
    let corners = [(n.0, d.0), (n.0, d.1), (n.1, d.0), (n.1, d.1)];
    let lower = corners
        .iter()
        .map(|&(a, b)| a.ceil_div(b))
        .min()
        .unwrap_or(i64::MIN);
    let upper = corners
        .iter()
        .map(|&(a, b)| a.floor_div(b))
        .max()
        .unwrap_or(i64::MAX);
    (lower, upper)
}

impl Display for XmulYeqZ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "XmulYeqZ({}, {}, {})", self.x, self.y, self.z)
    }
}
