use std::fmt::Display;

use super::bounds;
use crate::basic_types::PropagationStatus;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarId;
use crate::propagation::Constraint;
use crate::propagation::Domains;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// The constraint `x / y = z`, where the division truncates towards zero and `y` is never zero.
#[derive(Clone, Debug)]
pub struct XdivYeqZ {
    x: IntVar,
    y: IntVar,
    z: IntVar,
}

impl XdivYeqZ {
    pub fn new(x: IntVar, y: IntVar, z: IntVar) -> Self {
        XdivYeqZ { x, y, z }
    }
}

impl Constraint for XdivYeqZ {
    fn name(&self) -> &str {
        "XdivYeqZ"
    }

    fn scope(&self) -> Vec<VarId> {
        vec![self.x.id(), self.y.id(), self.z.id()]
    }

    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus {
        context.in_int_complement(self.y, 0)?;

        loop {
            let changes = context.changes();

            let (x_min, x_max) = bounds(context, self.x);
            let (y_min, y_max) = bounds(context, self.y);

            // the quotient is monotone in x for a fixed sign of y, so its extremes lie at corners
            let mut lower = i64::MAX;
            let mut upper = i64::MIN;
            for (part_min, part_max) in [(y_min, y_max.min(-1)), (y_min.max(1), y_max)] {
                if part_min > part_max {
                    continue;
                }
                for (a, b) in [
                    (x_min, part_min),
                    (x_min, part_max),
                    (x_max, part_min),
                    (x_max, part_max),
                ] {
                    lower = lower.min(a / b);
                    upper = upper.max(a / b);
                }
            }
            context.in_int(self.z, lower, upper)?;

            let (z_min, z_max) = bounds(context, self.z);
            let mut lower = i64::MAX;
            let mut upper = i64::MIN;
            if y_max >= 1 {
                let (l, u) = dividend_bounds((z_min, z_max), (y_min.max(1), y_max));
                lower = lower.min(l);
                upper = upper.max(u);
            }
            if y_min <= -1 {
                // x / y = z is x / -y = -z
                let (l, u) = dividend_bounds((-z_max, -z_min), (-y_max.min(-1), -y_min));
                lower = lower.min(l);
                upper = upper.max(u);
            }
            context.in_int(self.x, lower, upper)?;

            // |y| <= |x| / |z| when z excludes zero
            if z_min > 0 || z_max < 0 {
                let z_magnitude = z_min.abs().min(z_max.abs());
                let (x_min, x_max) = bounds(context, self.x);
                let limit = x_min.abs().max(x_max.abs()) / z_magnitude;
                context.in_int(self.y, -limit, limit)?;
            }

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
            (Some(x), Some(y), Some(z)) => y != 0 && i64::from(x) / i64::from(y) == i64::from(z),
            _ => false,
        }
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }
}

/// The range of `x` with `x / y = z` for `z` and a positive `y` in the given ranges.
///
/// For a fixed sign of `z` the range is bilinear in `z` and `y`, so it is enough to consider the
/// corners of every sign region.
fn dividend_bounds(z: (i64, i64), y: (i64, i64)) -> (i64, i64) {
    let mut lower = i64::MAX;
    let mut upper = i64::MIN;
    for q in [z.0, z.1, -1, 0, 1] {
        if q < z.0 || q > z.1 {
            continue;
        }
        for d in [y.0, y.1] {
            let (l, u) = match q.signum() {
                1 => (q * d, q * d + d - 1),
                -1 => (q * d - d + 1, q * d),
                _ => (1 - d, d - 1),
            };
            lower = lower.min(l);
            upper = upper.max(u);
        }
    }
    (lower, upper)
}

impl Display for XdivYeqZ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "XdivYeqZ({}, {}, {})", self.x, self.y, self.z)
    }
}
