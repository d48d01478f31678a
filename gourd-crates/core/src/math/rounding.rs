//! Directed rounding of doubles.
//!
//! Every function suffixed `_down` returns a double which is guaranteed to be at most the exact
//! real result, every `_up` function one which is at least the exact result. Results are finally
//! snapped onto the rounding grid of the active [`FloatPrecision`](super::FloatPrecision), which
//! clears the low `rounding_bits` bits of the mantissa.
//!
//! The basic operations (`+`, `-`, `*`, `/`, `sqrt`) detect whether the hardware result is exact
//! through error-free transformations and only step outward when it is not. Library functions
//! such as `sin` or `exp` carry no such guarantee, so their results are widened by a fixed number
//! of units in the last place.

use super::float_precision;

/// The number of ulps by which results of library functions are widened.
const LIBRARY_ULPS: usize = 2;

/// Below this magnitude products and quotients may have lost bits to gradual underflow, which the
/// error-free transformations cannot detect.
const UNDERFLOW_GUARD: f64 = 1e-290;

/// The smallest double strictly larger than `x`.
pub fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// The largest double strictly smaller than `x`.
pub fn next_down(x: f64) -> f64 {
    -next_up(-x)
}

fn steps_up(x: f64, steps: usize) -> f64 {
    (0..steps).fold(x, |value, _| next_up(value))
}

fn steps_down(x: f64, steps: usize) -> f64 {
    (0..steps).fold(x, |value, _| next_down(value))
}

/// Round `x` down onto the grid of doubles whose low `bits` mantissa bits are zero.
pub(crate) fn down_with(x: f64, bits: u32) -> f64 {
    if bits == 0 || !x.is_finite() {
        return x;
    }
    if x < 0.0 {
        return -up_with(-x, bits);
    }
    let mask = (1_u64 << bits) - 1;
    f64::from_bits(x.to_bits() & !mask)
}

/// Round `x` up onto the grid of doubles whose low `bits` mantissa bits are zero.
pub(crate) fn up_with(x: f64, bits: u32) -> f64 {
    if bits == 0 || !x.is_finite() {
        return x;
    }
    if x < 0.0 {
        return -down_with(-x, bits);
    }
    let mask = (1_u64 << bits) - 1;
    let raw = x.to_bits();
    if raw & mask == 0 {
        x
    } else {
        // Carrying into the exponent keeps the order of the representation, and the largest
        // carry lands exactly on the pattern of infinity.
        f64::from_bits((raw & !mask) + (1_u64 << bits))
    }
}

/// Round `x` down onto the active rounding grid. Idempotent on grid values.
pub fn down(x: f64) -> f64 {
    down_with(x, float_precision().rounding_bits)
}

/// Round `x` up onto the active rounding grid. Idempotent on grid values.
pub fn up(x: f64) -> f64 {
    up_with(x, float_precision().rounding_bits)
}

/// The error of the rounded sum `s = a + b`, such that `a + b = s + e` exactly.
fn two_sum(a: f64, b: f64, s: f64) -> f64 {
    let bb = s - a;
    (a - (s - bb)) + (b - bb)
}

/// Sign of the exact sum minus the rounded sum, or `None` if the sum overflowed.
fn sum_error(a: f64, b: f64, s: f64) -> Option<f64> {
    if s.is_finite() {
        Some(two_sum(a, b, s))
    } else if a.is_finite() && b.is_finite() {
        None
    } else {
        Some(0.0)
    }
}

pub fn add_down(a: f64, b: f64) -> f64 {
    let s = a + b;
    if s.is_nan() {
        return f64::NEG_INFINITY;
    }
    match sum_error(a, b, s) {
        None if s > 0.0 => down(f64::MAX),
        None => s,
        Some(e) if e < 0.0 => down(next_down(s)),
        Some(_) => down(s),
    }
}

pub fn add_up(a: f64, b: f64) -> f64 {
    let s = a + b;
    if s.is_nan() {
        return f64::INFINITY;
    }
    match sum_error(a, b, s) {
        None if s < 0.0 => up(f64::MIN),
        None => s,
        Some(e) if e > 0.0 => up(next_up(s)),
        Some(_) => up(s),
    }
}

pub fn sub_down(a: f64, b: f64) -> f64 {
    add_down(a, -b)
}

pub fn sub_up(a: f64, b: f64) -> f64 {
    add_up(a, -b)
}

/// Compares the exact product with the rounded one: negative if the exact product is smaller,
/// positive if larger, zero if exact. `None` when this cannot be established.
fn product_error(a: f64, b: f64, p: f64) -> Option<f64> {
    if !p.is_finite() {
        return if a.is_finite() && b.is_finite() {
            None
        } else {
            Some(0.0)
        };
    }
    if p.abs() < UNDERFLOW_GUARD {
        return None;
    }
    Some(a.mul_add(b, -p))
}

/// Multiplication rounded down. Zero times infinity is zero.
pub fn mul_down(a: f64, b: f64) -> f64 {
    if a == 0.0 || b == 0.0 {
        return 0.0;
    }
    let p = a * b;
    match product_error(a, b, p) {
        None if p == f64::INFINITY => down(f64::MAX),
        None => down(next_down(p)),
        Some(e) if e < 0.0 => down(next_down(p)),
        Some(_) => down(p),
    }
}

/// Multiplication rounded up. Zero times infinity is zero.
pub fn mul_up(a: f64, b: f64) -> f64 {
    if a == 0.0 || b == 0.0 {
        return 0.0;
    }
    let p = a * b;
    match product_error(a, b, p) {
        None if p == f64::NEG_INFINITY => up(f64::MIN),
        None => up(next_up(p)),
        Some(e) if e > 0.0 => up(next_up(p)),
        Some(_) => up(p),
    }
}

/// Compares the exact quotient `a / b` with the rounded one `q`, like [`product_error`].
fn quotient_error(a: f64, b: f64, q: f64) -> Option<f64> {
    if !q.is_finite() {
        return if a.is_finite() && b.is_finite() {
            None
        } else {
            Some(0.0)
        };
    }
    if !a.is_finite() || !b.is_finite() {
        // finite divided by infinity is an exact zero
        return Some(0.0);
    }
    if (q != 0.0 && q.abs() < UNDERFLOW_GUARD) || (q == 0.0 && a != 0.0) {
        return None;
    }
    // a - q * b has the sign of (a / b - q) * b
    let residual = (-q).mul_add(b, a);
    Some(if b > 0.0 { residual } else { -residual })
}

/// Division rounded down. The divisor must not be zero.
pub fn div_down(a: f64, b: f64) -> f64 {
    let q = a / b;
    if q.is_nan() {
        return f64::NEG_INFINITY;
    }
    match quotient_error(a, b, q) {
        None if q == f64::INFINITY => down(f64::MAX),
        None => down(next_down(q)),
        Some(e) if e < 0.0 => down(next_down(q)),
        Some(_) => down(q),
    }
}

/// Division rounded up. The divisor must not be zero.
pub fn div_up(a: f64, b: f64) -> f64 {
    let q = a / b;
    if q.is_nan() {
        return f64::INFINITY;
    }
    match quotient_error(a, b, q) {
        None if q == f64::NEG_INFINITY => up(f64::MIN),
        None => up(next_up(q)),
        Some(e) if e > 0.0 => up(next_up(q)),
        Some(_) => up(q),
    }
}

/// Square root rounded down. The argument must be non-negative.
pub fn sqrt_down(x: f64) -> f64 {
    let s = x.sqrt();
    if !s.is_finite() || s == 0.0 {
        return down(s);
    }
    // x - s * s is negative iff s overestimates the root
    if (-s).mul_add(s, x) < 0.0 {
        down(next_down(s))
    } else {
        down(s)
    }
}

/// Square root rounded up. The argument must be non-negative.
pub fn sqrt_up(x: f64) -> f64 {
    let s = x.sqrt();
    if !s.is_finite() || s == 0.0 {
        return up(s);
    }
    if (-s).mul_add(s, x) > 0.0 {
        up(next_up(s))
    } else {
        up(s)
    }
}

/// Lower bound of a library function result `value`, clamped to the range of the function.
fn library_down(value: f64, range_min: f64) -> f64 {
    if value.is_nan() {
        return range_min;
    }
    down(steps_down(value, LIBRARY_ULPS).max(range_min))
}

/// Upper bound of a library function result `value`, clamped to the range of the function.
fn library_up(value: f64, range_max: f64) -> f64 {
    if value.is_nan() {
        return range_max;
    }
    up(steps_up(value, LIBRARY_ULPS).min(range_max))
}

pub fn sin_down(x: f64) -> f64 {
    library_down(x.sin(), -1.0)
}

pub fn sin_up(x: f64) -> f64 {
    library_up(x.sin(), 1.0)
}

pub fn cos_down(x: f64) -> f64 {
    library_down(x.cos(), -1.0)
}

pub fn cos_up(x: f64) -> f64 {
    library_up(x.cos(), 1.0)
}

pub fn tan_down(x: f64) -> f64 {
    library_down(x.tan(), f64::NEG_INFINITY)
}

pub fn tan_up(x: f64) -> f64 {
    library_up(x.tan(), f64::INFINITY)
}

pub fn exp_down(x: f64) -> f64 {
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    library_down(x.exp(), 0.0)
}

pub fn exp_up(x: f64) -> f64 {
    if x == f64::NEG_INFINITY {
        return 0.0;
    }
    library_up(x.exp(), f64::INFINITY)
}

/// Natural logarithm rounded down. Non-positive arguments yield negative infinity.
pub fn ln_down(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if x == 1.0 || x == f64::INFINITY {
        return x.ln();
    }
    library_down(x.ln(), f64::NEG_INFINITY)
}

/// Natural logarithm rounded up. Non-positive arguments yield negative infinity.
pub fn ln_up(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if x == 1.0 || x == f64::INFINITY {
        return x.ln();
    }
    library_up(x.ln(), f64::INFINITY)
}

pub fn asin_down(x: f64) -> f64 {
    library_down(x.clamp(-1.0, 1.0).asin(), -PI_UP / 2.0)
}

pub fn asin_up(x: f64) -> f64 {
    library_up(x.clamp(-1.0, 1.0).asin(), PI_UP / 2.0)
}

pub fn acos_down(x: f64) -> f64 {
    library_down(x.clamp(-1.0, 1.0).acos(), 0.0)
}

pub fn acos_up(x: f64) -> f64 {
    library_up(x.clamp(-1.0, 1.0).acos(), PI_UP)
}

pub fn atan_down(x: f64) -> f64 {
    library_down(x.atan(), -PI_UP / 2.0)
}

pub fn atan_up(x: f64) -> f64 {
    library_up(x.atan(), PI_UP / 2.0)
}

/// A double below π.
pub const PI_DOWN: f64 = std::f64::consts::PI;
/// A double above π.
#[allow(clippy::approx_constant, reason = "the successor of the rounded constant")]
pub const PI_UP: f64 = 3.141_592_653_589_793_6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepping_moves_by_one_ulp() {
        assert_eq!(1.0 + f64::EPSILON, next_up(1.0));
        assert_eq!(1.0, next_down(next_up(1.0)));
        assert!(next_up(0.0) > 0.0);
        assert!(next_down(0.0) < 0.0);
        assert_eq!(f64::INFINITY, next_up(f64::MAX));
        assert_eq!(f64::MAX, next_down(f64::INFINITY));
        assert_eq!(f64::NEG_INFINITY, next_down(f64::NEG_INFINITY));
    }

    #[test]
    fn pi_is_enclosed() {
        assert!(PI_DOWN < PI_UP);
        assert_eq!(PI_UP, next_up(PI_DOWN));
    }

    #[test]
    fn grid_rounding_brackets_its_input() {
        for &x in &[1.0 / 3.0, -1.0 / 3.0, 1e300, -7.25e-12, 0.1, 123_456.789] {
            for bits in [0, 4, 12, 32] {
                let lower = down_with(x, bits);
                let upper = up_with(x, bits);
                assert!(lower <= x, "{lower} > {x} with {bits} bits");
                assert!(x <= upper, "{x} > {upper} with {bits} bits");
            }
        }
    }

    #[test]
    fn grid_rounding_is_idempotent() {
        for &x in &[1.0 / 3.0, -1.0 / 3.0, 2.5e-7, -9e99] {
            let lower = down_with(x, 12);
            let upper = up_with(x, 12);

            assert_eq!(lower, down_with(lower, 12));
            assert_eq!(lower, up_with(lower, 12));
            assert_eq!(upper, up_with(upper, 12));
            assert_eq!(upper, down_with(upper, 12));
        }
    }

    #[test]
    fn grid_rounding_keeps_infinities() {
        assert_eq!(f64::INFINITY, up_with(f64::INFINITY, 8));
        assert_eq!(f64::NEG_INFINITY, down_with(f64::NEG_INFINITY, 8));
        assert_eq!(f64::INFINITY, up_with(f64::MAX, 8));
    }

    #[test]
    fn exact_sums_are_not_widened() {
        assert_eq!(3.0, add_down(1.0, 2.0));
        assert_eq!(3.0, add_up(1.0, 2.0));
        assert_eq!(0.5, sub_down(1.0, 0.5));
    }

    #[test]
    fn inexact_sums_are_bracketed() {
        let lower = add_down(0.1, 0.2);
        let upper = add_up(0.1, 0.2);

        assert!(lower < upper);
        assert_eq!(upper, next_up(lower));
    }

    #[test]
    fn overflowing_sums_stay_finite_on_the_inner_side() {
        assert_eq!(f64::MAX, add_down(f64::MAX, f64::MAX));
        assert_eq!(f64::INFINITY, add_up(f64::MAX, f64::MAX));
    }

    #[test]
    fn products_follow_the_rounding_direction() {
        assert_eq!(6.0, mul_down(2.0, 3.0));
        assert_eq!(6.0, mul_up(2.0, 3.0));

        let lower = mul_down(0.1, 0.1);
        let upper = mul_up(0.1, 0.1);
        assert!(lower < upper);

        assert_eq!(0.0, mul_down(0.0, f64::INFINITY));
        assert_eq!(0.0, mul_up(f64::NEG_INFINITY, 0.0));
    }

    #[test]
    fn quotients_follow_the_rounding_direction() {
        assert_eq!(2.0, div_down(6.0, 3.0));
        assert_eq!(2.0, div_up(6.0, 3.0));

        let lower = div_down(1.0, 3.0);
        let upper = div_up(1.0, 3.0);
        assert!(lower < upper);
        assert!(lower <= 1.0 / 3.0 && 1.0 / 3.0 <= upper);

        let lower = div_down(1.0, -3.0);
        let upper = div_up(1.0, -3.0);
        assert!(lower < upper);
        assert!(lower <= -1.0 / 3.0 && -1.0 / 3.0 <= upper);

        assert_eq!(0.0, div_down(5.0, f64::INFINITY));
    }

    #[test]
    fn square_roots_are_bracketed() {
        assert_eq!(3.0, sqrt_down(9.0));
        assert_eq!(3.0, sqrt_up(9.0));

        let lower = sqrt_down(2.0);
        let upper = sqrt_up(2.0);
        assert!(lower < upper);
        assert!(mul_down(lower, lower) <= 2.0);
        assert!(mul_up(upper, upper) >= 2.0);
    }

    #[test]
    fn library_functions_are_widened_and_clamped() {
        assert!(sin_down(1.0) < 1.0_f64.sin());
        assert!(sin_up(1.0) > 1.0_f64.sin());
        assert!(sin_up(std::f64::consts::FRAC_PI_2) <= 1.0);
        assert!(exp_down(-1000.0) >= 0.0);
        assert_eq!(0.0, ln_down(1.0));
        assert_eq!(f64::NEG_INFINITY, ln_down(0.0));
    }
}
