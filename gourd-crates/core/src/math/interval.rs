use std::fmt::Display;
use std::fmt::Formatter;

use super::rounding::*;
use crate::gourd_assert_moderate;

/// A non-empty closed interval of reals with double bounds.
///
/// The results of all operations are outward rounded, so the exact real result of an operation on
/// members of the operands is always a member of the result. Operations which can produce an
/// empty set return an [`Option`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    lower: f64,
    upper: f64,
}

impl Interval {
    /// Creates the interval `[lower, upper]`.
    ///
    /// The bounds are taken as they are; they must not be NaN and `lower <= upper` must hold.
    pub fn new(lower: f64, upper: f64) -> Interval {
        gourd_assert_moderate!(
            lower <= upper,
            "invalid interval [{lower}, {upper}]"
        );
        Interval { lower, upper }
    }

    /// Creates the interval `[lower, upper]` if it is non-empty.
    pub fn try_new(lower: f64, upper: f64) -> Option<Interval> {
        (lower <= upper).then_some(Interval { lower, upper })
    }

    pub fn point(value: f64) -> Interval {
        Interval::new(value, value)
    }

    /// The whole real line.
    pub fn entire() -> Interval {
        Interval::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn is_point(&self) -> bool {
        self.lower == self.upper
    }

    pub fn is_bounded(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn contains_zero(&self) -> bool {
        self.contains(0.0)
    }

    pub fn is_subset_of(&self, other: Interval) -> bool {
        other.lower <= self.lower && self.upper <= other.upper
    }

    /// The width of the interval, rounded up.
    pub fn width(&self) -> f64 {
        sub_up(self.upper, self.lower)
    }

    /// The midpoint of the interval, or `None` if the interval is unbounded.
    pub fn midpoint(&self) -> Option<f64> {
        if !self.is_bounded() {
            return None;
        }
        if self.is_point() {
            return Some(self.lower);
        }
        let mid = 0.5 * self.lower + 0.5 * self.upper;
        Some(mid.clamp(self.lower, self.upper))
    }

    /// The mignitude, the smallest absolute value of a member.
    pub fn mig(&self) -> f64 {
        if self.contains_zero() {
            0.0
        } else {
            self.lower.abs().min(self.upper.abs())
        }
    }

    /// The magnitude, the largest absolute value of a member.
    pub fn mag(&self) -> f64 {
        self.lower.abs().max(self.upper.abs())
    }

    pub fn intersect(&self, other: Interval) -> Option<Interval> {
        Interval::try_new(
            self.lower.max(other.lower),
            self.upper.min(other.upper),
        )
    }

    /// The smallest interval containing both operands.
    pub fn hull(&self, other: Interval) -> Interval {
        Interval::new(
            self.lower.min(other.lower),
            self.upper.max(other.upper),
        )
    }

    pub fn add(self, rhs: Interval) -> Interval {
        Interval::new(
            add_down(self.lower, rhs.lower),
            add_up(self.upper, rhs.upper),
        )
    }

    pub fn sub(self, rhs: Interval) -> Interval {
        Interval::new(
            sub_down(self.lower, rhs.upper),
            sub_up(self.upper, rhs.lower),
        )
    }

    pub fn neg(self) -> Interval {
        Interval::new(-self.upper, -self.lower)
    }

    /// Multiplication; zero times an infinite bound counts as zero.
    pub fn mul(self, rhs: Interval) -> Interval {
        let candidates = [
            (self.lower, rhs.lower),
            (self.lower, rhs.upper),
            (self.upper, rhs.lower),
            (self.upper, rhs.upper),
        ];
        let lower = candidates
            .iter()
            .map(|&(a, b)| mul_down(a, b))
            .fold(f64::INFINITY, f64::min);
        let upper = candidates
            .iter()
            .map(|&(a, b)| mul_up(a, b))
            .fold(f64::NEG_INFINITY, f64::max);
        Interval::new(lower, upper)
    }

    pub fn scale(self, factor: f64) -> Interval {
        self.mul(Interval::point(factor))
    }

    /// The square of every member, tighter than `self.mul(self)`.
    pub fn sqr(self) -> Interval {
        let mig = self.mig();
        let mag = self.mag();
        Interval::new(mul_down(mig, mig), mul_up(mag, mag))
    }

    /// Division by an interval which may contain zero.
    ///
    /// Returns the hull of `{x / y}`; when the divisor contains zero this is the entire line,
    /// unless the divisor is exactly zero, in which case there is no quotient.
    pub fn div(self, rhs: Interval) -> Option<Interval> {
        match self.div_relational(rhs).as_slice() {
            [] => None,
            [single] => Some(*single),
            [first, .., last] => Some(first.hull(*last)),
        }
    }

    /// The set `{x | x * y ∈ self for some y ∈ rhs}`, as at most two disjoint intervals in
    /// increasing order.
    pub fn div_relational(self, rhs: Interval) -> Vec<Interval> {
        let (a1, a2) = (self.lower, self.upper);
        let (b1, b2) = (rhs.lower, rhs.upper);

        if !rhs.contains_zero() {
            let candidates = [(a1, b1), (a1, b2), (a2, b1), (a2, b2)];
            let lower = candidates
                .iter()
                .map(|&(a, b)| quotient_down(a, b))
                .fold(f64::INFINITY, f64::min);
            let upper = candidates
                .iter()
                .map(|&(a, b)| quotient_up(a, b))
                .fold(f64::NEG_INFINITY, f64::max);
            return vec![Interval::new(lower, upper)];
        }

        if self.contains_zero() {
            return vec![Interval::entire()];
        }
        if rhs.is_point() {
            // rhs is exactly zero, and zero times anything misses self
            return vec![];
        }

        if a2 < 0.0 {
            let mut result = vec![];
            if b2 > 0.0 {
                result.push(Interval::new(f64::NEG_INFINITY, div_up(a2, b2)));
            }
            if b1 < 0.0 {
                result.push(Interval::new(div_down(a2, b1), f64::INFINITY));
            }
            merge_overlapping(result)
        } else {
            let mut result = vec![];
            if b1 < 0.0 {
                result.push(Interval::new(f64::NEG_INFINITY, div_up(a1, b1)));
            }
            if b2 > 0.0 {
                result.push(Interval::new(div_down(a1, b2), f64::INFINITY));
            }
            merge_overlapping(result)
        }
    }

    /// Square root of the non-negative part, `None` if the interval is negative.
    pub fn sqrt(self) -> Option<Interval> {
        if self.upper < 0.0 {
            return None;
        }
        Some(Interval::new(
            sqrt_down(self.lower.max(0.0)),
            sqrt_up(self.upper),
        ))
    }

    pub fn exp(self) -> Interval {
        Interval::new(exp_down(self.lower), exp_up(self.upper))
    }

    /// Natural logarithm of the positive part, `None` if the interval has no positive member.
    pub fn ln(self) -> Option<Interval> {
        if self.upper <= 0.0 {
            return None;
        }
        Some(Interval::new(ln_down(self.lower), ln_up(self.upper)))
    }

    /// The range of sine over the interval.
    pub fn sin(self) -> Interval {
        // extrema at π/2 + kπ
        self.periodic_range(0.5, sin_down, sin_up, |k| k.rem_euclid(2) == 0)
    }

    /// The range of cosine over the interval.
    pub fn cos(self) -> Interval {
        // extrema at kπ
        self.periodic_range(0.0, cos_down, cos_up, |k| k.rem_euclid(2) == 0)
    }

    /// The range of tangent over the interval; the whole line if it contains a pole.
    pub fn tan(self) -> Interval {
        if !self.is_bounded() || self.width() >= PI_DOWN {
            return Interval::entire();
        }
        // poles at π/2 + kπ
        if contains_periodic_point(self, 0.5).is_some() {
            return Interval::entire();
        }
        Interval::new(tan_down(self.lower), tan_up(self.upper))
    }

    pub fn atan(self) -> Interval {
        Interval::new(atan_down(self.lower), atan_up(self.upper))
    }

    /// Computes the range of sine or cosine, whose extrema lie at `(offset + k) * π`, where `k`
    /// even gives a maximum according to `is_maximum`.
    fn periodic_range(
        self,
        offset: f64,
        lower_of: fn(f64) -> f64,
        upper_of: fn(f64) -> f64,
        is_maximum: impl Fn(i64) -> bool,
    ) -> Interval {
        if !self.is_bounded() || self.width() >= 2.0 * PI_DOWN || self.mag() > MAX_PERIODIC_ARGUMENT
        {
            return Interval::new(-1.0, 1.0);
        }

        let mut lower = lower_of(self.lower).min(lower_of(self.upper));
        let mut upper = upper_of(self.lower).max(upper_of(self.upper));

        for k in extremum_indices(self, offset) {
            if is_maximum(k) {
                upper = 1.0;
            } else {
                lower = -1.0;
            }
        }

        Interval::new(lower, upper)
    }
}

/// Beyond this magnitude the periodic functions are not narrowed, since the period is no longer
/// resolved with meaningful accuracy.
pub(crate) const MAX_PERIODIC_ARGUMENT: f64 = 1e12;

/// The integers `k` for which `(offset + k) * π` may lie in the interval, conservatively including
/// points which are only within rounding distance of it.
fn extremum_indices(interval: Interval, offset: f64) -> impl Iterator<Item = i64> {
    let slack = 1e-9 * interval.mag().max(1.0);
    let first = ((interval.lower - slack) / PI_DOWN - offset).ceil() as i64;
    let last = ((interval.upper + slack) / PI_DOWN - offset).floor() as i64;
    first..=last
}

fn contains_periodic_point(interval: Interval, offset: f64) -> Option<i64> {
    extremum_indices(interval, offset).next()
}

/// Division rounded down where zero divided by anything is zero.
fn quotient_down(a: f64, b: f64) -> f64 {
    if a == 0.0 {
        0.0
    } else {
        div_down(a, b)
    }
}

fn quotient_up(a: f64, b: f64) -> f64 {
    if a == 0.0 {
        0.0
    } else {
        div_up(a, b)
    }
}

fn merge_overlapping(intervals: Vec<Interval>) -> Vec<Interval> {
    match intervals.as_slice() {
        [first, second] if second.lower <= first.upper => vec![first.hull(*second)],
        _ => intervals,
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_point() {
            write!(f, "{}", self.lower)
        } else {
            write!(f, "[{}, {}]", self.lower, self.upper)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;
    use std::f64::consts::PI;

    use super::*;

    fn interval(lower: f64, upper: f64) -> Interval {
        Interval::new(lower, upper)
    }

    #[test]
    fn addition_of_integral_bounds_is_exact() {
        assert_eq!(interval(3.0, 8.0), interval(1.0, 3.0).add(interval(2.0, 5.0)));
        assert_eq!(interval(-4.0, 1.0), interval(1.0, 3.0).sub(interval(2.0, 5.0)));
    }

    #[test]
    fn addition_encloses_the_real_result() {
        let sum = Interval::point(0.1).add(Interval::point(0.2));

        assert!(sum.lower() < sum.upper());
        assert!(sum.contains(0.1 + 0.2));
    }

    #[test]
    fn multiplication_considers_all_sign_combinations() {
        assert_eq!(
            interval(-10.0, 15.0),
            interval(-2.0, 3.0).mul(interval(-1.0, 5.0))
        );
        assert_eq!(
            interval(0.0, f64::INFINITY),
            interval(0.0, 2.0).mul(interval(1.0, f64::INFINITY))
        );
    }

    #[test]
    fn square_is_non_negative() {
        assert_eq!(interval(0.0, 9.0), interval(-3.0, 2.0).sqr());
        assert_eq!(interval(4.0, 9.0), interval(-3.0, -2.0).sqr());
    }

    #[test]
    fn division_without_zero_in_divisor() {
        assert_eq!(
            Some(interval(1.0, 4.0)),
            interval(2.0, 8.0).div(interval(2.0, 2.0))
        );
    }

    #[test]
    fn division_by_interval_containing_zero_splits() {
        let pieces = interval(1.0, 2.0).div_relational(interval(-1.0, 1.0));

        assert_eq!(
            vec![
                interval(f64::NEG_INFINITY, -1.0),
                interval(1.0, f64::INFINITY)
            ],
            pieces
        );
    }

    #[test]
    fn division_by_zero_has_no_quotient() {
        assert!(interval(1.0, 2.0)
            .div_relational(Interval::point(0.0))
            .is_empty());
        assert_eq!(
            vec![Interval::entire()],
            interval(-1.0, 2.0).div_relational(Interval::point(0.0))
        );
    }

    #[test]
    fn division_by_half_open_divisor() {
        let pieces = interval(2.0, 4.0).div_relational(interval(0.0, 2.0));
        assert_eq!(vec![interval(1.0, f64::INFINITY)], pieces);

        let pieces = interval(-4.0, -2.0).div_relational(interval(0.0, 2.0));
        assert_eq!(vec![interval(f64::NEG_INFINITY, -1.0)], pieces);
    }

    #[test]
    fn midpoint_of_unbounded_interval_is_undefined() {
        assert_eq!(None, interval(0.0, f64::INFINITY).midpoint());
        assert_eq!(Some(1.5), interval(1.0, 2.0).midpoint());
    }

    #[test]
    fn mignitude_and_magnitude() {
        assert_eq!(0.0, interval(-1.0, 2.0).mig());
        assert_eq!(2.0, interval(-3.0, -2.0).mig());
        assert_eq!(3.0, interval(-3.0, -2.0).mag());
    }

    #[test]
    fn sine_range_over_a_maximum() {
        let range = interval(0.0, PI).sin();

        assert_eq!(1.0, range.upper());
        assert!(range.lower() <= 0.0);
        assert!(range.lower() > -1e-10);
    }

    #[test]
    fn sine_range_on_monotone_piece() {
        let range = interval(-0.5, 0.5).sin();

        assert!(range.contains(0.5_f64.sin()));
        assert!(range.contains((-0.5_f64).sin()));
        assert!(range.upper() < 0.48);
    }

    #[test]
    fn cosine_range_over_full_period() {
        assert_eq!(interval(-1.0, 1.0), interval(0.0, 7.0).cos());
        assert_eq!(-1.0, interval(3.0, 3.5).cos().lower());
    }

    #[test]
    fn tangent_over_a_pole_is_unbounded() {
        assert_eq!(Interval::entire(), interval(1.0, 2.0).tan());

        let range = interval(-1.0, 1.0).tan();
        assert!(range.contains(1.0_f64.tan()));
        assert!(range.upper() < FRAC_PI_2);
    }

    #[test]
    fn logarithm_of_non_positive_interval_is_undefined() {
        assert_eq!(None, interval(-2.0, 0.0).ln());
        assert_eq!(f64::NEG_INFINITY, interval(0.0, 1.0).ln().unwrap().lower());
    }
}
