use std::fmt::Display;
use std::fmt::Formatter;

use itertools::Itertools;

use crate::gourd_assert_moderate;

/// A closed range of integers `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntInterval {
    pub min: i32,
    pub max: i32,
}

impl IntInterval {
    pub fn new(min: i32, max: i32) -> IntInterval {
        gourd_assert_moderate!(min <= max);
        IntInterval { min, max }
    }

    fn size(&self) -> u64 {
        (i64::from(self.max) - i64::from(self.min) + 1) as u64
    }
}

/// The width below which a domain is stored as a bit set.
const DENSE_WIDTH: i64 = 64;

/// A non-empty set of integers.
///
/// Domains spanning fewer than 64 values are stored as a bit set relative to their minimum, wider
/// ones as a sorted list of disjoint, non-adjacent intervals. The representation is chosen
/// automatically after every operation. Operations which may remove every value return an
/// [`Option`], where `None` is the empty set.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntDomain {
    Intervals(Vec<IntInterval>),
    SmallDense {
        /// The value corresponding to the lowest bit, always a member of the domain.
        offset: i32,
        bits: u64,
    },
}

impl IntDomain {
    /// The domain `[min, max]`, or `None` if `min > max`.
    pub fn new(min: i32, max: i32) -> Option<IntDomain> {
        (min <= max).then(|| IntDomain::from_sorted(vec![IntInterval::new(min, max)]))
    }

    pub fn singleton(value: i32) -> IntDomain {
        IntDomain::SmallDense {
            offset: value,
            bits: 1,
        }
    }

    /// The domain containing exactly the given values, or `None` if there are none.
    pub fn from_values(values: impl IntoIterator<Item = i32>) -> Option<IntDomain> {
        let intervals = values
            .into_iter()
            .sorted_unstable()
            .dedup()
            .map(|value| IntInterval::new(value, value))
            .collect::<Vec<_>>();
        IntDomain::from_intervals(intervals)
    }

    /// The union of the given intervals, or `None` if there are none.
    pub fn from_intervals(mut intervals: Vec<IntInterval>) -> Option<IntDomain> {
        if intervals.is_empty() {
            return None;
        }
        intervals.sort_unstable_by_key(|interval| interval.min);

        let mut merged: Vec<IntInterval> = Vec::with_capacity(intervals.len());
        for interval in intervals {
            match merged.last_mut() {
                Some(last) if i64::from(interval.min) <= i64::from(last.max) + 1 => {
                    last.max = last.max.max(interval.max);
                }
                _ => merged.push(interval),
            }
        }
        Some(IntDomain::from_sorted(merged))
    }

    /// Builds a domain from non-empty, sorted, disjoint, non-adjacent intervals.
    fn from_sorted(intervals: Vec<IntInterval>) -> IntDomain {
        gourd_assert_moderate!(!intervals.is_empty());
        gourd_assert_moderate!(intervals
            .iter()
            .tuple_windows()
            .all(|(a, b)| i64::from(a.max) + 1 < i64::from(b.min)));

        let min = intervals[0].min;
        let max = intervals[intervals.len() - 1].max;
        if i64::from(max) - i64::from(min) < DENSE_WIDTH {
            let bits = intervals.iter().fold(0_u64, |bits, interval| {
                bits | range_mask(
                    (interval.min - min) as u32,
                    (interval.max - min) as u32,
                )
            });
            IntDomain::SmallDense { offset: min, bits }
        } else {
            IntDomain::Intervals(intervals)
        }
    }

    /// Builds a domain from a bit set relative to `offset`, `None` if no bit is set.
    fn from_bits(offset: i32, bits: u64) -> Option<IntDomain> {
        if bits == 0 {
            return None;
        }
        let shift = bits.trailing_zeros();
        Some(IntDomain::SmallDense {
            offset: offset + shift as i32,
            bits: bits >> shift,
        })
    }

    pub fn min(&self) -> i32 {
        match self {
            IntDomain::Intervals(intervals) => intervals[0].min,
            IntDomain::SmallDense { offset, .. } => *offset,
        }
    }

    pub fn max(&self) -> i32 {
        match self {
            IntDomain::Intervals(intervals) => intervals[intervals.len() - 1].max,
            IntDomain::SmallDense { offset, bits } => {
                offset + (63 - bits.leading_zeros()) as i32
            }
        }
    }

    /// The number of values in the domain.
    pub fn size(&self) -> u64 {
        match self {
            IntDomain::Intervals(intervals) => intervals.iter().map(IntInterval::size).sum(),
            IntDomain::SmallDense { bits, .. } => u64::from(bits.count_ones()),
        }
    }

    pub fn is_singleton(&self) -> bool {
        self.min() == self.max()
    }

    /// The value of a singleton domain.
    pub fn value(&self) -> Option<i32> {
        self.is_singleton().then(|| self.min())
    }

    pub fn contains(&self, value: i32) -> bool {
        match self {
            IntDomain::Intervals(intervals) => intervals
                .binary_search_by(|interval| {
                    if interval.max < value {
                        std::cmp::Ordering::Less
                    } else if interval.min > value {
                        std::cmp::Ordering::Greater
                    } else {
                        std::cmp::Ordering::Equal
                    }
                })
                .is_ok(),
            IntDomain::SmallDense { offset, bits } => {
                let index = i64::from(value) - i64::from(*offset);
                (0..DENSE_WIDTH).contains(&index) && bits & (1 << index) != 0
            }
        }
    }

    /// The maximal intervals making up the domain, in increasing order.
    pub fn intervals(&self) -> Vec<IntInterval> {
        match self {
            IntDomain::Intervals(intervals) => intervals.clone(),
            IntDomain::SmallDense { offset, bits } => {
                let mut result = vec![];
                let mut remaining = *bits;
                while remaining != 0 {
                    let start = remaining.trailing_zeros();
                    let length = (remaining >> start).trailing_ones();
                    result.push(IntInterval::new(
                        offset + start as i32,
                        offset + (start + length - 1) as i32,
                    ));
                    remaining &= !range_mask(start, start + length - 1);
                }
                result
            }
        }
    }

    /// The values of the domain in increasing order.
    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        self.intervals()
            .into_iter()
            .flat_map(|interval| interval.min..=interval.max)
    }

    /// The domain restricted to `[lower, upper]`. The bounds are given as `i64` so callers can
    /// pass results of arithmetic without clamping them first.
    pub fn with_bounds(&self, lower: i64, upper: i64) -> Option<IntDomain> {
        let lower = lower.max(i64::from(self.min()));
        let upper = upper.min(i64::from(self.max()));
        if lower > upper {
            return None;
        }
        if lower == i64::from(self.min()) && upper == i64::from(self.max()) {
            return Some(self.clone());
        }

        match self {
            IntDomain::SmallDense { offset, bits } => {
                let from = (lower - i64::from(*offset)) as u32;
                let to = (upper - i64::from(*offset)) as u32;
                IntDomain::from_bits(*offset, bits & range_mask(from, to))
            }
            IntDomain::Intervals(intervals) => {
                let (lower, upper) = (lower as i32, upper as i32);
                let restricted = intervals
                    .iter()
                    .filter(|interval| interval.max >= lower && interval.min <= upper)
                    .map(|interval| {
                        IntInterval::new(interval.min.max(lower), interval.max.min(upper))
                    })
                    .collect::<Vec<_>>();
                (!restricted.is_empty()).then(|| IntDomain::from_sorted(restricted))
            }
        }
    }

    /// The domain without `value`.
    pub fn without_value(&self, value: i32) -> Option<IntDomain> {
        self.without_interval(value, value)
    }

    /// The domain without the values in `[lower, upper]`.
    pub fn without_interval(&self, lower: i32, upper: i32) -> Option<IntDomain> {
        if lower > upper || upper < self.min() || lower > self.max() {
            return Some(self.clone());
        }

        match self {
            IntDomain::SmallDense { offset, bits } => {
                let from = (i64::from(lower) - i64::from(*offset)).max(0) as u32;
                let to = (i64::from(upper) - i64::from(*offset)).min(DENSE_WIDTH - 1) as u32;
                IntDomain::from_bits(*offset, bits & !range_mask(from, to))
            }
            IntDomain::Intervals(intervals) => {
                let mut remaining = Vec::with_capacity(intervals.len() + 1);
                for interval in intervals {
                    if interval.max < lower || interval.min > upper {
                        remaining.push(*interval);
                        continue;
                    }
                    if interval.min < lower {
                        remaining.push(IntInterval::new(interval.min, lower - 1));
                    }
                    if interval.max > upper {
                        remaining.push(IntInterval::new(upper + 1, interval.max));
                    }
                }
                (!remaining.is_empty()).then(|| IntDomain::from_sorted(remaining))
            }
        }
    }

    /// The values shared by both domains.
    pub fn intersect(&self, other: &IntDomain) -> Option<IntDomain> {
        if let (
            IntDomain::SmallDense { offset, bits },
            IntDomain::SmallDense {
                offset: other_offset,
                bits: other_bits,
            },
        ) = (self, other)
        {
            let shift = i64::from(*other_offset) - i64::from(*offset);
            let aligned = if shift >= DENSE_WIDTH || shift <= -DENSE_WIDTH {
                0
            } else if shift >= 0 {
                other_bits << shift
            } else {
                other_bits >> -shift
            };
            return IntDomain::from_bits(*offset, bits & aligned);
        }

        let ours = self.intervals();
        let theirs = other.intervals();
        let mut result = vec![];
        let (mut i, mut j) = (0, 0);
        while i < ours.len() && j < theirs.len() {
            let lower = ours[i].min.max(theirs[j].min);
            let upper = ours[i].max.min(theirs[j].max);
            if lower <= upper {
                result.push(IntInterval::new(lower, upper));
            }
            if ours[i].max < theirs[j].max {
                i += 1;
            } else {
                j += 1;
            }
        }
        (!result.is_empty()).then(|| IntDomain::from_sorted(result))
    }

    pub fn is_subset_of(&self, other: &IntDomain) -> bool {
        self.intersect(other)
            .is_some_and(|intersection| intersection.size() == self.size())
    }

    /// Whether the two domains share no value.
    pub fn is_disjoint_from(&self, other: &IntDomain) -> bool {
        self.intersect(other).is_none()
    }
}

/// A mask with the bits `from..=to` set.
fn range_mask(from: u32, to: u32) -> u64 {
    gourd_assert_moderate!(from <= to && to < 64);
    let upper = if to == 63 { u64::MAX } else { (1_u64 << (to + 1)) - 1 };
    upper & !((1_u64 << from) - 1)
}

impl Display for IntDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(value) = self.value() {
            return write!(f, "{value}");
        }
        let intervals = self
            .intervals()
            .iter()
            .map(|interval| {
                if interval.min == interval.max {
                    interval.min.to_string()
                } else {
                    format!("{}..{}", interval.min, interval.max)
                }
            })
            .join(", ");
        write!(f, "{{{intervals}}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(min: i32, max: i32) -> IntDomain {
        IntDomain::new(min, max).expect("non-empty domain")
    }

    #[test]
    fn narrow_domains_are_dense() {
        assert!(matches!(domain(0, 63), IntDomain::SmallDense { .. }));
        assert!(matches!(domain(0, 64), IntDomain::Intervals(_)));
    }

    #[test]
    fn wide_domain_becomes_dense_when_narrowed() {
        let narrowed = domain(0, 1000).with_bounds(10, 20).expect("non-empty");

        assert!(matches!(narrowed, IntDomain::SmallDense { .. }));
        assert_eq!(10, narrowed.min());
        assert_eq!(20, narrowed.max());
        assert_eq!(11, narrowed.size());
    }

    #[test]
    fn removing_interior_value_keeps_bounds() {
        let domain = domain(1, 5).without_value(3).expect("non-empty");

        assert_eq!(1, domain.min());
        assert_eq!(5, domain.max());
        assert!(!domain.contains(3));
        assert_eq!(
            vec![IntInterval::new(1, 2), IntInterval::new(4, 5)],
            domain.intervals()
        );
    }

    #[test]
    fn removing_bound_value_moves_bound() {
        let domain = domain(1, 5).without_value(1).expect("non-empty");
        assert_eq!(2, domain.min());

        let domain = IntDomain::new(-100, 100)
            .expect("non-empty")
            .without_interval(50, 100)
            .expect("non-empty");
        assert_eq!(49, domain.max());
    }

    #[test]
    fn removing_last_value_empties_domain() {
        assert_eq!(None, IntDomain::singleton(4).without_value(4));
        assert_eq!(None, domain(1, 3).with_bounds(4, 10));
    }

    #[test]
    fn wide_intervals_split_on_removal() {
        let domain = domain(0, 1000).without_interval(100, 899).expect("non-empty");

        assert_eq!(
            vec![IntInterval::new(0, 99), IntInterval::new(900, 1000)],
            domain.intervals()
        );
        assert_eq!(201, domain.size());
        assert!(domain.contains(950));
        assert!(!domain.contains(500));
    }

    #[test]
    fn from_values_merges_adjacent_values() {
        let domain = IntDomain::from_values([5, 3, 4, 10, 4]).expect("non-empty");

        assert_eq!(
            vec![IntInterval::new(3, 5), IntInterval::new(10, 10)],
            domain.intervals()
        );
    }

    #[test]
    fn intersection_of_dense_domains_with_different_offsets() {
        let a = IntDomain::from_values([1, 3, 5, 7]).expect("non-empty");
        let b = IntDomain::from_values([5, 6, 7, 8]).expect("non-empty");

        assert_eq!(IntDomain::from_values([5, 7]), a.intersect(&b));
        assert!(a.is_disjoint_from(&IntDomain::singleton(100)));
    }

    #[test]
    fn intersection_of_mixed_representations() {
        let wide = domain(0, 1000).without_interval(5, 995).expect("non-empty");
        let narrow = domain(3, 7);

        assert_eq!(IntDomain::from_values([3, 4]), wide.intersect(&narrow));
    }

    #[test]
    fn subset_checks() {
        assert!(domain(2, 3).is_subset_of(&domain(1, 5)));
        assert!(!domain(2, 6).is_subset_of(&domain(1, 5)));
    }

    #[test]
    fn extreme_bounds_do_not_overflow() {
        let domain = domain(i32::MIN, i32::MAX);

        assert_eq!(1_u64 << 32, domain.size());
        assert_eq!(None, domain.with_bounds(i64::from(i32::MAX) + 1, i64::MAX));
    }

    #[test]
    fn display_uses_ranges() {
        let domain = IntDomain::from_values([1, 2, 3, 5]).expect("non-empty");

        assert_eq!("{1..3, 5}", domain.to_string());
        assert_eq!("4", IntDomain::singleton(4).to_string());
    }
}
