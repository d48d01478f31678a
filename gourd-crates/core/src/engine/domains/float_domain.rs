use std::fmt::Display;
use std::fmt::Formatter;

use itertools::Itertools;

use crate::gourd_assert_moderate;
use crate::math::is_within_precision;
use crate::math::Interval;

/// A non-empty union of disjoint closed real intervals, stored in increasing order.
///
/// Intervals which touch or overlap are merged. Removing a range of values keeps the closure of
/// what remains: the reals cannot be split at a double without losing solutions, so the removed
/// range's endpoints stay members.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatDomain {
    intervals: Vec<Interval>,
}

impl FloatDomain {
    /// The domain `[lower, upper]`, or `None` if it is empty or a bound is NaN.
    pub fn new(lower: f64, upper: f64) -> Option<FloatDomain> {
        Interval::try_new(lower, upper).map(FloatDomain::from_interval)
    }

    pub fn from_interval(interval: Interval) -> FloatDomain {
        FloatDomain {
            intervals: vec![interval],
        }
    }

    /// The union of the given intervals, or `None` if there are none.
    pub fn from_intervals(mut intervals: Vec<Interval>) -> Option<FloatDomain> {
        if intervals.is_empty() {
            return None;
        }
        intervals.sort_unstable_by(|a, b| a.lower().total_cmp(&b.lower()));

        let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
        for interval in intervals {
            match merged.last_mut() {
                Some(last) if interval.lower() <= last.upper() => *last = last.hull(interval),
                _ => merged.push(interval),
            }
        }
        Some(FloatDomain { intervals: merged })
    }

    pub fn min(&self) -> f64 {
        self.intervals[0].lower()
    }

    pub fn max(&self) -> f64 {
        self.intervals[self.intervals.len() - 1].upper()
    }

    /// The smallest interval containing the whole domain.
    pub fn hull(&self) -> Interval {
        Interval::new(self.min(), self.max())
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Whether the domain is narrower than the configured precision.
    pub fn is_ground(&self) -> bool {
        is_within_precision(self.min(), self.max())
    }

    pub fn contains(&self, value: f64) -> bool {
        self.intervals
            .iter()
            .any(|interval| interval.contains(value))
    }

    /// The part of the domain inside `bounds`.
    pub fn intersect_interval(&self, bounds: Interval) -> Option<FloatDomain> {
        if self.hull().is_subset_of(bounds) {
            return Some(self.clone());
        }
        let intervals = self
            .intervals
            .iter()
            .filter_map(|interval| interval.intersect(bounds))
            .collect::<Vec<_>>();
        FloatDomain::from_intervals(intervals)
    }

    /// The values shared by both domains.
    pub fn intersect(&self, other: &FloatDomain) -> Option<FloatDomain> {
        let intervals = self
            .intervals
            .iter()
            .cartesian_product(other.intervals.iter())
            .filter_map(|(a, b)| a.intersect(*b))
            .collect::<Vec<_>>();
        FloatDomain::from_intervals(intervals)
    }

    /// The closure of the domain without the values in `[lower, upper]`.
    pub fn without_interval(&self, lower: f64, upper: f64) -> Option<FloatDomain> {
        gourd_assert_moderate!(lower <= upper);

        let mut remaining = Vec::with_capacity(self.intervals.len() + 1);
        for interval in &self.intervals {
            if interval.upper() < lower || interval.lower() > upper {
                remaining.push(*interval);
                continue;
            }
            if interval.lower() < lower {
                remaining.push(Interval::new(interval.lower(), lower));
            }
            if interval.upper() > upper {
                remaining.push(Interval::new(upper, interval.upper()));
            }
        }
        FloatDomain::from_intervals(remaining)
    }
}

impl Display for FloatDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.intervals.len() == 1 {
            write!(f, "{}", self.intervals[0])
        } else {
            write!(f, "{{{}}}", self.intervals.iter().join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(lower: f64, upper: f64) -> FloatDomain {
        FloatDomain::new(lower, upper).expect("non-empty domain")
    }

    #[test]
    fn overlapping_intervals_are_merged() {
        let domain = FloatDomain::from_intervals(vec![
            Interval::new(2.0, 3.0),
            Interval::new(0.0, 1.0),
            Interval::new(1.0, 1.5),
        ])
        .expect("non-empty");

        assert_eq!(
            &[Interval::new(0.0, 1.5), Interval::new(2.0, 3.0)],
            domain.intervals()
        );
    }

    #[test]
    fn intersecting_with_gap_empties_domain() {
        let domain = FloatDomain::from_intervals(vec![
            Interval::new(0.0, 1.0),
            Interval::new(2.0, 3.0),
        ])
        .expect("non-empty");

        assert_eq!(None, domain.intersect_interval(Interval::new(1.2, 1.8)));
        assert_eq!(
            Some(domain.clone()),
            domain.intersect_interval(Interval::new(-1.0, 4.0))
        );
    }

    #[test]
    fn intersection_of_unions() {
        let a = FloatDomain::from_intervals(vec![
            Interval::new(0.0, 2.0),
            Interval::new(4.0, 6.0),
        ])
        .expect("non-empty");
        let b = domain(1.0, 5.0);

        let intersection = a.intersect(&b).expect("non-empty");
        assert_eq!(
            &[Interval::new(1.0, 2.0), Interval::new(4.0, 5.0)],
            intersection.intervals()
        );
    }

    #[test]
    fn removal_keeps_the_closure() {
        let domain = domain(0.0, 10.0).without_interval(2.0, 3.0).expect("non-empty");

        assert_eq!(
            &[Interval::new(0.0, 2.0), Interval::new(3.0, 10.0)],
            domain.intervals()
        );

        let unchanged = domain.without_interval(5.0, 5.0).expect("non-empty");
        assert_eq!(domain.hull(), unchanged.hull());
    }

    #[test]
    fn narrow_domains_are_ground() {
        assert!(domain(1.0, 1.0).is_ground());
        assert!(!domain(1.0, 1.1).is_ground());
    }
}
