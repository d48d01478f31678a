use log::trace;

use crate::basic_types::EmptyDomain;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::engine::domains::Domain;
use crate::engine::domains::DomainEvent;
use crate::engine::domains::FloatDomain;
use crate::engine::domains::IntDomain;
use crate::engine::variables::FloatVar;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarId;
use crate::engine::variables::Variable;
use crate::engine::TrailEntry;
use crate::math::float_precision;
use crate::math::rounding;
use crate::math::Interval;

/// Read access to the current domains of the variables.
pub trait ReadDomains {
    fn domain(&self, var: VarId) -> &Domain;

    fn int_domain(&self, var: IntVar) -> &IntDomain {
        match self.domain(var.id()) {
            Domain::Int(domain) => domain,
            Domain::Float(_) => unreachable!("integer variable {var} has a float domain"),
        }
    }

    fn float_domain(&self, var: FloatVar) -> &FloatDomain {
        match self.domain(var.id()) {
            Domain::Float(domain) => domain,
            Domain::Int(_) => unreachable!("float variable {var} has an integer domain"),
        }
    }

    fn lower_bound(&self, var: IntVar) -> i32 {
        self.int_domain(var).min()
    }

    fn upper_bound(&self, var: IntVar) -> i32 {
        self.int_domain(var).max()
    }

    /// The value of `var` if its domain is a singleton.
    fn fixed_value(&self, var: IntVar) -> Option<i32> {
        self.int_domain(var).value()
    }

    fn contains(&self, var: IntVar, value: i32) -> bool {
        self.int_domain(var).contains(value)
    }

    /// The hull of the domain of `var`.
    fn float_bounds(&self, var: FloatVar) -> Interval {
        self.float_domain(var).hull()
    }

    fn is_ground(&self, var: VarId) -> bool {
        self.domain(var).is_ground()
    }
}

/// A read-only view on the domains, given to [`Constraint::satisfied`](super::Constraint).
#[derive(Clone, Copy, Debug)]
pub struct Domains<'a> {
    pub(crate) variables: &'a KeyedVec<VarId, Variable>,
}

impl<'a> Domains<'a> {
    pub(crate) fn new(variables: &'a KeyedVec<VarId, Variable>) -> Self {
        Domains { variables }
    }
}

impl ReadDomains for Domains<'_> {
    fn domain(&self, var: VarId) -> &Domain {
        &self.variables[var].domain
    }
}

/// Provides information about the state of the store to a constraint.
///
/// Domains can be read through the implementation of [`ReadDomains`], and narrowed through the
/// `in_*` methods. Every narrowing intersects the current domain with the given values: if
/// the result is empty the narrowing fails with [`EmptyDomain`], otherwise the previous domain is
/// trailed under the current level and the resulting [`DomainEvent`] is recorded so the store can
/// wake the constraints watching the variable.
#[derive(Debug)]
pub struct PropagationContext<'a> {
    pub(crate) variables: &'a mut KeyedVec<VarId, Variable>,
    pub(crate) trail: &'a mut Trail<TrailEntry>,
    pub(crate) events: &'a mut Vec<(VarId, DomainEvent)>,
    pub(crate) changes: &'a mut u64,
}

impl ReadDomains for PropagationContext<'_> {
    fn domain(&self, var: VarId) -> &Domain {
        &self.variables[var].domain
    }
}

impl<'a> PropagationContext<'a> {
    pub(crate) fn new(
        variables: &'a mut KeyedVec<VarId, Variable>,
        trail: &'a mut Trail<TrailEntry>,
        events: &'a mut Vec<(VarId, DomainEvent)>,
        changes: &'a mut u64,
    ) -> Self {
        PropagationContext {
            variables,
            trail,
            events,
            changes,
        }
    }

    /// The current decision level.
    pub fn level(&self) -> usize {
        self.trail.level()
    }

    /// A counter which increases with every domain change. A constraint is at its fixpoint when
    /// a pass over its narrowings leaves this unchanged.
    pub fn changes(&self) -> u64 {
        *self.changes
    }

    /// A read-only view on the domains.
    pub fn domains(&self) -> Domains<'_> {
        Domains::new(self.variables)
    }

    /// Replaces the domain of `var` by the narrower `domain`, or fails if `domain` is `None`.
    fn update(&mut self, var: VarId, domain: Option<Domain>) -> Result<(), EmptyDomain> {
        let Some(domain) = domain else {
            trace!("Domain of {var} became empty");
            return Err(EmptyDomain);
        };

        let level = self.trail.level();
        let variable = &mut self.variables[var];
        let Some(event) = variable.domain.event_towards(&domain) else {
            return Ok(());
        };

        trace!("{var}: {} -> {domain} {event}", variable.domain);
        let previous = std::mem::replace(&mut variable.domain, domain);
        if level > 0 && variable.last_changed_level != level {
            self.trail.push(TrailEntry::Domain {
                var,
                previous,
                previous_level: variable.last_changed_level,
            });
        }
        variable.last_changed_level = level;

        self.events.push((var, event));
        *self.changes += 1;
        Ok(())
    }

    /// Narrows `var` to `[lower, upper]`.
    pub fn in_int(&mut self, var: IntVar, lower: i64, upper: i64) -> Result<(), EmptyDomain> {
        let domain = self.int_domain(var);
        if lower <= i64::from(domain.min()) && i64::from(domain.max()) <= upper {
            return Ok(());
        }
        let narrowed = domain.with_bounds(lower, upper).map(Domain::Int);
        self.update(var.id(), narrowed)
    }

    pub fn in_int_min(&mut self, var: IntVar, lower: i64) -> Result<(), EmptyDomain> {
        self.in_int(var, lower, i64::MAX)
    }

    pub fn in_int_max(&mut self, var: IntVar, upper: i64) -> Result<(), EmptyDomain> {
        self.in_int(var, i64::MIN, upper)
    }

    pub fn in_int_value(&mut self, var: IntVar, value: i32) -> Result<(), EmptyDomain> {
        self.in_int(var, i64::from(value), i64::from(value))
    }

    /// Removes `value` from `var`.
    pub fn in_int_complement(&mut self, var: IntVar, value: i32) -> Result<(), EmptyDomain> {
        self.in_int_complement_interval(var, value, value)
    }

    /// Removes the values `[lower, upper]` from `var`.
    pub fn in_int_complement_interval(
        &mut self,
        var: IntVar,
        lower: i32,
        upper: i32,
    ) -> Result<(), EmptyDomain> {
        let narrowed = self
            .int_domain(var)
            .without_interval(lower, upper)
            .map(Domain::Int);
        self.update(var.id(), narrowed)
    }

    /// Narrows `var` to the values it shares with `domain`.
    pub fn in_int_domain(&mut self, var: IntVar, domain: &IntDomain) -> Result<(), EmptyDomain> {
        let narrowed = self.int_domain(var).intersect(domain).map(Domain::Int);
        self.update(var.id(), narrowed)
    }

    /// Narrows `var` to `[lower, upper]`, where the bounds are raw results of floating point
    /// computation. They are rounded outward onto the rounding grid first; NaN bounds are
    /// ignored.
    pub fn in_float(&mut self, var: FloatVar, lower: f64, upper: f64) -> Result<(), EmptyDomain> {
        let lower = if lower.is_nan() {
            f64::NEG_INFINITY
        } else {
            rounding::down(lower)
        };
        let upper = if upper.is_nan() {
            f64::INFINITY
        } else {
            rounding::up(upper)
        };
        match Interval::try_new(lower, upper) {
            Some(bounds) => self.in_float_interval(var, bounds),
            None => self.update(var.id(), None),
        }
    }

    pub fn in_float_min(&mut self, var: FloatVar, lower: f64) -> Result<(), EmptyDomain> {
        self.in_float(var, lower, f64::INFINITY)
    }

    pub fn in_float_max(&mut self, var: FloatVar, upper: f64) -> Result<(), EmptyDomain> {
        self.in_float(var, f64::NEG_INFINITY, upper)
    }

    /// Narrows `var` to `bounds`, which are used as they are since an [`Interval`] is already
    /// outward rounded.
    ///
    /// A bound which improves on the current one by less than the configured precision is not
    /// applied, so that repeated narrowing converges.
    pub fn in_float_interval(&mut self, var: FloatVar, bounds: Interval) -> Result<(), EmptyDomain> {
        let current = self.float_domain(var);
        let hull = current.hull();
        let Some(intersection) = hull.intersect(bounds) else {
            return self.update(var.id(), None);
        };

        let lower = if is_negligible(hull.lower(), intersection.lower(), intersection.upper()) {
            hull.lower()
        } else {
            intersection.lower()
        };
        let upper = if is_negligible(hull.upper(), intersection.upper(), intersection.lower()) {
            hull.upper()
        } else {
            intersection.upper()
        };
        if lower == hull.lower() && upper == hull.upper() {
            return Ok(());
        }

        let narrowed = current
            .intersect_interval(Interval::new(lower, upper))
            .map(Domain::Float);
        self.update(var.id(), narrowed)
    }

    /// Narrows `var` to the union of `intervals`.
    pub fn in_float_intervals(
        &mut self,
        var: FloatVar,
        intervals: Vec<Interval>,
    ) -> Result<(), EmptyDomain> {
        match FloatDomain::from_intervals(intervals) {
            Some(domain) => self.in_float_domain(var, &domain),
            None => self.update(var.id(), None),
        }
    }

    /// Narrows `var` to the values it shares with `domain`.
    pub fn in_float_domain(
        &mut self,
        var: FloatVar,
        domain: &FloatDomain,
    ) -> Result<(), EmptyDomain> {
        let Some(intersection) = self.float_domain(var).intersect(domain) else {
            return self.update(var.id(), None);
        };
        self.in_float_interval(var, intersection.hull())?;
        if intersection.intervals().len() == 1 {
            return Ok(());
        }

        // the gaps are applied as they are, the outer bounds only if they were not negligible
        let hull = self.float_bounds(var);
        let mut pieces = intersection.intervals().to_vec();
        let last = pieces.len() - 1;
        pieces[0] = Interval::new(hull.lower(), pieces[0].upper());
        pieces[last] = Interval::new(pieces[last].lower(), hull.upper());

        let narrowed = FloatDomain::from_intervals(pieces)
            .and_then(|gapped| self.float_domain(var).intersect(&gapped))
            .map(Domain::Float);
        self.update(var.id(), narrowed)
    }

    /// Removes the interior of `[lower, upper]` from `var`.
    pub fn in_float_complement(
        &mut self,
        var: FloatVar,
        lower: f64,
        upper: f64,
    ) -> Result<(), EmptyDomain> {
        let narrowed = self
            .float_domain(var)
            .without_interval(lower, upper)
            .map(Domain::Float);
        self.update(var.id(), narrowed)
    }
}

/// Whether moving a bound from `old` to `new` is below the precision, given that the opposite
/// bound is `opposite`. Moves which would make the domain ground are always applied.
fn is_negligible(old: f64, new: f64, opposite: f64) -> bool {
    if old == new || !old.is_finite() || !new.is_finite() {
        return old == new;
    }
    let precision = float_precision().precision;
    let magnitude = old.abs().max(1.0);
    let step = (new - old).abs();
    let remaining = (opposite - new).abs();
    step < precision * magnitude && remaining > precision * magnitude
}
