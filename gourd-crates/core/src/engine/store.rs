use log::debug;
use log::trace;
use log::warn;

use super::constraint_queue::ConstraintQueue;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Inconsistency;
use crate::basic_types::ModelConstructionError;
use crate::basic_types::PropagationStatus;
use crate::basic_types::Trail;
use crate::containers::HashMap;
use crate::containers::KeyedVec;
use crate::create_statistics_struct;
use crate::engine::domains::Domain;
use crate::engine::domains::DomainEvent;
use crate::engine::domains::FloatDomain;
use crate::engine::domains::IntDomain;
use crate::engine::variables::FloatVar;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarId;
use crate::engine::variables::Variable;
use crate::gourd_assert_simple;
use crate::math::rounding;
use crate::math::Interval;
use crate::propagation::Constraint;
use crate::propagation::ConstraintHandle;
use crate::propagation::ConstraintId;
use crate::propagation::Domains;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;
use crate::propagators::nonlinear::UnsupportedStructure;
use crate::statistics::log_statistic_postfix;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

create_statistics_struct!(
    /// Counters kept by the [`Store`].
    StoreStatistics {
        /// The number of calls to [`Store::consistency`].
        consistency_calls: u64,
        /// The number of times the consistency of a constraint was run.
        constraint_invocations: u64,
        /// The number of consistency calls which ended in failure.
        failures: u64,
        /// The number of removed levels.
        backtracks: u64,
        /// The number of constraints retired because they were satisfied.
        retirements: u64,
});

/// An undo record. Restoring the trail to a level replays the records of the removed levels,
/// youngest first.
#[derive(Clone, Debug)]
pub(crate) enum TrailEntry {
    Domain {
        var: VarId,
        previous: Domain,
        previous_level: usize,
    },
    Retirement(ConstraintId),
}

#[derive(Clone)]
struct ConstraintSlot {
    constraint: Box<dyn Constraint>,
    priority: Priority,
    /// Helpers created by the derivative engine; they describe derivatives and never propagate.
    derivative_only: bool,
    retired: bool,
    /// The level at which the constraint was first run, if it has been run.
    first_run_level: Option<usize>,
}

impl std::fmt::Debug for ConstraintSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintSlot")
            .field("constraint", &self.constraint.to_string())
            .field("priority", &self.priority)
            .field("derivative_only", &self.derivative_only)
            .field("retired", &self.retired)
            .field("first_run_level", &self.first_run_level)
            .finish()
    }
}

/// Owns the variables and constraints of a model, the current decision level, the trail used to
/// restore domains when levels are removed, and the queue of constraints awaiting propagation.
///
/// The search layer drives the store: it opens a level with [`Store::new_level`], narrows the
/// domain of some variable, calls [`Store::consistency`], and on failure removes the level again
/// with [`Store::remove_level`].
#[derive(Clone, Debug, Default)]
pub struct Store {
    variables: KeyedVec<VarId, Variable>,
    constraints: KeyedVec<ConstraintId, ConstraintSlot>,
    trail: Trail<TrailEntry>,
    queue: ConstraintQueue,
    /// What was pending when each level was opened, restored when that level is removed.
    opened_levels: Vec<OpenedLevel>,
    /// Domain changes not yet turned into wake-ups.
    events: Vec<(VarId, DomainEvent)>,
    /// Increases with every domain change.
    changes: u64,
    /// Set when propagation failed at the current level; cleared by removing the level.
    failure: Option<Inconsistency>,
    /// The constraints which are notified on level removal.
    stateful: Vec<ConstraintId>,
    /// Explicit defining relations of variables, consulted by the derivative engine first.
    definitions: HashMap<VarId, ConstraintId>,
    statistics: StoreStatistics,
}

/// The propagation state of the store at the moment a level was opened.
#[derive(Clone, Debug)]
struct OpenedLevel {
    pending: Vec<ConstraintId>,
    failure: Option<Inconsistency>,
}

impl ReadDomains for Store {
    fn domain(&self, var: VarId) -> &Domain {
        &self.variables[var].domain
    }
}

// Variables
impl Store {
    fn new_variable(&mut self, domain: Domain, name: Option<&str>) -> VarId {
        let var = self
            .variables
            .push(Variable::new(domain, name.map(str::to_owned)));
        trace!("Created variable {var} with domain {}", self.variables[var].domain);
        var
    }

    /// Creates an integer variable with domain `[lower, upper]`.
    pub fn new_int_variable(
        &mut self,
        lower: i32,
        upper: i32,
    ) -> Result<IntVar, ModelConstructionError> {
        self.new_named_int_variable(lower, upper, None)
    }

    pub fn new_named_int_variable(
        &mut self,
        lower: i32,
        upper: i32,
        name: Option<&str>,
    ) -> Result<IntVar, ModelConstructionError> {
        let domain =
            IntDomain::new(lower, upper).ok_or_else(|| ModelConstructionError::InvalidBounds {
                lower: lower.to_string(),
                upper: upper.to_string(),
            })?;
        Ok(self.new_int_variable_with_domain(domain, name))
    }

    /// Creates an integer variable with an arbitrary domain.
    pub fn new_int_variable_with_domain(&mut self, domain: IntDomain, name: Option<&str>) -> IntVar {
        IntVar(self.new_variable(Domain::Int(domain), name))
    }

    pub fn new_int_constant(&mut self, value: i32) -> IntVar {
        self.new_int_variable_with_domain(IntDomain::singleton(value), None)
    }

    /// Creates a float variable with domain `[lower, upper]`; the bounds are rounded outward onto
    /// the rounding grid.
    pub fn new_float_variable(
        &mut self,
        lower: f64,
        upper: f64,
    ) -> Result<FloatVar, ModelConstructionError> {
        self.new_named_float_variable(lower, upper, None)
    }

    pub fn new_named_float_variable(
        &mut self,
        lower: f64,
        upper: f64,
        name: Option<&str>,
    ) -> Result<FloatVar, ModelConstructionError> {
        let domain = FloatDomain::new(rounding::down(lower), rounding::up(upper))
            .filter(|_| lower < f64::INFINITY && upper > f64::NEG_INFINITY)
            .ok_or_else(|| ModelConstructionError::InvalidBounds {
                lower: lower.to_string(),
                upper: upper.to_string(),
            })?;
        Ok(self.new_float_variable_with_domain(domain, name))
    }

    /// Creates a float variable with an arbitrary domain, whose bounds are used as they are.
    pub fn new_float_variable_with_domain(
        &mut self,
        domain: FloatDomain,
        name: Option<&str>,
    ) -> FloatVar {
        FloatVar(self.new_variable(Domain::Float(domain), name))
    }

    /// Creates a float variable whose domain is the smallest grid interval containing `value`.
    pub fn new_float_constant(&mut self, value: f64) -> Result<FloatVar, ModelConstructionError> {
        if !value.is_finite() {
            return Err(ModelConstructionError::ConstantOutOfRange {
                constraint: "float constant",
                value: value.to_string(),
            });
        }
        self.new_float_variable(value, value)
    }

    /// Recovers the integer variable behind an untyped identifier.
    pub fn int_var(&self, var: VarId) -> Result<IntVar, ModelConstructionError> {
        match self.variables[var].domain {
            Domain::Int(_) => Ok(IntVar(var)),
            Domain::Float(_) => Err(ModelConstructionError::WrongVariableKind {
                variable: self.describe(var),
                expected: "an integer",
            }),
        }
    }

    /// Recovers the float variable behind an untyped identifier.
    pub fn float_var(&self, var: VarId) -> Result<FloatVar, ModelConstructionError> {
        match self.variables[var].domain {
            Domain::Float(_) => Ok(FloatVar(var)),
            Domain::Int(_) => Err(ModelConstructionError::WrongVariableKind {
                variable: self.describe(var),
                expected: "a float",
            }),
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variable_name(&self, var: impl Into<VarId>) -> Option<&str> {
        self.variables[var.into()].name.as_deref()
    }

    /// A readable description of the variable, its name if it has one.
    pub fn describe(&self, var: impl Into<VarId>) -> String {
        let var = var.into();
        match self.variable_name(var) {
            Some(name) => name.to_owned(),
            None => var.to_string(),
        }
    }

    /// The failure count of the constraints on `var`, for use by variable selection heuristics.
    pub fn weight(&self, var: impl Into<VarId>) -> u64 {
        self.variables[var.into()].weight
    }

    /// The decision level at which the domain of `var` last changed.
    pub fn last_changed_level(&self, var: impl Into<VarId>) -> usize {
        self.variables[var.into()].last_changed_level
    }
}

// Decision levels
impl Store {
    /// The current decision level; the store starts at level 0.
    pub fn level(&self) -> usize {
        self.trail.level()
    }

    /// Opens a new decision level and returns it. Domain changes from now on are undone by
    /// removing this level.
    pub fn new_level(&mut self) -> usize {
        self.enqueue_events(None);
        self.opened_levels.push(OpenedLevel {
            pending: self.queue.pending().collect(),
            failure: self.failure,
        });
        self.trail.new_level();
        trace!("Opened level {}", self.level());
        self.level()
    }

    /// Undoes every change made at `level` and above, and continues at `level - 1`.
    ///
    /// Stateful constraints are notified before any domain is restored. Propagation pending at the
    /// removed levels is discarded and a failure at the removed levels is forgotten. The queue is
    /// restored to what was pending when `level` was opened, together with the constraints
    /// reinstated from retirement and those first run at a removed level, so the next
    /// [`Store::consistency`] reaches the fixpoint of the restored domains.
    pub fn remove_level(&mut self, level: usize) {
        gourd_assert_simple!(
            level >= 1 && level <= self.level(),
            "cannot remove level {level} at level {}",
            self.level()
        );

        for &constraint in &self.stateful {
            self.constraints[constraint].constraint.remove_level(level);
        }

        debug!(
            "Removing level {level}, restoring {} trail entries",
            (level..=self.level())
                .map(|removed| self.trail.entries_at_level(removed).len())
                .sum::<usize>()
        );
        let mut reinstated = vec![];
        for entry in self.trail.synchronise(level - 1) {
            match entry {
                TrailEntry::Domain {
                    var,
                    previous,
                    previous_level,
                } => {
                    let variable = &mut self.variables[var];
                    variable.domain = previous;
                    variable.last_changed_level = previous_level;
                }
                TrailEntry::Retirement(constraint) => {
                    self.constraints[constraint].retired = false;
                    reinstated.push(constraint);
                }
            }
        }

        self.queue.clear();
        self.events.clear();

        let opened = self.opened_levels.drain(level - 1..).next();
        self.failure = opened.as_ref().and_then(|opened| opened.failure);
        let first_run_above = self
            .constraints
            .keys()
            .filter(|&id| self.constraints[id].first_run_level >= Some(level))
            .collect::<Vec<_>>();
        for &id in &first_run_above {
            self.constraints[id].first_run_level = None;
        }
        for id in opened
            .into_iter()
            .flat_map(|opened| opened.pending)
            .chain(reinstated)
            .chain(first_run_above)
        {
            let slot = &self.constraints[id];
            if !slot.retired && !slot.derivative_only {
                self.queue.enqueue(id, slot.priority);
            }
        }
        trace!("{} constraints pending after backtracking", self.queue.len());

        self.statistics.backtracks += 1;
    }

    /// A read-only view on the domains, as handed to [`Constraint::satisfied`].
    pub fn domains(&self) -> Domains<'_> {
        Domains::new(&self.variables)
    }

    /// Whether propagation failed at the current level.
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Increases with every domain change.
    pub fn changes(&self) -> u64 {
        self.changes
    }
}

// Constraints
impl Store {
    /// Imposes `constraint`: registers it on its scope for the events it declares and queues it
    /// for propagation. The constraint is only run by the next [`Store::consistency`].
    pub fn impose<C: Constraint>(&mut self, constraint: C) -> ConstraintHandle<C> {
        self.impose_with_pruning_events(constraint, &[])
    }

    /// Imposes `constraint` with the declared pruning event of some variables replaced.
    pub fn impose_with_pruning_events<C: Constraint>(
        &mut self,
        constraint: C,
        overrides: &[(VarId, DomainEvent)],
    ) -> ConstraintHandle<C> {
        let id = self.constraints.next_key();

        for var in constraint.scope() {
            let event = overrides
                .iter()
                .find(|(overridden, _)| *overridden == var)
                .map(|&(_, event)| event)
                .unwrap_or_else(|| constraint.consistency_pruning_event(var));
            self.variables[var].watch(id, event);
        }

        let priority = constraint.priority();
        if constraint.is_stateful() {
            self.stateful.push(id);
        }
        debug!("Imposing {constraint} as {id}");

        let _ = self.constraints.push(ConstraintSlot {
            constraint: Box::new(constraint),
            priority,
            derivative_only: false,
            retired: false,
            first_run_level: None,
        });
        self.queue.enqueue(id, priority);

        ConstraintHandle::new(id)
    }

    /// Imposes `constraint` and propagates immediately, failing if the model became infeasible.
    pub fn impose_with_consistency<C: Constraint>(
        &mut self,
        constraint: C,
    ) -> Result<ConstraintHandle<C>, ConstraintOperationError> {
        if self.is_failed() {
            return Err(ConstraintOperationError::InfeasibleState);
        }
        let handle = self.impose(constraint);
        self.consistency()
            .map_err(|_| ConstraintOperationError::InfeasibleConstraint)?;
        Ok(handle)
    }

    /// Adds a relation which only describes a derivative. It is never woken, but the derivative
    /// engine and the nonlinear solvers evaluate it.
    pub(crate) fn impose_derivative_only<C: Constraint>(&mut self, constraint: C) -> ConstraintId {
        trace!("Adding derivative relation {constraint}");
        self.constraints.push(ConstraintSlot {
            constraint: Box::new(constraint),
            priority: Priority::VeryLow,
            derivative_only: true,
            retired: false,
            first_run_level: None,
        })
    }

    /// Declares the relation of `handle` as the definition of `var`, which takes precedence over
    /// structural matching in the derivative engine.
    pub fn define<C: Constraint>(
        &mut self,
        var: FloatVar,
        handle: ConstraintHandle<C>,
    ) -> Result<(), UnsupportedStructure> {
        let defines_var = self
            .constraints
            .get(handle.id())
            .and_then(|slot| slot.constraint.as_differentiable())
            .is_some_and(|relation| relation.output() == var);
        if !defines_var {
            return Err(UnsupportedStructure::NotADefinition {
                variable: self.describe(var),
            });
        }
        let _ = self.definitions.insert(var.id(), handle.id());
        Ok(())
    }

    /// The constraint behind `handle`.
    pub fn get_constraint<C: Constraint>(&self, handle: ConstraintHandle<C>) -> Option<&C> {
        self.constraints
            .get(handle.id())
            .and_then(|slot| slot.constraint.downcast_ref::<C>())
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the constraint was found satisfied and no longer takes part in propagation.
    pub fn is_retired(&self, constraint: ConstraintId) -> bool {
        self.constraints[constraint].retired
    }

    /// Whether the constraint is satisfied by every combination of values of the current domains.
    pub fn is_satisfied(&self, constraint: ConstraintId) -> bool {
        self.constraints[constraint]
            .constraint
            .satisfied(&self.domains())
    }

    /// A copy of the constraint, if it has a functional view.
    pub(crate) fn relation(&self, constraint: ConstraintId) -> Option<Box<dyn Constraint>> {
        self.constraints
            .get(constraint)
            .filter(|slot| slot.constraint.as_differentiable().is_some())
            .map(|slot| slot.constraint.clone())
    }

    pub(crate) fn explicit_definition(&self, var: VarId) -> Option<ConstraintId> {
        self.definitions.get(&var).copied()
    }

    /// The constraints, apart from derivative helpers, with a functional view whose output is
    /// `var`.
    pub(crate) fn relations_with_output(&self, var: VarId) -> Vec<ConstraintId> {
        self.constraints
            .keys()
            .filter(|&id| {
                let slot = &self.constraints[id];
                !slot.derivative_only
                    && slot
                        .constraint
                        .as_differentiable()
                        .is_some_and(|relation| relation.output().id() == var)
            })
            .collect()
    }
}

// Propagation
impl Store {
    /// Runs the queued constraints until none is left or a domain becomes empty.
    ///
    /// On success every constraint is at its fixpoint. On failure the store stays failed until
    /// the current level is removed.
    pub fn consistency(&mut self) -> PropagationStatus {
        if let Some(failure) = self.failure {
            return Err(failure);
        }
        self.statistics.consistency_calls += 1;
        self.enqueue_events(None);

        while let Some(id) = self.queue.pop() {
            if self.constraints[id].retired {
                continue;
            }

            self.statistics.constraint_invocations += 1;
            let result = self.run_constraint(id);

            if let Err(inconsistency) = result {
                self.fail(id, inconsistency);
                return Err(inconsistency);
            }

            self.enqueue_events(Some(id));
            self.retire_if_satisfied(id);
        }

        Ok(())
    }

    fn run_constraint(&mut self, id: ConstraintId) -> PropagationStatus {
        let Store {
            variables,
            constraints,
            trail,
            events,
            changes,
            ..
        } = self;
        let slot = &mut constraints[id];
        trace!("Running {}", slot.constraint);
        if slot.first_run_level.is_none() {
            slot.first_run_level = Some(trail.level());
        }

        let mut context = PropagationContext::new(variables, trail, events, changes);
        slot.constraint.consistency(&mut context)
    }

    /// Wakes the constraints watching the variables changed since the last call, except for
    /// `current`, which is responsible for its own fixpoint.
    fn enqueue_events(&mut self, current: Option<ConstraintId>) {
        let mut events = std::mem::take(&mut self.events);
        for (var, event) in events.drain(..) {
            for watcher in self.variables[var].woken_by(event) {
                let slot = &self.constraints[watcher];
                if Some(watcher) != current && !slot.retired && !slot.derivative_only {
                    self.queue.enqueue(watcher, slot.priority);
                }
            }
        }
        self.events = events;
    }

    fn retire_if_satisfied(&mut self, id: ConstraintId) {
        let satisfied = self.constraints[id]
            .constraint
            .satisfied(&self.domains());
        if !satisfied {
            return;
        }

        trace!("Retiring {}", self.constraints[id].constraint);
        self.constraints[id].retired = true;
        if self.level() > 0 {
            self.trail.push(TrailEntry::Retirement(id));
        }
        self.statistics.retirements += 1;
    }

    fn fail(&mut self, id: ConstraintId, inconsistency: Inconsistency) {
        debug!(
            "{} failed at level {}: {inconsistency}",
            self.constraints[id].constraint,
            self.level()
        );
        for var in self.constraints[id].constraint.scope() {
            self.variables[var].weight += 1;
        }
        self.failure = Some(inconsistency);
        self.events.clear();
        self.queue.clear();
        self.statistics.failures += 1;
    }

    /// Applies a narrowing from outside of any constraint, typically a search decision. The
    /// affected constraints are woken by the next [`Store::consistency`].
    pub fn narrow<E: Into<Inconsistency> + Copy>(
        &mut self,
        narrowing: impl FnOnce(&mut PropagationContext<'_>) -> Result<(), E>,
    ) -> Result<(), E> {
        if self.is_failed() {
            warn!("Narrowing a failed store at level {}", self.level());
        }
        let mut context = PropagationContext::new(
            &mut self.variables,
            &mut self.trail,
            &mut self.events,
            &mut self.changes,
        );
        let result = narrowing(&mut context);
        if let Err(failure) = result {
            self.failure = Some(failure.into());
            self.events.clear();
        }
        result
    }

    pub fn in_int(&mut self, var: IntVar, lower: i64, upper: i64) -> Result<(), EmptyDomain> {
        self.narrow(|context| context.in_int(var, lower, upper))
    }

    pub fn in_int_value(&mut self, var: IntVar, value: i32) -> Result<(), EmptyDomain> {
        self.narrow(|context| context.in_int_value(var, value))
    }

    pub fn in_int_complement(&mut self, var: IntVar, value: i32) -> Result<(), EmptyDomain> {
        self.narrow(|context| context.in_int_complement(var, value))
    }

    pub fn in_float(&mut self, var: FloatVar, lower: f64, upper: f64) -> Result<(), EmptyDomain> {
        self.narrow(|context| context.in_float(var, lower, upper))
    }

    pub fn in_float_interval(
        &mut self,
        var: FloatVar,
        bounds: Interval,
    ) -> Result<(), EmptyDomain> {
        self.narrow(|context| context.in_float_interval(var, bounds))
    }
}

// Statistics
impl Store {
    pub fn statistics(&self) -> &StoreStatistics {
        &self.statistics
    }

    /// Logs the statistics of the store and of every constraint through the statistic logging
    /// facility.
    pub fn log_statistics(&self) {
        let logger = StatisticLogger::new("store");
        self.statistics.log(logger.clone());
        for (index, slot) in self.constraints.iter().enumerate() {
            slot.constraint.log_statistics(
                logger.attach_to_prefix(format!("{}_{index}", slot.constraint.name())),
            );
        }
        log_statistic_postfix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagators::integer::XeqC;
    use crate::propagators::integer::XeqY;
    use crate::propagators::integer::XltY;
    use crate::propagators::integer::XplusYeqZ;

    #[test]
    fn invalid_bounds_are_rejected() {
        let mut store = Store::default();

        assert!(matches!(
            store.new_int_variable(5, 4),
            Err(ModelConstructionError::InvalidBounds { .. })
        ));
        assert!(store.new_float_variable(f64::NAN, 1.0).is_err());
        assert!(store.new_float_constant(f64::INFINITY).is_err());
    }

    #[test]
    fn untyped_identifiers_are_checked_against_the_kind() {
        let mut store = Store::default();
        let x = store
            .new_named_int_variable(0, 1, Some("flag"))
            .expect("valid bounds");
        let p = store.new_float_variable(0.0, 1.0).expect("valid bounds");

        assert_eq!(Ok(x), store.int_var(x.id()));
        assert_eq!(Ok(p), store.float_var(p.id()));
        assert_eq!(
            Err(ModelConstructionError::WrongVariableKind {
                variable: "flag".to_owned(),
                expected: "a float",
            }),
            store.float_var(x.id())
        );
        assert!(store.int_var(p.id()).is_err());
    }

    #[test]
    fn consistency_reaches_fixpoint_through_a_chain() {
        let mut store = Store::default();
        let x = store.new_int_variable(0, 10).expect("valid bounds");
        let y = store.new_int_variable(0, 10).expect("valid bounds");
        let z = store.new_int_variable(0, 10).expect("valid bounds");

        let _ = store.impose(XltY::new(x, y));
        let _ = store.impose(XltY::new(y, z));
        store.consistency().expect("no empty domains");

        assert_eq!(8, store.upper_bound(x));
        assert_eq!(1, store.lower_bound(y));
        assert_eq!(9, store.upper_bound(y));
        assert_eq!(2, store.lower_bound(z));
    }

    #[test]
    fn remove_level_restores_domains_exactly() {
        let mut store = Store::default();
        let x = store.new_int_variable(0, 10).expect("valid bounds");
        let y = store.new_int_variable(0, 10).expect("valid bounds");
        let _ = store.impose(XeqY::new(x, y));
        store.consistency().expect("no empty domains");

        let level = store.new_level();
        store.in_int(x, 3, 5).expect("no empty domains");
        store.consistency().expect("no empty domains");
        assert_eq!(3, store.lower_bound(y));
        assert_eq!(1, store.last_changed_level(y));

        store.remove_level(level);
        assert_eq!(0, store.level());
        assert_eq!(0, store.lower_bound(y));
        assert_eq!(10, store.upper_bound(x));
        assert_eq!(0, store.last_changed_level(y));
    }

    #[test]
    fn failure_persists_until_level_is_removed() {
        let mut store = Store::default();
        let x = store.new_int_variable(0, 10).expect("valid bounds");
        let y = store.new_int_variable(0, 10).expect("valid bounds");
        let _ = store.impose(XltY::new(x, y));

        let level = store.new_level();
        store.in_int(y, 0, 0).expect("no empty domains");
        assert_eq!(Err(Inconsistency::EmptyDomain), store.consistency());
        assert!(store.is_failed());
        assert!(store.consistency().is_err());
        assert!(store.weight(x) > 1);

        store.remove_level(level);
        assert!(!store.is_failed());
        store.consistency().expect("no empty domains");
        assert_eq!(9, store.upper_bound(x));
    }

    #[test]
    fn satisfied_constraints_are_retired_and_reinstated() {
        let mut store = Store::default();
        let x = store.new_int_variable(0, 10).expect("valid bounds");
        let y = store.new_int_variable(0, 10).expect("valid bounds");
        let z = store.new_int_variable(0, 20).expect("valid bounds");
        let handle = store.impose(XplusYeqZ::new(x, y, z));
        store.consistency().expect("no empty domains");

        let level = store.new_level();
        store.in_int_value(x, 2).expect("no empty domains");
        store.in_int_value(y, 3).expect("no empty domains");
        store.consistency().expect("no empty domains");
        assert_eq!(Some(5), store.fixed_value(z));
        assert!(store.is_retired(handle.id()));

        store.remove_level(level);
        assert!(!store.is_retired(handle.id()));
    }

    #[test]
    fn propagation_pending_when_a_level_opened_is_restored() {
        let mut store = Store::default();
        let x = store.new_int_variable(0, 10).expect("valid bounds");
        let handle = store.impose(XeqC::new(x, 4));

        let level = store.new_level();
        store.consistency().expect("no empty domains");
        assert!(store.is_retired(handle.id()));

        store.remove_level(level);
        assert_eq!(10, store.upper_bound(x));
        store.consistency().expect("no empty domains");
        assert_eq!(Some(4), store.fixed_value(x));
    }

    #[test]
    fn constraints_imposed_at_a_removed_level_are_run_again() {
        let mut store = Store::default();
        let x = store.new_int_variable(0, 10).expect("valid bounds");
        let y = store.new_int_variable(0, 10).expect("valid bounds");

        let level = store.new_level();
        let _ = store.impose(XltY::new(x, y));
        store.in_int(y, 0, 5).expect("no empty domains");
        store.consistency().expect("no empty domains");
        assert_eq!(4, store.upper_bound(x));

        store.remove_level(level);
        store.consistency().expect("no empty domains");
        assert_eq!(9, store.upper_bound(x));
        assert_eq!(1, store.lower_bound(y));
    }

    #[test]
    fn failure_from_before_a_level_survives_its_removal() {
        let mut store = Store::default();
        let x = store.new_int_variable(5, 10).expect("valid bounds");
        let y = store.new_int_variable(0, 5).expect("valid bounds");
        let _ = store.impose(XltY::new(x, y));
        assert!(store.consistency().is_err());

        let level = store.new_level();
        store.remove_level(level);
        assert!(store.is_failed());
    }

    #[test]
    fn impose_with_consistency_reports_infeasibility() {
        let mut store = Store::default();
        let x = store.new_int_variable(5, 10).expect("valid bounds");
        let y = store.new_int_variable(0, 5).expect("valid bounds");

        let result = store.impose_with_consistency(XltY::new(x, y));
        assert_eq!(
            Some(ConstraintOperationError::InfeasibleConstraint),
            result.err()
        );

        let result = store.impose_with_consistency(XltY::new(y, x));
        assert_eq!(Some(ConstraintOperationError::InfeasibleState), result.err());
    }

    #[test]
    fn imposed_constraints_can_be_retrieved() {
        let mut store = Store::default();
        let x = store.new_int_variable(0, 10).expect("valid bounds");
        let y = store.new_int_variable(0, 10).expect("valid bounds");
        let handle = store.impose(XltY::new(x, y));

        let constraint = store.get_constraint(handle).expect("constraint exists");
        assert_eq!("XltY", constraint.name());
    }

    #[test]
    fn names_are_used_in_descriptions() {
        let mut store = Store::default();
        let x = store
            .new_named_int_variable(0, 1, Some("x"))
            .expect("valid bounds");
        let y = store.new_int_variable(0, 1).expect("valid bounds");

        assert_eq!("x", store.describe(x));
        assert_eq!(y.id().to_string(), store.describe(y));
    }
}
