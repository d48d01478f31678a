use std::fmt::Display;

use downcast_rs::impl_downcast;
use downcast_rs::Downcast;
use dyn_clone::clone_trait_object;
use dyn_clone::DynClone;

use super::Domains;
use super::PropagationContext;
use crate::basic_types::PropagationStatus;
#[cfg(doc)]
use crate::create_statistics_struct;
use crate::engine::domains::DomainEvent;
use crate::engine::variables::VarId;
#[cfg(doc)]
use crate::engine::LevelState;
#[cfg(doc)]
use crate::engine::Store;
use crate::propagators::nonlinear::DifferentiableRelation;
use crate::statistics::StatisticLogger;

// Allows casting from `Box<dyn Constraint>` back to the concrete constraint through a
// [`ConstraintHandle`](super::ConstraintHandle).
impl_downcast!(Constraint);

// Allows the store, and constraints wrapping other constraints, to be cloned.
clone_trait_object!(Constraint);

/// A constraint removes values from the domains of its scope which cannot be part of any
/// solution, or reports that no solution exists.
///
/// The required functions are [`Constraint::name`], [`Constraint::scope`],
/// [`Constraint::consistency`] and [`Constraint::satisfied`]; the others have default
/// implementations.
///
/// See the [`crate::propagation`] documentation for more details.
pub trait Constraint: Downcast + DynClone + Display {
    /// Return the name of the constraint.
    ///
    /// This is a convenience method that is used for printing.
    fn name(&self) -> &str;

    /// The variables the constraint is defined over, in their declared order. The store registers
    /// the constraint on every one of them.
    fn scope(&self) -> Vec<VarId>;

    /// Removes values from the domains of the scope which cannot be part of any solution given
    /// the current domains, or detects that there is none.
    ///
    /// Implementations repeat their narrowing until [`PropagationContext::changes`] is stable
    /// across one pass, so that a single call leaves the constraint at its fixpoint. The store
    /// does not wake a constraint for changes it made itself.
    fn consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus;

    /// Returns true only if every combination of values in the current domains satisfies the
    /// relation; in particular when all variables are ground and their values satisfy it.
    ///
    /// A constraint which is satisfied after its consistency returned is retired until the store
    /// backtracks past the level at which that happened.
    fn satisfied(&self, domains: &Domains<'_>) -> bool;

    /// The coarsest [`DomainEvent`] on `var` the constraint must be woken for.
    ///
    /// By default constraints are woken by every bound change.
    fn consistency_pruning_event(&self, _var: VarId) -> DomainEvent {
        DomainEvent::Bound
    }

    /// Returns the [`Priority`] of the constraint, used for determining the order in which
    /// constraints are run. By default the priority is set to [`Priority::VeryLow`].
    fn priority(&self) -> Priority {
        Priority::VeryLow
    }

    /// Whether the constraint keeps private state that depends on the decision level. Such
    /// constraints are notified through [`Constraint::remove_level`] before the store restores
    /// domains, typically to reset a [`LevelState`].
    fn is_stateful(&self) -> bool {
        false
    }

    /// Called by [`Store::remove_level`] with the level being removed, before any domain is
    /// restored.
    fn remove_level(&mut self, _level: usize) {}

    /// The functional view of this constraint used by the derivative engine, if it has one.
    fn as_differentiable(&self) -> Option<&dyn DifferentiableRelation> {
        None
    }

    /// Logs statistics of the constraint using the provided [`StatisticLogger`].
    ///
    /// It is recommended to create a struct through the [`create_statistics_struct!`] macro!
    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}
}

/// The priority of a constraint, used for determining the order in which constraints will be
/// run.
///
/// Constraints with high priority are run before constraints with low(er) priority. If two
/// constraints have the same priority, they are run in the order in which they were woken.
///
/// Typically, constraints with low computational complexity should be assigned a high priority.
#[derive(Default, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Priority {
    High = 0,
    Medium = 1,
    Low = 2,
    #[default]
    VeryLow = 3,
}

impl Priority {
    pub(crate) const NUM_PRIORITIES: usize = 4;
}
