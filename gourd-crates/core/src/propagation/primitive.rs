use super::Constraint;
use super::Domains;
use super::PropagationContext;
use crate::basic_types::PropagationStatus;
use crate::engine::domains::DomainEvent;
use crate::engine::variables::VarId;
#[cfg(doc)]
use crate::propagators::logical::Reified;

/// A constraint which can also enforce its negation. This is what allows embedding it under
/// [`Reified`], `Not` and `Xor`.
pub trait PrimitiveConstraint: Constraint {
    /// Enforces the negation of the relation, the counterpart of [`Constraint::consistency`].
    fn not_consistency(&mut self, context: &mut PropagationContext<'_>) -> PropagationStatus;

    /// Returns true only if no combination of values in the current domains satisfies the
    /// relation.
    fn not_satisfied(&self, domains: &Domains<'_>) -> bool;

    /// The coarsest event on `var` the negated relation must be woken for.
    fn not_consistency_pruning_event(&self, _var: VarId) -> DomainEvent {
        DomainEvent::Bound
    }
}
