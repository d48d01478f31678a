use enum_map::EnumMap;

use crate::engine::domains::Domain;
use crate::engine::domains::DomainEvent;
use crate::propagation::ConstraintId;

/// The state the store keeps per variable.
#[derive(Clone, Debug)]
pub(crate) struct Variable {
    pub(crate) domain: Domain,
    /// The constraints to wake, keyed by the event they registered for.
    pub(crate) watchers: EnumMap<DomainEvent, Vec<ConstraintId>>,
    /// Bumped whenever a constraint on this variable fails.
    pub(crate) weight: u64,
    /// The level at which the domain was last changed.
    pub(crate) last_changed_level: usize,
    pub(crate) name: Option<String>,
}

impl Variable {
    pub(crate) fn new(domain: Domain, name: Option<String>) -> Variable {
        Variable {
            domain,
            watchers: EnumMap::default(),
            weight: 1,
            last_changed_level: 0,
            name,
        }
    }

    pub(crate) fn watch(&mut self, constraint: ConstraintId, event: DomainEvent) {
        let watchers = &mut self.watchers[event];
        if !watchers.contains(&constraint) {
            watchers.push(constraint);
        }
    }

    /// The constraints which should be woken by a change of class `event`.
    pub(crate) fn woken_by(&self, event: DomainEvent) -> impl Iterator<Item = ConstraintId> + '_ {
        event
            .woken_registrations()
            .into_iter()
            .flat_map(move |registration| self.watchers[registration].iter().copied())
    }
}
