use std::fmt::Display;

use enum_map::Enum;
use enumset::EnumSet;
use enumset::EnumSetType;

/// The classes of change a narrowing can cause on a domain, ordered from the most specific to
/// the most general.
///
/// A constraint registers for one of these on each variable of its scope. A change of class
/// `Ground` wakes every registered constraint, a change of class `Bound` wakes the constraints
/// registered for `Bound` or `Any`, and a change which only removes interior values wakes the
/// constraints registered for `Any`.
#[derive(Debug, Hash, Enum, EnumSetType)]
pub enum DomainEvent {
    /// The domain became a single value (for floats: narrower than the precision).
    Ground,
    /// The minimum or maximum of the domain changed.
    Bound,
    /// Any value was removed from the domain.
    Any,
}

impl DomainEvent {
    /// The registrations which are woken by a change of this class.
    pub fn woken_registrations(self) -> EnumSet<DomainEvent> {
        match self {
            DomainEvent::Ground => EnumSet::all(),
            DomainEvent::Bound => DomainEvent::Bound | DomainEvent::Any,
            DomainEvent::Any => EnumSet::only(DomainEvent::Any),
        }
    }

    /// Whether a constraint registered for `self` should be woken by `change`.
    pub fn is_woken_by(self, change: DomainEvent) -> bool {
        change.woken_registrations().contains(self)
    }
}

impl Display for DomainEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainEvent::Ground => write!(f, "[Event:Ground]"),
            DomainEvent::Bound => write!(f, "[Event:Bound]"),
            DomainEvent::Any => write!(f, "[Event:Any]"),
        }
    }
}
