//! The domains of variables: finite sets of integers and unions of real intervals.
mod domain_event;
mod float_domain;
mod int_domain;

use std::fmt::Display;

pub use domain_event::DomainEvent;
pub use float_domain::FloatDomain;
pub use int_domain::IntDomain;
pub use int_domain::IntInterval;

/// The domain of a variable.
#[derive(Clone, Debug, PartialEq)]
pub enum Domain {
    Int(IntDomain),
    Float(FloatDomain),
}

impl Domain {
    pub fn is_ground(&self) -> bool {
        match self {
            Domain::Int(domain) => domain.is_singleton(),
            Domain::Float(domain) => domain.is_ground(),
        }
    }

    /// The class of change from `self` to the narrower `new` domain, or `None` if nothing changed.
    pub(crate) fn event_towards(&self, new: &Domain) -> Option<DomainEvent> {
        if self == new {
            return None;
        }
        if new.is_ground() {
            return Some(DomainEvent::Ground);
        }
        let bounds_changed = match (self, new) {
            (Domain::Int(old), Domain::Int(new)) => old.min() != new.min() || old.max() != new.max(),
            (Domain::Float(old), Domain::Float(new)) => {
                old.min() != new.min() || old.max() != new.max()
            }
            _ => true,
        };
        if bounds_changed {
            Some(DomainEvent::Bound)
        } else {
            Some(DomainEvent::Any)
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Domain::Int(domain) => domain.fmt(f),
            Domain::Float(domain) => domain.fmt(f),
        }
    }
}
