/// The result of invoking the consistency method of a constraint. Propagation either succeeds or
/// identifies that the current domains admit no solution.
pub type PropagationStatus = Result<(), Inconsistency>;

/// A domain operation removed every value of a variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EmptyDomain;

/// The reason a propagation pass failed. The caller is expected to backtrack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    /// A narrowing operation emptied a domain.
    EmptyDomain,
    /// A constraint established that the current domains cannot satisfy it, without emptying a
    /// domain itself (e.g. an entailed negation).
    Conflict,
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}

impl std::fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Inconsistency::EmptyDomain => write!(f, "a domain became empty"),
            Inconsistency::Conflict => write!(f, "a constraint cannot be satisfied"),
        }
    }
}
