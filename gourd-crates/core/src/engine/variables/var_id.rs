use std::fmt::Display;

use crate::containers::StorageKey;

/// An identifier to a variable within the [`Store`](crate::engine::Store), regardless of its
/// kind.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VarId(pub(crate) u32);

impl Display for VarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl StorageKey for VarId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        VarId(index as u32)
    }
}

/// A variable with an integer domain.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct IntVar(pub(crate) VarId);

/// A variable with a float domain.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FloatVar(pub(crate) VarId);

impl IntVar {
    pub fn id(self) -> VarId {
        self.0
    }
}

impl FloatVar {
    pub fn id(self) -> VarId {
        self.0
    }
}

impl From<IntVar> for VarId {
    fn from(value: IntVar) -> Self {
        value.0
    }
}

impl From<FloatVar> for VarId {
    fn from(value: FloatVar) -> Self {
        value.0
    }
}

impl Display for IntVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Display for FloatVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0 .0)
    }
}
