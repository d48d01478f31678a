use std::marker::PhantomData;

use crate::containers::StorageKey;

/// An identifier to a constraint instance within the store.
/// Each imposed constraint is assigned a unique identifier at runtime.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ConstraintId(pub(crate) u32);

impl std::fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConstraintId({})", self.0)
    }
}

impl StorageKey for ConstraintId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        ConstraintId(index as u32)
    }
}

/// A typed handle to a constraint in the store, which allows retrieving the concrete constraint
/// again through [`Store::get_constraint`](crate::engine::Store::get_constraint).
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ConstraintHandle<C> {
    id: ConstraintId,
    constraint: PhantomData<C>,
}

impl<C> ConstraintHandle<C> {
    pub(crate) fn new(id: ConstraintId) -> Self {
        ConstraintHandle {
            id,
            constraint: PhantomData,
        }
    }

    pub fn id(&self) -> ConstraintId {
        self.id
    }
}

impl<C> Clone for ConstraintHandle<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for ConstraintHandle<C> {}
