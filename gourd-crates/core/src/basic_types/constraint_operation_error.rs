use thiserror::Error;

use super::ModelConstructionError;
#[cfg(doc)]
use crate::engine::Store;

/// Errors related to imposing constraints on the [`Store`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstraintOperationError {
    /// Error which indicates that imposing the constraint led to infeasibility at the current
    /// level.
    #[error("Imposing the constraint failed because it is infeasible")]
    InfeasibleConstraint,
    /// Error which indicates that a constraint was imposed while the [`Store`] was in an
    /// infeasible state.
    #[error("Imposing the constraint failed because the store is in an infeasible state")]
    InfeasibleState,
    /// The arguments of the constraint were malformed.
    #[error(transparent)]
    Model(#[from] ModelConstructionError),
}
