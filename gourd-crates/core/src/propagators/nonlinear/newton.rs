use crate::create_statistics_struct;
#[cfg(doc)]
use crate::propagators::nonlinear::NonlinearSystem;
use crate::statistics::Statistic;

/// The options provided to a [`NonlinearSystem`].
#[derive(Debug, Clone, Copy)]
pub struct NewtonOptions {
    /// The maximum number of Newton steps per consistency call. The default is `10`.
    pub max_steps: usize,
    /// The maximum number of Gauss-Seidel sweeps per Newton step. The default is `20`.
    pub gauss_seidel_iterations: usize,
    /// When the Jacobian is multiplied by the inverse of its midpoint before solving.
    pub preconditioning: Preconditioning,
}

impl Default for NewtonOptions {
    fn default() -> Self {
        Self {
            max_steps: 10,
            gauss_seidel_iterations: 20,
            preconditioning: Preconditioning::default(),
        }
    }
}

/// When interval Gauss-Seidel preconditions the linear system with the inverse of the midpoint
/// matrix.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Preconditioning {
    /// Only reorder the rows; decline if no order is diagonally dominant.
    Never,
    /// Precondition if no order of the rows of the original system is diagonally dominant.
    #[default]
    WhenNotDominant,
    /// Always precondition first.
    Always,
}

create_statistics_struct!(
    /// Counters kept by a [`NonlinearSystem`].
    NewtonStatistics {
        /// Newton steps which were carried out.
        steps: u64,
        /// Newton steps which narrowed an unknown.
        narrowing_steps: u64,
        /// Steps given up on, because the box was unbounded, the system was undefined at the
        /// midpoint, or the Jacobian could not be made diagonally dominant.
        declines: u64,
        /// Steps in which the linear system was preconditioned.
        preconditionings: u64,
        /// Steps which proved that the box contains no solution.
        failures: u64,
});
