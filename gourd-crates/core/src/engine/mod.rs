//! The store of variables and constraints, and the machinery that keeps it consistent: decision
//! levels, the trail and the propagation queue.
pub mod domains;
pub mod variables;

mod constraint_queue;
mod level_state;
mod store;
#[cfg(test)]
pub(crate) mod test_store;

pub use level_state::LevelState;
pub use store::Store;
pub use store::StoreStatistics;
pub(crate) use store::TrailEntry;
