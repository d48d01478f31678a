mod constraint_operation_error;
mod model_construction_error;
mod propagation_status;
mod trail;

pub use constraint_operation_error::ConstraintOperationError;
pub use model_construction_error::ModelConstructionError;
pub use propagation_status::*;
pub(crate) use trail::Trail;
