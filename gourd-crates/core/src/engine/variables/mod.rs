mod var_id;
mod variable;

pub use var_id::*;
pub(crate) use variable::Variable;
