use thiserror::Error;

/// Malformed arguments given while building a model. These are detected eagerly when a variable
/// or constraint is created, and are fatal to model construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelConstructionError {
    #[error("the constraint `{constraint}` requires a non-empty scope")]
    EmptyScope { constraint: &'static str },
    #[error("the constraint `{constraint}` expects {expected} arguments but got {actual}")]
    MismatchedLengths {
        constraint: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("the constant {value} is outside of the supported range of `{constraint}`")]
    ConstantOutOfRange {
        constraint: &'static str,
        value: String,
    },
    #[error("the bounds [{lower}, {upper}] do not describe a valid domain")]
    InvalidBounds { lower: String, upper: String },
    #[error("the constraint `{constraint}` overflows when multiplying weights with bounds")]
    ArithmeticOverflow { constraint: &'static str },
    #[error("the variable `{variable}` is not {expected} variable")]
    WrongVariableKind {
        variable: String,
        expected: &'static str,
    },
}
