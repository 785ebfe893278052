use std::{error::Error, fmt};

/// The result type used across the whole crate.
pub type Result<T> = std::result::Result<T, MlErr>;

/// Model construction and training failures.
#[derive(Debug)]
pub enum MlErr {
    /// The topology declares no layers at all.
    EmptyModel,
    /// An input is invalid for semantic or domain reasons.
    InvalidInput(&'static str),
    /// A shape invariant was violated (e.g. mismatched lengths).
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A topology or serialized-model document failed to (de)serialize.
    Json(serde_json::Error),
    /// A weight blob could not be decoded back into parameters.
    WeightDecode(String),
}

impl fmt::Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::EmptyModel => write!(f, "model has no layers"),
            MlErr::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            MlErr::ShapeMismatch {
                what,
                got,
                expected,
            } => {
                write!(f, "shape mismatch for {what}: got {got}, expected {expected}")
            }
            MlErr::Json(e) => write!(f, "json error: {e}"),
            MlErr::WeightDecode(msg) => write!(f, "weight decode error: {msg}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
