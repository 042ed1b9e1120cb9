use crate::error::ModelError;

/// Result type for model import/export
pub type ModelResult<T> = Result<T, ModelError>;
