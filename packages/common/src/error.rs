use thiserror::Error;

/// Errors raised while importing or exporting a document
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid container size {width}x{height}")]
    InvalidContainer { width: f64, height: f64 },
}
