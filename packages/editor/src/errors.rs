//! Error types for the editor

use layoutpad_common::ModelError;
use thiserror::Error;

/// Failures raised by the command registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Command already registered: {0}")]
    DuplicateCommand(String),

    #[error("Command {name} failed: {reason}")]
    ExecuteFailed { name: String, reason: String },

    #[error("Invalid key chord: {0:?}")]
    InvalidChord(String),
}

impl CommandError {
    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CommandError::ExecuteFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Block index out of range: {0}")]
    BlockIndexOutOfRange(usize),
}
