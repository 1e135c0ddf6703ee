//! Crate-wide error type.

use std::io;
use thiserror::Error;

/// Errors raised by the segmentation engine, peak-calling pipeline, I/O
/// layer, and CLI.
#[derive(Error, Debug)]
pub enum BlockifyError {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("unsorted input: {message}")]
    UnsortedInput { message: String },

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, BlockifyError>;

impl BlockifyError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        BlockifyError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn unsorted_input(message: impl Into<String>) -> Self {
        BlockifyError::UnsortedInput {
            message: message.into(),
        }
    }
}
