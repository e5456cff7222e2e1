//! Expression boundary error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CelError {
    #[error("Compilation of {name} failed: {message}")]
    Compile { name: String, message: String },

    #[error("Evaluation of {name} failed: {message}")]
    Evaluation { name: String, message: String },

    #[error("Unsupported result type {kind} from {name}")]
    UnsupportedResultType { name: String, kind: &'static str },

    #[error("Invalid score value from {name}")]
    InvalidScore { name: String },
}
