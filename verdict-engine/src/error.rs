//! Engine error types

use thiserror::Error;
use verdict_cel::CelError;
use verdict_core::CoreError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Policy not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Expression(#[from] CelError),
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPolicy(msg) => EngineError::InvalidPolicy(msg),
        }
    }
}

impl EngineError {
    /// Whether this error was raised while compiling an expression,
    /// as opposed to evaluating one.
    pub fn is_compile_error(&self) -> bool {
        matches!(self, EngineError::Expression(CelError::Compile { .. }))
    }
}
