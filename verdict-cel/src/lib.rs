//! CEL expression boundary for Verdict
//!
//! This crate is the only place the engine touches the CEL evaluator.
//! It owns the two evaluation environments, compiles expression text
//! into executable programs, and classifies the dynamically-typed
//! values those programs produce into a small tagged union.

pub mod env;
pub mod error;

pub use env::{CompiledExpression, Environment, ExprValue};
pub use error::CelError;
