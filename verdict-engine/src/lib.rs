//! Policy evaluation engine for Verdict
//!
//! Compiles policy descriptors into immutable compiled values and
//! evaluates them against structured input: score accumulation with
//! early stop, and threshold-bucket resolution. The `RuleEngine`
//! registry is the only shared mutable state in the system.

pub mod engine;
pub mod error;
pub mod policy;

pub use engine::RuleEngine;
pub use error::EngineError;
pub use policy::{CompiledPolicy, CompiledRule};
