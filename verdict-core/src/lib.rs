//! Core domain models for Verdict
//!
//! This crate contains the shared data structures used across
//! the policy engine: Policy, Rule, Threshold, RuleResult and the
//! request/response types of the HTTP surface.

pub mod error;
pub mod models;

pub use error::CoreError;
pub use models::*;
