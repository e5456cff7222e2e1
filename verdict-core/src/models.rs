//! Core domain models

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A labeled score cutoff within a policy.
///
/// Ids need not be unique; resolution picks the highest-valued
/// threshold whose value does not exceed the total score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    /// Label returned when this bucket is resolved
    pub id: String,
    /// Minimum total score required to qualify (may be negative)
    pub value: i64,
}

/// One scored check within a policy, expressed in CEL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Human-readable name, used in error reporting
    pub name: String,
    /// CEL expression evaluated against the `input` binding
    pub expression: String,
}

/// A named, independently gateable bundle of rules and score thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Unique registry key (non-empty)
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Optional gate expression; empty means the policy always applies
    #[serde(default)]
    pub expression: String,
    /// Rules evaluated in declaration order
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Score buckets, kept sorted ascending by value once registered
    #[serde(default)]
    pub thresholds: Vec<Threshold>,
}

impl Policy {
    /// Check the structural invariants that registration requires.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.id.is_empty() {
            return Err(CoreError::InvalidPolicy(
                "policy id cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of evaluating a single rule.
///
/// `executed == false` means an earlier rule signalled stop and this
/// rule was skipped; every other field is zero-valued in that case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    /// Score contributed to the policy total
    pub score: i64,
    /// Whether this rule halted evaluation of the remaining rules
    pub stop: bool,
    /// Whether the rule passed (boolean rules) or produced a score
    pub passed: bool,
    /// Whether the rule actually ran
    pub executed: bool,
}

impl RuleResult {
    /// Trace entry for a rule skipped after an earlier stop.
    pub fn skipped() -> Self {
        Self::default()
    }
}

/// Outcome of evaluating one policy against one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Resolved threshold label, empty when no bucket qualified
    pub threshold: String,
    /// One entry per declared rule, in declaration order
    pub rule_results: Vec<RuleResult>,
}

/// Request to evaluate input against one or all policies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub input: serde_json::Value,
}

/// Response for single-policy evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub policy_id: String,
    /// Whether the gate passed; false carries an empty verdict
    pub applied: bool,
    pub threshold: String,
    pub rule_results: Vec<RuleResult>,
}

/// Per-policy entry in an evaluate-all response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyOutcome {
    pub policy_id: String,
    pub threshold: String,
    pub rule_results: Vec<RuleResult>,
    /// Set when this policy failed to evaluate; other policies still run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_id() {
        let policy = Policy {
            id: String::new(),
            name: "unnamed".to_string(),
            expression: String::new(),
            rules: vec![],
            thresholds: vec![],
        };

        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: Policy =
            serde_json::from_str(r#"{"id": "p1", "name": "minimal"}"#).unwrap();

        assert_eq!(policy.id, "p1");
        assert!(policy.expression.is_empty());
        assert!(policy.rules.is_empty());
        assert!(policy.thresholds.is_empty());
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_skipped_rule_result_is_zero_valued() {
        let result = RuleResult::skipped();

        assert_eq!(result.score, 0);
        assert!(!result.stop);
        assert!(!result.passed);
        assert!(!result.executed);
    }
}
