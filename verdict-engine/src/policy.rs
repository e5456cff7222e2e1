//! Compiled policies and the evaluation algorithm

use verdict_cel::{CelError, CompiledExpression, Environment, ExprValue};
use verdict_core::{Policy, Rule, RuleResult, Verdict};

use crate::EngineError;

/// A rule descriptor paired with its compiled program.
pub struct CompiledRule {
    rule: Rule,
    program: CompiledExpression,
}

impl CompiledRule {
    fn compile(rule: Rule) -> Result<Self, CelError> {
        let program = Environment::Rule.compile(&rule.expression, &rule.name)?;
        Ok(Self { rule, program })
    }

    pub fn name(&self) -> &str {
        &self.rule.name
    }

    /// Run the rule and convert its value per the result typing table:
    /// integers score directly, floats truncate toward zero, booleans
    /// carry the passed flag, and `Result(value, stop)` pairs carry
    /// both a score and the stop flag.
    pub fn evaluate(&self, input: &serde_json::Value) -> Result<RuleResult, CelError> {
        let result = match self.program.execute(input)? {
            ExprValue::Int(score) => RuleResult {
                score,
                stop: false,
                passed: true,
                executed: true,
            },
            ExprValue::Float(score) => RuleResult {
                score: score as i64,
                stop: false,
                passed: true,
                executed: true,
            },
            ExprValue::Bool(passed) => RuleResult {
                score: 0,
                stop: false,
                passed,
                executed: true,
            },
            ExprValue::Scored { value, stop } => RuleResult {
                score: value,
                stop,
                passed: true,
                executed: true,
            },
        };

        Ok(result)
    }
}

/// An immutable, fully-compiled policy.
///
/// Produced only by [`CompiledPolicy::compile`], so an uncompiled
/// program can never reach evaluation.
pub struct CompiledPolicy {
    policy: Policy,
    gate: Option<CompiledExpression>,
    rules: Vec<CompiledRule>,
}

impl CompiledPolicy {
    /// Pure compile step: validate the descriptor, compile the gate
    /// expression (if any) in the policy environment and every rule in
    /// the rule environment, and sort thresholds ascending by value.
    /// Any failure aborts the whole step with nothing half-built.
    pub fn compile(mut policy: Policy) -> Result<Self, EngineError> {
        policy.validate()?;

        let gate = if policy.expression.is_empty() {
            None
        } else {
            Some(Environment::Policy.compile(&policy.expression, &policy.id)?)
        };

        let rules = policy
            .rules
            .iter()
            .cloned()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        policy.thresholds.sort_by_key(|t| t.value);

        Ok(Self {
            policy,
            gate,
            rules,
        })
    }

    /// The registered descriptor, thresholds sorted ascending by value.
    pub fn descriptor(&self) -> &Policy {
        &self.policy
    }

    /// Whether this policy applies to the given input. A policy
    /// without a gate expression always applies; a gate must produce
    /// a boolean.
    pub fn should_execute(&self, input: &serde_json::Value) -> Result<bool, EngineError> {
        let gate = match &self.gate {
            Some(gate) => gate,
            None => return Ok(true),
        };

        match gate.execute(input)? {
            ExprValue::Bool(applies) => Ok(applies),
            _ => Err(CelError::Evaluation {
                name: gate.name().to_string(),
                message: "gate expression must produce a boolean".to_string(),
            }
            .into()),
        }
    }

    /// Evaluate every rule in declaration order, accumulating the
    /// total score. After a rule signals stop, the remaining rules are
    /// recorded as skipped so the trace always has one entry per
    /// declared rule. A rule failure aborts the whole evaluation with
    /// no partial results.
    pub fn evaluate(&self, input: &serde_json::Value) -> Result<Verdict, EngineError> {
        let mut total_score = 0i64;
        let mut stopped = false;
        let mut rule_results = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            if stopped {
                rule_results.push(RuleResult::skipped());
                continue;
            }

            let result = rule.evaluate(input)?;
            total_score += result.score;
            if result.stop {
                stopped = true;
            }
            rule_results.push(result);
        }

        Ok(Verdict {
            threshold: self.resolve_threshold(total_score),
            rule_results,
        })
    }

    /// Resolve the highest threshold whose value does not exceed the
    /// score. Empty string when no bucket qualifies or none exist.
    fn resolve_threshold(&self, score: i64) -> String {
        self.policy
            .thresholds
            .iter()
            .rev()
            .find(|t| score >= t.value)
            .map(|t| t.id.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use verdict_core::Threshold;

    fn scored_policy(rules: Vec<(&str, &str)>, thresholds: Vec<(&str, i64)>) -> CompiledPolicy {
        let policy = Policy {
            id: "p1".to_string(),
            name: "test policy".to_string(),
            expression: String::new(),
            rules: rules
                .into_iter()
                .map(|(name, expression)| Rule {
                    name: name.to_string(),
                    expression: expression.to_string(),
                })
                .collect(),
            thresholds: thresholds
                .into_iter()
                .map(|(id, value)| Threshold {
                    id: id.to_string(),
                    value,
                })
                .collect(),
        };
        CompiledPolicy::compile(policy).unwrap()
    }

    #[test]
    fn test_stop_flag_short_circuits_but_keeps_the_trace() {
        let policy = scored_policy(
            vec![
                ("r1", "Result(10, false)"),
                ("r2", "Result(80, true)"),
                ("r3", "Result(100, false)"),
            ],
            vec![("ninety", 90), ("hundred", 100)],
        );

        let verdict = policy.evaluate(&json!({})).unwrap();

        // r3 never ran: total is 90, not 190
        assert_eq!(verdict.threshold, "ninety");
        assert_eq!(
            verdict.rule_results,
            vec![
                RuleResult { score: 10, stop: false, passed: true, executed: true },
                RuleResult { score: 80, stop: true, passed: true, executed: true },
                RuleResult { score: 0, stop: false, passed: false, executed: false },
            ]
        );
    }

    #[test]
    fn test_threshold_resolution_picks_highest_qualifying_bucket() {
        let policy = scored_policy(
            vec![("score", "input.score")],
            vec![("low", 0), ("medium", 15), ("high", 25)],
        );

        let cases = [(24, "medium"), (25, "high"), (0, "low"), (-1, "")];
        for (score, expected) in cases {
            let verdict = policy.evaluate(&json!({ "score": score })).unwrap();
            assert_eq!(verdict.threshold, expected, "score {score}");
        }
    }

    #[test]
    fn test_no_thresholds_resolves_to_empty_label() {
        let policy = scored_policy(vec![("score", "42")], vec![]);
        let verdict = policy.evaluate(&json!({})).unwrap();
        assert_eq!(verdict.threshold, "");
    }

    #[test]
    fn test_float_scores_truncate_toward_zero() {
        let policy = scored_policy(vec![("up", "2.9"), ("down", "-2.9")], vec![]);
        let verdict = policy.evaluate(&json!({})).unwrap();

        assert_eq!(verdict.rule_results[0].score, 2);
        assert_eq!(verdict.rule_results[1].score, -2);
    }

    #[test]
    fn test_boolean_rules_score_zero_and_set_passed() {
        let policy = scored_policy(
            vec![("yes", "input.total > 10"), ("no", "input.total > 100")],
            vec![],
        );

        let verdict = policy.evaluate(&json!({ "total": 50 })).unwrap();

        assert_eq!(
            verdict.rule_results[0],
            RuleResult { score: 0, stop: false, passed: true, executed: true }
        );
        assert_eq!(
            verdict.rule_results[1],
            RuleResult { score: 0, stop: false, passed: false, executed: true }
        );
    }

    #[test]
    fn test_rule_failure_aborts_the_whole_evaluation() {
        let policy = scored_policy(vec![("ok", "10"), ("broken", "input.absent * 2")], vec![]);

        assert!(matches!(
            policy.evaluate(&json!({})),
            Err(EngineError::Expression(CelError::Evaluation { .. }))
        ));
    }

    #[test]
    fn test_policy_without_gate_always_applies() {
        let policy = scored_policy(vec![("score", "1")], vec![]);
        assert!(policy.should_execute(&json!({})).unwrap());
    }

    #[test]
    fn test_gate_must_produce_a_boolean() {
        let policy = CompiledPolicy::compile(Policy {
            id: "p1".to_string(),
            name: "numeric gate".to_string(),
            expression: "input.age + 1".to_string(),
            rules: vec![],
            thresholds: vec![],
        })
        .unwrap();

        assert!(policy.should_execute(&json!({ "age": 17 })).is_err());
    }

    #[test]
    fn test_compile_sorts_thresholds_ascending() {
        let policy = scored_policy(vec![], vec![("high", 25), ("low", 0), ("medium", 15)]);

        let values: Vec<i64> = policy
            .descriptor()
            .thresholds
            .iter()
            .map(|t| t.value)
            .collect();
        assert_eq!(values, vec![0, 15, 25]);
    }

    #[test]
    fn test_compile_rejects_empty_id() {
        let result = CompiledPolicy::compile(Policy {
            id: String::new(),
            name: "anonymous".to_string(),
            expression: String::new(),
            rules: vec![],
            thresholds: vec![],
        });

        assert!(matches!(result, Err(EngineError::InvalidPolicy(_))));
    }

    #[test]
    fn test_compile_rejects_invalid_rule_expression() {
        let result = CompiledPolicy::compile(Policy {
            id: "p1".to_string(),
            name: "broken rule".to_string(),
            expression: String::new(),
            rules: vec![Rule {
                name: "bad".to_string(),
                expression: "input.total >".to_string(),
            }],
            thresholds: vec![],
        });

        assert!(matches!(
            result,
            Err(EngineError::Expression(CelError::Compile { .. }))
        ));
    }
}
