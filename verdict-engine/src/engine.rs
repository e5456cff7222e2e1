//! Policy registry and evaluation entry points

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use verdict_core::{Policy, PolicyOutcome, Verdict};

use crate::{CompiledPolicy, EngineError};

/// Registry mapping policy id to its compiled form.
///
/// Reads (lookups, evaluation) take the read lock; add and delete take
/// the write lock. Compilation happens before the lock is acquired and
/// the finished value is swapped in atomically, so readers never see a
/// half-registered policy. Evaluation runs on an `Arc` snapshot, so
/// the lock is not held while expressions execute.
pub struct RuleEngine {
    policies: RwLock<HashMap<String, Arc<CompiledPolicy>>>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            policies: RwLock::new(HashMap::new()),
        }
    }

    /// Register or replace a policy under its id.
    ///
    /// All-or-nothing: a validation or compilation failure leaves the
    /// registry unchanged, including any previous version of the same
    /// policy.
    pub fn add_policy(&self, policy: Policy) -> Result<(), EngineError> {
        let compiled = CompiledPolicy::compile(policy)?;
        let id = compiled.descriptor().id.clone();

        let mut policies = self.policies.write().unwrap();
        policies.insert(id.clone(), Arc::new(compiled));
        tracing::debug!("Registered policy '{}'", id);
        Ok(())
    }

    /// Fetch a copy of a registered policy descriptor.
    pub fn get_policy(&self, id: &str) -> Result<Policy, EngineError> {
        let policies = self.policies.read().unwrap();
        policies
            .get(id)
            .map(|p| p.descriptor().clone())
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    /// Snapshot of all registered descriptors, in no particular order.
    pub fn get_all_policies(&self) -> Vec<Policy> {
        let policies = self.policies.read().unwrap();
        policies.values().map(|p| p.descriptor().clone()).collect()
    }

    pub fn delete_policy(&self, id: &str) -> Result<(), EngineError> {
        let mut policies = self.policies.write().unwrap();
        if policies.remove(id).is_none() {
            return Err(EngineError::NotFound(id.to_string()));
        }
        tracing::debug!("Deleted policy '{}'", id);
        Ok(())
    }

    /// Evaluate one policy against one input.
    ///
    /// `Ok(None)` means the gate did not pass and the policy simply
    /// did not fire; that is a quiet outcome, distinct from any error.
    pub fn evaluate_policy(
        &self,
        id: &str,
        input: &serde_json::Value,
    ) -> Result<Option<Verdict>, EngineError> {
        let policy = {
            let policies = self.policies.read().unwrap();
            policies.get(id).cloned()
        }
        .ok_or_else(|| EngineError::NotFound(id.to_string()))?;

        if !policy.should_execute(input)? {
            return Ok(None);
        }

        policy.evaluate(input).map(Some)
    }

    /// Evaluate the input against every registered policy, skipping
    /// those whose gate does not pass. A failing policy contributes an
    /// error outcome without preventing the rest from evaluating.
    pub fn evaluate_all(&self, input: &serde_json::Value) -> Vec<PolicyOutcome> {
        let snapshot: Vec<Arc<CompiledPolicy>> = {
            let policies = self.policies.read().unwrap();
            policies.values().cloned().collect()
        };

        let mut outcomes = Vec::new();
        for policy in snapshot {
            let policy_id = policy.descriptor().id.clone();
            let outcome = policy.should_execute(input).and_then(|applies| {
                if applies {
                    policy.evaluate(input).map(Some)
                } else {
                    Ok(None)
                }
            });

            match outcome {
                Ok(Some(verdict)) => outcomes.push(PolicyOutcome {
                    policy_id,
                    threshold: verdict.threshold,
                    rule_results: verdict.rule_results,
                    error: None,
                }),
                Ok(None) => {
                    tracing::debug!("Policy '{}' did not apply to this input", policy_id);
                }
                Err(e) => {
                    tracing::error!("Evaluation of policy '{}' failed: {}", policy_id, e);
                    outcomes.push(PolicyOutcome {
                        policy_id,
                        threshold: String::new(),
                        rule_results: vec![],
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        outcomes
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}
