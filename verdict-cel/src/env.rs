//! Evaluation environments and compiled expressions
//!
//! Gate expressions run in the policy environment, which exposes only
//! the `input` binding. Rule expressions run in the rule environment,
//! which additionally registers `Result(value, stop)` for building a
//! scored result with an explicit stop flag.

use cel_interpreter::objects::{Key, Map};
use cel_interpreter::{Context, ExecutionError, Program, ResolveResult, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::CelError;

/// The two CEL evaluation environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Gate expressions: `input` binding only
    Policy,
    /// Rule expressions: `input` binding plus the `Result` function
    Rule,
}

impl Environment {
    /// Compile an expression for this environment.
    ///
    /// `name` identifies the owning rule or policy in error messages.
    pub fn compile(self, expression: &str, name: &str) -> Result<CompiledExpression, CelError> {
        let program = Program::compile(expression).map_err(|e| CelError::Compile {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        Ok(CompiledExpression {
            name: name.to_string(),
            environment: self,
            program,
        })
    }

    fn build_context(self) -> Context<'static> {
        let mut context = Context::default();
        if self == Environment::Rule {
            context.add_function("Result", make_result);
        }
        context
    }
}

/// Value classes a compiled expression may legally produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExprValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// The `{value, stop}` pair built by the `Result` function,
    /// with a float score already truncated toward zero
    Scored { value: i64, stop: bool },
}

/// A CEL program bound to the environment it was compiled for.
pub struct CompiledExpression {
    name: String,
    environment: Environment,
    program: Program,
}

impl CompiledExpression {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute against `input` and classify the produced value.
    ///
    /// Evaluator failures (missing fields, wrongly-typed fields,
    /// unknown functions) surface as `CelError::Evaluation`.
    pub fn execute(&self, input: &serde_json::Value) -> Result<ExprValue, CelError> {
        let mut context = self.environment.build_context();
        context
            .add_variable("input", input)
            .map_err(|e| self.evaluation_error(e.to_string()))?;

        let value = self
            .program
            .execute(&context)
            .map_err(|e| self.evaluation_error(e.to_string()))?;

        self.classify(value)
    }

    fn evaluation_error(&self, message: String) -> CelError {
        CelError::Evaluation {
            name: self.name.clone(),
            message,
        }
    }

    /// The single place polymorphic result handling occurs.
    fn classify(&self, value: Value) -> Result<ExprValue, CelError> {
        match value {
            Value::Int(v) => Ok(ExprValue::Int(v)),
            Value::UInt(v) => Ok(ExprValue::Int(v as i64)),
            Value::Float(v) => Ok(ExprValue::Float(v)),
            Value::Bool(v) => Ok(ExprValue::Bool(v)),
            Value::Map(m) => {
                let value = match map_field(&m, "value") {
                    Some(Value::Int(v)) => *v,
                    Some(Value::UInt(v)) => *v as i64,
                    Some(Value::Float(v)) => *v as i64,
                    _ => {
                        return Err(CelError::InvalidScore {
                            name: self.name.clone(),
                        })
                    }
                };
                let stop = matches!(map_field(&m, "stop"), Some(Value::Bool(true)));
                Ok(ExprValue::Scored { value, stop })
            }
            other => Err(CelError::UnsupportedResultType {
                name: self.name.clone(),
                kind: type_name(&other),
            }),
        }
    }
}

fn map_field<'a>(map: &'a Map, field: &str) -> Option<&'a Value> {
    map.map.iter().find_map(|(key, value)| match key {
        Key::String(name) if name.as_str() == field => Some(value),
        _ => None,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::String(..) => "string",
        Value::Bytes(..) => "bytes",
        Value::List(..) => "list",
        Value::Map(..) => "map",
        Value::Null => "null",
        _ => "unknown",
    }
}

/// Implements the rule environment's `Result(value, stop)` function.
fn make_result(value: Value, stop: Value) -> ResolveResult {
    let score = match value {
        Value::Int(..) | Value::UInt(..) | Value::Float(..) => value,
        _ => {
            return Err(ExecutionError::function_error(
                "Result",
                "the first argument must be an integer or a float",
            ))
        }
    };
    let stop = match stop {
        Value::Bool(stop) => stop,
        _ => {
            return Err(ExecutionError::function_error(
                "Result",
                "the second argument must be a boolean",
            ))
        }
    };

    let mut fields: HashMap<Key, Value> = HashMap::new();
    fields.insert(Key::String(Arc::new("value".to_string())), score);
    fields.insert(Key::String(Arc::new("stop".to_string())), Value::Bool(stop));
    Ok(Value::Map(Map {
        map: Arc::new(fields),
    }))
}
