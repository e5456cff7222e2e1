//! API request handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use verdict_core::{EvaluateRequest, EvaluateResponse, Policy};

use crate::{ApiError, AppState};

// ==================== Policy Handlers ====================

/// Register a policy, replacing any existing policy with the same id
pub async fn set_policy(
    State(state): State<Arc<AppState>>,
    Json(policy): Json<Policy>,
) -> Result<impl IntoResponse, ApiError> {
    let id = policy.id.clone();
    state.engine.add_policy(policy)?;

    // Echo back the stored descriptor (thresholds sorted)
    let stored = state.engine.get_policy(&id)?;

    tracing::info!("Registered policy '{}'", stored.id);

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Get a policy by id
pub async fn get_policy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let policy = state.engine.get_policy(&id)?;
    Ok(Json(policy))
}

/// List all registered policies
pub async fn list_policies(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let policies = state.engine.get_all_policies();
    Ok(Json(policies))
}

/// Delete a policy by id
pub async fn delete_policy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.engine.delete_policy(&id)?;

    tracing::info!("Deleted policy '{}'", id);

    Ok(StatusCode::NO_CONTENT)
}

// ==================== Evaluation Handlers ====================

/// Evaluate input against a single policy
pub async fn evaluate_policy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<EvaluateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = match state.engine.evaluate_policy(&id, &req.input)? {
        Some(verdict) => {
            tracing::info!(
                "Evaluated policy '{}' - threshold: '{}'",
                id,
                verdict.threshold
            );
            EvaluateResponse {
                policy_id: id,
                applied: true,
                threshold: verdict.threshold,
                rule_results: verdict.rule_results,
            }
        }
        None => {
            tracing::debug!("Policy '{}' did not apply to this input", id);
            EvaluateResponse {
                policy_id: id,
                applied: false,
                threshold: String::new(),
                rule_results: vec![],
            }
        }
    };

    Ok(Json(response))
}

/// Evaluate input against every registered, gate-passing policy
pub async fn evaluate_input(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvaluateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcomes = state.engine.evaluate_all(&req.input);

    tracing::info!("Input evaluated by {} applicable policies", outcomes.len());

    Ok(Json(outcomes))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "verdict"
    }))
}
