//! Verdict API Server
//!
//! HTTP surface for managing policies and evaluating input.

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Policies
        .route(
            "/api/policies",
            post(handlers::set_policy).get(handlers::list_policies),
        )
        .route(
            "/api/policies/:id",
            get(handlers::get_policy).delete(handlers::delete_policy),
        )
        // Evaluation
        .route("/api/policies/:id/evaluate", post(handlers::evaluate_policy))
        .route("/api/evaluate", post(handlers::evaluate_input))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
