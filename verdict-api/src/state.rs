//! Application state shared across handlers

use verdict_engine::RuleEngine;

/// Shared application state
pub struct AppState {
    pub engine: RuleEngine,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            engine: RuleEngine::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
