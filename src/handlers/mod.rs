//! HTTP Request Handlers
//!
//! Thin transport adapter: parses requests, invokes the dispatcher, and maps
//! outcomes to status codes. All evaluation logic lives in the dispatcher.

pub mod executions;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest("/executions", executions::routes())
}
