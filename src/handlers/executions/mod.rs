//! Execution handlers

mod handler;
pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Execution routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::request_evaluation))
        .route("/{id}", get(handler::evaluate_submission))
        .route("/{id}/status", get(handler::get_submission_status))
}
