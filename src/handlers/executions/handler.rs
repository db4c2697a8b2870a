//! Execution handler implementations

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::languages,
    error::{AppError, AppResult},
    models::Submission,
    state::AppState,
};

use super::{request::CreateExecutionRequest, response::SubmissionStatusResponse};

/// Accept a submission and schedule its evaluation
pub async fn request_evaluation(
    State(state): State<AppState>,
    Json(payload): Json<CreateExecutionRequest>,
) -> AppResult<StatusCode> {
    payload.validate()?;

    if !languages::ALL.contains(&payload.language.as_str()) {
        return Err(AppError::Validation(format!(
            "Unsupported language: {}. Supported languages: {:?}",
            payload.language,
            languages::ALL
        )));
    }

    let submission = Submission::new(
        payload.id.unwrap_or_else(Uuid::new_v4),
        payload.problem_id,
        payload.user_id,
        payload.language,
        payload.source_code,
    );

    state.dispatcher().request_evaluate(submission).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Synchronously evaluate an existing submission
pub async fn evaluate_submission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.dispatcher().evaluate_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Look up a submission's status and result
pub async fn get_submission_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SubmissionStatusResponse>> {
    let submission = state.dispatcher().get_submission(id).await?;
    Ok(Json(submission.into()))
}
