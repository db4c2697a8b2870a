//! Execution response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Submission, SubmissionStatus};

/// Submission status as exposed over the API
#[derive(Debug, Serialize)]
pub struct SubmissionStatusResponse {
    pub id: Uuid,
    pub problem_id: Uuid,
    pub user_id: Uuid,
    pub language: String,
    pub status: SubmissionStatus,
    pub verdict: Option<String>,
    pub score: Option<f64>,
    pub last_error: Option<String>,
    pub attempts: i32,
    pub submitted_at: DateTime<Utc>,
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl From<Submission> for SubmissionStatusResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            problem_id: submission.problem_id,
            user_id: submission.user_id,
            language: submission.language,
            status: submission.status,
            verdict: submission.verdict,
            score: submission.score,
            last_error: submission.last_error,
            attempts: submission.attempts,
            submitted_at: submission.submitted_at,
            evaluated_at: submission.evaluated_at,
        }
    }
}
