//! Submission model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Submission lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl SubmissionStatus {
    /// Get status as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse status from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Check if this is a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The unit of work: a piece of code to evaluate plus the metadata the
/// judge needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub problem_id: Uuid,
    pub user_id: Uuid,
    pub language: String,
    #[serde(skip_serializing)]
    pub source_code: String,
    pub status: SubmissionStatus,
    pub verdict: Option<String>,
    pub score: Option<f64>,
    pub last_error: Option<String>,
    pub attempts: i32,
    pub claimed_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl Submission {
    /// Create a new pending submission
    pub fn new(
        id: Uuid,
        problem_id: Uuid,
        user_id: Uuid,
        language: String,
        source_code: String,
    ) -> Self {
        Self {
            id,
            problem_id,
            user_id,
            language,
            source_code,
            status: SubmissionStatus::Pending,
            verdict: None,
            score: None,
            last_error: None,
            attempts: 0,
            claimed_at: None,
            submitted_at: Utc::now(),
            evaluated_at: None,
        }
    }
}

/// Verdict and score produced by the judging backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeOutcome {
    pub verdict: String,
    pub score: f64,
}

/// Terminal outcome applied to a submission when an evaluation finishes
#[derive(Debug, Clone)]
pub enum EvaluationOutcome {
    Completed(JudgeOutcome),
    Failed(String),
}

impl EvaluationOutcome {
    /// Terminal status this outcome resolves to
    pub fn status(&self) -> SubmissionStatus {
        match self {
            Self::Completed(_) => SubmissionStatus::Completed,
            Self::Failed(_) => SubmissionStatus::Failed,
        }
    }
}
