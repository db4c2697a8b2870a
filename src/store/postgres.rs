//! Postgres-backed submission store

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{EvaluationOutcome, Submission, SubmissionStatus},
    store::SubmissionStore,
};

/// Submission row as stored in Postgres. Status is TEXT in the schema and
/// parsed into the typed enum on the way out.
#[derive(Debug, sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    problem_id: Uuid,
    user_id: Uuid,
    language: String,
    source_code: String,
    status: String,
    verdict: Option<String>,
    score: Option<f64>,
    last_error: Option<String>,
    attempts: i32,
    claimed_at: Option<DateTime<Utc>>,
    submitted_at: DateTime<Utc>,
    evaluated_at: Option<DateTime<Utc>>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = AppError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let status = SubmissionStatus::parse(&row.status)
            .ok_or_else(|| AppError::Store(format!("Unknown submission status: {}", row.status)))?;

        Ok(Submission {
            id: row.id,
            problem_id: row.problem_id,
            user_id: row.user_id,
            language: row.language,
            source_code: row.source_code,
            status,
            verdict: row.verdict,
            score: row.score,
            last_error: row.last_error,
            attempts: row.attempts,
            claimed_at: row.claimed_at,
            submitted_at: row.submitted_at,
            evaluated_at: row.evaluated_at,
        })
    }
}

/// Submission store backed by the `submissions` table
#[derive(Clone)]
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn create(&self, submission: &Submission) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO submissions (id, problem_id, user_id, language, source_code, status, attempts)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(submission.id)
        .bind(submission.problem_id)
        .bind(submission.user_id)
        .bind(&submission.language)
        .bind(&submission.source_code)
        .bind(submission.status.as_str())
        .bind(submission.attempts)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Submission>> {
        let row =
            sqlx::query_as::<_, SubmissionRow>(r#"SELECT * FROM submissions WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Submission::try_from).transpose()
    }

    async fn list_eligible(&self, max_attempts: i32, limit: i64) -> AppResult<Vec<Submission>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT * FROM submissions
            WHERE status = 'pending'
               OR (status = 'failed' AND attempts < $1)
            ORDER BY submitted_at
            LIMIT $2
            "#,
        )
        .bind(max_attempts)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Submission::try_from).collect()
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: SubmissionStatus,
        new: SubmissionStatus,
    ) -> AppResult<bool> {
        // The WHERE clause on the current status makes this a single
        // atomic claim; concurrent claimers race on rows_affected.
        // Entering in_progress stamps the claim and clears the previous
        // attempt's error, so last_error is only set while failed.
        let result = sqlx::query(
            r#"
            UPDATE submissions
            SET status = $3,
                claimed_at = CASE WHEN $3 = 'in_progress' THEN NOW() ELSE claimed_at END,
                last_error = CASE WHEN $3 = 'in_progress' THEN NULL ELSE last_error END
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(new.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn finalize(&self, id: Uuid, outcome: &EvaluationOutcome) -> AppResult<bool> {
        let (verdict, score, last_error) = match outcome {
            EvaluationOutcome::Completed(result) => {
                (Some(result.verdict.as_str()), Some(result.score), None)
            }
            EvaluationOutcome::Failed(error) => (None, None, Some(error.as_str())),
        };

        let result = sqlx::query(
            r#"
            UPDATE submissions
            SET status = $2,
                verdict = $3,
                score = $4,
                last_error = $5,
                attempts = attempts + 1,
                claimed_at = NULL,
                evaluated_at = NOW()
            WHERE id = $1 AND status = 'in_progress'
            "#,
        )
        .bind(id)
        .bind(outcome.status().as_str())
        .bind(verdict)
        .bind(score)
        .bind(last_error)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn release_stale_claims(&self, older_than: Duration) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE submissions
            SET status = 'failed',
                last_error = $2,
                attempts = attempts + 1,
                claimed_at = NULL
            WHERE status = 'in_progress'
              AND claimed_at < NOW() - ($1 * INTERVAL '1 second')
            "#,
        )
        .bind(older_than.as_secs_f64())
        .bind(stale_claim_error())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Error recorded on submissions whose claim was abandoned
pub(crate) fn stale_claim_error() -> &'static str {
    "evaluation abandoned: stale in-progress claim released"
}
