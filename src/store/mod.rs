//! Submission store
//!
//! The store is the single source of truth for submission status. All status
//! changes funnel through the conditional claim and finalize operations here;
//! no other code path mutates status.

mod postgres;

#[cfg(test)]
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{EvaluationOutcome, Submission, SubmissionStatus},
};

pub use postgres::PgSubmissionStore;

/// Durable record of submissions, injected into the dispatcher.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist a new submission. Idempotent: inserting an id that already
    /// exists is a no-op.
    async fn create(&self, submission: &Submission) -> AppResult<()>;

    /// Fetch a submission by id.
    async fn get(&self, id: Uuid) -> AppResult<Option<Submission>>;

    /// List submissions eligible for evaluation: pending, or failed with
    /// fewer than `max_attempts` attempts. Oldest first.
    async fn list_eligible(&self, max_attempts: i32, limit: i64) -> AppResult<Vec<Submission>>;

    /// Atomically transition a submission from `expected` to `new`. Moving
    /// into `InProgress` stamps the claim time and clears the previous
    /// attempt's error. Returns whether the transition was applied. This is
    /// the claim primitive: it must be a single conditional update, never
    /// read-then-write.
    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: SubmissionStatus,
        new: SubmissionStatus,
    ) -> AppResult<bool>;

    /// Write the terminal status, result or error, and attempt count in a
    /// single update, clearing the claim. Guarded on the submission still
    /// being `InProgress`; returns false if the claim was lost meanwhile.
    async fn finalize(&self, id: Uuid, outcome: &EvaluationOutcome) -> AppResult<bool>;

    /// Reset `InProgress` submissions whose claim is older than
    /// `older_than` to retryable `Failed`. Returns how many were reset.
    async fn release_stale_claims(&self, older_than: Duration) -> AppResult<u64>;
}
