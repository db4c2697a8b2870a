//! In-memory submission store used as a test double
//!
//! The map is guarded by a mutex, so compare-and-set and finalize are
//! atomic with respect to every other caller, matching the Postgres
//! implementation's conditional updates.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{EvaluationOutcome, Submission, SubmissionStatus},
    store::SubmissionStore,
};

#[derive(Default)]
pub struct MemoryStore {
    submissions: Mutex<HashMap<Uuid, Submission>>,
    // When set, every operation fails; simulates a store outage.
    fail: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a submission directly, bypassing the create path.
    pub fn insert(&self, submission: Submission) {
        self.submissions
            .lock()
            .unwrap()
            .insert(submission.id, submission);
    }

    /// Snapshot a submission for assertions.
    pub fn snapshot(&self, id: Uuid) -> Option<Submission> {
        self.submissions.lock().unwrap().get(&id).cloned()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.fail.lock().unwrap() = failing;
    }

    fn check_available(&self) -> AppResult<()> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::Store("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn create(&self, submission: &Submission) -> AppResult<()> {
        self.check_available()?;
        self.submissions
            .lock()
            .unwrap()
            .entry(submission.id)
            .or_insert_with(|| submission.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Submission>> {
        self.check_available()?;
        Ok(self.submissions.lock().unwrap().get(&id).cloned())
    }

    async fn list_eligible(&self, max_attempts: i32, limit: i64) -> AppResult<Vec<Submission>> {
        self.check_available()?;
        let map = self.submissions.lock().unwrap();
        let mut eligible: Vec<Submission> = map
            .values()
            .filter(|s| match s.status {
                SubmissionStatus::Pending => true,
                SubmissionStatus::Failed => s.attempts < max_attempts,
                _ => false,
            })
            .cloned()
            .collect();
        eligible.sort_by_key(|s| s.submitted_at);
        eligible.truncate(limit as usize);
        Ok(eligible)
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: SubmissionStatus,
        new: SubmissionStatus,
    ) -> AppResult<bool> {
        self.check_available()?;
        let mut map = self.submissions.lock().unwrap();
        match map.get_mut(&id) {
            Some(sub) if sub.status == expected => {
                sub.status = new;
                if new == SubmissionStatus::InProgress {
                    sub.claimed_at = Some(Utc::now());
                    // The previous attempt's error belongs to the failed
                    // state, not the new claim
                    sub.last_error = None;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn finalize(&self, id: Uuid, outcome: &EvaluationOutcome) -> AppResult<bool> {
        self.check_available()?;
        let mut map = self.submissions.lock().unwrap();
        match map.get_mut(&id) {
            Some(sub) if sub.status == SubmissionStatus::InProgress => {
                match outcome {
                    EvaluationOutcome::Completed(result) => {
                        sub.status = SubmissionStatus::Completed;
                        sub.verdict = Some(result.verdict.clone());
                        sub.score = Some(result.score);
                        sub.last_error = None;
                    }
                    EvaluationOutcome::Failed(error) => {
                        sub.status = SubmissionStatus::Failed;
                        sub.verdict = None;
                        sub.score = None;
                        sub.last_error = Some(error.clone());
                    }
                }
                sub.attempts += 1;
                sub.claimed_at = None;
                sub.evaluated_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_stale_claims(&self, older_than: Duration) -> AppResult<u64> {
        self.check_available()?;
        let cutoff = Utc::now()
            - chrono::Duration::from_std(older_than)
                .map_err(|e| AppError::Store(e.to_string()))?;
        let mut map = self.submissions.lock().unwrap();
        let mut released = 0;
        for sub in map.values_mut() {
            if sub.status == SubmissionStatus::InProgress
                && sub.claimed_at.is_some_and(|at| at < cutoff)
            {
                sub.status = SubmissionStatus::Failed;
                sub.last_error = Some(super::postgres::stale_claim_error().to_string());
                sub.attempts += 1;
                sub.claimed_at = None;
                released += 1;
            }
        }
        Ok(released)
    }
}
