//! Evaluation dispatcher
//!
//! The dispatcher owns the submission evaluation lifecycle: it claims a
//! submission with an atomic conditional status transition, runs the judge
//! under a timeout, and finalizes the terminal state. It serves three entry
//! points sharing the same claim protocol: fire-and-forget scheduling
//! (`request_evaluate`), synchronous on-demand evaluation (`evaluate_by_id`),
//! and the perpetual background sweep (`auto_evaluate`).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use uuid::Uuid;

use crate::{
    config::DispatcherConfig,
    error::{AppError, AppResult},
    judge::Judge,
    models::{EvaluationOutcome, Submission, SubmissionStatus},
    store::SubmissionStore,
};

/// Schedules and orchestrates submission evaluation. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    store: Arc<dyn SubmissionStore>,
    judge: Arc<dyn Judge>,
    config: DispatcherConfig,
    shutdown: AtomicBool,
}

impl Dispatcher {
    /// Create a new dispatcher over the given store and judge capabilities
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        judge: Arc<dyn Judge>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                store,
                judge,
                config,
                shutdown: AtomicBool::new(false),
            }),
        }
    }

    /// Persist a submission and schedule its evaluation without waiting for
    /// the judge. Returns once scheduling is accepted. Failures after the
    /// submission is persisted are not surfaced; the background sweep picks
    /// those up.
    pub async fn request_evaluate(&self, submission: Submission) -> AppResult<()> {
        if submission.source_code.trim().is_empty() {
            return Err(AppError::Validation(
                "Submission source code must not be empty".to_string(),
            ));
        }
        if submission.language.trim().is_empty() {
            return Err(AppError::Validation(
                "Submission language must not be empty".to_string(),
            ));
        }
        if submission.status != SubmissionStatus::Pending {
            return Err(AppError::Validation(format!(
                "New submissions must be pending, got {}",
                submission.status
            )));
        }

        self.inner.store.create(&submission).await?;

        let dispatcher = self.clone();
        tokio::spawn(async move {
            match dispatcher.try_claim_and_evaluate(&submission).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(
                        submission_id = %submission.id,
                        "Scheduled submission was claimed elsewhere"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        submission_id = %submission.id,
                        "Scheduled evaluation failed, background sweep will retry: {}",
                        e
                    );
                }
            }
        });

        Ok(())
    }

    /// Synchronously claim and evaluate one submission, blocking the caller
    /// until the judge returns. Never queues behind another claim holder.
    pub async fn evaluate_by_id(&self, id: Uuid) -> AppResult<()> {
        let submission = self
            .inner
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission {id} not found")))?;

        match submission.status {
            SubmissionStatus::Completed => Err(AppError::Conflict(format!(
                "Submission {id} is already evaluated"
            ))),
            SubmissionStatus::InProgress => Err(AppError::AlreadyInProgress(format!(
                "Submission {id} is being evaluated"
            ))),
            SubmissionStatus::Pending | SubmissionStatus::Failed => {
                let claimed = self
                    .inner
                    .store
                    .compare_and_set_status(id, submission.status, SubmissionStatus::InProgress)
                    .await?;
                if !claimed {
                    return Err(AppError::AlreadyInProgress(format!(
                        "Submission {id} was claimed concurrently"
                    )));
                }
                self.run_evaluation(&submission).await
            }
        }
    }

    /// Fetch a submission for read-only callers (the status endpoint).
    pub async fn get_submission(&self, id: Uuid) -> AppResult<Submission> {
        self.inner
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission {id} not found")))
    }

    /// Perpetual background pass: release stale claims, pick up eligible
    /// submissions, and evaluate them with bounded fan-out. Runs until
    /// `shutdown` is called; in-flight evaluations finish before the loop
    /// re-checks the flag. One submission's failure never stops the loop.
    pub async fn auto_evaluate(&self) {
        tracing::info!("Starting background evaluation loop");

        while !self.is_shutdown() {
            match self.sweep().await {
                Ok(found) if found > 0 => {
                    // More work may be queued; go straight into the next cycle
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Background sweep failed, will retry: {}", e);
                }
            }

            tokio::time::sleep(self.inner.config.poll_interval()).await;
        }

        tracing::info!("Background evaluation loop stopped");
    }

    /// Signal the background loop to stop after the current cycle
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::SeqCst);
    }

    fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::SeqCst)
    }

    /// One background cycle. Returns how many eligible submissions were found.
    async fn sweep(&self) -> AppResult<usize> {
        let config = &self.inner.config;

        let released = self
            .inner
            .store
            .release_stale_claims(config.stale_claim_after())
            .await?;
        if released > 0 {
            tracing::warn!(released, "Released stale in-progress claims");
        }

        let eligible = self
            .inner
            .store
            .list_eligible(config.max_attempts, config.sweep_batch)
            .await?;
        let found = eligible.len();

        futures::stream::iter(eligible)
            .for_each_concurrent(config.worker_limit, |submission| {
                let dispatcher = self.clone();
                async move {
                    match dispatcher.try_claim_and_evaluate(&submission).await {
                        Ok(true) => {}
                        Ok(false) => {
                            tracing::debug!(
                                submission_id = %submission.id,
                                "Submission claimed elsewhere, skipping"
                            );
                        }
                        Err(e) => {
                            tracing::warn!(
                                submission_id = %submission.id,
                                "Evaluation failed: {}",
                                e
                            );
                        }
                    }
                }
            })
            .await;

        Ok(found)
    }

    /// Claim protocol shared by scheduling and the sweep: conditionally
    /// transition into `InProgress` from the status we observed; a lost race
    /// is not an error, the submission is simply abandoned to its new owner.
    async fn try_claim_and_evaluate(&self, submission: &Submission) -> AppResult<bool> {
        match submission.status {
            SubmissionStatus::Pending | SubmissionStatus::Failed => {}
            _ => return Ok(false),
        }

        let claimed = self
            .inner
            .store
            .compare_and_set_status(
                submission.id,
                submission.status,
                SubmissionStatus::InProgress,
            )
            .await?;
        if !claimed {
            return Ok(false);
        }

        self.run_evaluation(submission).await?;
        Ok(true)
    }

    /// Run the judge under the configured timeout and finalize the terminal
    /// state in a single store update. The caller must hold the claim.
    /// Returns `Conflict` when the claim was lost before the result could
    /// be recorded, so a synchronous success always reflects stored state.
    async fn run_evaluation(&self, submission: &Submission) -> AppResult<()> {
        let timeout = self.inner.config.judge_timeout();

        let judged = match tokio::time::timeout(
            timeout,
            self.inner.judge.evaluate(submission),
        )
        .await
        {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("Judge timed out after {}s", timeout.as_secs())),
        };

        let (outcome, result) = match judged {
            Ok(judge_outcome) => {
                tracing::info!(
                    submission_id = %submission.id,
                    verdict = %judge_outcome.verdict,
                    score = judge_outcome.score,
                    "Submission evaluated"
                );
                (EvaluationOutcome::Completed(judge_outcome), Ok(()))
            }
            Err(message) => {
                tracing::warn!(
                    submission_id = %submission.id,
                    "Judge failed: {}",
                    message
                );
                (
                    EvaluationOutcome::Failed(message.clone()),
                    Err(AppError::Judge(message)),
                )
            }
        };

        match self.inner.store.finalize(submission.id, &outcome).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    submission_id = %submission.id,
                    "Claim was lost before finalize; result discarded"
                );
                return Err(AppError::Conflict(format!(
                    "Submission {} was reclaimed before its result could be recorded",
                    submission.id
                )));
            }
            Err(e) => {
                // Left in progress; the stale-claim pass reconciles it
                tracing::warn!(
                    submission_id = %submission.id,
                    "Failed to finalize evaluation: {}",
                    e
                );
            }
        }

        result
    }
}
