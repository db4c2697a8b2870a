//! Judging backend
//!
//! The judge is an opaque capability: given a submission it produces a
//! verdict and score, or fails. The production implementation runs the
//! submission inside a locked-down Docker container.

mod docker;
pub mod languages;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{JudgeOutcome, Submission},
};

pub use docker::DockerJudge;

/// Evaluation backend, injected into the dispatcher.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Judge: Send + Sync {
    /// Execute and score a submission. The dispatcher bounds this call
    /// with a timeout; implementations do not need their own deadline.
    async fn evaluate(&self, submission: &Submission) -> AppResult<JudgeOutcome>;
}
