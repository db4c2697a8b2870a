//! Domain models

mod submission;

pub use submission::{EvaluationOutcome, JudgeOutcome, Submission, SubmissionStatus};
