//! Execution request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Request to evaluate a new submission
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExecutionRequest {
    /// Submission ID; generated when absent
    pub id: Option<Uuid>,

    /// Problem the submission answers
    pub problem_id: Uuid,

    /// Author of the submission
    pub user_id: Uuid,

    /// Programming language
    #[validate(length(min = 1, max = 20))]
    pub language: String,

    /// Source code
    #[validate(length(min = 1, max = 1048576))] // 1MB max
    pub source_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_fails_validation() {
        let request = CreateExecutionRequest {
            id: None,
            problem_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            language: "rust".to_string(),
            source_code: String::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_valid_request_passes_validation() {
        let request = CreateExecutionRequest {
            id: Some(Uuid::new_v4()),
            problem_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            language: "python".to_string(),
            source_code: "print('hi')".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}
