use hoover_engine::WorkflowError;
use std::fmt::Display;

pub fn app_err<E: Display>(e: E) -> WorkflowError {
    WorkflowError::ApplicationError {
        message: e.to_string(),
        non_retryable: false,
    }
}
