use std::fmt;
use std::time::Duration;

/// The durable engine's sum type for everything that can go wrong running
/// an activity or child workflow.
#[derive(Debug)]
pub enum WorkflowError {
    ActivityFailure {
        activity: String,
        attempts: u32,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    ChildFailure {
        workflow: String,
        source: Box<WorkflowError>,
    },
    ApplicationError {
        message: String,
        non_retryable: bool,
    },
    TimeoutError {
        activity: String,
        elapsed: Duration,
    },
    CancelledError,
}

impl WorkflowError {
    /// Whether a retry loop should give up immediately rather than retry.
    pub fn is_non_retryable(&self) -> bool {
        matches!(self, WorkflowError::ApplicationError { non_retryable: true, .. })
    }
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::ActivityFailure { activity, attempts, source } => {
                write!(f, "activity '{activity}' failed after {attempts} attempt(s): {source}")
            }
            WorkflowError::ChildFailure { workflow, source } => {
                write!(f, "child workflow '{workflow}' failed: {source}")
            }
            WorkflowError::ApplicationError { message, non_retryable } => {
                write!(f, "application error (non_retryable={non_retryable}): {message}")
            }
            WorkflowError::TimeoutError { activity, elapsed } => {
                write!(f, "activity '{activity}' timed out after {elapsed:?}")
            }
            WorkflowError::CancelledError => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for WorkflowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkflowError::ActivityFailure { source, .. } => Some(source.as_ref()),
            WorkflowError::ChildFailure { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Renders the full cause chain for the error journal: message, type name,
/// nested source, deduplicating identical repeated messages so a cyclic or
/// very deep chain still renders as a finite string.
pub fn render_error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut lines = Vec::new();
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    let mut last_rendered: Option<String> = None;
    while let Some(e) = current {
        let rendered = e.to_string();
        if last_rendered.as_deref() != Some(rendered.as_str()) {
            lines.push(rendered.clone());
            last_rendered = Some(rendered);
        }
        current = e.source();
    }
    lines.join("\ncaused by: ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_retryable_flag_only_set_on_application_error() {
        let app_err = WorkflowError::ApplicationError {
            message: "bad".into(),
            non_retryable: true,
        };
        assert!(app_err.is_non_retryable());
        assert!(!WorkflowError::CancelledError.is_non_retryable());
    }

    #[test]
    fn render_chain_dedups_repeated_causes() {
        #[derive(Debug)]
        struct Leaf;
        impl fmt::Display for Leaf {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "same message")
            }
        }
        impl std::error::Error for Leaf {}

        #[derive(Debug)]
        struct Wrapper(Leaf);
        impl fmt::Display for Wrapper {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Forwards verbatim, as a thin wrapper often does.
                write!(f, "same message")
            }
        }
        impl std::error::Error for Wrapper {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let rendered = render_error_chain(&Wrapper(Leaf));
        assert_eq!(rendered, "same message");
    }
}
