use crate::error::WorkflowError;
use crate::queue::TaskQueue;
use crate::retry::RetryPolicy;
use std::future::Future;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct ActivityOptions {
    pub start_to_close_timeout: Duration,
    pub retry_policy: RetryPolicy,
    pub task_queue: TaskQueue,
}

impl ActivityOptions {
    pub fn new(timeout: Duration, task_queue: TaskQueue) -> Self {
        Self {
            start_to_close_timeout: timeout,
            retry_policy: RetryPolicy::default(),
            task_queue,
        }
    }
}

/// Runs `activity_name` via `f`, retrying with exponential backoff up to
/// `options.retry_policy.max_attempts`, unless the error is marked
/// non-retryable. Each attempt is logged with its number and elapsed time.
/// A per-attempt timeout of `start_to_close_timeout` is enforced.
pub async fn execute_activity<F, Fut, T>(
    activity_name: &str,
    options: &ActivityOptions,
    mut f: F,
) -> Result<T, WorkflowError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, WorkflowError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        let started = Instant::now();
        let outcome = tokio::time::timeout(options.start_to_close_timeout, f()).await;
        let elapsed = started.elapsed();

        let result = match outcome {
            Ok(inner) => inner,
            Err(_) => Err(WorkflowError::TimeoutError {
                activity: activity_name.to_string(),
                elapsed,
            }),
        };

        match result {
            Ok(value) => {
                tracing::info!(activity = activity_name, attempt, elapsed_ms = elapsed.as_millis() as u64, "activity succeeded");
                return Ok(value);
            }
            Err(err) if err.is_non_retryable() || attempt >= options.retry_policy.max_attempts => {
                tracing::warn!(activity = activity_name, attempt, elapsed_ms = elapsed.as_millis() as u64, error = %err, "activity failed, giving up");
                return Err(match err {
                    WorkflowError::ActivityFailure { .. } | WorkflowError::TimeoutError { .. } => err,
                    other => WorkflowError::ActivityFailure {
                        activity: activity_name.to_string(),
                        attempts: attempt,
                        source: Box::new(std::io::Error::other(other.to_string())),
                    },
                });
            }
            Err(err) => {
                let backoff = options.retry_policy.backoff_for_attempt(attempt);
                tracing::warn!(activity = activity_name, attempt, elapsed_ms = elapsed.as_millis() as u64, error = %err, backoff_ms = backoff.as_millis() as u64, "activity failed, retrying");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn retries_up_to_max_attempts_then_fails() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let options = ActivityOptions::new(Duration::from_secs(5), TaskQueue::Common);

        let result: Result<(), WorkflowError> = execute_activity("always_fails", &options, move || {
            let calls = calls2.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(WorkflowError::ApplicationError {
                    message: "boom".into(),
                    non_retryable: false,
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_second_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let options = ActivityOptions::new(Duration::from_secs(5), TaskQueue::Common);

        let result = execute_activity("flaky", &options, move || {
            let calls = calls2.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 2 {
                    Err(WorkflowError::ApplicationError {
                        message: "transient".into(),
                        non_retryable: false,
                    })
                } else {
                    Ok(42)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let options = ActivityOptions::new(Duration::from_secs(5), TaskQueue::Common);

        let result: Result<(), WorkflowError> = execute_activity("fatal", &options, move || {
            let calls = calls2.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(WorkflowError::ApplicationError {
                    message: "fatal".into(),
                    non_retryable: true,
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
