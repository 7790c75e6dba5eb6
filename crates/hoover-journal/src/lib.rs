//! # hoover-journal
//!
//! The error journal (C10): a single append activity, called from the
//! executor and the parser router, that never raises. Failures writing to
//! the journal itself are logged and swallowed -- a broken journal must
//! never take down a plan or a file's processing.

use hoover_engine::render_error_chain;
use hoover_store::StoreClient;
use hoover_types::ProcessingErrorRow;
use std::time::{SystemTime, UNIX_EPOCH};

/// One failure to record: task name, how long it ran before failing, and
/// the error that caused it.
pub struct ErrorEntry<'a> {
    pub hash: String,
    pub task_name: String,
    pub run_time_ms: u64,
    pub error: &'a (dyn std::error::Error + 'static),
}

fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after 1970")
        .as_millis() as i64
}

/// Records a batch of processing failures. Never returns an error to the
/// caller -- a write failure here is logged at `error` level and dropped,
/// matching the original's "journal insert never raises" contract.
pub async fn record_processing_errors(client: &StoreClient, dataset: &str, entries: &[ErrorEntry<'_>]) {
    if entries.is_empty() {
        return;
    }
    let timestamp = now_unix_ms();
    let rows: Vec<ProcessingErrorRow> = entries
        .iter()
        .map(|entry| ProcessingErrorRow {
            collection_dataset: dataset.to_string(),
            hash: entry.hash.clone(),
            task_name: entry.task_name.clone(),
            run_time_ms: entry.run_time_ms,
            error_logs: render_error_chain(entry.error),
            timestamp_unix_ms: timestamp,
        })
        .collect();

    if let Err(err) = hoover_store::error_journal::insert_processing_errors(client, &rows).await {
        tracing::error!(dataset, error = %err, "failed to write processing errors to journal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_unix_ms_is_positive_and_monotonic_enough() {
        let a = now_unix_ms();
        let b = now_unix_ms();
        assert!(a > 0);
        assert!(b >= a);
    }
}
