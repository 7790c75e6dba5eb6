use crate::client::StoreClient;
use crate::error::StoreError;
use clickhouse::Row;
use hoover_types::ProcessingErrorRow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
struct ProcessingErrorWireRow {
    collection_dataset: String,
    hash: String,
    task_name: String,
    run_time_ms: u64,
    error_logs: String,
    timestamp_unix_ms: i64,
}

/// Append-only insert for C10's journal. Called from the executor and the
/// parser router; by design this never returns an error the caller must
/// abort on -- failures here are themselves logged and swallowed by
/// `hoover-journal`, which wraps this.
pub async fn insert_processing_errors(
    client: &StoreClient,
    rows: &[ProcessingErrorRow],
) -> Result<(), StoreError> {
    if rows.is_empty() {
        return Ok(());
    }
    let mut insert = client.inner.insert("processing_errors")?;
    for row in rows {
        let wire = ProcessingErrorWireRow {
            collection_dataset: row.collection_dataset.clone(),
            hash: row.hash.clone(),
            task_name: row.task_name.clone(),
            run_time_ms: row.run_time_ms,
            error_logs: row.error_logs.clone(),
            timestamp_unix_ms: row.timestamp_unix_ms,
        };
        insert.write(&wire).await?;
    }
    insert.end().await?;
    Ok(())
}
