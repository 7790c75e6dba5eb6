//! `index_dataset_plan`: the indexer's per-plan workflow entry point.

use crate::metadata_index::index_metadatas;
use crate::text_index::index_text_content;
use hoover_engine::{execute_activity, ActivityOptions, TaskQueue, WorkflowError};
use hoover_ner::NerClient;
use hoover_search::SearchClient;
use hoover_store::StoreClient;
use hoover_types::batch_seq;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Chunk size for `index_dataset_plan`'s per-chunk activity pair, matching
/// the original's `INDEXING_CHUNK_SIZE`.
const INDEXING_CHUNK_SIZE: usize = 100;

/// `start_to_close_timeout` for both per-chunk activities, matching the
/// original's `INDEXING_TIMEOUT`.
const INDEXING_TIMEOUT: Duration = Duration::from_secs(45 * 60);

/// Shared handles every indexing activity needs. `NerClient` is wrapped in
/// an `Arc` since it holds no internal cheap-clone story of its own;
/// `StoreClient`/`SearchClient` are already cheaply `Clone`.
#[derive(Clone)]
pub struct IndexContext {
    pub store: StoreClient,
    pub search: SearchClient,
    pub ner: Arc<NerClient>,
}

fn app_err(message: impl ToString) -> WorkflowError {
    WorkflowError::ApplicationError {
        message: message.to_string(),
        non_retryable: false,
    }
}

pub async fn index_dataset_plan(ctx: &IndexContext, dataset: &str, plan_hash: &str) -> Result<(), WorkflowError> {
    let plan = hoover_store::plan::get_plan(&ctx.store, dataset, plan_hash)
        .await
        .map_err(app_err)?
        .ok_or_else(|| app_err(format!("no such plan: {plan_hash}")))?;

    let mut item_hashes = plan.item_hashes.clone();
    item_hashes.sort();
    item_hashes.dedup();

    let chunks = batch_seq(&item_hashes, INDEXING_CHUNK_SIZE);

    let text_options = ActivityOptions::new(INDEXING_TIMEOUT, TaskQueue::Indexing);
    let metadata_options = ActivityOptions::new(INDEXING_TIMEOUT, TaskQueue::Common);

    let chunk_futures = chunks.into_iter().map(|chunk_hashes| {
        let ctx = ctx.clone();
        let dataset = dataset.to_string();
        let text_options = text_options;
        let metadata_options = metadata_options;
        async move {
            let chunk_hashes_text = chunk_hashes.clone();
            let ctx_text = ctx.clone();
            let dataset_text = dataset.clone();
            let text_fut = async move {
                let started = Instant::now();
                let result = execute_activity("index_text_content", &text_options, move || {
                    let ctx = ctx_text.clone();
                    let dataset = dataset_text.clone();
                    let chunk_hashes = chunk_hashes_text.clone();
                    async move { index_text_content(&ctx, &dataset, &chunk_hashes).await }
                })
                .await;
                (result, started.elapsed().as_millis() as u64)
            };

            let chunk_hashes_meta = chunk_hashes.clone();
            let ctx_meta = ctx.clone();
            let dataset_meta = dataset.clone();
            let metadata_fut = async move {
                let started = Instant::now();
                let result = execute_activity("index_metadatas", &metadata_options, move || {
                    let ctx = ctx_meta.clone();
                    let dataset = dataset_meta.clone();
                    let chunk_hashes = chunk_hashes_meta.clone();
                    async move { index_metadatas(&ctx, &dataset, &chunk_hashes).await }
                })
                .await;
                (result, started.elapsed().as_millis() as u64)
            };

            let ((text_result, text_ms), (metadata_result, metadata_ms)) = tokio::join!(text_fut, metadata_fut);

            if let Err(err) = text_result {
                journal_chunk_failure(&ctx, &dataset, &chunk_hashes, "index_text_content", text_ms, err).await;
            }
            if let Err(err) = metadata_result {
                journal_chunk_failure(&ctx, &dataset, &chunk_hashes, "index_metadatas", metadata_ms, err).await;
            }
        }
    });

    futures::future::join_all(chunk_futures).await;

    tracing::info!(dataset, plan_hash, "finished indexing dataset plan");
    Ok(())
}

async fn journal_chunk_failure(
    ctx: &IndexContext,
    dataset: &str,
    item_hashes: &[String],
    task_name: &'static str,
    run_time_ms: u64,
    err: WorkflowError,
) {
    let entries: Vec<hoover_journal::ErrorEntry> = item_hashes
        .iter()
        .map(|hash| hoover_journal::ErrorEntry {
            hash: hash.clone(),
            task_name: task_name.to_string(),
            run_time_ms,
            error: &err,
        })
        .collect();
    hoover_journal::record_processing_errors(&ctx.store, dataset, &entries).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_matches_original_contract() {
        assert_eq!(INDEXING_CHUNK_SIZE, 100);
    }

    #[test]
    fn timeout_matches_original_contract() {
        assert_eq!(INDEXING_TIMEOUT, Duration::from_secs(2700));
    }
}
