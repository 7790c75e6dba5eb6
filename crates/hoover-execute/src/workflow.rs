//! The executor's two workflow entry points (C7, phase P2):
//! `execute_plans`, the top-level driver over all pending plans for a
//! dataset, and `execute_single_plan`, which drives one plan through
//! download -> parse dispatch -> index -> commit.

use crate::dispatch::process_items_batched;
use crate::download::{download_plan_items, download_timeout_secs};
use crate::scratch_dir::plan_scratch_dir;
use futures::future::{join_all, BoxFuture};
use hoover_cas::ObjectStoreBackend;
use hoover_engine::{
    child_workflow_id, execute_activity, execute_child_workflow, ActivityOptions,
    ChildWorkflowOptions, TaskQueue, WorkflowError,
};
use hoover_index::IndexContext;
use hoover_parse::ParseContext;
use hoover_store::StoreClient;
use hoover_types::{batch_seq, PlanFinished};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Plans are run 16 at a time, per C7 step 2.
const PLANS_PER_BATCH: usize = 16;

/// Shared handles the executor needs across its whole plan-driving
/// pipeline. `parse`/`index` already carry their own store handles; `store`
/// and `cas` are kept at this level too since the download step and the
/// plan bookkeeping queries sit above both of those crates.
#[derive(Clone)]
pub struct ExecuteContext {
    pub store: StoreClient,
    pub cas: ObjectStoreBackend,
    pub parse: ParseContext,
    pub index: IndexContext,
    pub scratch_base_dir: PathBuf,
    pub max_recursion_depth: u32,
}

fn app_err(message: impl ToString) -> WorkflowError {
    WorkflowError::ApplicationError {
        message: message.to_string(),
        non_retryable: false,
    }
}

fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after 1970")
        .as_millis() as i64
}

#[derive(Serialize)]
struct PlanWorkflowParams {
    collection_dataset: String,
    plan_hash: String,
}

/// Drives one plan to completion: download, dispatch to P3, index via P4,
/// then append `processing_plan_finished` as the plan's commit point.
pub async fn execute_single_plan(ctx: &ExecuteContext, dataset: &str, plan_hash: &str) -> Result<(), WorkflowError> {
    let plan = hoover_store::plan::get_plan(&ctx.store, dataset, plan_hash)
        .await
        .map_err(app_err)?
        .ok_or_else(|| app_err(format!("no such plan: {plan_hash}")))?;

    let blobs = hoover_store::blob::get_blobs_batch(&ctx.store, dataset, &plan.item_hashes)
        .await
        .map_err(app_err)?;

    let plan_dir = plan_scratch_dir(&ctx.scratch_base_dir, dataset, plan_hash);
    let total_bytes: u64 = blobs.iter().map(|b| b.size).sum();
    let timeout = Duration::from_secs(download_timeout_secs(total_bytes));
    let download_options = ActivityOptions::new(timeout, TaskQueue::Common);

    let store = ctx.store.clone();
    let cas = ctx.cas.clone();
    let downloaded = execute_activity("download_plan_items", &download_options, move || {
        let store = store.clone();
        let cas = cas.clone();
        let dataset = dataset.to_string();
        let plan_dir = plan_dir.clone();
        let blobs = blobs.clone();
        async move { download_plan_items(&store, &cas, &dataset, &plan_dir, &blobs).await }
    })
    .await?;

    let plan_dir = plan_scratch_dir(&ctx.scratch_base_dir, dataset, plan_hash);

    let dispatch_params = PlanWorkflowParams {
        collection_dataset: dataset.to_string(),
        plan_hash: plan_hash.to_string(),
    };
    let dispatch_id = child_workflow_id("process_items_batched", &dispatch_params)
        .unwrap_or_else(|_| format!("process_items_batched-{plan_hash}"));
    let dispatch_options = ChildWorkflowOptions { id: dispatch_id, task_queue: TaskQueue::Common };
    let parse_ctx = ctx.parse.clone();
    let failures = execute_child_workflow("process_items_batched", &dispatch_options, move || {
        let parse_ctx = parse_ctx.clone();
        let dataset = dataset.to_string();
        async move {
            let failures = process_items_batched(&parse_ctx, &dataset, &downloaded).await;
            Ok::<_, WorkflowError>(failures)
        }
    })
    .await?;

    if !failures.is_empty() {
        let entries: Vec<hoover_journal::ErrorEntry> = failures
            .iter()
            .map(|(item_hash, error)| hoover_journal::ErrorEntry {
                hash: item_hash.clone(),
                task_name: "P3_ParseSingleFile".to_string(),
                run_time_ms: 0,
                error,
            })
            .collect();
        hoover_journal::record_processing_errors(&ctx.store, dataset, &entries).await;
    }

    if let Err(err) = tokio::fs::remove_dir_all(&plan_dir).await {
        tracing::warn!(dataset, plan_hash, error = %err, "failed to clean up plan scratch dir");
    }

    let index_params = PlanWorkflowParams {
        collection_dataset: dataset.to_string(),
        plan_hash: plan_hash.to_string(),
    };
    let index_id = child_workflow_id("index_dataset_plan", &index_params)
        .unwrap_or_else(|_| format!("index_dataset_plan-{plan_hash}"));
    let index_options = ChildWorkflowOptions { id: index_id, task_queue: TaskQueue::Indexing };
    let index_ctx = ctx.index.clone();
    execute_child_workflow("index_dataset_plan", &index_options, move || {
        let index_ctx = index_ctx.clone();
        let dataset = dataset.to_string();
        let plan_hash = plan_hash.to_string();
        async move { hoover_index::index_dataset_plan(&index_ctx, &dataset, &plan_hash).await }
    })
    .await?;

    hoover_store::plan::mark_finished(
        &ctx.store,
        &PlanFinished {
            collection_dataset: dataset.to_string(),
            plan_hash: plan_hash.to_string(),
            finished_at_unix_ms: now_unix_ms(),
        },
    )
    .await
    .map_err(app_err)?;

    tracing::info!(dataset, plan_hash, "plan finished");
    Ok(())
}

/// The top-level driver (C7): lists pending plans 1001 at a time, runs up
/// to 16 concurrently via `execute_single_plan`, tail-calls itself with the
/// continuation cursor, and once no plans remain, checks for newly
/// unplanned blobs and invokes P1 before recursing again. Guards recursion
/// depth the same way `hoover_scan::scan` does.
pub fn execute_plans<'a>(
    ctx: &'a ExecuteContext,
    dataset: &'a str,
    starting_plan_hash: Option<String>,
    depth: u32,
) -> BoxFuture<'a, Result<(), WorkflowError>> {
    Box::pin(async move {
        if depth > ctx.max_recursion_depth {
            return Err(WorkflowError::ApplicationError {
                message: format!("execute_plans recursion depth {depth} exceeds limit {}", ctx.max_recursion_depth),
                non_retryable: true,
            });
        }

        let pending = hoover_store::plan::list_pending_plans(&ctx.store, dataset, starting_plan_hash.as_deref())
            .await
            .map_err(app_err)?;
        let (page, cursor) = hoover_store::plan::split_continuation(pending);

        for batch in batch_seq(&page, PLANS_PER_BATCH) {
            let results = join_all(batch.iter().map(|plan_hash| {
                let params = PlanWorkflowParams {
                    collection_dataset: dataset.to_string(),
                    plan_hash: plan_hash.clone(),
                };
                let id = child_workflow_id("execute_single_plan", &params)
                    .unwrap_or_else(|_| format!("execute_single_plan-{plan_hash}"));
                let options = ChildWorkflowOptions { id, task_queue: TaskQueue::Common };
                async move {
                    execute_child_workflow("execute_single_plan", &options, || execute_single_plan(ctx, dataset, plan_hash))
                        .await
                }
            }))
            .await;
            for result in results {
                result?;
            }
        }

        if let Some(next_cursor) = cursor {
            return execute_plans(ctx, dataset, Some(next_cursor), depth + 1).await;
        }

        let unplanned = hoover_store::plan::count_unplanned_blobs(&ctx.store, dataset)
            .await
            .map_err(app_err)?;
        if unplanned > 0 {
            let options = ActivityOptions::new(Duration::from_secs(60 + unplanned.div_ceil(4000)), TaskQueue::Common);
            let store = ctx.store.clone();
            execute_activity("compute_plans", &options, move || {
                let store = store.clone();
                let dataset = dataset.to_string();
                async move { hoover_plan::compute_plans(&store, &dataset).await }
            })
            .await?;
            return execute_plans(ctx, dataset, None, depth + 1).await;
        }

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plans_per_batch_matches_original_contract() {
        assert_eq!(PLANS_PER_BATCH, 16);
    }
}
