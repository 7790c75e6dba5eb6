//! `process_items_batched` (C7 step 3): fans a plan's downloaded items out
//! to P3's `parse_single_file` child workflow, up to 32 in parallel per
//! batch. Per-item failures are collected, never rethrown -- one bad file
//! must not sink the rest of the plan.

use crate::download::DownloadedItem;
use hoover_engine::{child_workflow_id, execute_child_workflow, ChildWorkflowOptions, TaskQueue, WorkflowError};
use hoover_parse::ParseContext;
use hoover_types::batch_seq;
use serde::Serialize;

const PARSE_BATCH_SIZE: usize = 32;

#[derive(Serialize)]
struct ParseSingleFileParams {
    collection_dataset: String,
    item_hash: String,
}

/// Runs `parse_single_file` for every item, 32 at a time, returning the
/// `(item_hash, error)` pairs for whichever items failed.
pub async fn process_items_batched(
    ctx: &ParseContext,
    dataset: &str,
    items: &[DownloadedItem],
) -> Vec<(String, WorkflowError)> {
    let mut failures = Vec::new();

    for batch in batch_seq(items, PARSE_BATCH_SIZE) {
        let results = futures::future::join_all(batch.iter().map(|item| {
            let ctx = ctx.clone();
            let dataset = dataset.to_string();
            let item_hash = item.item_hash.clone();
            let path = item.path.clone();
            let size = item.size;
            async move {
                let params = ParseSingleFileParams {
                    collection_dataset: dataset.clone(),
                    item_hash: item_hash.clone(),
                };
                let id = child_workflow_id("parse_single_file", &params)
                    .unwrap_or_else(|_| format!("parse_single_file-{item_hash}"));
                let options = ChildWorkflowOptions { id, task_queue: TaskQueue::Common };
                let result = execute_child_workflow("parse_single_file", &options, move || {
                    hoover_parse::parse_single_file(&ctx, &dataset, &item_hash, path, size)
                })
                .await;
                (item.item_hash.clone(), result)
            }
        }))
        .await;

        for (item_hash, result) in results {
            if let Err(err) = result {
                failures.push((item_hash, err));
            }
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_size_matches_original_contract() {
        assert_eq!(PARSE_BATCH_SIZE, 32);
    }
}
