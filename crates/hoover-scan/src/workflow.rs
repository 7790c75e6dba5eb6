//! The scanner workflow (C5, phase P0): recursively turns a directory tree
//! into a deduplicated `(blobs, VFS)` population. Also the re-entry point
//! P3 calls when a container (archive/email/PDF/video) unpacks into a
//! scratch directory.

use crate::fs_walk::{scan_one_level, RawEntry};
use crate::ingest::ingest_files_batch;
use futures::future::BoxFuture;
use hoover_cas::ObjectStoreBackend;
use hoover_engine::{
    child_workflow_id, execute_activity, execute_child_workflow, ActivityOptions,
    ChildWorkflowOptions, TaskQueue, WorkflowError,
};
use hoover_store::StoreClient;
use hoover_types::{batch_files_by_size, batch_seq, normalize_vfs_path};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

const MAX_FOLDERS_PER_LISTING_BATCH: usize = 10;
const MAX_CHILD_DIRS_PER_RECURSE_BATCH: usize = 10;
const FILE_BATCH_MAX_COUNT: usize = 100;
const FILE_BATCH_MAX_BYTES: u64 = 50 * 1024 * 1024;

/// Shared handles a scan call needs; cheap to clone (both inner handles are
/// themselves `Arc`-backed or `Clone`).
#[derive(Clone)]
pub struct ScanContext {
    pub store: StoreClient,
    pub cas: ObjectStoreBackend,
    pub max_recursion_depth: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanInput {
    pub dataset: String,
    pub dataset_path: PathBuf,
    pub folder_paths: Vec<String>,
    pub container_hash: String,
    pub root_path_prefix: String,
    #[serde(skip)]
    pub depth: u32,
}

impl ScanInput {
    /// The top-level entry point for a fresh dataset: scan from the root.
    pub fn root(dataset: String, dataset_path: PathBuf) -> Self {
        Self {
            dataset,
            dataset_path,
            folder_paths: vec!["/".to_string()],
            container_hash: String::new(),
            root_path_prefix: String::new(),
            depth: 0,
        }
    }

    /// The entry point P3 uses when a container unpacks into `scratch_dir`.
    pub fn for_container(dataset: String, scratch_dir: PathBuf, container_hash: String) -> Self {
        Self {
            dataset,
            dataset_path: scratch_dir,
            folder_paths: vec!["/".to_string()],
            container_hash,
            root_path_prefix: String::new(),
            depth: 0,
        }
    }
}

/// Recursive by construction -- boxed because `async fn` cannot otherwise
/// call itself.
pub fn scan<'a>(ctx: &'a ScanContext, input: ScanInput) -> BoxFuture<'a, Result<(), WorkflowError>> {
    Box::pin(async move {
        if input.depth > ctx.max_recursion_depth {
            return Err(WorkflowError::ApplicationError {
                message: format!(
                    "scan recursion depth {} exceeds limit {}",
                    input.depth, ctx.max_recursion_depth
                ),
                non_retryable: true,
            });
        }

        let mut all_entries: Vec<RawEntry> = Vec::new();
        for listing_batch in batch_seq(&input.folder_paths, MAX_FOLDERS_PER_LISTING_BATCH) {
            let listings = futures::future::join_all(listing_batch.iter().map(|folder_path| {
                let local_dir = join_dataset_relative(&input.dataset_path, folder_path);
                let options = ActivityOptions::new(Duration::from_secs(60), TaskQueue::Common);
                async move {
                    let folder_path = folder_path.clone();
                    execute_activity("scan_one_level", &options, move || {
                        let local_dir = local_dir.clone();
                        let folder_path = folder_path.clone();
                        async move {
                            scan_one_level(&local_dir, &folder_path).await.map_err(|e| {
                                WorkflowError::ApplicationError {
                                    message: format!("reading {}: {e}", local_dir.display()),
                                    non_retryable: false,
                                }
                            })
                        }
                    })
                    .await
                }
            }))
            .await;
            for listing in listings {
                all_entries.extend(listing?);
            }
        }

        let (dir_entries, file_entries): (Vec<RawEntry>, Vec<RawEntry>) =
            all_entries.into_iter().partition(|e| e.is_dir);

        // Step 2: insert newly discovered directories (set-difference).
        let dir_candidate_paths: Vec<String> = dir_entries
            .iter()
            .map(|e| normalize_vfs_path(&format!("{}{}", input.root_path_prefix, e.vfs_path)))
            .collect();
        if !dir_candidate_paths.is_empty() {
            let existing = hoover_store::vfs::existing_paths(
                &ctx.store,
                &input.dataset,
                &input.container_hash,
                &dir_candidate_paths,
            )
            .await
            .map_err(|e| WorkflowError::ApplicationError {
                message: e.to_string(),
                non_retryable: false,
            })?;
            let existing: std::collections::HashSet<String> = existing.into_iter().collect();
            let new_dirs: Vec<String> = dir_candidate_paths
                .iter()
                .filter(|p| !existing.contains(*p))
                .cloned()
                .collect();
            hoover_store::vfs::insert_directories(
                &ctx.store,
                &input.dataset,
                &input.container_hash,
                &new_dirs,
            )
            .await
            .map_err(|e| WorkflowError::ApplicationError {
                message: e.to_string(),
                non_retryable: false,
            })?;
        }

        // Step 3 (files) + 4: one activity per file batch.
        let file_batches = batch_files_by_size(&file_entries, FILE_BATCH_MAX_COUNT, FILE_BATCH_MAX_BYTES);
        let ingest_results = futures::future::join_all(file_batches.into_iter().map(|batch| {
            let options = ActivityOptions::new(Duration::from_secs(300), TaskQueue::Common);
            let dataset = input.dataset.clone();
            let container_hash = input.container_hash.clone();
            let root_path_prefix = input.root_path_prefix.clone();
            async move {
                execute_activity("ingest_files_batch", &options, move || {
                    let batch = batch.clone();
                    let dataset = dataset.clone();
                    let container_hash = container_hash.clone();
                    let root_path_prefix = root_path_prefix.clone();
                    async move {
                        ingest_files_batch(&ctx.store, &ctx.cas, &dataset, &container_hash, &root_path_prefix, &batch)
                            .await
                    }
                })
                .await
            }
        }))
        .await;
        for result in ingest_results {
            result?;
        }

        // Step 3 (directories): recurse into child scan workflows, up to
        // `MAX_CHILD_DIRS_PER_RECURSE_BATCH` folders per child call.
        let child_dir_paths: Vec<String> = dir_entries
            .iter()
            .map(|e| normalize_vfs_path(&format!("{}{}", input.root_path_prefix, e.vfs_path)))
            .collect();
        let recurse_batches = batch_seq(&child_dir_paths, MAX_CHILD_DIRS_PER_RECURSE_BATCH);
        let child_results = futures::future::join_all(recurse_batches.into_iter().map(|folder_paths| {
            let child_input = ScanInput {
                dataset: input.dataset.clone(),
                dataset_path: input.dataset_path.clone(),
                folder_paths,
                container_hash: input.container_hash.clone(),
                root_path_prefix: input.root_path_prefix.clone(),
                depth: input.depth + 1,
            };
            async move {
                let id = child_workflow_id("scan", &child_input).unwrap_or_else(|_| "scan-unknown".to_string());
                let options = ChildWorkflowOptions { id, task_queue: TaskQueue::Common };
                execute_child_workflow("scan", &options, move || scan(ctx, child_input)).await
            }
        }))
        .await;
        for result in child_results {
            result?;
        }

        Ok(())
    })
}

fn join_dataset_relative(dataset_path: &std::path::Path, vfs_folder: &str) -> PathBuf {
    let relative = vfs_folder.trim_start_matches('/');
    if relative.is_empty() {
        dataset_path.to_path_buf()
    } else {
        dataset_path.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoover_cas::ObjectStoreBackend;
    use hoover_types::is_valid_dataset_slug;
    use tempfile::tempdir;

    fn test_ctx() -> ScanContext {
        ScanContext {
            store: StoreClient::new("http://localhost:18123", "hoover4_test_scan"),
            cas: ObjectStoreBackend::in_memory_for_tests(),
            max_recursion_depth: 100,
        }
    }

    #[test]
    fn root_input_starts_at_depth_zero() {
        let input = ScanInput::root("ds1".to_string(), PathBuf::from("/data/ds1"));
        assert_eq!(input.depth, 0);
        assert_eq!(input.folder_paths, vec!["/".to_string()]);
        assert!(is_valid_dataset_slug(&input.dataset));
    }

    #[test]
    fn join_dataset_relative_handles_root() {
        let base = PathBuf::from("/data/ds1");
        assert_eq!(join_dataset_relative(&base, "/"), base);
        assert_eq!(join_dataset_relative(&base, "/a/b"), base.join("a/b"));
    }

    #[test]
    fn depth_guard_is_checked_before_any_io() {
        let ctx = test_ctx();
        let input = ScanInput {
            depth: ctx.max_recursion_depth + 1,
            ..ScanInput::root("ds1".to_string(), tempdir().unwrap().keep())
        };
        let result = futures::executor::block_on(scan(&ctx, input));
        assert!(matches!(result, Err(WorkflowError::ApplicationError { non_retryable: true, .. })));
    }
}
