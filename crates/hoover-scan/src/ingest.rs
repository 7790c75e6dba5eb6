//! `ingest_files_batch`: the single durable activity behind one file batch.
//! Streams each new file once, routes the bytes to inline/object storage,
//! and appends VFS rows -- internally re-run safe against both
//! `(dataset, blob_hash)` and `(dataset, container_hash, path)` dedup.

use crate::fs_walk::RawEntry;
use hoover_cas::ObjectStoreBackend;
use hoover_store::StoreClient;
use hoover_types::{Blob, StorageSite, VfsFile};

/// Streams, hashes and persists one batch of newly-discovered files.
/// `root_path_prefix` is prepended to every VFS path, per the scanner's
/// container-recursion contract.
pub async fn ingest_files_batch(
    store: &StoreClient,
    cas: &ObjectStoreBackend,
    dataset: &str,
    container_hash: &str,
    root_path_prefix: &str,
    batch: &[RawEntry],
) -> Result<(), hoover_engine::WorkflowError> {
    if batch.is_empty() {
        return Ok(());
    }

    let candidate_paths: Vec<String> = batch
        .iter()
        .map(|e| format!("{root_path_prefix}{}", e.vfs_path))
        .collect();
    let already_present_paths =
        hoover_store::vfs::existing_paths(store, dataset, container_hash, &candidate_paths)
            .await
            .map_err(app_err)?;
    let already_present_paths: std::collections::HashSet<String> = already_present_paths.into_iter().collect();

    let mut new_entries = Vec::new();
    for (entry, vfs_path) in batch.iter().zip(candidate_paths.into_iter()) {
        let vfs_path = hoover_types::normalize_vfs_path(&vfs_path);
        if already_present_paths.contains(&vfs_path) {
            continue;
        }
        let (multi_hash, size) = hoover_cas::compute_hashes_streaming(&entry.local_path)
            .await
            .map_err(|e| hoover_engine::WorkflowError::ApplicationError {
                message: format!("hashing failed for {}: {e}", entry.local_path.display()),
                non_retryable: false,
            })?;
        new_entries.push((entry, vfs_path, multi_hash, size));
    }

    let candidate_hashes: Vec<String> = new_entries
        .iter()
        .map(|(_, _, multi_hash, _)| multi_hash.primary_hex())
        .collect();
    let already_present_hashes =
        hoover_store::blob::existing_blob_hashes(store, dataset, &candidate_hashes)
            .await
            .map_err(app_err)?;
    let mut already_present_hashes: std::collections::HashSet<String> = already_present_hashes.into_iter().collect();

    let mut new_vfs_files = Vec::new();
    for (entry, vfs_path, multi_hash, size) in new_entries {
        let blob_hash = multi_hash.primary_hex();
        let already_present = !already_present_hashes.insert(blob_hash);

        let put_result = hoover_cas::put_with_hash(cas, dataset, &entry.local_path, multi_hash, size, already_present)
            .await
            .map_err(|e| hoover_engine::WorkflowError::ApplicationError {
                message: format!("hashing/upload failed for {}: {e}", entry.local_path.display()),
                non_retryable: false,
            })?;

        let blob = Blob {
            collection_dataset: dataset.to_string(),
            blob_hash: put_result.blob_hash.clone(),
            size: put_result.size,
            secondary: put_result.secondary,
            storage: put_result.storage,
        };
        let inline_bytes = match &blob.storage {
            StorageSite::Inline => Some(tokio::fs::read(&entry.local_path).await.map_err(app_err)?),
            StorageSite::ObjectStore { .. } => None,
        };
        hoover_store::blob::insert_blob_if_absent(
            store,
            &hoover_store::blob::BlobRow::from_domain(&blob),
            inline_bytes.as_deref(),
        )
        .await
        .map_err(app_err)?;

        new_vfs_files.push(VfsFile {
            collection_dataset: dataset.to_string(),
            container_hash: container_hash.to_string(),
            path: vfs_path,
            hash: blob.blob_hash,
            file_size_bytes: blob.size,
        });
    }

    hoover_store::vfs::insert_files(store, &new_vfs_files)
        .await
        .map_err(app_err)?;
    Ok(())
}

fn app_err<E: std::fmt::Display>(e: E) -> hoover_engine::WorkflowError {
    hoover_engine::WorkflowError::ApplicationError {
        message: e.to_string(),
        non_retryable: false,
    }
}
