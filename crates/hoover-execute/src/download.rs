//! Download step of `execute_single_plan` (C7 step 2): fetches every item a
//! plan covers into its scratch directory. S3-backed blobs are fetched
//! per-item in parallel; inline (ClickHouse-resident) blobs are fetched in
//! batches of 100 via a single `IN (...)` query. A blob row whose
//! `storage_s3_path` is non-empty but not a valid `s3://` URL falls back to
//! the inline batch path rather than failing the whole download, matching
//! the original's defensive fallback.

use crate::scratch_dir::item_scratch_path;
use hoover_cas::ObjectStoreBackend;
use hoover_engine::WorkflowError;
use hoover_store::blob::BlobRow;
use hoover_store::StoreClient;
use hoover_types::{batch_seq, StorageSite};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const CLICKHOUSE_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct DownloadedItem {
    pub item_hash: String,
    pub path: PathBuf,
    pub size: u64,
}

fn app_err(message: impl ToString) -> WorkflowError {
    WorkflowError::ApplicationError {
        message: message.to_string(),
        non_retryable: false,
    }
}

fn is_s3_url(path: &str) -> bool {
    path.starts_with("s3://")
}

/// `900s + ceil(total_bytes / (100 kbit/s equivalent))`, matching the
/// original's transfer-time-derived download timeout.
pub fn download_timeout_secs(total_bytes: u64) -> u64 {
    900 + total_bytes.div_ceil(12_500)
}

pub async fn download_plan_items(
    store: &StoreClient,
    cas: &ObjectStoreBackend,
    dataset: &str,
    plan_dir: &Path,
    blobs: &[BlobRow],
) -> Result<Vec<DownloadedItem>, WorkflowError> {
    tokio::fs::create_dir_all(plan_dir).await.map_err(app_err)?;

    let (s3_blobs, inline_blobs): (Vec<&BlobRow>, Vec<&BlobRow>) =
        blobs.iter().partition(|b| is_s3_url(&b.storage_s3_path));

    let mut downloaded: Vec<DownloadedItem> = Vec::with_capacity(blobs.len());

    let s3_results = futures::future::join_all(s3_blobs.iter().map(|blob| {
        let dest = item_scratch_path(plan_dir, &blob.blob_hash);
        let storage = StorageSite::ObjectStore {
            s3_path: blob.storage_s3_path.clone(),
        };
        async move {
            hoover_cas::get(cas, dataset, &blob.blob_hash, &storage, &dest, blob.size)
                .await
                .map_err(app_err)?;
            Ok::<_, WorkflowError>(DownloadedItem {
                item_hash: blob.blob_hash.clone(),
                path: dest,
                size: blob.size,
            })
        }
    }))
    .await;
    for result in s3_results {
        downloaded.push(result?);
    }

    let inline_hashes: Vec<String> = inline_blobs.iter().map(|b| b.blob_hash.clone()).collect();
    let inline_sizes: HashMap<&str, u64> = inline_blobs.iter().map(|b| (b.blob_hash.as_str(), b.size)).collect();

    for chunk in batch_seq(&inline_hashes, CLICKHOUSE_BATCH_SIZE) {
        let values = hoover_store::blob::get_inline_values_batch(store, dataset, &chunk)
            .await
            .map_err(app_err)?;
        let mut by_hash: HashMap<String, Vec<u8>> =
            values.into_iter().map(|v| (v.blob_hash, v.bytes)).collect();

        for hash in &chunk {
            let bytes = by_hash.remove(hash).ok_or_else(|| {
                app_err(format!("inline blob value missing for hash {hash}"))
            })?;
            let expected_size = *inline_sizes.get(hash.as_str()).unwrap_or(&(bytes.len() as u64));
            let dest = item_scratch_path(plan_dir, hash);
            hoover_cas::write_inline_to_disk(&bytes, &dest, expected_size).map_err(app_err)?;
            downloaded.push(DownloadedItem {
                item_hash: hash.clone(),
                path: dest,
                size: expected_size,
            });
        }
    }

    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_floor_is_900s() {
        assert_eq!(download_timeout_secs(0), 900);
    }

    #[test]
    fn timeout_scales_with_total_bytes() {
        assert_eq!(download_timeout_secs(12_500), 901);
        assert_eq!(download_timeout_secs(12_501), 902);
    }

    #[test]
    fn recognizes_s3_urls() {
        assert!(is_s3_url("s3://bucket/ds/hash"));
        assert!(!is_s3_url(""));
        assert!(!is_s3_url("not-a-url"));
    }
}
