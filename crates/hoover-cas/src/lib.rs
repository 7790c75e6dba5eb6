//! # hoover-cas
//!
//! The blob store (C1): single-pass multi-hashing plus a size-routed
//! storage backend -- small blobs are left for the caller to inline into
//! the columnar store, large blobs are uploaded to an S3-compatible
//! object store at `<dataset>/<blob_hash>`.
//!
//! Content-addressed get/put with a dedup check before write, generalized
//! from a local fan-out directory tree to a remote object store plus an
//! inline fallback, routed by a size threshold.

mod hash;
mod object_store_backend;

pub use hash::{compute_hashes_streaming, MultiHash, HASH_CHUNK_SIZE};
pub use object_store_backend::ObjectStoreBackend;

use hoover_types::{SecondaryHashes, StorageSite, StorageSiteKind};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum CasError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),
    #[error("invalid object store url: {0}")]
    InvalidUrl(String),
    #[error("size mismatch after transfer: expected {expected}, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },
    #[error("blob not found: dataset={dataset} hash={hash}")]
    NotFound { dataset: String, hash: String },
}

/// The outcome of hashing + routing a local file through the blob store.
/// Large blobs have already been uploaded by the time this is returned;
/// small blobs carry their storage-site decision only -- the caller (P0's
/// `ingest_files_batch`) is responsible for inlining the bytes into the
/// columnar store's `blob_values` table.
#[derive(Debug, Clone)]
pub struct PutResult {
    pub blob_hash: String,
    pub size: u64,
    pub secondary: SecondaryHashes,
    pub storage: StorageSite,
}

/// `put(dataset, local_path)`: deterministic, idempotent per `(dataset,
/// hash)`. `already_present` lets the caller skip the network round trip
/// for blobs it already knows about (the set-difference dedup P0 performs
/// before ever calling this). Hashes the file itself; callers that need
/// the hash before deciding `already_present` should call
/// [`compute_hashes_streaming`] and [`put_with_hash`] instead, to avoid
/// hashing the file twice.
pub async fn put(
    backend: &ObjectStoreBackend,
    dataset: &str,
    local_path: &Path,
    already_present: bool,
) -> Result<PutResult, CasError> {
    let (multi_hash, size) = compute_hashes_streaming(local_path).await?;
    put_with_hash(backend, dataset, local_path, multi_hash, size, already_present).await
}

/// Same contract as [`put`], but for a hash already computed by the
/// caller -- lets P0's batch ingest hash every candidate up front, check
/// the whole batch against the store in one query, and only then decide
/// per-file whether to upload.
pub async fn put_with_hash(
    backend: &ObjectStoreBackend,
    dataset: &str,
    local_path: &Path,
    multi_hash: MultiHash,
    size: u64,
    already_present: bool,
) -> Result<PutResult, CasError> {
    let blob_hash = multi_hash.primary_hex();
    let secondary = multi_hash.secondary();

    let storage = match StorageSite::for_size(size) {
        StorageSiteKind::Inline => StorageSite::Inline,
        StorageSiteKind::ObjectStore => {
            if !already_present {
                backend.upload(dataset, &blob_hash, local_path).await?;
            }
            StorageSite::ObjectStore {
                s3_path: backend.s3_uri(dataset, &blob_hash),
            }
        }
    };

    Ok(PutResult {
        blob_hash,
        size,
        secondary,
        storage,
    })
}

/// `get(dataset, hash, dest_local_path)`: fetches by storage site,
/// verifying `size_on_disk == expected_size` on completion.
pub async fn get(
    backend: &ObjectStoreBackend,
    dataset: &str,
    hash: &str,
    storage: &StorageSite,
    dest_local_path: &Path,
    expected_size: u64,
) -> Result<u64, CasError> {
    match storage {
        StorageSite::Inline => Err(CasError::NotFound {
            dataset: dataset.to_string(),
            hash: hash.to_string(),
        }),
        StorageSite::ObjectStore { .. } => {
            backend.download(dataset, hash, dest_local_path).await?;
            verify_size_on_disk(dest_local_path, expected_size)
        }
    }
}

/// Writes inline bytes (already fetched from the columnar store by the
/// caller) to disk and verifies the size, mirroring `get`'s contract for
/// the `StorageSite::Inline` case.
pub fn write_inline_to_disk(
    bytes: &[u8],
    dest_local_path: &Path,
    expected_size: u64,
) -> Result<u64, CasError> {
    std::fs::write(dest_local_path, bytes)?;
    verify_size_on_disk(dest_local_path, expected_size)
}

fn verify_size_on_disk(path: &Path, expected_size: u64) -> Result<u64, CasError> {
    let actual = std::fs::metadata(path)?.len();
    if actual != expected_size {
        return Err(CasError::SizeMismatch {
            expected: expected_size,
            actual,
        });
    }
    Ok(actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn put_small_file_is_inline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"hello\n").unwrap();
        let backend = ObjectStoreBackend::in_memory_for_tests();

        let result = put(&backend, "ds1", &path, false).await.unwrap();
        assert_eq!(result.size, 6);
        assert!(matches!(result.storage, StorageSite::Inline));
    }

    #[tokio::test]
    async fn put_is_deterministic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"hello\n").unwrap();
        let backend = ObjectStoreBackend::in_memory_for_tests();

        let r1 = put(&backend, "ds1", &path, false).await.unwrap();
        let r2 = put(&backend, "ds1", &path, false).await.unwrap();
        assert_eq!(r1.blob_hash, r2.blob_hash);
        assert_eq!(r1.secondary.md5, r2.secondary.md5);
    }

    #[tokio::test]
    async fn large_blob_goes_to_object_store_and_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let data = vec![7u8; 700 * 1024]; // > 600 KiB threshold
        std::fs::write(&path, &data).unwrap();
        let backend = ObjectStoreBackend::in_memory_for_tests();

        let result = put(&backend, "ds1", &path, false).await.unwrap();
        let s3_path = match &result.storage {
            StorageSite::ObjectStore { s3_path } => s3_path.clone(),
            StorageSite::Inline => panic!("expected object store"),
        };
        assert!(s3_path.starts_with("s3://"));

        let dest = dir.path().join("restored.bin");
        let size = get(
            &backend,
            "ds1",
            &result.blob_hash,
            &result.storage,
            &dest,
            result.size,
        )
        .await
        .unwrap();
        assert_eq!(size, result.size);
        assert_eq!(std::fs::read(&dest).unwrap(), data);
    }

    #[test]
    fn inline_write_verifies_size() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("x.txt");
        let err = write_inline_to_disk(b"abc", &dest, 10).unwrap_err();
        assert!(matches!(err, CasError::SizeMismatch { .. }));
    }

    #[tokio::test]
    async fn already_present_skips_upload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let data = vec![9u8; 700 * 1024];
        std::fs::write(&path, &data).unwrap();
        let backend = ObjectStoreBackend::in_memory_for_tests();

        let (multi_hash, size) = compute_hashes_streaming(&path).await.unwrap();
        let result = put_with_hash(&backend, "ds1", &path, multi_hash, size, true).await.unwrap();
        let s3_path = match &result.storage {
            StorageSite::ObjectStore { s3_path } => s3_path.clone(),
            StorageSite::Inline => panic!("expected object store"),
        };

        let dest = dir.path().join("restored.bin");
        let err = get(&backend, "ds1", &result.blob_hash, &result.storage, &dest, result.size)
            .await
            .unwrap_err();
        assert!(matches!(err, CasError::ObjectStore(_)));
        assert!(s3_path.starts_with("s3://"));
    }
}
