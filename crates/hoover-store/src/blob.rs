use crate::client::StoreClient;
use crate::error::StoreError;
use clickhouse::Row;
use serde::{Deserialize, Serialize};

/// On-disk row shape for the `blobs` table. `storage_s3_path` is empty for
/// inline blobs -- mirrors `hoover_types::StorageSite`'s single-site
/// invariant (I-BLOB-1) without needing an enum at the wire layer.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct BlobRow {
    pub collection_dataset: String,
    pub blob_hash: String,
    pub size: u64,
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
    pub storage_s3_path: String,
}

impl BlobRow {
    pub fn from_domain(blob: &hoover_types::Blob) -> Self {
        Self {
            collection_dataset: blob.collection_dataset.clone(),
            blob_hash: blob.blob_hash.clone(),
            size: blob.size,
            md5: blob.secondary.md5.clone(),
            sha1: blob.secondary.sha1.clone(),
            sha256: blob.secondary.sha256.clone(),
            storage_s3_path: blob.storage.s3_path().to_string(),
        }
    }
}

/// Inline bytes for small blobs, keyed the same as the companion `BlobRow`.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct BlobValueRow {
    pub collection_dataset: String,
    pub blob_hash: String,
    pub bytes: Vec<u8>,
}

/// Insert a blob row (and its inline value, if any) unless `(dataset,
/// blob_hash)` already exists -- the idempotence half of C1's `put`
/// contract.
pub async fn insert_blob_if_absent(
    client: &StoreClient,
    row: &BlobRow,
    inline_bytes: Option<&[u8]>,
) -> Result<bool, StoreError> {
    let existing: Vec<String> = client
        .inner
        .query("SELECT blob_hash FROM blobs WHERE collection_dataset = ? AND blob_hash = ? LIMIT 1")
        .bind(&row.collection_dataset)
        .bind(&row.blob_hash)
        .fetch_all()
        .await?;
    if !existing.is_empty() {
        return Ok(false);
    }

    let mut insert = client.inner.insert("blobs")?;
    insert.write(row).await?;
    insert.end().await?;

    if let Some(bytes) = inline_bytes {
        let value_row = BlobValueRow {
            collection_dataset: row.collection_dataset.clone(),
            blob_hash: row.blob_hash.clone(),
            bytes: bytes.to_vec(),
        };
        let mut insert = client.inner.insert("blob_values")?;
        insert.write(&value_row).await?;
        insert.end().await?;
    }

    Ok(true)
}

pub async fn get_blob(
    client: &StoreClient,
    dataset: &str,
    blob_hash: &str,
) -> Result<Option<BlobRow>, StoreError> {
    let rows: Vec<BlobRow> = client
        .inner
        .query(
            "SELECT collection_dataset, blob_hash, size, md5, sha1, sha256, storage_s3_path \
             FROM blobs WHERE collection_dataset = ? AND blob_hash = ? LIMIT 1",
        )
        .bind(dataset)
        .bind(blob_hash)
        .fetch_all()
        .await?;
    Ok(rows.into_iter().next())
}

pub async fn get_inline_value(
    client: &StoreClient,
    dataset: &str,
    blob_hash: &str,
) -> Result<Option<Vec<u8>>, StoreError> {
    let rows: Vec<Vec<u8>> = client
        .inner
        .query(
            "SELECT bytes FROM blob_values WHERE collection_dataset = ? AND blob_hash = ? LIMIT 1",
        )
        .bind(dataset)
        .bind(blob_hash)
        .fetch_all()
        .await?;
    Ok(rows.into_iter().next())
}

/// Batched blob-metadata fetch for P2's download path: joins a plan's item
/// hashes against `blobs` to get `(hash, size, storage_s3_path)` without one
/// round trip per item.
pub async fn get_blobs_batch(
    client: &StoreClient,
    dataset: &str,
    blob_hashes: &[String],
) -> Result<Vec<BlobRow>, StoreError> {
    if blob_hashes.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<BlobRow> = client
        .inner
        .query(
            "SELECT collection_dataset, blob_hash, size, md5, sha1, sha256, storage_s3_path \
             FROM blobs WHERE collection_dataset = ? AND blob_hash IN ?",
        )
        .bind(dataset)
        .bind(blob_hashes)
        .fetch_all()
        .await?;
    Ok(rows)
}

/// Set-difference fetch for P0's ingest path: which of `candidate_hashes`
/// already have a `blobs` row for this dataset, so the CAS upload step can
/// be skipped for content that's already stored under a different path.
pub async fn existing_blob_hashes(
    client: &StoreClient,
    dataset: &str,
    candidate_hashes: &[String],
) -> Result<Vec<String>, StoreError> {
    if candidate_hashes.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<String> = client
        .inner
        .query("SELECT blob_hash FROM blobs WHERE collection_dataset = ? AND blob_hash IN ?")
        .bind(dataset)
        .bind(candidate_hashes)
        .fetch_all()
        .await?;
    Ok(rows)
}

/// Batched fetch for P2's download path: up to 100 hashes per call via a
/// single `IN (...)`, matching the original's batching of ClickHouse-backed
/// plan items.
pub async fn get_inline_values_batch(
    client: &StoreClient,
    dataset: &str,
    blob_hashes: &[String],
) -> Result<Vec<BlobValueRow>, StoreError> {
    if blob_hashes.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<BlobValueRow> = client
        .inner
        .query(
            "SELECT collection_dataset, blob_hash, bytes FROM blob_values \
             WHERE collection_dataset = ? AND blob_hash IN ?",
        )
        .bind(dataset)
        .bind(blob_hashes)
        .fetch_all()
        .await?;
    Ok(rows)
}
