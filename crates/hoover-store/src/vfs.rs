use crate::client::StoreClient;
use crate::error::StoreError;
use clickhouse::Row;
use hoover_types::{normalize_vfs_path, VfsFile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
struct VfsDirectoryRow {
    collection_dataset: String,
    container_hash: String,
    path: String,
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
struct VfsFileRow {
    collection_dataset: String,
    container_hash: String,
    path: String,
    hash: String,
    file_size_bytes: u64,
}

/// The set-difference half of C2's contract: everyone calls this before
/// inserting, so callers only ever write the delta.
pub async fn existing_paths(
    client: &StoreClient,
    dataset: &str,
    container_hash: &str,
    candidate_paths: &[String],
) -> Result<Vec<String>, StoreError> {
    if candidate_paths.is_empty() {
        return Ok(Vec::new());
    }
    let normalized: Vec<String> = candidate_paths.iter().map(|p| normalize_vfs_path(p)).collect();
    let dir_rows: Vec<String> = client
        .inner
        .query(
            "SELECT path FROM vfs_directories \
             WHERE collection_dataset = ? AND container_hash = ? AND path IN ?",
        )
        .bind(dataset)
        .bind(container_hash)
        .bind(&normalized)
        .fetch_all()
        .await?;
    let file_rows: Vec<String> = client
        .inner
        .query(
            "SELECT path FROM vfs_files \
             WHERE collection_dataset = ? AND container_hash = ? AND path IN ?",
        )
        .bind(dataset)
        .bind(container_hash)
        .bind(&normalized)
        .fetch_all()
        .await?;
    let mut seen: Vec<String> = dir_rows;
    seen.extend(file_rows);
    Ok(seen)
}

/// Insert only the directories not already present (caller has typically
/// already computed the delta via [`existing_paths`]).
pub async fn insert_directories(
    client: &StoreClient,
    dataset: &str,
    container_hash: &str,
    new_paths: &[String],
) -> Result<(), StoreError> {
    if new_paths.is_empty() {
        return Ok(());
    }
    let mut insert = client.inner.insert("vfs_directories")?;
    for path in new_paths {
        let row = VfsDirectoryRow {
            collection_dataset: dataset.to_string(),
            container_hash: container_hash.to_string(),
            path: normalize_vfs_path(path),
        };
        insert.write(&row).await?;
    }
    insert.end().await?;
    Ok(())
}

/// Insert only the files not already present, keyed `(dataset,
/// container_hash, path)`.
pub async fn insert_files(
    client: &StoreClient,
    rows: &[VfsFile],
) -> Result<(), StoreError> {
    if rows.is_empty() {
        return Ok(());
    }
    let mut insert = client.inner.insert("vfs_files")?;
    for row in rows {
        let wire = VfsFileRow {
            collection_dataset: row.collection_dataset.clone(),
            container_hash: row.container_hash.clone(),
            path: normalize_vfs_path(&row.path),
            hash: row.hash.clone(),
            file_size_bytes: row.file_size_bytes,
        };
        insert.write(&wire).await?;
    }
    insert.end().await?;
    Ok(())
}

pub async fn list_files_for_dataset(
    client: &StoreClient,
    dataset: &str,
) -> Result<Vec<VfsFile>, StoreError> {
    let rows: Vec<VfsFileRow> = client
        .inner
        .query(
            "SELECT collection_dataset, container_hash, path, hash, file_size_bytes \
             FROM vfs_files WHERE collection_dataset = ?",
        )
        .bind(dataset)
        .fetch_all()
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| VfsFile {
            collection_dataset: r.collection_dataset,
            container_hash: r.container_hash,
            path: r.path,
            hash: r.hash,
            file_size_bytes: r.file_size_bytes,
        })
        .collect())
}
