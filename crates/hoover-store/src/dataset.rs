use crate::client::StoreClient;
use crate::error::StoreError;
use clickhouse::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct DatasetRow {
    pub name: String,
    pub dataset_path: String,
}

/// Datasets are created once; both `name` and `dataset_path` are unique on
/// their own, not just as a pair -- a second name pointed at an
/// already-registered path is rejected exactly like a duplicate name.
/// This is a plain insert-if-absent, same shape as
/// [`crate::blob::insert_blob_if_absent`].
pub async fn create_dataset_if_absent(
    client: &StoreClient,
    name: &str,
    dataset_path: &str,
) -> Result<bool, StoreError> {
    if get_dataset(client, name).await?.is_some() {
        return Ok(false);
    }
    if get_dataset_by_path(client, dataset_path).await?.is_some() {
        return Ok(false);
    }
    let mut insert = client.inner.insert("datasets")?;
    insert
        .write(&DatasetRow {
            name: name.to_string(),
            dataset_path: dataset_path.to_string(),
        })
        .await?;
    insert.end().await?;
    Ok(true)
}

pub async fn get_dataset(client: &StoreClient, name: &str) -> Result<Option<DatasetRow>, StoreError> {
    let rows: Vec<DatasetRow> = client
        .inner
        .query("SELECT name, dataset_path FROM datasets WHERE name = ? LIMIT 1")
        .bind(name)
        .fetch_all()
        .await?;
    Ok(rows.into_iter().next())
}

pub async fn get_dataset_by_path(client: &StoreClient, dataset_path: &str) -> Result<Option<DatasetRow>, StoreError> {
    let rows: Vec<DatasetRow> = client
        .inner
        .query("SELECT name, dataset_path FROM datasets WHERE dataset_path = ? LIMIT 1")
        .bind(dataset_path)
        .fetch_all()
        .await?;
    Ok(rows.into_iter().next())
}
