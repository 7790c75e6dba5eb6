use crate::client::StoreClient;
use crate::error::StoreError;
use clickhouse::Row;
use serde::{Deserialize, Serialize};

/// Which family of container a blob was expanded into children as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
    Archive,
    Email,
    Pdf,
    Video,
}

impl ContainerKind {
    fn as_str(self) -> &'static str {
        match self {
            ContainerKind::Archive => "archive",
            ContainerKind::Email => "email",
            ContainerKind::Pdf => "pdf",
            ContainerKind::Video => "video",
        }
    }
}

/// One row per container blob: lets callers ask "was this blob expanded
/// into children" without walking the VFS tree. `attributes_json` holds the
/// kind-specific light attribute set (email headers, PDF page count, video
/// duration, ...).
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct ContainerMarkerRow {
    pub collection_dataset: String,
    pub container_hash: String,
    pub kind: String,
    pub attributes_json: String,
}

pub async fn insert_container_marker(
    client: &StoreClient,
    dataset: &str,
    container_hash: &str,
    kind: ContainerKind,
    attributes: &serde_json::Value,
) -> Result<(), StoreError> {
    let row = ContainerMarkerRow {
        collection_dataset: dataset.to_string(),
        container_hash: container_hash.to_string(),
        kind: kind.as_str().to_string(),
        attributes_json: serde_json::to_string(attributes)?,
    };
    let mut insert = client.inner.insert("container_markers")?;
    insert.write(&row).await?;
    insert.end().await?;
    Ok(())
}

pub async fn get_container_marker(
    client: &StoreClient,
    dataset: &str,
    container_hash: &str,
) -> Result<Option<ContainerMarkerRow>, StoreError> {
    let rows: Vec<ContainerMarkerRow> = client
        .inner
        .query(
            "SELECT collection_dataset, container_hash, kind, attributes_json \
             FROM container_markers WHERE collection_dataset = ? AND container_hash = ? LIMIT 1",
        )
        .bind(dataset)
        .bind(container_hash)
        .fetch_all()
        .await?;
    Ok(rows.into_iter().next())
}
