//! Generic per-kind attribute rows: one JSON blob per `(dataset, hash,
//! kind)`, the same generalization [`crate::container`]'s
//! `container_markers` already applies to recursion bookkeeping, extended
//! here to cover the numeric/text side data the original stored in
//! separate `pdfs`/`image`/`audio_metadata`/`video_metadata`/
//! `raw_ocr_results` tables.

use crate::client::StoreClient;
use crate::error::StoreError;
use clickhouse::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    Pdf,
    Image,
    Audio,
    Video,
    Ocr,
    Tika,
}

impl AttributeKind {
    fn as_str(self) -> &'static str {
        match self {
            AttributeKind::Pdf => "pdf",
            AttributeKind::Image => "image",
            AttributeKind::Audio => "audio",
            AttributeKind::Video => "video",
            AttributeKind::Ocr => "ocr",
            AttributeKind::Tika => "tika",
        }
    }
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct FileAttributeRow {
    pub collection_dataset: String,
    pub hash: String,
    pub kind: String,
    pub attributes_json: String,
}

pub async fn insert_file_attributes(
    client: &StoreClient,
    dataset: &str,
    hash: &str,
    kind: AttributeKind,
    attributes: &serde_json::Value,
) -> Result<(), StoreError> {
    let row = FileAttributeRow {
        collection_dataset: dataset.to_string(),
        hash: hash.to_string(),
        kind: kind.as_str().to_string(),
        attributes_json: serde_json::to_string(attributes)?,
    };
    let mut insert = client.inner.insert("file_attributes")?;
    insert.write(&row).await?;
    insert.end().await?;
    Ok(())
}

pub async fn get_file_attributes(
    client: &StoreClient,
    dataset: &str,
    hash: &str,
    kind: AttributeKind,
) -> Result<Option<FileAttributeRow>, StoreError> {
    let rows: Vec<FileAttributeRow> = client
        .inner
        .query(
            "SELECT collection_dataset, hash, kind, attributes_json FROM file_attributes \
             WHERE collection_dataset = ? AND hash = ? AND kind = ? LIMIT 1",
        )
        .bind(dataset)
        .bind(hash)
        .bind(kind.as_str())
        .fetch_all()
        .await?;
    Ok(rows.into_iter().next())
}
