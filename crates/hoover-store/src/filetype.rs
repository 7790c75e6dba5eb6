use crate::client::StoreClient;
use crate::error::StoreError;
use clickhouse::Row;
use hoover_types::{CoarseType, DetectionResult, ExtractedBy, FileTypeRow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
struct FileTypeWireRow {
    collection_dataset: String,
    hash: String,
    extracted_by: String,
    mime_types: Vec<String>,
    mime_encodings: Vec<String>,
    file_types: Vec<String>,
    extensions: Vec<String>,
}

impl From<&FileTypeRow> for FileTypeWireRow {
    fn from(row: &FileTypeRow) -> Self {
        Self {
            collection_dataset: row.collection_dataset.clone(),
            hash: row.hash.clone(),
            extracted_by: row.extracted_by.to_string(),
            mime_types: row.mime_types.clone(),
            mime_encodings: row.mime_encodings.clone(),
            file_types: row.file_types.iter().map(|t| t.to_string()).collect(),
            extensions: row.extensions.clone(),
        }
    }
}

/// C3's per-detector append. Detectors never update or overwrite each
/// other's rows -- a rerun of the same detector adds another row tagged
/// with the same `extracted_by`, which downstream union consumption treats
/// identically to a duplicate.
pub async fn insert_file_type_row(client: &StoreClient, row: &FileTypeRow) -> Result<(), StoreError> {
    let wire = FileTypeWireRow::from(row);
    let mut insert = client.inner.insert("file_types")?;
    insert.write(&wire).await?;
    insert.end().await?;
    Ok(())
}

/// The consensus step: union `coarse_types` (and the other detector fields)
/// across every `file_types` row for a blob, regardless of which detectors
/// actually ran. Zero rows is treated as `{other}` by the caller, per the
/// "no detector produced rows" fallback -- this function just reports an
/// empty result so the caller can apply that policy.
pub async fn union_detection_results(
    client: &StoreClient,
    dataset: &str,
    hash: &str,
) -> Result<DetectionResult, StoreError> {
    let rows: Vec<FileTypeWireRow> = client
        .inner
        .query(
            "SELECT collection_dataset, hash, extracted_by, mime_types, mime_encodings, \
             file_types, extensions FROM file_types WHERE collection_dataset = ? AND hash = ?",
        )
        .bind(dataset)
        .bind(hash)
        .fetch_all()
        .await?;

    let results = rows.into_iter().map(|r| DetectionResult {
        mime_types: r.mime_types,
        mime_encodings: r.mime_encodings,
        coarse_types: r
            .file_types
            .iter()
            .map(|s| parse_coarse_type(s))
            .collect(),
        extensions: r.extensions,
    });
    Ok(DetectionResult::union(results))
}

fn parse_coarse_type(s: &str) -> CoarseType {
    match s {
        "html" => CoarseType::Html,
        "archive" => CoarseType::Archive,
        "doc" => CoarseType::Doc,
        "xls" => CoarseType::Xls,
        "ppt" => CoarseType::Ppt,
        "email" => CoarseType::Email,
        "image" => CoarseType::Image,
        "video" => CoarseType::Video,
        "audio" => CoarseType::Audio,
        "pdf" => CoarseType::Pdf,
        "text" => CoarseType::Text,
        _ => CoarseType::Other,
    }
}

pub fn parse_extracted_by(s: &str) -> ExtractedBy {
    match s {
        "file" => ExtractedBy::File,
        "tika" => ExtractedBy::Tika,
        "magika" => ExtractedBy::Magika,
        "raw_text" => ExtractedBy::RawText,
        "extractous" => ExtractedBy::Extractous,
        "easyocr" => ExtractedBy::EasyOcr,
        "email_parser" => ExtractedBy::EmailParser,
        _ => ExtractedBy::Qpdf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coarse_type_round_trips_through_its_own_display() {
        for t in [
            CoarseType::Html,
            CoarseType::Archive,
            CoarseType::Doc,
            CoarseType::Xls,
            CoarseType::Ppt,
            CoarseType::Email,
            CoarseType::Image,
            CoarseType::Video,
            CoarseType::Audio,
            CoarseType::Pdf,
            CoarseType::Text,
            CoarseType::Other,
        ] {
            assert_eq!(parse_coarse_type(&t.to_string()), t);
        }
    }
}
