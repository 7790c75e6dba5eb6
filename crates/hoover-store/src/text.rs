use crate::client::StoreClient;
use crate::error::StoreError;
use crate::filetype::parse_extracted_by;
use clickhouse::Row;
use hoover_types::{EntityHit, TextContentRow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
struct TextContentWireRow {
    collection_dataset: String,
    file_hash: String,
    extracted_by: String,
    page_id: u32,
    text: String,
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
struct EntityHitWireRow {
    collection_dataset: String,
    file_hash: String,
    extracted_by: String,
    page_id: u32,
    entity_type: String,
    entity_values: Vec<String>,
}

pub async fn insert_text_content(
    client: &StoreClient,
    rows: &[TextContentRow],
) -> Result<(), StoreError> {
    if rows.is_empty() {
        return Ok(());
    }
    let mut insert = client.inner.insert("text_content")?;
    for row in rows {
        let wire = TextContentWireRow {
            collection_dataset: row.collection_dataset.clone(),
            file_hash: row.file_hash.clone(),
            extracted_by: row.extracted_by.to_string(),
            page_id: row.page_id,
            text: row.text.clone(),
        };
        insert.write(&wire).await?;
    }
    insert.end().await?;
    Ok(())
}

pub async fn text_content_for_chunk(
    client: &StoreClient,
    dataset: &str,
    file_hashes: &[String],
) -> Result<Vec<TextContentRow>, StoreError> {
    if file_hashes.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<TextContentWireRow> = client
        .inner
        .query(
            "SELECT collection_dataset, file_hash, extracted_by, page_id, text \
             FROM text_content WHERE collection_dataset = ? AND file_hash IN ?",
        )
        .bind(dataset)
        .bind(file_hashes)
        .fetch_all()
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| TextContentRow {
            collection_dataset: r.collection_dataset,
            file_hash: r.file_hash,
            extracted_by: parse_extracted_by(&r.extracted_by),
            page_id: r.page_id,
            text: r.text,
        })
        .collect())
}

pub async fn insert_entity_hits(client: &StoreClient, rows: &[EntityHit]) -> Result<(), StoreError> {
    if rows.is_empty() {
        return Ok(());
    }
    let mut insert = client.inner.insert("entity_hit")?;
    for row in rows {
        let wire = EntityHitWireRow {
            collection_dataset: row.collection_dataset.clone(),
            file_hash: row.file_hash.clone(),
            extracted_by: row.extracted_by.to_string(),
            page_id: row.page_id,
            entity_type: row.entity_type.to_string(),
            entity_values: row.entity_values.clone(),
        };
        insert.write(&wire).await?;
    }
    insert.end().await?;
    Ok(())
}

/// `_clean_text`: a UTF-8 lossy round trip plus trim, mirroring the
/// original indexer's cleanup before an empty-after-trim page is skipped.
pub fn clean_text(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let cleaned = String::from_utf8_lossy(bytes).into_owned();
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_trims_whitespace() {
        assert_eq!(clean_text("  hello \n"), "hello");
    }

    #[test]
    fn clean_text_of_blank_page_is_empty() {
        assert_eq!(clean_text("   \n\t  "), "");
    }
}
