use crate::client::SearchClient;
use crate::tuple::repr_manticore_tuple;

/// One `doc_text_pages` row, ready to insert: scalar columns are bound
/// parameters, the four NER MVA columns are interned term IDs.
pub struct DocTextPageRow {
    pub collection_dataset: String,
    pub file_hash: String,
    pub extracted_by: String,
    pub page_id: u32,
    pub page_text: String,
    pub ner_per: Vec<u64>,
    pub ner_org: Vec<u64>,
    pub ner_loc: Vec<u64>,
    pub ner_misc: Vec<u64>,
}

/// One `doc_metadata` row, ready to insert.
pub struct DocMetadataRow {
    pub collection_dataset: String,
    pub file_hash: String,
    pub filenames: String,
    pub metadata_values: String,
    pub file_types: Vec<u64>,
    pub file_mime_types: Vec<u64>,
    pub file_extensions: Vec<u64>,
    pub file_paths: Vec<u64>,
}

/// Rows are committed in chunks of <= 512 to bound memory and commit
/// latency, per the indexer's contract (SPEC_FULL.md §4.8 step 3).
pub const COMMIT_CHUNK_SIZE: usize = 512;

pub async fn insert_doc_text_pages(
    client: &SearchClient,
    rows: &[DocTextPageRow],
) -> Result<(), sqlx::Error> {
    for chunk in rows.chunks(COMMIT_CHUNK_SIZE) {
        let mut tx = client.pool.begin().await?;
        for row in chunk {
            let sql = format!(
                "INSERT INTO doc_text_pages (\
                    collection_dataset, file_hash, extracted_by, page_id, page_text, \
                    ner_per, ner_org, ner_loc, ner_misc\
                ) VALUES (?, ?, ?, ?, ?, {}, {}, {}, {})",
                repr_manticore_tuple(&row.ner_per),
                repr_manticore_tuple(&row.ner_org),
                repr_manticore_tuple(&row.ner_loc),
                repr_manticore_tuple(&row.ner_misc),
            );
            sqlx::query(&sql)
                .bind(&row.collection_dataset)
                .bind(&row.file_hash)
                .bind(&row.extracted_by)
                .bind(row.page_id)
                .bind(&row.page_text)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
    }
    Ok(())
}

pub async fn insert_doc_metadata(
    client: &SearchClient,
    rows: &[DocMetadataRow],
) -> Result<(), sqlx::Error> {
    for chunk in rows.chunks(COMMIT_CHUNK_SIZE) {
        let mut tx = client.pool.begin().await?;
        for row in chunk {
            let sql = format!(
                "INSERT INTO doc_metadata (\
                    collection_dataset, file_hash, filenames, metadata_values, \
                    file_types, file_mime_types, file_extensions, file_paths\
                ) VALUES (?, ?, ?, ?, {}, {}, {}, {})",
                repr_manticore_tuple(&row.file_types),
                repr_manticore_tuple(&row.file_mime_types),
                repr_manticore_tuple(&row.file_extensions),
                repr_manticore_tuple(&row.file_paths),
            );
            sqlx::query(&sql)
                .bind(&row.collection_dataset)
                .bind(&row.file_hash)
                .bind(&row.filenames)
                .bind(&row.metadata_values)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_matches_commit_contract() {
        assert_eq!(COMMIT_CHUNK_SIZE, 512);
    }
}
