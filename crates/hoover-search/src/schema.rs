use crate::client::SearchClient;

const CREATE_DOC_TEXT_PAGES: &str = "
    create table if not exists doc_text_pages(
        collection_dataset string,
        file_hash string,
        extracted_by string,
        page_id int,
        page_text text,
        ner_per multi64,
        ner_org multi64,
        ner_loc multi64,
        ner_misc multi64
    ) engine='columnar'
";

const CREATE_DOC_METADATA: &str = "
    create table if not exists doc_metadata(
        collection_dataset string,
        file_hash string,
        file_types multi64,
        file_mime_types multi64,
        file_extensions multi64,
        file_paths multi64,
        filenames text,
        metadata_values text
    ) engine='columnar'
";

/// Idempotent schema migration, run once at daemon startup (mirrors
/// `manticore_migrate`: health check, then create-if-not-exists for both
/// search-engine tables).
pub async fn migrate(client: &SearchClient) -> Result<(), sqlx::Error> {
    client.health_check().await?;
    sqlx::query(CREATE_DOC_TEXT_PAGES).execute(&client.pool).await?;
    sqlx::query(CREATE_DOC_METADATA).execute(&client.pool).await?;
    Ok(())
}
