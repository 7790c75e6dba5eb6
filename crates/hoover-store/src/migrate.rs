use crate::client::StoreClient;
use crate::error::StoreError;

/// Every table this store reads and writes, as `CREATE TABLE IF NOT
/// EXISTS` statements. Idempotent: `migrate` may be run against an
/// already-provisioned dataset without harm, matching C13's `migrate`
/// entry point contract.
const TABLE_DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS datasets (\
        name String, \
        dataset_path String \
     ) ENGINE = MergeTree ORDER BY name",
    "CREATE TABLE IF NOT EXISTS blobs (\
        collection_dataset String, \
        blob_hash String, \
        size UInt64, \
        md5 String, \
        sha1 String, \
        sha256 String, \
        storage_s3_path String \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, blob_hash)",
    "CREATE TABLE IF NOT EXISTS blob_values (\
        collection_dataset String, \
        blob_hash String, \
        bytes String \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, blob_hash)",
    "CREATE TABLE IF NOT EXISTS vfs_directories (\
        collection_dataset String, \
        container_hash String, \
        path String \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, container_hash, path)",
    "CREATE TABLE IF NOT EXISTS vfs_files (\
        collection_dataset String, \
        container_hash String, \
        path String, \
        hash String, \
        file_size_bytes UInt64 \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, container_hash, path)",
    "CREATE TABLE IF NOT EXISTS file_types (\
        collection_dataset String, \
        hash String, \
        extracted_by String, \
        mime_types Array(String), \
        mime_encodings Array(String), \
        file_types Array(String), \
        extensions Array(String) \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, hash)",
    "CREATE TABLE IF NOT EXISTS file_attributes (\
        collection_dataset String, \
        hash String, \
        kind String, \
        attributes_json String \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, hash)",
    "CREATE TABLE IF NOT EXISTS container_markers (\
        collection_dataset String, \
        container_hash String, \
        kind String, \
        attributes_json String \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, container_hash)",
    "CREATE TABLE IF NOT EXISTS processing_plans (\
        collection_dataset String, \
        plan_hash String, \
        item_hashes Array(String), \
        plan_size_bytes UInt64 \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, plan_hash)",
    "CREATE TABLE IF NOT EXISTS processing_plan_hits (\
        collection_dataset String, \
        item_hash String, \
        plan_hash String \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, plan_hash, item_hash)",
    "CREATE TABLE IF NOT EXISTS processing_plan_finished (\
        collection_dataset String, \
        plan_hash String, \
        finished_at_unix_ms Int64 \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, plan_hash)",
    "CREATE TABLE IF NOT EXISTS text_content (\
        collection_dataset String, \
        file_hash String, \
        extracted_by String, \
        page_id UInt32, \
        text String \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, file_hash, page_id)",
    "CREATE TABLE IF NOT EXISTS entity_hit (\
        collection_dataset String, \
        file_hash String, \
        extracted_by String, \
        page_id UInt32, \
        entity_type String, \
        entity_values Array(String) \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, file_hash)",
    "CREATE TABLE IF NOT EXISTS string_term_text_to_id (\
        collection_dataset String, \
        field String, \
        value String, \
        id UInt64 \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, field, value)",
    "CREATE TABLE IF NOT EXISTS string_term_id_to_text (\
        collection_dataset String, \
        field String, \
        id UInt64, \
        value String \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, field, id)",
    "CREATE TABLE IF NOT EXISTS processing_errors (\
        collection_dataset String, \
        hash String, \
        task_name String, \
        run_time_ms UInt64, \
        error_logs String, \
        timestamp_unix_ms Int64 \
     ) ENGINE = MergeTree ORDER BY (collection_dataset, hash)",
];

/// Applies every `CREATE TABLE IF NOT EXISTS` statement this store depends
/// on, in order. Safe to run repeatedly against a live dataset.
pub async fn apply_schema(client: &StoreClient) -> Result<(), StoreError> {
    for ddl in TABLE_DDL {
        client.inner.query(ddl).execute().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_is_create_table_if_not_exists() {
        for ddl in TABLE_DDL {
            assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS"));
        }
    }

    #[test]
    fn table_count_matches_the_schema_surface() {
        assert_eq!(TABLE_DDL.len(), 15);
    }
}
