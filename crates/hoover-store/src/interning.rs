use crate::client::StoreClient;
use crate::error::StoreError;
use clickhouse::Row;
use hoover_types::{hash_string_to_uint63, StringTermField};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
struct StringTermTextToIdRow {
    collection_dataset: String,
    field: String,
    value: String,
    id: u64,
}

#[derive(Debug, Clone, Row, Serialize, Deserialize)]
struct StringTermIdToTextRow {
    collection_dataset: String,
    field: String,
    id: u64,
    value: String,
}

/// `get_string_term_ids`: fetch-then-create-then-merge, read-your-writes
/// within one call. Queries existing `(dataset, field, value)` mappings,
/// computes + inserts the missing ones via `hash_string_to_uint63`, and
/// returns the full `value -> id` map.
pub async fn get_string_term_ids(
    client: &StoreClient,
    dataset: &str,
    field: StringTermField,
    values: &[String],
) -> Result<HashMap<String, u64>, StoreError> {
    let field_name = field.to_string();
    let mut out = HashMap::new();
    if values.is_empty() {
        return Ok(out);
    }

    let existing: Vec<StringTermTextToIdRow> = client
        .inner
        .query(
            "SELECT collection_dataset, field, value, id FROM string_term_text_to_id \
             WHERE collection_dataset = ? AND field = ? AND value IN ?",
        )
        .bind(dataset)
        .bind(&field_name)
        .bind(values)
        .fetch_all()
        .await?;
    for row in &existing {
        out.insert(row.value.clone(), row.id);
    }

    let missing: Vec<&String> = values.iter().filter(|v| !out.contains_key(*v)).collect();
    if !missing.is_empty() {
        let mut text_to_id = client.inner.insert("string_term_text_to_id")?;
        let mut id_to_text = client.inner.insert("string_term_id_to_text")?;
        for value in &missing {
            let id = hash_string_to_uint63(value);
            text_to_id
                .write(&StringTermTextToIdRow {
                    collection_dataset: dataset.to_string(),
                    field: field_name.clone(),
                    value: value.to_string(),
                    id,
                })
                .await?;
            id_to_text
                .write(&StringTermIdToTextRow {
                    collection_dataset: dataset.to_string(),
                    field: field_name.clone(),
                    id,
                    value: value.to_string(),
                })
                .await?;
            out.insert(value.to_string(), id);
        }
        text_to_id.end().await?;
        id_to_text.end().await?;
    }

    Ok(out)
}
