//! `index_text_content`: NER over a chunk's text pages, written as
//! `entity_hit` rows plus interned `doc_text_pages` rows.

use crate::IndexContext;
use hoover_engine::WorkflowError;
use hoover_search::DocTextPageRow;
use hoover_store::text::{clean_text, insert_entity_hits, text_content_for_chunk};
use hoover_types::{EntityHit, EntityType, StringTermField, TextContentRow};

fn app_err(message: impl ToString) -> WorkflowError {
    WorkflowError::ApplicationError {
        message: message.to_string(),
        non_retryable: false,
    }
}

struct CleanedPage {
    row: TextContentRow,
    text: String,
}

pub async fn index_text_content(
    ctx: &IndexContext,
    dataset: &str,
    file_hashes: &[String],
) -> Result<(), WorkflowError> {
    let rows = text_content_for_chunk(&ctx.store, dataset, file_hashes)
        .await
        .map_err(app_err)?;

    let pages: Vec<CleanedPage> = rows
        .into_iter()
        .filter_map(|row| {
            let text = clean_text(&row.text);
            if text.is_empty() {
                None
            } else {
                Some(CleanedPage { row, text })
            }
        })
        .collect();
    if pages.is_empty() {
        return Ok(());
    }

    let texts: Vec<String> = pages.iter().map(|p| p.text.clone()).collect();
    let entities_by_page = ctx
        .ner
        .extract_entities(&texts)
        .await
        .map_err(|e| app_err(e.to_string()))?;

    let mut all_values: Vec<String> = Vec::new();
    for buckets in &entities_by_page {
        for values in buckets.values() {
            all_values.extend(values.iter().cloned());
        }
    }
    all_values.sort();
    all_values.dedup();
    let term_ids = hoover_store::interning::get_string_term_ids(
        &ctx.store,
        dataset,
        StringTermField::Ner,
        &all_values,
    )
    .await
    .map_err(app_err)?;

    let mut entity_hits: Vec<EntityHit> = Vec::new();
    let mut search_rows: Vec<DocTextPageRow> = Vec::new();

    for (page, buckets) in pages.iter().zip(entities_by_page.iter()) {
        let ids_for = |entity_type: EntityType| -> Vec<u64> {
            buckets
                .get(&entity_type)
                .map(|values| values.iter().filter_map(|v| term_ids.get(v).copied()).collect())
                .unwrap_or_default()
        };

        for (entity_type, values) in buckets {
            if values.is_empty() {
                continue;
            }
            entity_hits.push(EntityHit {
                collection_dataset: dataset.to_string(),
                file_hash: page.row.file_hash.clone(),
                extracted_by: page.row.extracted_by,
                page_id: page.row.page_id,
                entity_type: *entity_type,
                entity_values: values.clone(),
            });
        }

        search_rows.push(DocTextPageRow {
            collection_dataset: dataset.to_string(),
            file_hash: page.row.file_hash.clone(),
            extracted_by: page.row.extracted_by.to_string(),
            page_id: page.row.page_id,
            page_text: page.text.clone(),
            ner_per: ids_for(EntityType::Per),
            ner_org: ids_for(EntityType::Org),
            ner_loc: ids_for(EntityType::Loc),
            ner_misc: ids_for(EntityType::Misc),
        });
    }

    insert_entity_hits(&ctx.store, &entity_hits).await.map_err(app_err)?;
    hoover_search::insert_doc_text_pages(&ctx.search, &search_rows)
        .await
        .map_err(app_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_bucket_map_is_skipped() {
        let buckets: HashMap<EntityType, Vec<String>> = HashMap::new();
        assert!(buckets.get(&EntityType::Per).is_none());
    }
}
