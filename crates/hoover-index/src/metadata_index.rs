//! `index_metadatas`: per-file aggregation of file-type/mime/extension rows
//! and VFS paths, interned and written as one `doc_metadata` row per hash.

use crate::IndexContext;
use hoover_engine::WorkflowError;
use hoover_search::DocMetadataRow;
use hoover_store::metadata::aggregate_file_metadata;
use hoover_types::{parent_paths, StringTermField};

fn app_err(message: impl ToString) -> WorkflowError {
    WorkflowError::ApplicationError {
        message: message.to_string(),
        non_retryable: false,
    }
}

fn basename(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

pub async fn index_metadatas(
    ctx: &IndexContext,
    dataset: &str,
    file_hashes: &[String],
) -> Result<(), WorkflowError> {
    let aggregates = aggregate_file_metadata(&ctx.store, dataset, file_hashes)
        .await
        .map_err(app_err)?;
    if aggregates.is_empty() {
        return Ok(());
    }

    let mut all_file_types = Vec::new();
    let mut all_mime_types = Vec::new();
    let mut all_extensions = Vec::new();
    let mut all_ancestor_paths = Vec::new();

    struct Prepared {
        file_hash: String,
        file_types: Vec<String>,
        mime_types: Vec<String>,
        extensions: Vec<String>,
        ancestor_paths: Vec<String>,
        filenames: String,
    }
    let mut prepared = Vec::new();

    for agg in &aggregates {
        let mut ancestors: Vec<String> = agg.paths.iter().flat_map(|p| parent_paths(p)).collect();
        ancestors.sort();
        ancestors.dedup();

        let mut basenames: Vec<String> = agg.paths.iter().map(|p| basename(p)).collect();
        basenames.sort();
        basenames.dedup();

        all_file_types.extend(agg.coarse_types.iter().cloned());
        all_mime_types.extend(agg.mime_types.iter().cloned());
        all_extensions.extend(agg.extensions.iter().cloned());
        all_ancestor_paths.extend(ancestors.iter().cloned());

        prepared.push(Prepared {
            file_hash: agg.file_hash.clone(),
            file_types: agg.coarse_types.clone(),
            mime_types: agg.mime_types.clone(),
            extensions: agg.extensions.clone(),
            ancestor_paths: ancestors,
            filenames: basenames.join("\n"),
        });
    }

    all_file_types.sort();
    all_file_types.dedup();
    all_mime_types.sort();
    all_mime_types.dedup();
    all_extensions.sort();
    all_extensions.dedup();
    all_ancestor_paths.sort();
    all_ancestor_paths.dedup();

    let file_type_ids =
        hoover_store::interning::get_string_term_ids(&ctx.store, dataset, StringTermField::FileType, &all_file_types)
            .await
            .map_err(app_err)?;
    let mime_type_ids =
        hoover_store::interning::get_string_term_ids(&ctx.store, dataset, StringTermField::MimeType, &all_mime_types)
            .await
            .map_err(app_err)?;
    let extension_ids =
        hoover_store::interning::get_string_term_ids(&ctx.store, dataset, StringTermField::Extension, &all_extensions)
            .await
            .map_err(app_err)?;
    let path_ids = hoover_store::interning::get_string_term_ids(
        &ctx.store,
        dataset,
        StringTermField::ParentPaths,
        &all_ancestor_paths,
    )
    .await
    .map_err(app_err)?;

    let rows: Vec<DocMetadataRow> = prepared
        .into_iter()
        .map(|p| DocMetadataRow {
            collection_dataset: dataset.to_string(),
            file_hash: p.file_hash,
            filenames: p.filenames,
            metadata_values: String::new(),
            file_types: p.file_types.iter().filter_map(|v| file_type_ids.get(v).copied()).collect(),
            file_mime_types: p.mime_types.iter().filter_map(|v| mime_type_ids.get(v).copied()).collect(),
            file_extensions: p.extensions.iter().filter_map(|v| extension_ids.get(v).copied()).collect(),
            file_paths: p.ancestor_paths.iter().filter_map(|v| path_ids.get(v).copied()).collect(),
        })
        .collect();

    hoover_search::insert_doc_metadata(&ctx.search, &rows).await.map_err(app_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_strips_directory() {
        assert_eq!(basename("/a/b/c.txt"), "c.txt");
        assert_eq!(basename("/a.txt"), "a.txt");
    }
}
