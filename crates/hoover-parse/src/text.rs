//! The `text` coarse type: a bare read-and-chunk, no detector involved.

use hoover_store::StoreClient;
use hoover_types::{chunk_utf8, ExtractedBy, TextContentRow, MAX_TEXT_PAGE_BYTES};
use std::path::Path;

pub async fn extract_plaintext_chunks(
    store: &StoreClient,
    dataset: &str,
    hash: &str,
    file_path: &Path,
) -> Result<usize, std::io::Error> {
    let bytes = tokio::fs::read(file_path).await?;
    let pages = chunk_utf8(&bytes, MAX_TEXT_PAGE_BYTES);
    let count = pages.len();
    let rows: Vec<TextContentRow> = pages
        .into_iter()
        .enumerate()
        .map(|(i, page)| TextContentRow {
            collection_dataset: dataset.to_string(),
            file_hash: hash.to_string(),
            extracted_by: ExtractedBy::RawText,
            page_id: i as u32,
            text: page,
        })
        .collect();
    hoover_store::text::insert_text_content(store, &rows).await.map_err(std::io::Error::other)?;
    Ok(count)
}
