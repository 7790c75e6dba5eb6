//! OCR on the `image` coarse type. The original shells Python's in-process
//! EasyOCR; no Rust binding for it is verified in this corpus, so this
//! shells the real `tesseract` CLI instead -- consistent with every other
//! handler in this crate, which is subprocess-based already.

use hoover_store::attributes::{insert_file_attributes, AttributeKind};
use hoover_store::StoreClient;
use hoover_types::{chunk_utf8, ExtractedBy, TextContentRow, MAX_TEXT_PAGE_BYTES};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::proc::{run, truncate};

pub async fn run_ocr_and_store(
    store: &StoreClient,
    dataset: &str,
    hash: &str,
    file_path: &Path,
    timeout: Duration,
) -> Result<(), std::io::Error> {
    let path_str = file_path.to_string_lossy().into_owned();
    let started = Instant::now();
    let out = run("tesseract", &[&path_str, "stdout"], timeout).await?;
    let run_time_ms = started.elapsed().as_millis() as u64;

    if !out.status_ok {
        return Err(std::io::Error::other(format!(
            "tesseract failed: {}",
            truncate(&out.stderr, 200)
        )));
    }

    let text = String::from_utf8_lossy(&out.stdout).into_owned();
    let raw_results = serde_json::json!({
        "text": text,
        "run_time_ms": run_time_ms,
    });
    insert_file_attributes(store, dataset, hash, AttributeKind::Ocr, &raw_results)
        .await
        .map_err(std::io::Error::other)?;

    if !text.trim().is_empty() {
        let rows: Vec<TextContentRow> = chunk_utf8(text.as_bytes(), MAX_TEXT_PAGE_BYTES)
            .into_iter()
            .enumerate()
            .map(|(i, page)| TextContentRow {
                collection_dataset: dataset.to_string(),
                file_hash: hash.to_string(),
                extracted_by: ExtractedBy::EasyOcr,
                page_id: i as u32,
                text: page,
            })
            .collect();
        hoover_store::text::insert_text_content(store, &rows).await.map_err(std::io::Error::other)?;
    }

    Ok(())
}
