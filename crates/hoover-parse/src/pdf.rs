//! The `pdf` coarse type: `qpdf`/`pdftotext` based metadata, text, and image
//! extraction, branching on size/page count between a single-pass small
//! path and a page-range-chunked large path so a 10,000-page PDF doesn't
//! blow the activity timeout.

use crate::errors::app_err;
use crate::proc::{run, truncate};
use crate::temp_dir::{cleanup_temp_dir, make_temp_dir};
use crate::ParseContext;
use hoover_engine::{
    child_workflow_id, execute_activity, execute_child_workflow, ActivityOptions, ChildWorkflowOptions, TaskQueue,
    WorkflowError,
};
use hoover_scan::ScanInput;
use hoover_store::attributes::{insert_file_attributes, AttributeKind};
use hoover_store::container::{insert_container_marker, ContainerKind};
use hoover_types::{chunk_utf8, ExtractedBy, TextContentRow, MAX_TEXT_PAGE_BYTES};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const LARGE_PDF_SIZE_THRESHOLD: u64 = 64 * 1024 * 1024;
const LARGE_PDF_PAGE_THRESHOLD: u64 = 1000;
const MAX_PAGES_PER_CHUNK: u64 = 500;
const CHUNK_TARGET_BYTES: u64 = 32 * 1024 * 1024;

fn is_small_pdf(size_bytes: u64, page_count: u64) -> bool {
    size_bytes < LARGE_PDF_SIZE_THRESHOLD || page_count < LARGE_PDF_PAGE_THRESHOLD
}

/// `min(500, ceil(pages / max(ceil(size/32MiB), ceil(pages/500))))`.
fn pages_per_chunk(size_bytes: u64, page_count: u64) -> u64 {
    let by_size = size_bytes.div_ceil(CHUNK_TARGET_BYTES).max(1);
    let by_pages = page_count.div_ceil(MAX_PAGES_PER_CHUNK).max(1);
    let divisor = by_size.max(by_pages);
    page_count.div_ceil(divisor).min(MAX_PAGES_PER_CHUNK).max(1)
}

fn page_count_from_qpdf_show_npages(stdout: &[u8]) -> u64 {
    String::from_utf8_lossy(stdout).trim().parse().unwrap_or(0)
}

/// Strips the PDF `D:` date prefix and tries ISO-8601, then `%Y%m%d%H%M%S`,
/// falling back to the Unix epoch.
fn parse_pdf_date(raw: &str) -> chrono::NaiveDateTime {
    let stripped = raw.strip_prefix("D:").unwrap_or(raw);
    let cleaned: String = stripped.chars().take(14).filter(|c| c.is_ascii_digit()).collect();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(stripped) {
        return dt.naive_utc();
    }
    if cleaned.len() == 14 {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(&cleaned, "%Y%m%d%H%M%S") {
            return dt;
        }
    }
    chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc()
}

async fn qpdf_metadata(pdf_path: &Path, timeout: Duration) -> std::io::Result<serde_json::Value> {
    let path_str = pdf_path.to_string_lossy().into_owned();
    let out = run("qpdf", &["--json", &path_str], timeout).await?;
    if !out.status_ok {
        return Err(std::io::Error::other(format!(
            "qpdf --json failed: {} {}",
            truncate(&out.stderr, 200),
            truncate(&out.stdout, 200)
        )));
    }
    Ok(serde_json::from_slice(&out.stdout).unwrap_or(serde_json::Value::Object(Default::default())))
}

fn author_and_date_from_qpdf(meta: &serde_json::Value) -> (String, chrono::NaiveDateTime) {
    let docinfo = meta.pointer("/qpdf/0/docinfo").unwrap_or(&serde_json::Value::Null);
    let author = docinfo
        .get("Author")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let date = docinfo
        .get("CreationDate")
        .and_then(|v| v.as_str())
        .map(parse_pdf_date)
        .unwrap_or_else(|| chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc());
    (author, date)
}

async fn extract_small_pdf(pdf_path: &Path, out_dir: &Path, timeout: Duration) -> std::io::Result<usize> {
    let path_str = pdf_path.to_string_lossy().into_owned();
    let text_path = out_dir.join("text.txt");
    let text_out = run(
        "pdftotext",
        &["-enc", "UTF-8", "-layout", &path_str, &text_path.to_string_lossy()],
        timeout,
    )
    .await?;
    if !text_out.status_ok {
        tracing::warn!(pdf = %pdf_path.display(), "pdftotext failed, continuing without text");
    }

    let img_prefix = out_dir.join("img");
    let img_out = run(
        "qpdf",
        &[&format!("--extract-images={}", img_prefix.to_string_lossy()), &path_str],
        timeout,
    )
    .await?;
    if !img_out.status_ok {
        tracing::warn!(pdf = %pdf_path.display(), "qpdf --extract-images failed, continuing without images");
    }

    let mut images = tokio::fs::read_dir(out_dir).await?;
    let mut count = 0;
    while let Some(entry) = images.next_entry().await? {
        if entry.file_name().to_string_lossy().starts_with("img-") {
            count += 1;
        }
    }
    Ok(count)
}

async fn extract_large_pdf(pdf_path: &Path, out_dir: &Path, page_count: u64, size_bytes: u64, timeout: Duration) -> std::io::Result<usize> {
    let chunk_size = pages_per_chunk(size_bytes, page_count);
    let path_str = pdf_path.to_string_lossy().into_owned();
    let mut chunks = 0;
    let mut start = 1;
    while start <= page_count {
        let end = (start + chunk_size - 1).min(page_count);
        let range = if start == end { format!("{start}") } else { format!("{start}-{end}") };
        let dest = out_dir.join(format!("chunk_{start:06}_{end:06}.pdf"));
        let out = run(
            "qpdf",
            &["--pages", &path_str, &range, "--", &dest.to_string_lossy()],
            timeout,
        )
        .await?;
        if !out.status_ok {
            return Err(std::io::Error::other(format!(
                "qpdf --pages failed for range {range}: {}",
                truncate(&out.stderr, 200)
            )));
        }
        chunks += 1;
        start = end + 1;
    }
    Ok(chunks)
}

#[derive(Serialize)]
struct PdfScanParams {
    dataset: String,
    pdf_hash: String,
}

pub async fn pdf_process_and_scan(
    ctx: &ParseContext,
    dataset: &str,
    pdf_hash: &str,
    pdf_path: &Path,
    size_bytes: u64,
    timeout: Duration,
) -> Result<(), WorkflowError> {
    let options = ActivityOptions::new(timeout, TaskQueue::Common);
    let pdf_path_buf: PathBuf = pdf_path.to_path_buf();

    let (page_count, author, created_at) = execute_activity("qpdf_show_npages_and_metadata", &options, || {
        let pdf_path_buf = pdf_path_buf.clone();
        async move {
            let path_str = pdf_path_buf.to_string_lossy().into_owned();
            let npages = run("qpdf", &["--show-npages", &path_str], timeout).await.map_err(app_err)?;
            let page_count = page_count_from_qpdf_show_npages(&npages.stdout);
            let meta = qpdf_metadata(&pdf_path_buf, timeout).await.map_err(app_err)?;
            let (author, created_at) = author_and_date_from_qpdf(&meta);
            Ok::<_, WorkflowError>((page_count, author, created_at))
        }
    })
    .await?;

    execute_activity("record_pdf_attributes", &options, || {
        let attributes = serde_json::json!({
            "page_count": page_count,
            "author": author,
            "created_at": created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        });
        async move {
            insert_file_attributes(&ctx.store, dataset, pdf_hash, AttributeKind::Pdf, &attributes)
                .await
                .map_err(app_err)
        }
    })
    .await?;

    let out_dir = execute_activity("extract_pdf_contents", &options, || {
        let pdf_path_buf = pdf_path_buf.clone();
        async move {
            let out_dir = make_temp_dir(dataset, "pdf", pdf_hash).await.map_err(app_err)?;
            if is_small_pdf(size_bytes, page_count) {
                extract_small_pdf(&pdf_path_buf, &out_dir, timeout).await.map_err(app_err)?;
                if let Ok(text) = tokio::fs::read_to_string(out_dir.join("text.txt")).await {
                    let rows: Vec<TextContentRow> = chunk_utf8(text.as_bytes(), MAX_TEXT_PAGE_BYTES)
                        .into_iter()
                        .enumerate()
                        .map(|(i, page)| TextContentRow {
                            collection_dataset: dataset.to_string(),
                            file_hash: pdf_hash.to_string(),
                            extracted_by: ExtractedBy::Qpdf,
                            page_id: i as u32,
                            text: page,
                        })
                        .collect();
                    if !rows.is_empty() {
                        hoover_store::text::insert_text_content(&ctx.store, &rows).await.map_err(app_err)?;
                    }
                }
            } else {
                extract_large_pdf(&pdf_path_buf, &out_dir, page_count, size_bytes, timeout)
                    .await
                    .map_err(app_err)?;
            }
            Ok(out_dir)
        }
    })
    .await?;

    execute_activity("record_pdf_container", &options, || {
        let attributes = serde_json::json!({"page_count": page_count});
        async move {
            insert_container_marker(&ctx.store, dataset, pdf_hash, ContainerKind::Pdf, &attributes)
                .await
                .map_err(app_err)
        }
    })
    .await?;

    let params = PdfScanParams {
        dataset: dataset.to_string(),
        pdf_hash: pdf_hash.to_string(),
    };
    let child_id = child_workflow_id("pdf_process_and_scan", &params).unwrap_or_else(|_| "scan-pdf".to_string());
    let child_options = ChildWorkflowOptions { id: child_id, task_queue: TaskQueue::Common };
    let scan_input = ScanInput::for_container(dataset.to_string(), out_dir.clone(), pdf_hash.to_string());
    execute_child_workflow("scan", &child_options, || hoover_scan::scan(&ctx.scan, scan_input)).await?;

    execute_activity("cleanup_temp_dir", &options, || {
        let out_dir = out_dir.clone();
        async move {
            cleanup_temp_dir(&out_dir).await;
            Ok::<(), WorkflowError>(())
        }
    })
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_pdf_threshold_checks_either_dimension() {
        assert!(is_small_pdf(10, 5000));
        assert!(is_small_pdf(200 * 1024 * 1024, 10));
        assert!(!is_small_pdf(200 * 1024 * 1024, 5000));
    }

    #[test]
    fn pages_per_chunk_caps_at_500() {
        assert_eq!(pages_per_chunk(1024, 100), 100);
        assert_eq!(pages_per_chunk(1024, 10_000), 500);
    }

    #[test]
    fn pdf_date_strips_prefix_and_parses() {
        let dt = parse_pdf_date("D:20230115120000");
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2023-01-15");
    }

    #[test]
    fn page_count_parses_qpdf_output() {
        assert_eq!(page_count_from_qpdf_show_npages(b"42\n"), 42);
    }
}
