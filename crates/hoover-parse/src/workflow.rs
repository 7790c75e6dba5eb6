//! The top-level per-file entry point (C8, phase P3): type consensus, then
//! fan out to every coarse-type handler whose category the union of
//! detectors produced.

use crate::archive::archive_extract_and_scan;
use crate::audio::parse_audio_metadata_and_store;
use crate::email::email_extract_and_scan;
use crate::image::parse_image_metadata_and_store;
use crate::mime::{detect_mime_with_gnu_file, detect_mime_with_magika};
use crate::ocr::run_ocr_and_store;
use crate::pdf::pdf_process_and_scan;
use crate::text::extract_plaintext_chunks;
use crate::tika::{run_tika_and_store, TikaClient};
use crate::video::video_process_and_scan;
use hoover_engine::{execute_activity, ActivityOptions, TaskQueue, WorkflowError};
use hoover_scan::ScanContext;
use hoover_store::StoreClient;
use hoover_types::{CoarseType, DetectionResult};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Shared handles every dispatched handler in this crate needs. Cheap to
/// clone: `StoreClient`/`ScanContext`/`TikaClient` are all themselves
/// `Arc`-backed or otherwise cheap.
#[derive(Clone)]
pub struct ParseContext {
    pub store: StoreClient,
    pub scan: ScanContext,
    pub tika: TikaClient,
}

/// `900s + ceil(size / (10 kbit/s equivalent))`, matching the original's
/// transfer-time-derived per-dispatched-task budget.
fn proc_secs(size_bytes: u64) -> u64 {
    900 + size_bytes.div_ceil(1250)
}

async fn detect_type_consensus(
    ctx: &ParseContext,
    dataset: &str,
    hash: &str,
    file_path: &Path,
    timeout: Duration,
) -> (DetectionResult, Vec<(&'static str, WorkflowError)>) {
    let options = ActivityOptions::new(timeout, TaskQueue::Common);
    let tika_options = ActivityOptions::new(timeout, TaskQueue::Tika);

    let file_path_buf = file_path.to_path_buf();
    let file_result = execute_activity("detect_mime_with_gnu_file", &options, || {
        let file_path_buf = file_path_buf.clone();
        async move {
            detect_mime_with_gnu_file(&ctx.store, dataset, hash, &file_path_buf, timeout)
                .await
                .map_err(crate::errors::app_err)
        }
    })
    .await;

    let file_path_buf = file_path.to_path_buf();
    let magika_result = execute_activity("detect_mime_with_magika", &options, || {
        let file_path_buf = file_path_buf.clone();
        async move {
            detect_mime_with_magika(&ctx.store, dataset, hash, &file_path_buf, timeout)
                .await
                .map_err(crate::errors::app_err)
        }
    })
    .await;

    let file_path_buf = file_path.to_path_buf();
    let tika_result = execute_activity("run_tika_and_store", &tika_options, || {
        let file_path_buf = file_path_buf.clone();
        async move {
            run_tika_and_store(&ctx.tika, &ctx.store, dataset, hash, &file_path_buf)
                .await
                .map_err(crate::errors::app_err)
        }
    })
    .await;

    let mut errors = Vec::new();
    let mut results = Vec::new();
    match file_result {
        Ok(r) => results.push(r),
        Err(e) => errors.push(("detector_error_file", e)),
    }
    match magika_result {
        Ok(r) => results.push(r),
        Err(e) => errors.push(("detector_error_magika", e)),
    }
    match tika_result {
        Ok(r) => results.push(r),
        Err(e) => errors.push(("detector_error_tika", e)),
    }

    let mut union = DetectionResult::union(results);
    if union.coarse_types.is_empty() {
        union.coarse_types.push(CoarseType::Other);
    }
    (union, errors)
}

/// Runs `fut`, converting any error into a `(task_name, run_time_ms, error)`
/// triple rather than rethrowing -- per-category dispatch failures never
/// abort routing for the other categories.
async fn record_outcome<F>(task_name: &'static str, fut: F) -> Option<(&'static str, u64, WorkflowError)>
where
    F: std::future::Future<Output = Result<(), WorkflowError>>,
{
    let started = Instant::now();
    match fut.await {
        Ok(()) => None,
        Err(err) => Some((task_name, started.elapsed().as_millis() as u64, err)),
    }
}

/// Leaf activities (`text`/`image`/`audio`/ocr) run through the same
/// `execute_activity` retry/timeout machinery the type-consensus detectors
/// use, unlike the child-workflow handlers (archive/email/pdf/video) which
/// already wrap their own internal steps.
async fn run_leaf_activity<F, Fut>(
    task_name: &'static str,
    timeout: Duration,
    f: F,
) -> Option<(&'static str, u64, WorkflowError)>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), WorkflowError>>,
{
    let options = ActivityOptions::new(timeout, TaskQueue::Common);
    record_outcome(task_name, execute_activity(task_name, &options, f)).await
}

pub async fn parse_single_file(
    ctx: &ParseContext,
    dataset: &str,
    item_hash: &str,
    file_path: PathBuf,
    size_bytes: u64,
) -> Result<(), WorkflowError> {
    let timeout = Duration::from_secs(proc_secs(size_bytes));
    let started = Instant::now();

    let (detection, detector_errors) = detect_type_consensus(ctx, dataset, item_hash, &file_path, timeout).await;

    let mut failures: Vec<(&'static str, u64, WorkflowError)> = detector_errors
        .into_iter()
        .map(|(name, err)| (name, started.elapsed().as_millis() as u64, err))
        .collect();

    let categories = &detection.coarse_types;

    if categories.contains(&CoarseType::Archive) {
        let path = file_path.clone();
        if let Some(failure) = record_outcome("archive_extract_and_scan", async {
            archive_extract_and_scan(ctx, dataset, item_hash, &detection.mime_types, &path, timeout).await
        })
        .await
        {
            failures.push(failure);
        }
    }

    if categories.contains(&CoarseType::Email) {
        let path = file_path.clone();
        if let Some(failure) = record_outcome("email_extract_and_scan", async {
            email_extract_and_scan(ctx, dataset, item_hash, &path, timeout).await
        })
        .await
        {
            failures.push(failure);
        }
    }

    if categories.contains(&CoarseType::Text) {
        let path = file_path.clone();
        if let Some(failure) = run_leaf_activity("extract_plaintext_chunks", timeout, || {
            let store = ctx.store.clone();
            let dataset = dataset.to_string();
            let item_hash = item_hash.to_string();
            let path = path.clone();
            async move {
                extract_plaintext_chunks(&store, &dataset, &item_hash, &path)
                    .await
                    .map(|_| ())
                    .map_err(crate::errors::app_err)
            }
        })
        .await
        {
            failures.push(failure);
        }
    }

    if categories.contains(&CoarseType::Pdf) {
        let path = file_path.clone();
        if let Some(failure) = record_outcome("pdf_process_and_scan", async {
            pdf_process_and_scan(ctx, dataset, item_hash, &path, size_bytes, timeout).await
        })
        .await
        {
            failures.push(failure);
        }
    }

    if categories.contains(&CoarseType::Image) {
        let path = file_path.clone();
        if let Some(failure) = run_leaf_activity("parse_image_metadata_and_store", timeout, || {
            let store = ctx.store.clone();
            let dataset_s = dataset.to_string();
            let hash_s = item_hash.to_string();
            let path = path.clone();
            async move {
                parse_image_metadata_and_store(&store, &dataset_s, &hash_s, &path, timeout)
                    .await
                    .map_err(crate::errors::app_err)
            }
        })
        .await
        {
            failures.push(failure);
        }

        let path = file_path.clone();
        if let Some(failure) = run_leaf_activity("run_ocr_and_store", timeout, || {
            let store = ctx.store.clone();
            let dataset_s = dataset.to_string();
            let hash_s = item_hash.to_string();
            let path = path.clone();
            async move {
                run_ocr_and_store(&store, &dataset_s, &hash_s, &path, timeout)
                    .await
                    .map_err(crate::errors::app_err)
            }
        })
        .await
        {
            failures.push(failure);
        }
    }

    if categories.contains(&CoarseType::Audio) {
        let path = file_path.clone();
        if let Some(failure) = run_leaf_activity("parse_audio_metadata_and_store", timeout, || {
            let store = ctx.store.clone();
            let dataset_s = dataset.to_string();
            let hash_s = item_hash.to_string();
            let path = path.clone();
            async move {
                parse_audio_metadata_and_store(&store, &dataset_s, &hash_s, &path, timeout)
                    .await
                    .map_err(crate::errors::app_err)
            }
        })
        .await
        {
            failures.push(failure);
        }
    }

    if categories.contains(&CoarseType::Video) {
        let path = file_path.clone();
        let ffprobe_timeout = Duration::from_secs(90 + size_bytes.div_ceil(20_000));
        let extract_timeout = Duration::from_secs(120 + size_bytes.div_ceil(10_000));
        if let Some(failure) = record_outcome("video_process_and_scan", async {
            video_process_and_scan(ctx, dataset, item_hash, &path, ffprobe_timeout, extract_timeout).await
        })
        .await
        {
            failures.push(failure);
        }
    }

    if !failures.is_empty() {
        let entries: Vec<hoover_journal::ErrorEntry> = failures
            .iter()
            .map(|(task_name, run_time_ms, err)| hoover_journal::ErrorEntry {
                hash: item_hash.to_string(),
                task_name: task_name.to_string(),
                run_time_ms: *run_time_ms,
                error: err,
            })
            .collect();
        hoover_journal::record_processing_errors(&ctx.store, dataset, &entries).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proc_secs_matches_transfer_time_formula() {
        assert_eq!(proc_secs(0), 900);
        assert_eq!(proc_secs(1), 901);
        assert_eq!(proc_secs(1250), 901);
        assert_eq!(proc_secs(1251), 902);
    }
}
