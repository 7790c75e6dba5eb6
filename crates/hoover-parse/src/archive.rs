//! The `archive` coarse type: `7z x` into a scratch dir, then recurse P0
//! as a container.

use crate::errors::app_err;
use crate::temp_dir::{cleanup_temp_dir, make_temp_dir};
use crate::ParseContext;
use crate::proc::{run, truncate};
use hoover_engine::{child_workflow_id, execute_activity, execute_child_workflow, ActivityOptions, ChildWorkflowOptions, TaskQueue, WorkflowError};
use hoover_scan::ScanInput;
use hoover_store::container::{insert_container_marker, ContainerKind};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

#[derive(Serialize)]
struct ArchiveScanParams {
    dataset: String,
    archive_hash: String,
}

pub async fn archive_extract_and_scan(
    ctx: &ParseContext,
    dataset: &str,
    archive_hash: &str,
    archive_types: &[String],
    archive_path: &Path,
    timeout: Duration,
) -> Result<(), WorkflowError> {
    let options = ActivityOptions::new(timeout, TaskQueue::Common);

    let out_dir = execute_activity("extract_archive_to_temp", &options, || async {
        let out_dir = make_temp_dir(dataset, "extract", archive_hash).await.map_err(app_err)?;
        let out_str = out_dir.to_string_lossy().into_owned();
        let archive_str = archive_path.to_string_lossy().into_owned();
        let result = run("7z", &["x", "-y", &format!("-o{out_str}"), &archive_str], timeout)
            .await
            .map_err(app_err)?;
        if !result.status_ok {
            return Err(app_err(format!(
                "7z extraction failed: {} {}",
                truncate(&result.stderr, 200),
                truncate(&result.stdout, 200)
            )));
        }
        Ok(out_dir)
    })
    .await?;

    execute_activity("record_archive_container", &options, || {
        let attributes = serde_json::json!({"archive_type": archive_types.join(" ")});
        async move {
            insert_container_marker(&ctx.store, dataset, archive_hash, ContainerKind::Archive, &attributes)
                .await
                .map_err(app_err)
        }
    })
    .await?;

    let params = ArchiveScanParams {
        dataset: dataset.to_string(),
        archive_hash: archive_hash.to_string(),
    };
    let child_id = child_workflow_id("archive_extract_and_scan", &params).unwrap_or_else(|_| "scan-archive".to_string());
    let child_options = ChildWorkflowOptions { id: child_id, task_queue: TaskQueue::Common };
    let scan_input = ScanInput::for_container(dataset.to_string(), out_dir.clone(), archive_hash.to_string());
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
