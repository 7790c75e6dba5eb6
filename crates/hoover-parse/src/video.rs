//! The `video` coarse type: ffprobe metadata, then `ffmpeg`-extracted
//! frames (one every 4s) and any subtitle streams, then recurse P0 over
//! the frames/subtitles like any other container.

use crate::errors::app_err;
use crate::proc::{duration_seconds, ffprobe_json, first_video_resolution, run, truncate};
use crate::temp_dir::{cleanup_temp_dir, make_temp_dir};
use crate::ParseContext;
use hoover_engine::{
    child_workflow_id, execute_activity, execute_child_workflow, ActivityOptions, ChildWorkflowOptions, TaskQueue,
    WorkflowError,
};
use hoover_scan::ScanInput;
use hoover_store::attributes::{insert_file_attributes, AttributeKind};
use hoover_store::container::{insert_container_marker, ContainerKind};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn subtitle_stream_indices(meta: &serde_json::Value) -> Vec<u64> {
    meta.get("streams")
        .and_then(|s| s.as_array())
        .map(|streams| {
            streams
                .iter()
                .filter(|s| s.get("codec_type").and_then(|v| v.as_str()) == Some("subtitle"))
                .filter_map(|s| s.get("index").and_then(|v| v.as_u64()))
                .collect()
        })
        .unwrap_or_default()
}

async fn extract_frames_and_subtitles(
    video_path: &Path,
    out_dir: &Path,
    subtitle_indices: &[u64],
    timeout: Duration,
) -> std::io::Result<usize> {
    let frames_dir = out_dir.join("frames");
    tokio::fs::create_dir_all(&frames_dir).await?;
    let path_str = video_path.to_string_lossy().into_owned();
    let pattern = frames_dir.join("frame_%06d.jpg");
    let out = run(
        "ffmpeg",
        &[
            "-y",
            "-i",
            &path_str,
            "-vf",
            "fps=1/4",
            "-qscale:v",
            "2",
            &pattern.to_string_lossy(),
        ],
        timeout,
    )
    .await?;
    if !out.status_ok {
        return Err(std::io::Error::other(format!(
            "ffmpeg frame extraction failed: {}",
            truncate(&out.stderr, 200)
        )));
    }

    for idx in subtitle_indices {
        let dest = out_dir.join(format!("subtitle_{idx}.srt"));
        let map = format!("0:{idx}");
        let _ = run(
            "ffmpeg",
            &["-y", "-i", &path_str, "-map", &map, &dest.to_string_lossy()],
            timeout,
        )
        .await;
    }

    let mut entries = tokio::fs::read_dir(&frames_dir).await?;
    let mut count = 0;
    while entries.next_entry().await?.is_some() {
        count += 1;
    }
    Ok(count)
}

#[derive(Serialize)]
struct VideoScanParams {
    dataset: String,
    video_hash: String,
}

pub async fn video_process_and_scan(
    ctx: &ParseContext,
    dataset: &str,
    video_hash: &str,
    video_path: &Path,
    ffprobe_timeout: Duration,
    extract_timeout: Duration,
) -> Result<(), WorkflowError> {
    let probe_options = ActivityOptions::new(ffprobe_timeout, TaskQueue::Common);
    let extract_options = ActivityOptions::new(extract_timeout, TaskQueue::Common);
    let video_path_buf: PathBuf = video_path.to_path_buf();

    let meta = execute_activity("video_ffprobe_and_store", &probe_options, || {
        let video_path_buf = video_path_buf.clone();
        async move {
            let meta = ffprobe_json(&video_path_buf, ffprobe_timeout).await.map_err(app_err)?;
            let (width, height) = first_video_resolution(&meta);
            let duration = duration_seconds(&meta);
            let attributes = serde_json::json!({"width": width, "height": height, "duration_seconds": duration});
            insert_file_attributes(&ctx.store, dataset, video_hash, AttributeKind::Video, &attributes)
                .await
                .map_err(app_err)?;
            Ok::<_, WorkflowError>(meta)
        }
    })
    .await?;

    let subtitle_indices = subtitle_stream_indices(&meta);

    let out_dir = execute_activity("video_extract_frames_and_subtitles", &extract_options, || {
        let video_path_buf = video_path_buf.clone();
        let subtitle_indices = subtitle_indices.clone();
        async move {
            let out_dir = make_temp_dir(dataset, "video", video_hash).await.map_err(app_err)?;
            extract_frames_and_subtitles(&video_path_buf, &out_dir, &subtitle_indices, extract_timeout)
                .await
                .map_err(app_err)?;
            Ok(out_dir)
        }
    })
    .await?;

    execute_activity("record_video_container", &extract_options, || {
        let attributes = serde_json::json!({});
        async move {
            insert_container_marker(&ctx.store, dataset, video_hash, ContainerKind::Video, &attributes)
                .await
                .map_err(app_err)
        }
    })
    .await?;

    let params = VideoScanParams {
        dataset: dataset.to_string(),
        video_hash: video_hash.to_string(),
    };
    let child_id = child_workflow_id("video_process_and_scan", &params).unwrap_or_else(|_| "scan-video".to_string());
    let child_options = ChildWorkflowOptions { id: child_id, task_queue: TaskQueue::Common };
    let scan_input = ScanInput::for_container(dataset.to_string(), out_dir.clone(), video_hash.to_string());
    execute_child_workflow("scan", &child_options, || hoover_scan::scan(&ctx.scan, scan_input)).await?;

    execute_activity("cleanup_temp_dir", &extract_options, || {
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
    use serde_json::json;

    #[test]
    fn subtitle_indices_filter_by_codec_type() {
        let meta = json!({"streams": [
            {"codec_type": "video", "index": 0},
            {"codec_type": "subtitle", "index": 2},
            {"codec_type": "subtitle", "index": 3},
        ]});
        assert_eq!(subtitle_stream_indices(&meta), vec![2, 3]);
    }
}
