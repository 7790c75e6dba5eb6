//! Shared external-process plumbing: every detector/handler in this crate
//! shells out to a well-known binary (`file`, `7z`, `qpdf`, `pdftotext`,
//! `ffprobe`, `ffmpeg`, `tesseract`, `magika`) exactly as the original
//! ingester did, just via `tokio::process::Command` instead of Python's
//! `subprocess.run`.

use std::path::Path;
use std::time::Duration;

pub struct ProcOutput {
    pub status_ok: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Truncates a byte slice to at most `n` bytes for error messages, mirroring
/// the original's `stderr[:200]` pattern.
pub fn truncate(bytes: &[u8], n: usize) -> String {
    let s = String::from_utf8_lossy(bytes);
    if s.len() > n {
        format!("{}...", &s[..n])
    } else {
        s.into_owned()
    }
}

/// Runs `program` with `args`, bounded by `timeout`. A timed-out child is
/// killed before returning.
pub async fn run(program: &str, args: &[&str], timeout: Duration) -> std::io::Result<ProcOutput> {
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args);
    let child = cmd.output();
    let output = tokio::time::timeout(timeout, child)
        .await
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, format!("{program} timed out")))??;
    Ok(ProcOutput {
        status_ok: output.status.success(),
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

/// `ffprobe -v error -print_format json -show_format -show_streams <path>`,
/// shared by the image/audio/video metadata activities.
pub async fn ffprobe_json(file_path: &Path, timeout: Duration) -> std::io::Result<serde_json::Value> {
    let path_str = file_path.to_string_lossy().into_owned();
    let out = run(
        "ffprobe",
        &["-v", "error", "-print_format", "json", "-show_format", "-show_streams", &path_str],
        timeout,
    )
    .await?;
    if !out.status_ok {
        return Err(std::io::Error::other(format!(
            "ffprobe failed: {} {}",
            truncate(&out.stderr, 200),
            truncate(&out.stdout, 200)
        )));
    }
    Ok(serde_json::from_slice(&out.stdout).unwrap_or(serde_json::Value::Object(Default::default())))
}

/// First video stream's `(width, height)`, or `(0, 0)` if none.
pub fn first_video_resolution(meta: &serde_json::Value) -> (u32, u32) {
    let Some(streams) = meta.get("streams").and_then(|s| s.as_array()) else {
        return (0, 0);
    };
    for stream in streams {
        if stream.get("codec_type").and_then(|v| v.as_str()) == Some("video") {
            let w = stream.get("width").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
            let h = stream.get("height").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
            return (w, h);
        }
    }
    (0, 0)
}

/// `format.duration`, falling back to the longest stream duration, else 0.
pub fn duration_seconds(meta: &serde_json::Value) -> f64 {
    if let Some(d) = meta
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<f64>().ok())
    {
        return d;
    }
    meta.get("streams")
        .and_then(|s| s.as_array())
        .map(|streams| {
            streams
                .iter()
                .filter_map(|s| s.get("duration").and_then(|v| v.as_str()).and_then(|s| s.parse::<f64>().ok()))
                .fold(0.0_f64, f64::max)
        })
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truncate_leaves_short_strings_alone() {
        assert_eq!(truncate(b"hi", 200), "hi");
    }

    #[test]
    fn resolution_reads_first_video_stream() {
        let meta = json!({"streams": [{"codec_type": "audio"}, {"codec_type": "video", "width": 640, "height": 480}]});
        assert_eq!(first_video_resolution(&meta), (640, 480));
    }

    #[test]
    fn duration_falls_back_to_max_stream_duration() {
        let meta = json!({"streams": [{"duration": "1.5"}, {"duration": "3.2"}]});
        assert_eq!(duration_seconds(&meta), 3.2);
    }

    #[test]
    fn duration_defaults_to_zero() {
        assert_eq!(duration_seconds(&json!({})), 0.0);
    }
}
