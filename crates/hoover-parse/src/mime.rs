//! Type consensus, detectors 1 and 3 (`file` and `magika`). Detector 2,
//! the text/metadata extractor, lives in [`crate::tika`].

use crate::proc::{run, truncate};
use hoover_store::StoreClient;
use hoover_types::{coarse_file_type, coarse_type_from_magika_group, CoarseType, DetectionResult, ExtractedBy, FileTypeRow};
use std::path::Path;
use std::time::Duration;

/// `file -k <mode> <path>` output, `\012`-joined multi-match lines
/// unwound into one candidate per line, leading `"path: "`/`"- "` stripped.
fn parse_file_multi_output(raw: &str) -> Vec<String> {
    let normalized = raw.replace("\\012", "\n");
    let mut candidates = Vec::new();
    for (i, part) in normalized.trim().split('\n').enumerate() {
        let mut part = part.trim();
        if i == 0 {
            if let Some(idx) = part.find(": ") {
                part = &part[idx + 2..];
            }
        } else {
            part = part.trim_start_matches("- ").trim();
        }
        if !part.is_empty() && part != "?" {
            candidates.push(part.to_string());
        }
    }
    candidates
}

fn split_extension_candidates(raw: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for candidate in raw {
        for piece in candidate.split('/') {
            if piece.contains('?') || piece.is_empty() {
                continue;
            }
            let ext = if piece.starts_with('.') {
                piece.to_string()
            } else {
                format!(".{piece}")
            };
            out.push(ext);
        }
    }
    out
}

/// Derives extensions directly from the filename: the last extension and
/// the full multi-dot chain (e.g. `archive.tar.gz` -> `[".gz", ".tar.gz"]`).
fn extensions_from_filename(file_path: &Path) -> Vec<String> {
    let Some(name) = file_path.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() < 2 {
        return Vec::new();
    }
    let mut out = Vec::new();
    out.push(format!(".{}", parts[parts.len() - 1]));
    if parts.len() > 2 {
        out.push(format!(".{}", parts[1..].join(".")));
    }
    out.sort();
    out.dedup();
    out
}

async fn run_file_mode(mode: &str, file_path: &Path, timeout: Duration) -> std::io::Result<Vec<String>> {
    let path_str = file_path.to_string_lossy().into_owned();
    let out = run("file", &["-k", mode, &path_str], timeout).await?;
    if !out.status_ok {
        return Err(std::io::Error::other(format!(
            "file {mode} failed: {} {}",
            truncate(&out.stderr, 200),
            truncate(&out.stdout, 200)
        )));
    }
    Ok(parse_file_multi_output(&String::from_utf8_lossy(&out.stdout)))
}

/// Activity 1: `file -k --mime-type/--mime-encoding/--extension`, combined
/// with filename-derived extensions. Inserts one `file_types` row tagged
/// `ExtractedBy::File` and returns the union for the caller's routing step.
pub async fn detect_mime_with_gnu_file(
    store: &StoreClient,
    dataset: &str,
    hash: &str,
    file_path: &Path,
    timeout: Duration,
) -> Result<DetectionResult, std::io::Error> {
    let mime_types = run_file_mode("--mime-type", file_path, timeout).await.unwrap_or_default();
    let mime_encodings = run_file_mode("--mime-encoding", file_path, timeout).await.unwrap_or_default();
    let file_extensions = run_file_mode("--extension", file_path, timeout).await.unwrap_or_default();

    let mut extensions = split_extension_candidates(&file_extensions);
    extensions.extend(extensions_from_filename(file_path));
    extensions.sort();
    extensions.dedup();

    let coarse_types: Vec<CoarseType> = mime_types.iter().map(|m| coarse_file_type(m)).collect();
    let result = DetectionResult {
        mime_types,
        mime_encodings,
        coarse_types,
        extensions,
    };

    let row = FileTypeRow {
        collection_dataset: dataset.to_string(),
        hash: hash.to_string(),
        extracted_by: ExtractedBy::File,
        mime_types: result.mime_types.clone(),
        mime_encodings: result.mime_encodings.clone(),
        file_types: result.coarse_types.clone(),
        extensions: result.extensions.clone(),
    };
    hoover_store::filetype::insert_file_type_row(store, &row)
        .await
        .map_err(std::io::Error::other)?;

    Ok(result)
}

/// Loosely-shaped magika CLI JSON result: `[{"path", "result": {"value":
/// {"output": {"mime_type", "group", "ct_label"}}}}]`. Parsed defensively
/// since the shape has drifted across magika CLI releases.
fn find_str_field<'a>(value: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(v) = map.get(key).and_then(|v| v.as_str()) {
                return Some(v);
            }
            map.values().find_map(|v| find_str_field(v, key))
        }
        serde_json::Value::Array(items) => items.iter().find_map(|v| find_str_field(v, key)),
        _ => None,
    }
}

/// Activity 3: shells the `magika` CLI (Google's deep-learning file-type
/// identifier) rather than the in-process Python library, since the CLI is
/// the only stable cross-language surface. Inserts one `file_types` row
/// tagged `ExtractedBy::Magika`.
pub async fn detect_mime_with_magika(
    store: &StoreClient,
    dataset: &str,
    hash: &str,
    file_path: &Path,
    timeout: Duration,
) -> Result<DetectionResult, std::io::Error> {
    let path_str = file_path.to_string_lossy().into_owned();
    let out = run("magika", &[&path_str, "--json"], timeout).await?;
    if !out.status_ok {
        return Err(std::io::Error::other(format!(
            "magika failed: {} {}",
            truncate(&out.stderr, 200),
            truncate(&out.stdout, 200)
        )));
    }
    let parsed: serde_json::Value =
        serde_json::from_slice(&out.stdout).unwrap_or(serde_json::Value::Array(Vec::new()));

    let mime_type = find_str_field(&parsed, "mime_type").map(str::to_string);
    let group = find_str_field(&parsed, "group");
    let label = find_str_field(&parsed, "ct_label").or_else(|| find_str_field(&parsed, "label"));

    let coarse_type = group
        .map(coarse_type_from_magika_group)
        .or_else(|| mime_type.as_deref().map(coarse_file_type))
        .unwrap_or(CoarseType::Other);

    let mut extensions = extensions_from_filename(file_path);
    if let Some(label) = label {
        let ext = format!(".{label}");
        if !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }

    let result = DetectionResult {
        mime_types: mime_type.into_iter().collect(),
        mime_encodings: Vec::new(),
        coarse_types: vec![coarse_type],
        extensions,
    };

    let row = FileTypeRow {
        collection_dataset: dataset.to_string(),
        hash: hash.to_string(),
        extracted_by: ExtractedBy::Magika,
        mime_types: result.mime_types.clone(),
        mime_encodings: result.mime_encodings.clone(),
        file_types: result.coarse_types.clone(),
        extensions: result.extensions.clone(),
    };
    hoover_store::filetype::insert_file_type_row(store, &row)
        .await
        .map_err(std::io::Error::other)?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_single_match_output() {
        let raw = "/tmp/foo.txt: text/plain";
        assert_eq!(parse_file_multi_output(raw), vec!["text/plain".to_string()]);
    }

    #[test]
    fn parses_multi_match_output_with_dashes() {
        let raw = "/tmp/foo: application/zip\\012- application/octet-stream";
        let got = parse_file_multi_output(raw);
        assert_eq!(got, vec!["application/zip".to_string(), "application/octet-stream".to_string()]);
    }

    #[test]
    fn extension_candidates_skip_question_marks_and_prefix_dot() {
        let raw = vec!["zip/cbz".to_string(), "???".to_string()];
        let got = split_extension_candidates(&raw);
        assert_eq!(got, vec![".zip".to_string(), ".cbz".to_string()]);
    }

    #[test]
    fn filename_extensions_cover_last_and_full_chain() {
        let got = extensions_from_filename(&PathBuf::from("archive.tar.gz"));
        assert_eq!(got, vec![".gz".to_string(), ".tar.gz".to_string()]);
    }

    #[test]
    fn filename_without_extension_yields_nothing() {
        assert!(extensions_from_filename(&PathBuf::from("README")).is_empty());
    }

    #[test]
    fn find_str_field_searches_nested_objects() {
        let v = serde_json::json!([{"result": {"value": {"output": {"mime_type": "image/png"}}}}]);
        assert_eq!(find_str_field(&v, "mime_type"), Some("image/png"));
    }
}
