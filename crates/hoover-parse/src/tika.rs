//! Detector 2 and the tagged-text extractor. The original's
//! `run_tika_and_store` activity shells the Python `extractous` library in
//! process; no Rust binding for it is available in this corpus, so this
//! talks to a real Apache Tika Server over HTTP instead, the same
//! sidecar-HTTP shape [`hoover_ner::NerClient`] already uses. The dual
//! tagging is preserved exactly: extracted text is still recorded as
//! `ExtractedBy::Extractous`, and the derived `file_types`/attribute row is
//! still recorded as `ExtractedBy::Tika` -- downstream consumers key off
//! those tags, not off which binary produced them.

use hoover_config::AiSidecarConfig;
use hoover_store::attributes::{insert_file_attributes, AttributeKind};
use hoover_store::StoreClient;
use hoover_types::{
    chunk_utf8, coarse_file_type, CoarseType, DetectionResult, ExtractedBy, FileTypeRow, TextContentRow,
    MAX_TEXT_PAGE_BYTES,
};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TikaError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store error: {0}")]
    Store(#[from] hoover_store::StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone)]
pub struct TikaClient {
    http: reqwest::Client,
    base_url: String,
}

impl TikaClient {
    pub fn from_config(config: &AiSidecarConfig, timeout: Duration) -> Result<Self, TikaError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: config.tika_url.trim_end_matches('/').to_string(),
        })
    }

    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String, TikaError> {
        let resp = self
            .http
            .put(format!("{}/tika", self.base_url))
            .header("Accept", "text/plain")
            .body(bytes)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.text().await?)
    }

    async fn extract_metadata(&self, bytes: Vec<u8>) -> Result<serde_json::Value, TikaError> {
        let resp = self
            .http
            .put(format!("{}/meta", self.base_url))
            .header("Accept", "application/json")
            .body(bytes)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }
}

fn first_string_of(meta: &serde_json::Value, keys: &[&str]) -> Vec<String> {
    for key in keys {
        if let Some(v) = meta.get(key) {
            if let Some(s) = v.as_str() {
                return vec![s.to_string()];
            }
            if let Some(arr) = v.as_array() {
                return arr.iter().filter_map(|x| x.as_str().map(str::to_string)).collect();
            }
        }
    }
    Vec::new()
}

fn extensions_from_resource_name(name: &str) -> Vec<String> {
    let parts: Vec<&str> = name.rsplit('/').next().unwrap_or(name).split('.').collect();
    if parts.len() < 2 {
        return Vec::new();
    }
    let mut out = vec![format!(".{}", parts[parts.len() - 1])];
    if parts.len() > 2 {
        out.push(format!(".{}", parts[1..].join(".")));
    }
    out
}

/// Runs Tika's text and metadata extraction, inserting text pages tagged
/// `extractous` and a `file_types` row plus `file_attributes` row tagged
/// `tika`.
pub async fn run_tika_and_store(
    client: &TikaClient,
    store: &StoreClient,
    dataset: &str,
    hash: &str,
    file_path: &Path,
) -> Result<DetectionResult, TikaError> {
    let bytes = tokio::fs::read(file_path).await?;

    let metadata = client.extract_metadata(bytes.clone()).await.unwrap_or_default();
    let text = client.extract_text(bytes).await.unwrap_or_default();

    let mime_types = first_string_of(&metadata, &["Content-Type", "content-type", "ContentType"]);
    let mime_encodings = first_string_of(&metadata, &["Content-Encoding", "content-encoding", "encoding"]);
    let resource_names = first_string_of(&metadata, &["resourceName", "X-Parsed-By-Filename", "filename"]);
    let extensions: Vec<String> = resource_names.iter().flat_map(|n| extensions_from_resource_name(n)).collect();

    let coarse_types: Vec<CoarseType> = mime_types.iter().map(|m| coarse_file_type(m)).collect();
    let result = DetectionResult {
        mime_types: mime_types.clone(),
        mime_encodings: mime_encodings.clone(),
        coarse_types,
        extensions: extensions.clone(),
    };

    let row = FileTypeRow {
        collection_dataset: dataset.to_string(),
        hash: hash.to_string(),
        extracted_by: ExtractedBy::Tika,
        mime_types: result.mime_types.clone(),
        mime_encodings: result.mime_encodings.clone(),
        file_types: result.coarse_types.clone(),
        extensions: result.extensions.clone(),
    };
    hoover_store::filetype::insert_file_type_row(store, &row).await?;
    insert_file_attributes(store, dataset, hash, AttributeKind::Tika, &metadata).await.ok();

    if text.trim().len() > 1 {
        let pages = chunk_utf8(text.as_bytes(), MAX_TEXT_PAGE_BYTES);
        let rows: Vec<TextContentRow> = pages
            .into_iter()
            .enumerate()
            .map(|(i, page)| TextContentRow {
                collection_dataset: dataset.to_string(),
                file_hash: hash.to_string(),
                extracted_by: ExtractedBy::Extractous,
                page_id: i as u32,
                text: page,
            })
            .collect();
        hoover_store::text::insert_text_content(store, &rows).await?;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_name_extensions_cover_last_and_full_chain() {
        assert_eq!(
            extensions_from_resource_name("archive.tar.gz"),
            vec![".gz".to_string(), ".tar.gz".to_string()]
        );
    }

    #[test]
    fn first_string_of_checks_keys_in_order() {
        let meta = serde_json::json!({"content-type": "text/plain"});
        assert_eq!(first_string_of(&meta, &["Content-Type", "content-type"]), vec!["text/plain".to_string()]);
    }
}
