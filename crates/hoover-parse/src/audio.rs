//! The `audio` coarse type: ffprobe-derived duration only.

use crate::proc::{duration_seconds, ffprobe_json};
use hoover_store::attributes::{insert_file_attributes, AttributeKind};
use hoover_store::StoreClient;
use std::path::Path;
use std::time::Duration;

pub async fn parse_audio_metadata_and_store(
    store: &StoreClient,
    dataset: &str,
    hash: &str,
    file_path: &Path,
    timeout: Duration,
) -> Result<(), std::io::Error> {
    let meta = ffprobe_json(file_path, timeout).await?;
    let duration = duration_seconds(&meta);
    let attributes = serde_json::json!({"duration_seconds": duration});
    insert_file_attributes(store, dataset, hash, AttributeKind::Audio, &attributes)
        .await
        .map_err(std::io::Error::other)
}
