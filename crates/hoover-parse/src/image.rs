//! The `image` coarse type: ffprobe-derived width/height only. Not a
//! container -- images never recurse into a child scan.

use crate::proc::{ffprobe_json, first_video_resolution};
use hoover_store::attributes::{insert_file_attributes, AttributeKind};
use hoover_store::StoreClient;
use std::path::Path;
use std::time::Duration;

pub async fn parse_image_metadata_and_store(
    store: &StoreClient,
    dataset: &str,
    hash: &str,
    file_path: &Path,
    timeout: Duration,
) -> Result<(), std::io::Error> {
    let meta = ffprobe_json(file_path, timeout).await?;
    let (width, height) = first_video_resolution(&meta);
    let attributes = serde_json::json!({"width": width, "height": height});
    insert_file_attributes(store, dataset, hash, AttributeKind::Image, &attributes)
        .await
        .map_err(std::io::Error::other)
}
