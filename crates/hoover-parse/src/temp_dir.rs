//! Scratch-directory naming for container handlers: `<tmp>/hoover4/<dataset>/<kind>_<hash>`.

use std::path::PathBuf;

pub async fn make_temp_dir(dataset: &str, kind: &str, hash: &str) -> std::io::Result<PathBuf> {
    let out_dir = std::env::temp_dir()
        .join("hoover4")
        .join(dataset)
        .join(format!("{kind}_{hash}"));
    tokio::fs::create_dir_all(&out_dir).await?;
    Ok(out_dir)
}

pub async fn cleanup_temp_dir(out_dir: &std::path::Path) {
    if tokio::fs::metadata(out_dir).await.is_ok() {
        if let Err(err) = tokio::fs::remove_dir_all(out_dir).await {
            tracing::warn!(dir = %out_dir.display(), error = %err, "failed to clean up scratch dir");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn make_temp_dir_is_namespaced_by_dataset_and_kind() {
        let dir = make_temp_dir("ds1", "pdf", "abc123").await.unwrap();
        assert!(dir.ends_with("hoover4/ds1/pdf_abc123"));
        assert!(tokio::fs::metadata(&dir).await.is_ok());
        cleanup_temp_dir(&dir).await;
        assert!(tokio::fs::metadata(&dir).await.is_err());
    }
}
