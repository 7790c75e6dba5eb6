use hoover_config::ObjectStoreConfig;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::path::Path;
use std::sync::Arc;

/// Thin wrapper around an [`object_store::ObjectStore`], responsible for
/// the `<dataset>/<blob_hash>` key layout and local-file <-> object
/// transfers. URL-driven construction, `path`-keyed reads/writes, with a
/// flat (unsharded) key format.
#[derive(Clone)]
pub struct ObjectStoreBackend {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectStoreBackend {
    pub fn from_config(config: &ObjectStoreConfig) -> Result<Self, object_store::Error> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region);
        if !config.endpoint.is_empty() {
            builder = builder.with_endpoint(&config.endpoint).with_allow_http(true);
        }
        if !config.access_key_id.is_empty() {
            builder = builder.with_access_key_id(&config.access_key_id);
        }
        if !config.secret_access_key.is_empty() {
            builder = builder.with_secret_access_key(&config.secret_access_key);
        }
        let store = builder.build()?;
        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
        })
    }

    /// An isolated in-memory store, for tests only -- no network, no
    /// real bucket name needed.
    pub fn in_memory_for_tests() -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            bucket: "test-bucket".to_string(),
        }
    }

    fn object_key(&self, dataset: &str, hash: &str) -> ObjectPath {
        ObjectPath::from(format!("{dataset}/{hash}"))
    }

    /// `s3://<bucket>/<dataset>/<hash>`, the exact locator format the
    /// columnar store persists in `blobs.storage_s3_path`.
    pub fn s3_uri(&self, dataset: &str, hash: &str) -> String {
        format!("s3://{}/{}/{}", self.bucket, dataset, hash)
    }

    pub async fn upload(
        &self,
        dataset: &str,
        hash: &str,
        local_path: &Path,
    ) -> Result<(), object_store::Error> {
        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|e| object_store::Error::Generic {
                store: "local-fs",
                source: Box::new(e),
            })?;
        let key = self.object_key(dataset, hash);
        self.store.put(&key, bytes.into()).await?;
        Ok(())
    }

    /// Confirms the configured bucket is reachable, the "ensure
    /// object-store bucket" half of C13's `migrate` entry point.
    /// `object_store` has no bucket-creation API -- provisioning a bucket
    /// is an S3 admin-plane operation, not a data-plane one -- so this is a
    /// cheap existence probe rather than a create-if-absent.
    pub async fn ensure_bucket(&self) -> Result<(), object_store::Error> {
        use futures::StreamExt;
        let mut listing = self.store.list(None);
        if let Some(first) = listing.next().await {
            first?;
        }
        Ok(())
    }

    pub async fn download(
        &self,
        dataset: &str,
        hash: &str,
        dest_path: &Path,
    ) -> Result<(), object_store::Error> {
        let key = self.object_key(dataset, hash);
        let result = self.store.get(&key).await?;
        let bytes = result.bytes().await?;
        tokio::fs::write(dest_path, &bytes)
            .await
            .map_err(|e| object_store::Error::Generic {
                store: "local-fs",
                source: Box::new(e),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn uploads_and_downloads_round_trip() {
        let backend = ObjectStoreBackend::in_memory_for_tests();
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.bin");
        std::fs::write(&src, b"object store payload").unwrap();

        backend.upload("ds1", "deadbeef", &src).await.unwrap();

        let dest = dir.path().join("dest.bin");
        backend.download("ds1", "deadbeef", &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"object store payload");
    }

    #[test]
    fn s3_uri_is_flat_no_sharding() {
        let backend = ObjectStoreBackend::in_memory_for_tests();
        assert_eq!(
            backend.s3_uri("my-dataset", "abc123"),
            "s3://test-bucket/my-dataset/abc123"
        );
    }
}
