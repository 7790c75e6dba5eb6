use serde::{Deserialize, Serialize};

/// Small blobs are inlined into the columnar store rather than uploaded to
/// the object store. Confirmed intentional against the original ingester's
/// `SMALL_BLOB_THRESHOLD_BYTES` constant, not a rounding artifact.
pub const SMALL_BLOB_THRESHOLD_BYTES: u64 = 600 * 1024;

/// Secondary hashes computed in the same streaming pass as the primary
/// `sha3_256` hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryHashes {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
}

/// Where a blob's bytes physically live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageSite {
    /// Bytes live in the columnar store's `blob_values` table.
    Inline,
    /// Bytes live in the object store at this fully-qualified `s3://` URI.
    ObjectStore { s3_path: String },
}

impl StorageSite {
    pub fn for_size(size: u64) -> StorageSiteKind {
        if size <= SMALL_BLOB_THRESHOLD_BYTES {
            StorageSiteKind::Inline
        } else {
            StorageSiteKind::ObjectStore
        }
    }

    pub fn s3_path(&self) -> &str {
        match self {
            StorageSite::Inline => "",
            StorageSite::ObjectStore { s3_path } => s3_path,
        }
    }

    pub fn stored_in_clickhouse(&self) -> bool {
        matches!(self, StorageSite::Inline)
    }
}

/// Discriminant-only form, used before an object-store path has been computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageSiteKind {
    Inline,
    ObjectStore,
}

/// A content-addressed byte sequence, scoped to a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub collection_dataset: String,
    pub blob_hash: String,
    pub size: u64,
    pub secondary: SecondaryHashes,
    pub storage: StorageSite,
}

impl Blob {
    /// Invariant 1 (Blob single-site): exactly one storage site per row.
    pub fn storage_is_exclusive(&self) -> bool {
        match &self.storage {
            StorageSite::Inline => true,
            StorageSite::ObjectStore { s3_path } => !s3_path.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_600kib() {
        assert_eq!(SMALL_BLOB_THRESHOLD_BYTES, 614_400);
    }

    #[test]
    fn storage_site_for_size() {
        assert_eq!(
            StorageSite::for_size(SMALL_BLOB_THRESHOLD_BYTES),
            StorageSiteKind::Inline
        );
        assert_eq!(
            StorageSite::for_size(SMALL_BLOB_THRESHOLD_BYTES + 1),
            StorageSiteKind::ObjectStore
        );
    }

    #[test]
    fn single_site_invariant() {
        let inline = Blob {
            collection_dataset: "ds".into(),
            blob_hash: "abc".into(),
            size: 6,
            secondary: SecondaryHashes {
                md5: "m".into(),
                sha1: "s".into(),
                sha256: "h".into(),
            },
            storage: StorageSite::Inline,
        };
        assert!(inline.storage_is_exclusive());

        let remote = Blob {
            storage: StorageSite::ObjectStore {
                s3_path: "s3://bucket/ds/abc".into(),
            },
            ..inline.clone()
        };
        assert!(remote.storage_is_exclusive());

        let broken = Blob {
            storage: StorageSite::ObjectStore {
                s3_path: "".into(),
            },
            ..inline
        };
        assert!(!broken.storage_is_exclusive());
    }
}
