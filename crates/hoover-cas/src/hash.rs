use hoover_types::SecondaryHashes;
use md5::Md5;
use sha1::Sha1;
use sha2::Sha256;
use sha3::{Digest, Sha3_256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Single-pass streaming chunk size (8 MiB), matching the original
/// ingester's `_compute_hashes_streaming`: large enough to amortize
/// syscall overhead, small enough to bound peak memory for huge media
/// files.
pub const HASH_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// All four hashes produced by one streaming pass over a file's bytes.
#[derive(Debug, Clone)]
pub struct MultiHash {
    pub sha3_256: [u8; 32],
    pub sha256: [u8; 32],
    pub sha1: [u8; 20],
    pub md5: [u8; 16],
}

impl MultiHash {
    /// The primary content hash used as the blob's identity.
    pub fn primary_hex(&self) -> String {
        hex::encode(self.sha3_256)
    }

    pub fn secondary(&self) -> SecondaryHashes {
        SecondaryHashes {
            md5: hex::encode(self.md5),
            sha1: hex::encode(self.sha1),
            sha256: hex::encode(self.sha256),
        }
    }
}

/// Stream `path` once, updating all four hashers per chunk, returning the
/// combined digest and the total byte count.
pub async fn compute_hashes_streaming(
    path: &Path,
) -> std::io::Result<(MultiHash, u64)> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut primary = Sha3_256::new();
    let mut secondary_sha256 = Sha256::new();
    let mut secondary_sha1 = Sha1::new();
    let mut secondary_md5 = Md5::new();

    let mut buf = vec![0u8; HASH_CHUNK_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        let chunk = &buf[..n];
        primary.update(chunk);
        secondary_sha256.update(chunk);
        secondary_sha1.update(chunk);
        secondary_md5.update(chunk);
        total += n as u64;
    }

    let multi = MultiHash {
        sha3_256: primary.finalize().into(),
        sha256: secondary_sha256.finalize().into(),
        sha1: secondary_sha1.finalize().into(),
        md5: secondary_md5.finalize().into(),
    };
    Ok((multi, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn hashes_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();
        let (hash, size) = compute_hashes_streaming(&path).await.unwrap();
        assert_eq!(size, 0);
        // sha3_256("") is a well-known constant.
        assert_eq!(
            hash.primary_hex(),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434"
        );
    }

    #[tokio::test]
    async fn hashes_across_chunk_boundary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big");
        let data = vec![0xAB; HASH_CHUNK_SIZE + 13];
        std::fs::write(&path, &data).unwrap();
        let (hash, size) = compute_hashes_streaming(&path).await.unwrap();
        assert_eq!(size, data.len() as u64);
        assert_eq!(hash.primary_hex().len(), 64);
    }

    #[tokio::test]
    async fn deterministic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a");
        std::fs::write(&path, b"hello\n").unwrap();
        let (h1, _) = compute_hashes_streaming(&path).await.unwrap();
        let (h2, _) = compute_hashes_streaming(&path).await.unwrap();
        assert_eq!(h1.primary_hex(), h2.primary_hex());
        assert_eq!(h1.secondary().md5, h2.secondary().md5);
    }
}
