//! One level of directory listing, plus the surrogate-path guard from
//! SPEC_FULL.md step 1.

use std::path::{Path, PathBuf};

/// One child entry discovered under a folder, before it is routed to the
/// directory or file partition.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub local_path: PathBuf,
    pub vfs_path: String,
    pub is_dir: bool,
    pub size: u64,
}

impl hoover_types::SizedItem for RawEntry {
    fn size_bytes(&self) -> u64 {
        self.size
    }
}

/// Paths containing a replacement character after lossy UTF-8 decoding
/// cannot have survived a round trip through a valid path string -- the
/// Rust analogue of the original's unpaired-surrogate check, since Rust
/// strings can never themselves contain surrogate code points.
pub fn path_has_unpaired_surrogate(path: &Path) -> bool {
    path.to_string_lossy().contains('\u{FFFD}')
}

/// Reads one level of `local_dir` (non-recursive, symlinks not followed),
/// skipping entries whose path can't round-trip through UTF-8. A symlink
/// entry is classified as neither a directory nor a file and is dropped
/// entirely, rather than falling through into the file partition.
/// `vfs_prefix` is the dataset-relative path of `local_dir` itself.
pub async fn scan_one_level(
    local_dir: &Path,
    vfs_prefix: &str,
) -> std::io::Result<Vec<RawEntry>> {
    let mut read_dir = tokio::fs::read_dir(local_dir).await?;
    let mut out = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let path = entry.path();
        if path_has_unpaired_surrogate(&path) {
            tracing::warn!(path = %path.display(), "skipping path with unrepresentable bytes");
            continue;
        }
        let metadata = entry.metadata().await?;
        if metadata.file_type().is_symlink() {
            tracing::warn!(path = %path.display(), "skipping symlink, not a dir or a file");
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let vfs_path = hoover_types::normalize_vfs_path(&format!("{vfs_prefix}/{name}"));
        out.push(RawEntry {
            local_path: path,
            vfs_path,
            is_dir: metadata.is_dir(),
            size: metadata.len(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn lists_one_level_only() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/nested.txt"), b"y").unwrap();

        let entries = scan_one_level(dir.path(), "/").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.vfs_path == "/a.txt" && !e.is_dir));
        assert!(entries.iter().any(|e| e.vfs_path == "/sub" && e.is_dir));
    }

    #[test]
    fn surrogate_guard_passes_normal_paths() {
        assert!(!path_has_unpaired_surrogate(Path::new("/a/b/plain.txt")));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn symlinks_are_dropped_from_both_dirs_and_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("real.txt"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();

        let entries = scan_one_level(dir.path(), "/").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].vfs_path, "/real.txt");
    }
}
