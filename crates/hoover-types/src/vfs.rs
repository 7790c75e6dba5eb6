use serde::{Deserialize, Serialize};

/// A directory node in the virtual filesystem, keyed by `(dataset,
/// container_hash, path)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VfsDirectory {
    pub collection_dataset: String,
    pub container_hash: String,
    pub path: String,
}

/// A file node in the virtual filesystem, keyed by `(dataset, container_hash,
/// path)`, carrying a reference to its blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VfsFile {
    pub collection_dataset: String,
    pub container_hash: String,
    pub path: String,
    pub hash: String,
    pub file_size_bytes: u64,
}

/// Normalize a dataset-relative path to the VFS convention: forward
/// slashes, a single leading `/`, no duplicate or trailing slashes (except
/// the root itself).
pub fn normalize_vfs_path(path: &str) -> String {
    let replaced = path.replace('\\', "/");
    let mut collapsed = String::with_capacity(replaced.len() + 1);
    let mut prev_slash = false;
    for c in replaced.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        collapsed.push(c);
    }
    if !collapsed.starts_with('/') {
        collapsed.insert(0, '/');
    }
    if collapsed.len() > 1 && collapsed.ends_with('/') {
        collapsed.pop();
    }
    collapsed
}

/// The strict ancestor chain of a path, excluding the root `/` itself.
///
/// `/a/b/c.txt` -> `["/a", "/a/b"]`; `/a/b/c/d.pdf` -> `["/a", "/a/b", "/a/b/c"]`.
pub fn parent_paths(path: &str) -> Vec<String> {
    let normalized = normalize_vfs_path(path);
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
    let mut out = Vec::new();
    if segments.len() <= 1 {
        return out;
    }
    let mut acc = String::new();
    for segment in &segments[..segments.len() - 1] {
        acc.push('/');
        acc.push_str(segment);
        out.push(acc.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_slashes() {
        assert_eq!(normalize_vfs_path("a/b//c"), "/a/b/c");
        assert_eq!(normalize_vfs_path("/a/b/"), "/a/b");
        assert_eq!(normalize_vfs_path("/"), "/");
        assert_eq!(normalize_vfs_path(""), "/");
    }

    #[test]
    fn parent_chain_s6() {
        assert_eq!(
            parent_paths("/a/b/c/d.pdf"),
            vec!["/a".to_string(), "/a/b".to_string(), "/a/b/c".to_string()]
        );
    }

    #[test]
    fn parent_chain_s10() {
        assert_eq!(
            parent_paths("/a/b/c.txt"),
            vec!["/a".to_string(), "/a/b".to_string()]
        );
    }

    #[test]
    fn top_level_file_has_no_parents() {
        assert_eq!(parent_paths("/a.txt"), Vec::<String>::new());
    }
}
