use crate::client::StoreClient;
use crate::error::StoreError;

/// Per-file aggregate pulled from `file_types` and `vfs_files`, the input
/// to P4's `index_metadatas` activity before interning. Mirrors the
/// original's `arrayDistinct(arrayFlatten(groupArray(...)))` aggregation:
/// distinct union of coarse types / mime types / extensions across every
/// detector row for the hash, plus the distinct set of VFS paths the hash
/// appears under.
#[derive(Debug, Clone, Default)]
pub struct FileMetadataAggregate {
    pub file_hash: String,
    pub coarse_types: Vec<String>,
    pub mime_types: Vec<String>,
    pub extensions: Vec<String>,
    pub paths: Vec<String>,
}

pub async fn aggregate_file_metadata(
    client: &StoreClient,
    dataset: &str,
    file_hashes: &[String],
) -> Result<Vec<FileMetadataAggregate>, StoreError> {
    if file_hashes.is_empty() {
        return Ok(Vec::new());
    }

    let type_rows: Vec<(String, Vec<String>, Vec<String>, Vec<String>)> = client
        .inner
        .query(
            "SELECT hash, \
                    arrayDistinct(arrayFlatten(groupArray(file_types))), \
                    arrayDistinct(arrayFlatten(groupArray(mime_types))), \
                    arrayDistinct(arrayFlatten(groupArray(extensions))) \
             FROM file_types WHERE collection_dataset = ? AND hash IN ? GROUP BY hash",
        )
        .bind(dataset)
        .bind(file_hashes)
        .fetch_all()
        .await?;

    let path_rows: Vec<(String, Vec<String>)> = client
        .inner
        .query(
            "SELECT hash, groupArray(path) FROM vfs_files \
             WHERE collection_dataset = ? AND hash IN ? GROUP BY hash",
        )
        .bind(dataset)
        .bind(file_hashes)
        .fetch_all()
        .await?;

    let mut by_hash: std::collections::HashMap<String, FileMetadataAggregate> =
        std::collections::HashMap::new();
    for (hash, coarse_types, mime_types, extensions) in type_rows {
        let entry = by_hash.entry(hash.clone()).or_insert_with(|| FileMetadataAggregate {
            file_hash: hash,
            ..Default::default()
        });
        entry.coarse_types = coarse_types;
        entry.mime_types = mime_types;
        entry.extensions = extensions;
    }
    for (hash, paths) in path_rows {
        let mut distinct: Vec<String> = paths;
        distinct.sort();
        distinct.dedup();
        let entry = by_hash.entry(hash.clone()).or_insert_with(|| FileMetadataAggregate {
            file_hash: hash,
            ..Default::default()
        });
        entry.paths = distinct;
    }

    Ok(by_hash.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_defaults_are_empty() {
        let agg = FileMetadataAggregate::default();
        assert!(agg.coarse_types.is_empty());
        assert!(agg.paths.is_empty());
    }
}
