//! Shared data model for the hoover4 ingestion pipeline.
//!
//! This crate holds no I/O: every type here is a plain row shape shared by
//! `hoover-store`/`hoover-search` (persistence) and the phase crates
//! (`hoover-scan`, `hoover-plan`, ...), plus the pure routing/encoding
//! functions that must give bit-identical answers regardless of which
//! crate calls them (coarse type mapping, string-term interning, path
//! normalization, UTF-8 chunking, batching).

mod batch;
mod blob;
mod chunk;
mod filetype;
mod interning;
mod plan;
mod text;
mod vfs;

pub use batch::{batch_files_by_size, batch_seq, SizedItem};
pub use blob::{Blob, SecondaryHashes, StorageSite, SMALL_BLOB_THRESHOLD_BYTES};
pub use chunk::{chunk_utf8, MAX_TEXT_PAGE_BYTES};
pub use filetype::{
    coarse_file_type, coarse_type_from_magika_group, CoarseType, DetectionResult, ExtractedBy, FileTypeRow,
};
pub use interning::{hash_string_to_uint63, StringTermField};
pub use plan::{plan_hash_of, PlanFinished, PlanHit, ProcessingPlan, PLAN_MAX_BYTES, PLAN_MAX_ITEMS};
pub use text::{EntityHit, EntityType, ProcessingErrorRow, TextContentRow};
pub use vfs::{normalize_vfs_path, parent_paths, VfsDirectory, VfsFile};

/// Dataset slug: lowercase `[a-z0-9_]+`, validated at creation time by the CLI.
pub type CollectionDataset = String;

/// Validate a dataset slug per the CLI's invariant (`add_disk_dataset`).
pub fn is_valid_dataset_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_validation() {
        assert!(is_valid_dataset_slug("my_dataset_1"));
        assert!(!is_valid_dataset_slug("My-Dataset"));
        assert!(!is_valid_dataset_slug(""));
    }
}
