//! # hoover-scan
//!
//! The scanner (C5, phase P0): turns a directory tree into a deduplicated
//! `(blobs, VFS)` population. The same workflow is the re-entry point P3
//! uses after unpacking an archive, email attachments, PDF page chunks, or
//! video frames/subtitles into a scratch directory.

mod fs_walk;
mod ingest;
mod workflow;

pub use fs_walk::{path_has_unpaired_surrogate, scan_one_level, RawEntry};
pub use ingest::ingest_files_batch;
pub use workflow::{scan, ScanContext, ScanInput};
