//! # hoover-index
//!
//! The indexer (C9, phase P4): per finished plan, runs NER over extracted
//! text and writes interned search-engine rows for both text pages and
//! per-file metadata.

mod metadata_index;
mod text_index;
mod workflow;

pub use metadata_index::index_metadatas;
pub use text_index::index_text_content;
pub use workflow::{index_dataset_plan, IndexContext};
