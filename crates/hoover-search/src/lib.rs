//! # hoover-search
//!
//! Client for the search-engine rows (`doc_text_pages`, `doc_metadata`),
//! speaking Manticore Search's MySQL wire protocol. The only place in the
//! repo that renders raw SQL tuple literals for multi-valued attributes --
//! [`tuple::repr_manticore_tuple`] takes `&[u64]` so that is a compile-time
//! guarantee, not a convention.

mod client;
mod rows;
mod schema;
mod tuple;

pub use client::SearchClient;
pub use rows::{insert_doc_metadata, insert_doc_text_pages, DocMetadataRow, DocTextPageRow, COMMIT_CHUNK_SIZE};
pub use schema::migrate;
pub use tuple::repr_manticore_tuple;
