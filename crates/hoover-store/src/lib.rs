//! # hoover-store
//!
//! The ClickHouse-backed columnar store: VFS catalog (C2), type registry
//! (C3), and plan store (C4), plus the blob table, string-term interner,
//! text/entity rows, and container markers they all depend on.
//!
//! One file per table family, a shared client handle threaded through
//! every function, generalized from an embedded key-value model to a
//! remote columnar store so aggregation queries (`arrayDistinct`,
//! `groupArray`, anti-joins) can run against a real SQL engine.

pub mod attributes;
pub mod blob;
mod client;
pub mod container;
pub mod dataset;
mod error;
pub mod error_journal;
pub mod filetype;
pub mod interning;
pub mod metadata;
pub mod migrate;
pub mod plan;
pub mod text;
pub mod vfs;

pub use client::StoreClient;
pub use error::StoreError;
