//! Document-store seam.
//! The application never talks to a concrete backend directly; everything
//! goes through the `DocumentStore` trait. Collections are addressed by
//! slash-separated paths (see `paths`), records are schemaless JSON maps at
//! the wire and parsed into typed records at the boundary.

mod document;
mod memory;
pub mod paths;
mod query;

pub use document::{to_fields, Document, DocumentData};
pub use memory::MemoryStore;
pub use query::{Direction, Query, RangeFilter};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// External document store collaborator.
///
/// `get`/`set` address a single document by key within a collection; `add`
/// appends a new document under a store-issued id; `query` returns the
/// collection filtered and ordered entirely by the store — callers must not
/// re-sort.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    async fn set(&self, collection: &str, key: &str, fields: DocumentData) -> Result<(), StoreError>;

    async fn add(&self, collection: &str, fields: DocumentData) -> Result<Document, StoreError>;

    async fn query(&self, collection: &str, query: Query) -> Result<Vec<Document>, StoreError>;
}
