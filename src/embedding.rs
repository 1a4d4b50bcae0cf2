//! Reserved interface for embedding-based name retrieval (§1 Non-goals:
//! "embedding-based retrieval (interface reserved but unspecified)").
//!
//! No implementation ships in this crate. The trait exists so a future
//! vector-similarity backend (e.g. pgvector, as the original prototyped
//! with `search_by_name_embedding`) can be slotted in beside
//! [`crate::name_resolver`] without reshaping the Facade.

use async_trait::async_trait;

use crate::error::DomainResult;

#[async_trait]
pub trait NameEmbeddingIndex: Send + Sync {
    /// Returns up to `limit` clean names ranked by embedding similarity to
    /// `query`. Unimplemented in this crate.
    async fn nearest_names(&self, query: &str, limit: usize) -> DomainResult<Vec<String>>;
}
