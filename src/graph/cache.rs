use std::collections::HashMap;
use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use tokio::sync::RwLock;

use crate::domain::{EdgeKind, Node};
use crate::error::DomainResult;
use crate::graph::{build_colleague_graph, build_full_graph};
use crate::store::Store;

/// Both cached graphs together, built in one pass over the store (§4.4).
pub struct CachedGraphs {
    pub full: DiGraph<Node, EdgeKind>,
    pub full_index: HashMap<Node, NodeIndex>,
    pub colleague: UnGraph<i64, Vec<i64>>,
    pub colleague_index: HashMap<i64, NodeIndex>,
}

/// Single-writer-rebuild, multi-reader-use cache for both graphs (§5).
///
/// Readers hold a reference to the current cache; invalidation publishes
/// `None`; the next reader rebuilds under an exclusive lock and publishes
/// atomically. Mirrors the teacher's `infrastructure::persistence`
/// `Arc<RwLock<HashMap<...>>>` snapshot-store idiom, generalized to a
/// single optional cached value instead of a keyed map.
#[derive(Clone)]
pub struct GraphCache {
    inner: Arc<RwLock<Option<Arc<CachedGraphs>>>>,
}

impl Default for GraphCache {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current cache, building it on first use.
    pub async fn get_or_build(&self, store: &Store) -> DomainResult<Arc<CachedGraphs>> {
        if let Some(cached) = self.inner.read().await.clone() {
            return Ok(cached);
        }

        // The three reads are independent; fan them out concurrently
        // rather than paying three sequential round-trips (§5: "internal
        // fan-out... run concurrently").
        let (people, orgs, employment) = futures::try_join!(
            store.people().find_all(),
            store.organizations().find_all(),
            store.employment().find_all(),
        )?;

        let (full, full_index) = build_full_graph(&people, &orgs, &employment);
        let (colleague, colleague_index) = build_colleague_graph(&employment);

        let built = Arc::new(CachedGraphs {
            full,
            full_index,
            colleague,
            colleague_index,
        });

        let mut guard = self.inner.write().await;
        if guard.is_none() {
            *guard = Some(built.clone());
        }
        Ok(guard.as_ref().unwrap().clone())
    }

    /// Rebuilds from explicitly supplied rows, bypassing the store reads in
    /// [`Self::get_or_build`]. This is what `Ingest`/`OrgService` call after
    /// a successful write, and what tests use directly.
    pub async fn rebuild_from(
        &self,
        people: &[crate::domain::PersonRow],
        orgs: &[crate::domain::OrganizationRow],
        employment: &[crate::domain::EmploymentRow],
    ) -> Arc<CachedGraphs> {
        let (full, full_index) = build_full_graph(people, orgs, employment);
        let (colleague, colleague_index) = build_colleague_graph(employment);

        let built = Arc::new(CachedGraphs {
            full,
            full_index,
            colleague,
            colleague_index,
        });

        let mut guard = self.inner.write().await;
        *guard = Some(built.clone());
        built
    }

    /// Drops both caches (§4.4 "Caching & invalidation"). The next reader
    /// rebuilds under an exclusive lock.
    pub async fn invalidate(&self) {
        let mut guard = self.inner.write().await;
        *guard = None;
    }
}
