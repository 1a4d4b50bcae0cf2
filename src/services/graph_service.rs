//! GraphService (C3, §4.4 via Facade): thin wrapper tying the cache to the
//! path/centrality algorithms in [`crate::graph`].

use crate::error::DomainResult;
use crate::graph::{
    calculate_centrality_metrics, shortest_path_temporal, shortest_path_time_agnostic,
    CentralityReport, PathNode, PathQuery, PathResult,
};
use crate::graph::GraphCache;
use crate::services::query_service::{CareerEntry, QueryService};
use crate::store::Store;

/// A path node, shaped by `query.ids_only` and `include_metadata` (§4.4,
/// §4.5 `shortest_path`): bare id when `ids_only`, else the node's name;
/// `include_metadata` additionally attaches a person's career list.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichedPathNode {
    Person {
        id: i64,
        name: Option<String>,
        career: Option<Vec<CareerEntry>>,
    },
    Org {
        id: i64,
        name: Option<String>,
    },
}

pub struct GraphService<'a> {
    store: &'a Store,
    cache: &'a GraphCache,
}

impl<'a> GraphService<'a> {
    pub fn new(store: &'a Store, cache: &'a GraphCache) -> Self {
        Self { store, cache }
    }

    /// `shortest_path(a_ids, b_ids, temporal?, people_only?, include_metadata?)` (§4.5).
    /// Dispatches to `G_colleague` when `temporal`, else `G_full`.
    pub async fn shortest_path(
        &self,
        query: PathQuery,
        temporal: bool,
        include_metadata: bool,
    ) -> DomainResult<Option<Vec<EnrichedPathNode>>> {
        let graphs = self.cache.get_or_build(self.store).await?;

        let result: Option<PathResult> = if temporal {
            shortest_path_temporal(&graphs, &query)
        } else {
            shortest_path_time_agnostic(&graphs, &query)
        };

        let Some(result) = result else {
            return Ok(None);
        };

        // §4.4: ids_only suppresses all name/metadata resolution and
        // returns bare ids regardless of include_metadata.
        if query.ids_only {
            return Ok(Some(
                result
                    .nodes
                    .into_iter()
                    .map(|node| match node {
                        PathNode::Person(id) => EnrichedPathNode::Person {
                            id,
                            name: None,
                            career: None,
                        },
                        PathNode::Org(id) => EnrichedPathNode::Org { id, name: None },
                    })
                    .collect(),
            ));
        }

        let query_service = QueryService::new(self.store, Default::default());

        let mut enriched = Vec::with_capacity(result.nodes.len());
        for node in result.nodes {
            enriched.push(match node {
                PathNode::Person(id) => {
                    let person = self.store.people().require(id).await?;
                    let career = if include_metadata {
                        Some(query_service.career_progression_by_person_id(id, false).await?)
                    } else {
                        None
                    };
                    EnrichedPathNode::Person {
                        id,
                        name: Some(person.name),
                        career,
                    }
                }
                PathNode::Org(id) => {
                    let org = self.store.organizations().require(id).await?;
                    EnrichedPathNode::Org {
                        id,
                        name: Some(org.name),
                    }
                }
            });
        }

        Ok(Some(enriched))
    }

    pub async fn centralities(&self) -> DomainResult<CentralityReport> {
        let graphs = self.cache.get_or_build(self.store).await?;
        Ok(calculate_centrality_metrics(&graphs))
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }
}
