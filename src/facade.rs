//! Facade (F, §4.5): the single entry point exposing the public query API.
//!
//! Structured as an explicit handle with a defined lifecycle
//! (`Handle::init`/`handle.close()`), per the Design Notes §9 — the facade
//! and caches behave as process-wide singletons, but are never bare global
//! state.
//!
//! Every operation below accepts a [`CancellationToken`] (§5: "every public
//! operation must accept a cancellation signal") and races its body against
//! it via [`cancellable`]; a firing token drops the in-flight future (and
//! any pooled connection it holds) and surfaces `Cancelled` without partial
//! commits (§7).

use chrono::NaiveDate;

use crate::cancellation::{cancellable, CancellationToken};
use crate::config::Config;
use crate::domain::{EmploymentRecord, OrganizationRow};
use crate::error::DomainResult;
use crate::graph::{GraphCache, PathQuery};
use crate::repositories::OrgDescendantsDiff;
use crate::services::graph_service::{EnrichedPathNode, GraphService};
use crate::services::ingest::{Ingest, IngestReport};
use crate::services::org_service::{OrgService, PreseedReport, UnitSeed};
use crate::services::query_service::{CareerEntry, ColleagueEntry, NetworkSnapshotEntry, PersonProfile, QueryService};
use crate::store::Store;

/// Owns the store connection and the graph cache for the process lifetime.
/// Cheap to clone (an `Arc`-backed pool and an `Arc`-backed cache handle
/// underneath); cloning shares the same underlying resources.
#[derive(Clone)]
pub struct Handle {
    store: Store,
    graph_cache: GraphCache,
    config: Config,
}

impl Handle {
    /// Connects to the store, runs migrations, and returns a ready handle.
    pub async fn init(config: Config) -> DomainResult<Self> {
        let store = Store::connect(&config.store).await?;
        Ok(Self {
            store,
            graph_cache: GraphCache::new(),
            config,
        })
    }

    /// Releases the pooled connection. Further use of this handle (or
    /// clones sharing the same pool) after `close` will surface
    /// `DependencyUnavailable`.
    pub async fn close(&self) {
        self.store.close().await;
    }

    fn query_service(&self) -> QueryService<'_> {
        QueryService::new(&self.store, self.config.resolver)
    }

    fn org_service(&self) -> OrgService<'_> {
        OrgService::new(&self.store, &self.graph_cache)
    }

    fn graph_service(&self) -> GraphService<'_> {
        GraphService::new(&self.store, &self.graph_cache)
    }

    fn ingest(&self) -> Ingest<'_> {
        Ingest::new(&self.store, &self.graph_cache, self.config.disambiguator, self.config.ingest)
    }

    pub async fn find_colleagues(
        &self,
        name: &str,
        date: Option<NaiveDate>,
        fuzzy: bool,
        cancel: &CancellationToken,
    ) -> DomainResult<Vec<ColleagueEntry>> {
        cancellable(cancel, self.query_service().find_colleagues(name, date, fuzzy)).await
    }

    pub async fn find_person_by_name(
        &self,
        name: &str,
        fuzzy: bool,
        include_profile: bool,
        include_ancestors: bool,
        cancel: &CancellationToken,
    ) -> DomainResult<Vec<PersonProfile>> {
        cancellable(
            cancel,
            self.query_service()
                .find_person_by_name(name, fuzzy, include_profile, include_ancestors),
        )
        .await
    }

    pub async fn career_progression_by_name(
        &self,
        name: &str,
        fuzzy: bool,
        cluster_by_rank_and_entity: bool,
        cancel: &CancellationToken,
    ) -> DomainResult<Vec<(crate::domain::PersonRow, Vec<CareerEntry>)>> {
        cancellable(
            cancel,
            self.query_service()
                .career_progression_by_name(name, fuzzy, cluster_by_rank_and_entity),
        )
        .await
    }

    pub async fn career_progression_by_person_id(
        &self,
        person_id: i64,
        cluster_by_rank_and_entity: bool,
        cancel: &CancellationToken,
    ) -> DomainResult<Vec<CareerEntry>> {
        cancellable(
            cancel,
            self.query_service()
                .career_progression_by_person_id(person_id, cluster_by_rank_and_entity),
        )
        .await
    }

    pub async fn network_snapshot(
        &self,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> DomainResult<Vec<NetworkSnapshotEntry>> {
        cancellable(cancel, self.query_service().network_snapshot(date)).await
    }

    pub async fn find_people_by_temporal_overlap(
        &self,
        person_id: i64,
        name_filter: Option<&str>,
        limit: i64,
        cancel: &CancellationToken,
    ) -> DomainResult<Vec<crate::domain::EmploymentRow>> {
        cancellable(
            cancel,
            self.query_service()
                .find_people_by_temporal_overlap(person_id, name_filter, limit),
        )
        .await
    }

    pub async fn shortest_path(
        &self,
        query: PathQuery,
        temporal: bool,
        include_metadata: bool,
        cancel: &CancellationToken,
    ) -> DomainResult<Option<Vec<EnrichedPathNode>>> {
        cancellable(
            cancel,
            self.graph_service().shortest_path(query, temporal, include_metadata),
        )
        .await
    }

    pub async fn get_base_organizations(&self, cancel: &CancellationToken) -> DomainResult<Vec<OrganizationRow>> {
        cancellable(cancel, self.org_service().get_base_organizations()).await
    }

    pub async fn get_active_descendants(
        &self,
        root: i64,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> DomainResult<Vec<OrganizationRow>> {
        cancellable(cancel, self.org_service().get_active_descendants(root, date)).await
    }

    pub async fn get_org_timeline_dates(
        &self,
        root: i64,
        distinct: bool,
        cancel: &CancellationToken,
    ) -> DomainResult<Vec<NaiveDate>> {
        cancellable(cancel, self.org_service().get_org_timeline_dates(root, distinct)).await
    }

    pub async fn get_org_descendants_diff(
        &self,
        root: i64,
        d1: NaiveDate,
        d2: NaiveDate,
        cancel: &CancellationToken,
    ) -> DomainResult<Vec<OrgDescendantsDiff>> {
        cancellable(cancel, self.org_service().get_org_descendants_diff(root, d1, d2)).await
    }

    pub async fn preseed_organizations(
        &self,
        units: Vec<UnitSeed>,
        cancel: &CancellationToken,
    ) -> DomainResult<PreseedReport> {
        cancellable(cancel, self.org_service().preseed_organizations(units)).await
    }

    /// `bulk_insert_records(records, batch_size)` (§4.5). `batch_size` is
    /// read from configuration (§6); this parameter lets a caller override
    /// it for one call without reconstructing the handle.
    pub async fn bulk_insert_records(
        &self,
        records: Vec<EmploymentRecord>,
        batch_size: Option<usize>,
        cancel: &CancellationToken,
    ) -> DomainResult<IngestReport> {
        match batch_size {
            Some(batch_size) => {
                let mut config = self.config.ingest;
                config.batch_size = batch_size;
                let ingest = Ingest::new(&self.store, &self.graph_cache, self.config.disambiguator, config);
                cancellable(cancel, ingest.bulk_insert_records(records)).await
            }
            None => cancellable(cancel, self.ingest().bulk_insert_records(records)).await,
        }
    }
}
