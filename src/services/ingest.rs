//! Ingest (§4.7): groups raw employment records by cleaned name, clusters
//! each group via the Disambiguator, and upserts one person + N employment
//! rows per cluster inside its own transaction.

use std::collections::HashMap;

use tracing::info;

use crate::config::{DisambiguatorConfig, IngestConfig};
use crate::disambiguation::cluster_employment_records;
use crate::domain::EmploymentRecord;
use crate::error::DomainResult;
use crate::graph::GraphCache;
use crate::repositories::{EmploymentRepository, OrganizationsRepository, PeopleRepository};
use crate::retry::classify;
use crate::store::Store;

/// Counts returned by [`Ingest::bulk_insert_records`] (§4.5).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
}

pub struct Ingest<'a> {
    store: &'a Store,
    graph_cache: &'a GraphCache,
    disambiguator_config: DisambiguatorConfig,
    ingest_config: IngestConfig,
}

impl<'a> Ingest<'a> {
    pub fn new(
        store: &'a Store,
        graph_cache: &'a GraphCache,
        disambiguator_config: DisambiguatorConfig,
        ingest_config: IngestConfig,
    ) -> Self {
        Self {
            store,
            graph_cache,
            disambiguator_config,
            ingest_config,
        }
    }

    /// Groups by `clean_name`, clusters each group, and upserts. Failures
    /// during one cluster roll back only that cluster; other clusters are
    /// unaffected. Refreshes `colleague_pairs` and invalidates the graph
    /// caches once, after all groups are processed.
    pub async fn bulk_insert_records(&self, records: Vec<EmploymentRecord>) -> DomainResult<IngestReport> {
        let mut by_name: HashMap<String, Vec<EmploymentRecord>> = HashMap::new();
        for record in records {
            by_name.entry(record.clean_name.clone()).or_default().push(record);
        }

        let mut report = IngestReport::default();
        let mut since_last_checkpoint = 0;

        for (clean_name, group) in by_name {
            report.total_processed += group.len();

            let top_ancestors = self.resolve_top_ancestors(&group).await?;
            let clusters = cluster_employment_records(
                &group,
                |url| top_ancestors.get(url).cloned().flatten(),
                &self.disambiguator_config,
            );

            for (disambiguation_key, cluster) in clusters.into_iter().enumerate() {
                let cluster_len = cluster.len();
                match self
                    .ingest_cluster(&clean_name, disambiguation_key as i32 + 1, &cluster)
                    .await
                {
                    Ok(successful) => report.successful += successful,
                    Err(_) => report.failed += cluster_len,
                }

                since_last_checkpoint += cluster_len;
                if since_last_checkpoint >= self.ingest_config.batch_size {
                    info!(
                        processed = report.total_processed,
                        successful = report.successful,
                        failed = report.failed,
                        "ingest checkpoint"
                    );
                    since_last_checkpoint = 0;
                }
            }
        }

        self.store.refresh_colleague_pairs().await?;
        self.graph_cache.invalidate().await;
        Ok(report)
    }

    /// Resolves each distinct org url in `group` to the name of its
    /// top-level ancestor (§4.2 "Enrichment"), for units that already exist
    /// in the store. A url with no matching unit yet (first time it's seen)
    /// has no ancestor to report.
    async fn resolve_top_ancestors(
        &self,
        group: &[EmploymentRecord],
    ) -> DomainResult<HashMap<String, Option<String>>> {
        let orgs_repo = self.store.organizations();
        let mut result = HashMap::new();

        for url in group.iter().map(|r| &r.org_url).collect::<std::collections::HashSet<_>>() {
            if result.contains_key(url) {
                continue;
            }
            let ancestor = match orgs_repo.find_by_url(url).await? {
                Some(org) => {
                    let ancestors = orgs_repo.get_all_ancestors(org.id).await?;
                    ancestors.first().map(|a| a.name.clone()).or(Some(org.name))
                }
                None => None,
            };
            result.insert(url.clone(), ancestor);
        }

        Ok(result)
    }

    /// Runs entirely inside one transaction: if any record in `cluster`
    /// fails to insert, the person row and every employment row already
    /// written for this cluster roll back with it, so a cluster either
    /// lands in full or not at all (§4.7 step 2).
    async fn ingest_cluster(
        &self,
        clean_name: &str,
        disambiguation_key: i32,
        cluster: &[EmploymentRecord],
    ) -> DomainResult<usize> {
        let mut tx = self.store.begin().await?;

        let display_name = cluster
            .first()
            .map(|r| r.raw_name.clone())
            .unwrap_or_else(|| clean_name.to_string());

        let person = PeopleRepository::create_in(
            &mut *tx,
            &display_name,
            clean_name,
            disambiguation_key,
            &serde_json::json!({}),
        )
        .await?;

        let mut successful = 0;
        for record in cluster {
            let org = match OrganizationsRepository::find_by_url_in(&mut *tx, &record.org_url).await? {
                Some(org) => org,
                None => {
                    OrganizationsRepository::create_in(
                        &mut *tx,
                        &record.org_url,
                        None,
                        Some(&record.org_url),
                        None,
                        &serde_json::json!({}),
                    )
                    .await?
                }
            };

            EmploymentRepository::create_in(
                &mut *tx,
                person.id,
                org.id,
                Some(&record.rank),
                record.start_date,
                record.end_date,
                Some(&record.raw_name),
                &record.attributes,
            )
            .await?;

            successful += 1;
        }

        tx.commit().await.map_err(classify)?;
        Ok(successful)
    }
}
