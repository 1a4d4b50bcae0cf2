//! OrgService (§4.6): preseeds units and answers subtree/timeline queries.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::OrganizationRow;
use crate::error::DomainResult;
use crate::graph::GraphCache;
use crate::repositories::{OrgDescendantsDiff, OrganizationsRepository};
use crate::retry::classify;
use crate::store::Store;

/// Counts returned by [`OrgService::preseed_organizations`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreseedReport {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

/// One unit to preseed, as supplied by the caller.
#[derive(Debug, Clone)]
pub struct UnitSeed {
    pub name: String,
    pub department: Option<String>,
    pub url: String,
    pub parent_url: Option<String>,
    pub parts: Vec<String>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

pub struct OrgService<'a> {
    store: &'a Store,
    graph_cache: &'a GraphCache,
}

impl<'a> OrgService<'a> {
    pub fn new(store: &'a Store, graph_cache: &'a GraphCache) -> Self {
        Self { store, graph_cache }
    }

    /// Preseeds `units` in ascending depth (by `parts.len()`), remembering
    /// url -> id as it goes so later rows resolve parents from the
    /// in-memory map without a round-trip. Each unit's lookup-then-upsert
    /// runs inside its own transaction, so a failed unit rolls back cleanly
    /// without poisoning the rest of the batch (§4.6) — see DESIGN.md for
    /// why the transaction boundary is per-unit rather than one transaction
    /// spanning the whole call. Drops both graph caches on completion.
    pub async fn preseed_organizations(&self, mut units: Vec<UnitSeed>) -> DomainResult<PreseedReport> {
        units.sort_by_key(|unit| unit.parts.len());

        let mut url_to_id: HashMap<String, i64> = HashMap::new();
        let mut report = PreseedReport::default();

        for unit in units {
            let parent_id = unit
                .parent_url
                .as_ref()
                .and_then(|url| url_to_id.get(url))
                .copied();

            let mut metadata = unit.metadata.clone();
            metadata.insert(
                "parts".to_string(),
                serde_json::Value::Array(
                    unit.parts.iter().map(|p| serde_json::Value::String(p.clone())).collect(),
                ),
            );

            match self.preseed_one(&unit, parent_id, serde_json::Value::Object(metadata)).await {
                Ok((id, existed)) => {
                    url_to_id.insert(unit.url.clone(), id);
                    if existed {
                        report.updated += 1;
                    } else {
                        report.created += 1;
                    }
                }
                Err(_) => report.failed += 1,
            }
        }

        self.graph_cache.invalidate().await;
        Ok(report)
    }

    async fn preseed_one(
        &self,
        unit: &UnitSeed,
        parent_id: Option<i64>,
        metadata: serde_json::Value,
    ) -> DomainResult<(i64, bool)> {
        let mut tx = self.store.begin().await?;

        let existed = OrganizationsRepository::find_by_url_in(&mut *tx, &unit.url).await?.is_some();
        let row = OrganizationsRepository::create_in(
            &mut *tx,
            &unit.name,
            unit.department.as_deref(),
            Some(&unit.url),
            parent_id,
            &metadata,
        )
        .await?;

        tx.commit().await.map_err(classify)?;
        Ok((row.id, existed))
    }

    pub async fn get_active_descendants(&self, root: i64, date: NaiveDate) -> DomainResult<Vec<OrganizationRow>> {
        self.store.organizations().get_active_descendants(root, date).await
    }

    /// Union of `first_observed`/`last_observed` across the subtree, sorted.
    /// When `distinct`, collapses adjacent dates whose active-descendant
    /// sets are equal to the earlier one (§4.5 "Timeline distinctness").
    pub async fn get_org_timeline_dates(&self, root: i64, distinct: bool) -> DomainResult<Vec<NaiveDate>> {
        let dates = self.store.organizations().get_timeline_dates_for_subtree(root).await?;
        if !distinct {
            return Ok(dates);
        }

        let mut ids_by_date = Vec::with_capacity(dates.len());
        for &date in &dates {
            let descendants = self.get_active_descendants(root, date).await?;
            let mut ids: Vec<i64> = descendants.iter().map(|o| o.id).collect();
            ids.sort_unstable();
            ids_by_date.push(ids);
        }

        Ok(collapse_unchanged_dates(&dates, &ids_by_date))
    }

    pub async fn get_org_descendants_diff(
        &self,
        root: i64,
        d1: NaiveDate,
        d2: NaiveDate,
    ) -> DomainResult<Vec<OrgDescendantsDiff>> {
        self.store
            .organizations()
            .get_org_descendants_diff_between_dates(root, d1, d2)
            .await
    }

    pub async fn get_base_organizations(&self) -> DomainResult<Vec<OrganizationRow>> {
        self.store.organizations().find_by_depth(1).await
    }

    pub async fn update_parent_link(&self, org_id: i64, parent_org_id: Option<i64>) -> DomainResult<()> {
        self.store.organizations().update_parent_link(org_id, parent_org_id).await?;
        self.graph_cache.invalidate().await;
        Ok(())
    }
}

/// Drops any date whose active-descendant id set equals the previous kept
/// date's set — the pure core of the "distinct" timeline (§4.5, §8 scenario 6),
/// pulled out of [`OrgService::get_org_timeline_dates`] so it is testable
/// without a store.
fn collapse_unchanged_dates(dates: &[NaiveDate], ids_by_date: &[Vec<i64>]) -> Vec<NaiveDate> {
    let mut result = Vec::new();
    let mut previous_set: Option<&Vec<i64>> = None;

    for (date, ids) in dates.iter().zip(ids_by_date.iter()) {
        if previous_set != Some(ids) {
            result.push(*date);
            previous_set = Some(ids);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn timeline_distinctness_drops_unchanged_structure() {
        // §8 scenario 6: descendants added on 2019-01-01, unchanged on 2019-06-01.
        let dates = vec![date("2019-01-01"), date("2019-06-01")];
        let ids_by_date = vec![vec![10, 11], vec![10, 11]];
        let result = collapse_unchanged_dates(&dates, &ids_by_date);
        assert_eq!(result, vec![date("2019-01-01")]);
    }

    #[test]
    fn timeline_distinctness_keeps_actual_structural_changes() {
        let dates = vec![date("2019-01-01"), date("2019-06-01"), date("2020-01-01")];
        let ids_by_date = vec![vec![10], vec![10, 11], vec![10, 11]];
        let result = collapse_unchanged_dates(&dates, &ids_by_date);
        assert_eq!(result, vec![date("2019-01-01"), date("2019-06-01")]);
    }
}
