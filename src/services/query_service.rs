//! QueryService (§4.5 via Facade): colleagues, career progression,
//! temporal-overlap candidates, network snapshot. Delegates name
//! resolution to [`crate::name_resolver`].

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::ResolverConfig;
use crate::domain::{EmploymentRow, OrganizationRow, PersonRow};
use crate::error::DomainResult;
use crate::name_resolver::{resolve, TrigramCandidate};
use crate::store::Store;

/// One (colleague, unit, rank) triple, as returned by `find_colleagues`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColleagueEntry {
    pub colleague_name: String,
    pub org_name: String,
    pub colleague_rank: Option<String>,
}

/// One entry in a career progression listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CareerEntry {
    pub org_id: i64,
    pub org_name: String,
    pub rank: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub tenure_days: i64,
    pub ancestor_chain: Vec<String>,
}

/// A person together with an optional career/ancestor enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonProfile {
    pub person: PersonRow,
    pub career: Option<Vec<CareerEntry>>,
    pub ancestors: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSnapshotEntry {
    pub person_id: i64,
    pub person_name: String,
    pub org_id: i64,
    pub org_name: String,
}

pub struct QueryService<'a> {
    store: &'a Store,
    resolver_config: ResolverConfig,
}

impl<'a> QueryService<'a> {
    pub fn new(store: &'a Store, resolver_config: ResolverConfig) -> Self {
        Self { store, resolver_config }
    }

    /// Resolves `name` to at most one canonical clean name via C2 when
    /// `fuzzy`, else treats it as already-canonical.
    async fn resolve_one(&self, name: &str, fuzzy: bool) -> DomainResult<Option<String>> {
        if !fuzzy {
            return Ok(Some(name.to_string()));
        }

        let candidates: Vec<TrigramCandidate> = self
            .store
            .people()
            .search_by_name_fuzzy(name, self.resolver_config.alpha, self.resolver_config.limit)
            .await?;
        let resolved = resolve(name, &candidates, &self.resolver_config);
        Ok(resolved.into_iter().next())
    }

    /// `find_colleagues(name, date?, fuzzy?)` (§4.5). Distinct
    /// `(colleague_name, org_name, colleague_rank)` triples; `date` filters
    /// to intervals covering that date, omitted means all time.
    pub async fn find_colleagues(
        &self,
        name: &str,
        date: Option<NaiveDate>,
        fuzzy: bool,
    ) -> DomainResult<Vec<ColleagueEntry>> {
        let Some(clean_name) = self.resolve_one(name, fuzzy).await? else {
            return Ok(Vec::new());
        };

        let pool = self.store.pool();
        let mut rows: Vec<(String, String, Option<String>)> = if let Some(date) = date {
            sqlx::query_as(
                "SELECT colleague_name, organization, colleague_rank FROM find_colleagues_at_date($1, $2)",
            )
            .bind(&clean_name)
            .bind(date)
            .fetch_all(pool)
            .await
        } else {
            sqlx::query_as(
                "SELECT colleague_name, organization, colleague_rank FROM find_all_colleagues($1)",
            )
            .bind(&clean_name)
            .fetch_all(pool)
            .await
        }
        .map_err(crate::retry::classify)?;

        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows.dedup();

        Ok(rows
            .into_iter()
            .map(|(colleague_name, org_name, colleague_rank)| ColleagueEntry {
                colleague_name,
                org_name,
                colleague_rank,
            })
            .collect())
    }

    /// `find_person_by_name(name, fuzzy?, include_profile?, include_ancestors?)` (§4.5).
    pub async fn find_person_by_name(
        &self,
        name: &str,
        fuzzy: bool,
        include_profile: bool,
        include_ancestors: bool,
    ) -> DomainResult<Vec<PersonProfile>> {
        let people_repo = self.store.people();

        let names: Vec<String> = if fuzzy {
            let candidates = people_repo
                .search_by_name_fuzzy(name, self.resolver_config.alpha, self.resolver_config.limit)
                .await?;
            resolve(name, &candidates, &self.resolver_config)
        } else {
            vec![name.to_string()]
        };

        let mut people = Vec::new();
        for clean_name in names {
            people.extend(people_repo.find_by_name(&clean_name).await?);
        }

        // Per-person enrichment is independent across people; fan it out
        // concurrently rather than one round-trip per person per field
        // (§5: "internal fan-out (e.g., many per-person enrichments) run
        // concurrently").
        futures::future::try_join_all(people.into_iter().map(|person| async move {
            let career = if include_profile {
                Some(self.career_progression_by_person_id(person.id, false).await?)
            } else {
                None
            };

            let ancestors = if include_ancestors {
                Some(self.most_recent_unit_ancestor_chain(person.id).await?)
            } else {
                None
            };

            Ok(PersonProfile {
                person,
                career,
                ancestors,
            })
        }))
        .await
    }

    async fn most_recent_unit_ancestor_chain(&self, person_id: i64) -> DomainResult<Vec<String>> {
        let employment = self.store.employment().find_by_person_id(person_id).await?;
        let Some(most_recent) = employment.iter().max_by_key(|row| row.end_date) else {
            return Ok(Vec::new());
        };

        let orgs_repo = self.store.organizations();
        let org = orgs_repo.require(most_recent.org_id).await?;
        let ancestors = orgs_repo.get_all_ancestors(most_recent.org_id).await?;

        if ancestors.is_empty() {
            // fallback to that unit alone when the chain is empty (§4.5)
            Ok(vec![org.name])
        } else {
            let mut chain: Vec<String> = ancestors.into_iter().map(|a| a.name).collect();
            chain.push(org.name);
            Ok(chain)
        }
    }

    /// `career_progression_by_name(name, …)` (§4.5).
    pub async fn career_progression_by_name(
        &self,
        name: &str,
        fuzzy: bool,
        cluster_by_rank_and_entity: bool,
    ) -> DomainResult<Vec<(PersonRow, Vec<CareerEntry>)>> {
        let Some(clean_name) = self.resolve_one(name, fuzzy).await? else {
            return Ok(Vec::new());
        };

        let mut result = Vec::new();
        for person in self.store.people().find_by_name(&clean_name).await? {
            let career = self
                .career_progression_by_person_id(person.id, cluster_by_rank_and_entity)
                .await?;
            result.push((person, career));
        }
        Ok(result)
    }

    /// `career_progression_by_person_id(id, …)` (§4.5). Ascending start
    /// date; if `cluster_by_rank_and_entity`, entries sharing (rank, unit)
    /// are merged by extending to the union interval and recomputing
    /// `tenure_days`.
    pub async fn career_progression_by_person_id(
        &self,
        person_id: i64,
        cluster_by_rank_and_entity: bool,
    ) -> DomainResult<Vec<CareerEntry>> {
        let employment_rows = self.store.employment().find_by_person_id(person_id).await?;
        let orgs_repo = self.store.organizations();

        let mut entries = Vec::new();
        for row in employment_rows {
            let org = orgs_repo.require(row.org_id).await?;
            let ancestors = orgs_repo.get_all_ancestors(row.org_id).await?;
            let mut ancestor_chain: Vec<String> = ancestors.into_iter().map(|a| a.name).collect();
            ancestor_chain.push(org.name.clone());

            entries.push(CareerEntry {
                org_id: org.id,
                org_name: org.name,
                rank: row.rank,
                start_date: row.start_date,
                end_date: row.end_date,
                tenure_days: row.tenure_days.map(|d| d as i64).unwrap_or_else(|| {
                    (row.end_date - row.start_date).num_days()
                }),
                ancestor_chain,
            });
        }

        entries.sort_by_key(|e| e.start_date);

        if cluster_by_rank_and_entity {
            entries = merge_by_rank_and_entity(entries);
        }

        Ok(entries)
    }

    /// `network_snapshot(date)` (§4.5): all employments whose interval
    /// contains `date`.
    pub async fn network_snapshot(&self, date: NaiveDate) -> DomainResult<Vec<NetworkSnapshotEntry>> {
        let rows: Vec<(i64, String, i64, String)> = sqlx::query_as(
            r#"
            SELECT p.id, p.name, o.id, o.name
            FROM employment e
            JOIN people p ON p.id = e.person_id
            JOIN organizations o ON o.id = e.org_id
            WHERE $1 BETWEEN e.start_date AND e.end_date
            "#,
        )
        .bind(date)
        .fetch_all(self.store.pool())
        .await
        .map_err(crate::retry::classify)?;

        Ok(rows
            .into_iter()
            .map(|(person_id, person_name, org_id, org_name)| NetworkSnapshotEntry {
                person_id,
                person_name,
                org_id,
                org_name,
            })
            .collect())
    }

    /// `find_people_by_temporal_overlap(id, name_filter?, limit)` (§4.5).
    pub async fn find_people_by_temporal_overlap(
        &self,
        person_id: i64,
        name_filter: Option<&str>,
        limit: i64,
    ) -> DomainResult<Vec<EmploymentRow>> {
        self.store
            .employment()
            .find_people_with_overlapping_employment(person_id, name_filter, limit)
            .await
    }

    pub async fn require_person(&self, person_id: i64) -> DomainResult<PersonRow> {
        self.store.people().require(person_id).await
    }

    pub async fn require_org(&self, org_id: i64) -> DomainResult<OrganizationRow> {
        self.store.organizations().require(org_id).await
    }
}

/// Merges entries sharing `(org_id, rank)` wherever they occur in the list,
/// not just when adjacent — two stints at the same rank in the same unit
/// with an intervening stint elsewhere still collapse into one entry.
/// Mirrors `_deduplicate_employment_profiles`'s global key map rather than
/// a single-lookback comparison.
fn merge_by_rank_and_entity(entries: Vec<CareerEntry>) -> Vec<CareerEntry> {
    let mut merged: Vec<CareerEntry> = Vec::new();
    let mut index_by_key: HashMap<(i64, Option<String>), usize> = HashMap::new();

    for entry in entries {
        let key = (entry.org_id, entry.rank.clone());

        if let Some(&index) = index_by_key.get(&key) {
            let existing = &mut merged[index];
            existing.end_date = existing.end_date.max(entry.end_date);
            existing.start_date = existing.start_date.min(entry.start_date);
            existing.tenure_days = (existing.end_date - existing.start_date).num_days();
            continue;
        }

        index_by_key.insert(key, merged.len());
        merged.push(entry);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(org_id: i64, rank: &str, start: &str, end: &str) -> CareerEntry {
        CareerEntry {
            org_id,
            org_name: "Unit".to_string(),
            rank: Some(rank.to_string()),
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end_date: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
            tenure_days: 0,
            ancestor_chain: vec![],
        }
    }

    #[test]
    fn merges_consecutive_entries_sharing_rank_and_unit() {
        let entries = vec![
            entry(1, "Manager", "2015-01-01", "2016-12-31"),
            entry(1, "Manager", "2017-01-01", "2018-12-31"),
        ];
        let merged = merge_by_rank_and_entity(entries);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start_date.to_string(), "2015-01-01");
        assert_eq!(merged[0].end_date.to_string(), "2018-12-31");
    }

    #[test]
    fn keeps_entries_with_different_rank_separate() {
        let entries = vec![
            entry(1, "Manager", "2015-01-01", "2016-12-31"),
            entry(1, "Director", "2017-01-01", "2018-12-31"),
        ];
        let merged = merge_by_rank_and_entity(entries);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merges_same_rank_and_unit_across_an_intervening_stint() {
        let entries = vec![
            entry(1, "Manager", "2015-01-01", "2016-12-31"),
            entry(2, "Director", "2017-01-01", "2018-12-31"),
            entry(1, "Manager", "2019-01-01", "2020-12-31"),
        ];
        let merged = merge_by_rank_and_entity(entries);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].org_id, 1);
        assert_eq!(merged[0].start_date.to_string(), "2015-01-01");
        assert_eq!(merged[0].end_date.to_string(), "2020-12-31");
        assert_eq!(merged[1].org_id, 2);
    }
}
