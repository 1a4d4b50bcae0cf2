//! Disambiguator (C1, §4.2): partitions employment records that share one
//! cleaned name into clusters, each standing in for one real person.

use crate::config::DisambiguatorConfig;
use crate::domain::EmploymentRecord;
use crate::rank;

/// A record enriched with the fields the cohesion score needs, kept
/// alongside the original so callers get their record back untouched.
#[derive(Debug, Clone)]
struct Enriched {
    record: EmploymentRecord,
    top_ancestor: Option<String>,
    rank_score: i32,
}

/// One real person's worth of records, in input order.
pub type Cluster = Vec<EmploymentRecord>;

/// Partitions `records` (all sharing one cleaned name) into clusters.
///
/// `top_ancestor_of` resolves a record's org to the name of its top-level
/// ancestor unit (ascending `parent_org_id` until root); this keeps the
/// algorithm itself free of store access, matching the pure-pipeline shape
/// of [`crate::name_resolver`].
pub fn cluster_employment_records(
    records: &[EmploymentRecord],
    top_ancestor_of: impl Fn(&str) -> Option<String>,
    config: &DisambiguatorConfig,
) -> Vec<Cluster> {
    let mut enriched: Vec<Enriched> = records
        .iter()
        .map(|record| Enriched {
            top_ancestor: top_ancestor_of(&record.org_url),
            rank_score: rank::parse(&record.rank),
            record: record.clone(),
        })
        .collect();

    enriched.sort_by_key(|e| e.record.start_date);

    let mut clusters: Vec<Vec<Enriched>> = Vec::new();

    for candidate in enriched {
        let mut best_cluster: Option<(usize, i32)> = None;

        for (cluster_idx, cluster) in clusters.iter().enumerate() {
            if cluster
                .iter()
                .any(|member| is_hard_conflict(&candidate, member))
            {
                continue;
            }

            let total: i32 = cluster
                .iter()
                .map(|member| cohesion(&candidate, member))
                .sum();

            match best_cluster {
                Some((_, best_total)) if total <= best_total => {}
                _ => best_cluster = Some((cluster_idx, total)),
            }
        }

        match best_cluster {
            Some((idx, total)) if total >= config.cohesion_threshold => {
                clusters[idx].push(candidate);
            }
            _ => clusters.push(vec![candidate]),
        }
    }

    clusters
        .into_iter()
        .map(|cluster| cluster.into_iter().map(|e| e.record).collect())
        .collect()
}

fn has_temporal_overlap(a: &Enriched, b: &Enriched) -> bool {
    a.record.overlaps(&b.record)
}

fn is_hard_conflict(a: &Enriched, b: &Enriched) -> bool {
    has_temporal_overlap(a, b)
        && !rank::permits_overlap(&a.record.rank)
        && !rank::permits_overlap(&b.record.rank)
}

fn cohesion(candidate: &Enriched, member: &Enriched) -> i32 {
    let mut score = 0;

    if candidate.top_ancestor.is_some() && candidate.top_ancestor == member.top_ancestor {
        score += 5;
    }

    if has_temporal_overlap(candidate, member) {
        score -= 2;
        return score;
    }

    if candidate.rank_score > member.rank_score {
        score += 3;
    } else if candidate.rank_score == member.rank_score {
        score += 1;
    } else if candidate.rank_score < member.rank_score - 3 {
        score -= 10;
    }

    let gap_days = gap_days(candidate, member);
    if gap_days < 30 {
        score += 4;
    } else if gap_days < 180 {
        score += 2;
    }

    score
}

fn gap_days(a: &Enriched, b: &Enriched) -> i64 {
    let gap = if a.record.start_date >= b.record.end_date {
        a.record.start_date - b.record.end_date
    } else {
        b.record.start_date - a.record.end_date
    };
    gap.num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(org_url: &str, rank: &str, start: &str, end: &str) -> EmploymentRecord {
        EmploymentRecord {
            clean_name: "jane tan".to_string(),
            raw_name: "Jane Tan".to_string(),
            org_url: org_url.to_string(),
            rank: rank.to_string(),
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end_date: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
            attributes: serde_json::Value::Null,
        }
    }

    fn same_ancestor(_url: &str) -> Option<String> {
        Some("ministry-of-example".to_string())
    }

    fn config() -> DisambiguatorConfig {
        DisambiguatorConfig::default()
    }

    #[test]
    fn non_overlapping_sequential_jobs_cluster_together() {
        let records = vec![
            record("/a", "Manager", "2010-01-01", "2012-12-31"),
            record("/a", "Senior Director", "2013-01-01", "2016-12-31"),
        ];
        let clusters = cluster_employment_records(&records, same_ancestor, &config());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
    }

    #[test]
    fn overlapping_non_permissible_titles_split_into_two_people() {
        let records = vec![
            record("/a", "Director", "2010-01-01", "2015-12-31"),
            record("/b", "Manager", "2011-01-01", "2013-12-31"),
        ];
        let clusters = cluster_employment_records(&records, |_| None, &config());
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn overlapping_board_membership_is_a_soft_conflict_not_a_split() {
        let records = vec![
            record("/a", "Director", "2010-01-01", "2020-12-31"),
            record("/b", "Board Member", "2012-01-01", "2013-12-31"),
        ];
        let clusters = cluster_employment_records(&records, same_ancestor, &config());
        // soft conflict is allowed (penalized, not forbidden); same ancestor
        // cohesion (+5) outweighs the overlap penalty (-2).
        assert_eq!(clusters.len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let clusters = cluster_employment_records(&[], |_| None, &config());
        assert!(clusters.is_empty());
    }
}
