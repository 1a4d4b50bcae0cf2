use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::domain::EmploymentRow;

/// `G_colleague` (§4.4): undirected, people-only. For every unit, every
/// overlapping pair of its employees gets an edge carrying the list of
/// units where they overlapped. `O(sum(E_u^2))`, amortized over the
/// cache's lifetime.
pub fn build_colleague_graph(
    employment: &[EmploymentRow],
) -> (UnGraph<i64, Vec<i64>>, HashMap<i64, NodeIndex>) {
    let mut graph = UnGraph::new_undirected();
    let mut index: HashMap<i64, NodeIndex> = HashMap::new();
    let mut edge_index: HashMap<(i64, i64), petgraph::graph::EdgeIndex> = HashMap::new();

    let mut person_ids: Vec<i64> = employment.iter().map(|row| row.person_id).collect();
    person_ids.sort_unstable();
    person_ids.dedup();
    for person_id in person_ids {
        index.insert(person_id, graph.add_node(person_id));
    }

    let mut by_org: HashMap<i64, Vec<&EmploymentRow>> = HashMap::new();
    for row in employment {
        by_org.entry(row.org_id).or_default().push(row);
    }

    for (org_id, rows) in by_org {
        for i in 0..rows.len() {
            for j in (i + 1)..rows.len() {
                let a = rows[i];
                let b = rows[j];
                if a.person_id == b.person_id || !a.overlaps(b) {
                    continue;
                }
                let key = if a.person_id < b.person_id {
                    (a.person_id, b.person_id)
                } else {
                    (b.person_id, a.person_id)
                };

                match edge_index.get(&key) {
                    Some(&edge) => {
                        let units = &mut graph[edge];
                        if !units.contains(&org_id) {
                            units.push(org_id);
                        }
                    }
                    None => {
                        let edge = graph.add_edge(index[&key.0], index[&key.1], vec![org_id]);
                        edge_index.insert(key, edge);
                    }
                }
            }
        }
    }

    (graph, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(id: i64, person_id: i64, org_id: i64, start: &str, end: &str) -> EmploymentRow {
        EmploymentRow {
            id,
            person_id,
            org_id,
            rank: None,
            start_date: date(start),
            end_date: date(end),
            tenure_days: None,
            raw_name: None,
            attributes: serde_json::Value::Null,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn overlapping_employees_at_same_unit_get_an_edge() {
        let employment = vec![
            row(1, 1, 100, "2018-01-01", "2018-12-31"),
            row(2, 2, 100, "2018-06-01", "2019-06-01"),
        ];
        let (graph, index) = build_colleague_graph(&employment);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let edge = graph.find_edge(index[&1], index[&2]).unwrap();
        assert_eq!(graph[edge], vec![100]);
    }

    #[test]
    fn non_overlapping_employees_get_no_edge() {
        let employment = vec![
            row(1, 1, 100, "2018-01-01", "2018-06-01"),
            row(2, 2, 100, "2019-01-01", "2019-06-01"),
        ];
        let (graph, _) = build_colleague_graph(&employment);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn shared_units_accumulate_on_existing_edge() {
        let employment = vec![
            row(1, 1, 100, "2018-01-01", "2018-12-31"),
            row(2, 2, 100, "2018-01-01", "2018-12-31"),
            row(3, 1, 200, "2018-01-01", "2018-12-31"),
            row(4, 2, 200, "2018-01-01", "2018-12-31"),
        ];
        let (graph, index) = build_colleague_graph(&employment);
        assert_eq!(graph.edge_count(), 1);
        let edge = graph.find_edge(index[&1], index[&2]).unwrap();
        assert_eq!(graph[edge].len(), 2);
    }
}
