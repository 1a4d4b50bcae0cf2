use std::collections::{HashSet, VecDeque};

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::domain::Node;
use crate::graph::cache::CachedGraphs;

/// Inputs shared by both path queries (§4.4).
#[derive(Debug, Clone)]
pub struct PathQuery {
    pub sources: Vec<i64>,
    pub targets: Vec<i64>,
    pub people_only: bool,
    pub ids_only: bool,
}

/// A path through one of the cached graphs, already filtered per
/// `people_only`/`ids_only`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    pub nodes: Vec<PathNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathNode {
    Person(i64),
    Org(i64),
}

/// Time-agnostic shortest path over `G_full` (§4.4). Treats the directed
/// multigraph as undirected; BFS from every source to every target,
/// keeping the overall-shortest path.
pub fn shortest_path_time_agnostic(graphs: &CachedGraphs, query: &PathQuery) -> Option<PathResult> {
    let mut best: Option<Vec<NodeIndex>> = None;

    for &source_id in &query.sources {
        let Some(&source) = graphs.full_index.get(&Node::Person(source_id)) else {
            continue;
        };
        for &target_id in &query.targets {
            let Some(&target) = graphs.full_index.get(&Node::Person(target_id)) else {
                continue;
            };
            if let Some(path) = bfs_undirected(graphs, source, target) {
                if best.as_ref().map(|b| path.len() < b.len()).unwrap_or(true) {
                    best = Some(path);
                }
            }
        }
    }

    best.map(|indices| {
        let nodes: Vec<PathNode> = indices
            .into_iter()
            .map(|idx| match graphs.full[idx] {
                Node::Person(id) => PathNode::Person(id),
                Node::Org(id) => PathNode::Org(id),
            })
            .filter(|node| !query.people_only || matches!(node, PathNode::Person(_)))
            .collect();
        PathResult { nodes }
    })
}

fn bfs_undirected(graphs: &CachedGraphs, source: NodeIndex, target: NodeIndex) -> Option<Vec<NodeIndex>> {
    if source == target {
        return Some(vec![source]);
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    let mut parent = std::collections::HashMap::new();

    visited.insert(source);
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        let neighbors = graphs
            .full
            .edges_directed(current, Direction::Outgoing)
            .map(|e| e.target())
            .chain(graphs.full.edges_directed(current, Direction::Incoming).map(|e| e.source()));

        for neighbor in neighbors {
            if visited.insert(neighbor) {
                parent.insert(neighbor, current);
                if neighbor == target {
                    return Some(reconstruct(&parent, source, target));
                }
                queue.push_back(neighbor);
            }
        }
    }

    None
}

fn reconstruct(
    parent: &std::collections::HashMap<NodeIndex, NodeIndex>,
    source: NodeIndex,
    target: NodeIndex,
) -> Vec<NodeIndex> {
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        current = parent[&current];
        path.push(current);
    }
    path.reverse();
    path
}

/// Temporal shortest path over `G_colleague` (§4.4). On conversion back,
/// interleaves the connecting unit between each consecutive person pair by
/// reading `units[0]` off the traversed edge.
pub fn shortest_path_temporal(graphs: &CachedGraphs, query: &PathQuery) -> Option<PathResult> {
    let mut best: Option<Vec<NodeIndex>> = None;

    for &source_id in &query.sources {
        let Some(&source) = graphs.colleague_index.get(&source_id) else {
            continue;
        };
        for &target_id in &query.targets {
            let Some(&target) = graphs.colleague_index.get(&target_id) else {
                continue;
            };
            if let Some(path) = bfs_colleague(graphs, source, target) {
                if best.as_ref().map(|b| path.len() < b.len()).unwrap_or(true) {
                    best = Some(path);
                }
            }
        }
    }

    best.map(|indices| {
        let mut nodes = Vec::new();
        for (i, &idx) in indices.iter().enumerate() {
            let person_id = graphs.colleague[idx];
            nodes.push(PathNode::Person(person_id));

            if i + 1 < indices.len() {
                if let Some(edge) = graphs.colleague.find_edge(idx, indices[i + 1]) {
                    if let Some(&unit) = graphs.colleague[edge].first() {
                        nodes.push(PathNode::Org(unit));
                    }
                }
            }
        }
        PathResult {
            nodes: if query.people_only {
                nodes
                    .into_iter()
                    .filter(|n| matches!(n, PathNode::Person(_)))
                    .collect()
            } else {
                nodes
            },
        }
    })
}

fn bfs_colleague(graphs: &CachedGraphs, source: NodeIndex, target: NodeIndex) -> Option<Vec<NodeIndex>> {
    if source == target {
        return Some(vec![source]);
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    let mut parent = std::collections::HashMap::new();

    visited.insert(source);
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        for neighbor in graphs.colleague.neighbors(current) {
            if visited.insert(neighbor) {
                parent.insert(neighbor, current);
                if neighbor == target {
                    return Some(reconstruct(&parent, source, target));
                }
                queue.push_back(neighbor);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EmploymentRow, OrganizationRow, PersonRow};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn person(id: i64) -> PersonRow {
        PersonRow {
            id,
            name: format!("Person {id}"),
            clean_name: format!("person {id}"),
            tel: None,
            email: None,
            disambiguation_key: 1,
            attributes: serde_json::Value::Null,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn org(id: i64) -> OrganizationRow {
        OrganizationRow {
            id,
            name: format!("Unit {id}"),
            department: None,
            url: Some(format!("/unit{id}")),
            parent_org_id: None,
            attributes: Default::default(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn employment(id: i64, person_id: i64, org_id: i64, start: &str, end: &str) -> EmploymentRow {
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

    fn cached(people: Vec<PersonRow>, orgs: Vec<OrganizationRow>, employment: Vec<EmploymentRow>) -> CachedGraphs {
        let (full, full_index) = crate::graph::build_full_graph(&people, &orgs, &employment);
        let (colleague, colleague_index) = crate::graph::build_colleague_graph(&employment);
        CachedGraphs {
            full,
            full_index,
            colleague,
            colleague_index,
        }
    }

    #[test]
    fn temporal_path_interleaves_units_between_people() {
        // P1-U in 2018, P2-U in 2018, P2-V in 2020, P3-V in 2020.
        let people = vec![person(1), person(2), person(3)];
        let orgs = vec![org(100), org(200)];
        let employment_rows = vec![
            employment(1, 1, 100, "2018-01-01", "2018-12-31"),
            employment(2, 2, 100, "2018-01-01", "2018-12-31"),
            employment(3, 2, 200, "2020-01-01", "2020-12-31"),
            employment(4, 3, 200, "2020-01-01", "2020-12-31"),
        ];
        let graphs = cached(people, orgs, employment_rows);

        let query = PathQuery {
            sources: vec![1],
            targets: vec![3],
            people_only: false,
            ids_only: false,
        };
        let result = shortest_path_temporal(&graphs, &query).expect("path should exist");
        assert_eq!(
            result.nodes,
            vec![
                PathNode::Person(1),
                PathNode::Org(100),
                PathNode::Person(2),
                PathNode::Org(200),
                PathNode::Person(3),
            ]
        );
    }

    #[test]
    fn time_agnostic_path_connects_via_shared_unit_without_overlap_requirement() {
        let people = vec![person(1), person(2)];
        let orgs = vec![org(100)];
        let employment_rows = vec![
            employment(1, 1, 100, "2010-01-01", "2010-12-31"),
            employment(2, 2, 100, "2020-01-01", "2020-12-31"),
        ];
        let graphs = cached(people, orgs, employment_rows);

        let query = PathQuery {
            sources: vec![1],
            targets: vec![2],
            people_only: true,
            ids_only: false,
        };
        let result = shortest_path_time_agnostic(&graphs, &query).expect("path should exist");
        assert_eq!(result.nodes, vec![PathNode::Person(1), PathNode::Person(2)]);
    }

    #[test]
    fn no_path_returns_none() {
        let people = vec![person(1), person(2)];
        let graphs = cached(people, vec![], vec![]);
        let query = PathQuery {
            sources: vec![1],
            targets: vec![2],
            people_only: false,
            ids_only: false,
        };
        assert!(shortest_path_time_agnostic(&graphs, &query).is_none());
    }
}
