use std::collections::{HashMap, VecDeque};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;

use crate::domain::Node;
use crate::graph::cache::CachedGraphs;

/// Betweenness/degree/closeness for one person, as returned by
/// [`calculate_centrality_metrics`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonCentrality {
    pub person_id: i64,
    pub betweenness: f64,
    pub degree: f64,
    pub closeness: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CentralityReport {
    pub people: Vec<PersonCentrality>,
}

/// Builds the person-projection graph from `G_full` (two persons connected
/// iff any undirected path exists between them, hierarchy edges included)
/// and computes betweenness, degree, and closeness on it (§4.4). There is
/// no built-in centrality in `petgraph`, so the three algorithms below are
/// hand-rolled, the same way the teacher's own `NetworkAnalysisService`
/// computes network metrics from scratch over its relation map.
pub fn calculate_centrality_metrics(graphs: &CachedGraphs) -> CentralityReport {
    let projection = build_person_projection(graphs);
    if projection.node_count() == 0 {
        return CentralityReport::default();
    }

    let betweenness = betweenness_centrality(&projection);
    let closeness = closeness_centrality(&projection);

    let people = projection
        .node_indices()
        .map(|idx| {
            let person_id = projection[idx];
            let degree = projection.neighbors(idx).count() as f64;
            let normalizer = (projection.node_count() - 1).max(1) as f64;
            PersonCentrality {
                person_id,
                betweenness: betweenness.get(&idx).copied().unwrap_or(0.0),
                degree: degree / normalizer,
                closeness: closeness.get(&idx).copied().unwrap_or(0.0),
            }
        })
        .collect();

    CentralityReport { people }
}

fn build_person_projection(graphs: &CachedGraphs) -> UnGraph<i64, ()> {
    let person_nodes: Vec<(i64, NodeIndex)> = graphs
        .full_index
        .iter()
        .filter_map(|(node, &idx)| match node {
            Node::Person(id) => Some((*id, idx)),
            Node::Org(_) => None,
        })
        .collect();

    let mut union_find = UnionFind::new(graphs.full.node_count());
    for edge in graphs.full.edge_indices() {
        if let Some((a, b)) = graphs.full.edge_endpoints(edge) {
            union_find.union(a.index(), b.index());
        }
    }

    let mut projection = UnGraph::new_undirected();
    let mut projection_index = HashMap::new();
    for &(person_id, _) in &person_nodes {
        projection_index.insert(person_id, projection.add_node(person_id));
    }

    for i in 0..person_nodes.len() {
        for j in (i + 1)..person_nodes.len() {
            let (id_a, idx_a) = person_nodes[i];
            let (id_b, idx_b) = person_nodes[j];
            if union_find.find(idx_a.index()) == union_find.find(idx_b.index()) {
                projection.add_edge(projection_index[&id_a], projection_index[&id_b], ());
            }
        }
    }

    projection
}

/// Brandes' algorithm for unweighted undirected graphs.
fn betweenness_centrality(graph: &UnGraph<i64, ()>) -> HashMap<NodeIndex, f64> {
    let mut betweenness: HashMap<NodeIndex, f64> =
        graph.node_indices().map(|n| (n, 0.0)).collect();

    for source in graph.node_indices() {
        let mut stack = Vec::new();
        let mut predecessors: HashMap<NodeIndex, Vec<NodeIndex>> =
            graph.node_indices().map(|n| (n, Vec::new())).collect();
        let mut sigma: HashMap<NodeIndex, f64> =
            graph.node_indices().map(|n| (n, 0.0)).collect();
        let mut distance: HashMap<NodeIndex, i64> =
            graph.node_indices().map(|n| (n, -1)).collect();

        sigma.insert(source, 1.0);
        distance.insert(source, 0);

        let mut queue = VecDeque::new();
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for w in graph.neighbors(v) {
                if distance[&w] < 0 {
                    distance.insert(w, distance[&v] + 1);
                    queue.push_back(w);
                }
                if distance[&w] == distance[&v] + 1 {
                    *sigma.get_mut(&w).unwrap() += sigma[&v];
                    predecessors.get_mut(&w).unwrap().push(v);
                }
            }
        }

        let mut delta: HashMap<NodeIndex, f64> = graph.node_indices().map(|n| (n, 0.0)).collect();
        while let Some(w) = stack.pop() {
            for &v in &predecessors[&w] {
                let contribution = (sigma[&v] / sigma[&w]) * (1.0 + delta[&w]);
                *delta.get_mut(&v).unwrap() += contribution;
            }
            if w != source {
                *betweenness.get_mut(&w).unwrap() += delta[&w];
            }
        }
    }

    // Undirected graph: Brandes counts each pair twice (once per direction).
    for value in betweenness.values_mut() {
        *value /= 2.0;
    }

    betweenness
}

fn closeness_centrality(graph: &UnGraph<i64, ()>) -> HashMap<NodeIndex, f64> {
    let mut result = HashMap::new();

    for source in graph.node_indices() {
        let distances = bfs_distances(graph, source);
        let reachable: Vec<i64> = distances.values().filter(|&&d| d > 0).copied().collect();
        let total: i64 = reachable.iter().sum();
        let closeness = if total > 0 {
            reachable.len() as f64 / total as f64
        } else {
            0.0
        };
        result.insert(source, closeness);
    }

    result
}

fn bfs_distances(graph: &UnGraph<i64, ()>, source: NodeIndex) -> HashMap<NodeIndex, i64> {
    let mut distance = HashMap::new();
    distance.insert(source, 0);
    let mut queue = VecDeque::new();
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        let current_distance = distance[&current];
        for neighbor in graph.neighbors(current) {
            if !distance.contains_key(&neighbor) {
                distance.insert(neighbor, current_distance + 1);
                queue.push_back(neighbor);
            }
        }
    }

    distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_graph_has_higher_betweenness_in_the_middle() {
        let mut graph: UnGraph<i64, ()> = UnGraph::new_undirected();
        let a = graph.add_node(1);
        let b = graph.add_node(2);
        let c = graph.add_node(3);
        graph.add_edge(a, b, ());
        graph.add_edge(b, c, ());

        let betweenness = betweenness_centrality(&graph);
        assert!(betweenness[&b] > betweenness[&a]);
        assert!(betweenness[&b] > betweenness[&c]);
    }

    #[test]
    fn isolated_node_has_zero_closeness() {
        let mut graph: UnGraph<i64, ()> = UnGraph::new_undirected();
        let a = graph.add_node(1);
        graph.add_node(2);
        let closeness = closeness_centrality(&graph);
        assert_eq!(closeness[&a], 0.0);
    }
}
