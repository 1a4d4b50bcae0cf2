use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::domain::{EdgeKind, EmploymentRow, Node, OrganizationRow, PersonRow};

/// `G_full` (§4.4): every person and every unit as a node; an
/// `employed_at` edge per employment row, a `subunit_of` edge per
/// parent link. Used for time-agnostic shortest path, and as the basis
/// of the person-projection graph for centralities.
pub fn build_full_graph(
    people: &[PersonRow],
    orgs: &[OrganizationRow],
    employment: &[EmploymentRow],
) -> (DiGraph<Node, EdgeKind>, HashMap<Node, NodeIndex>) {
    let mut graph = DiGraph::new();
    let mut index = HashMap::new();

    for person in people {
        let node = Node::Person(person.id);
        index.insert(node, graph.add_node(node));
    }
    for org in orgs {
        let node = Node::Org(org.id);
        index.insert(node, graph.add_node(node));
    }

    for row in employment {
        let person_node = index[&Node::Person(row.person_id)];
        let org_node = match index.get(&Node::Org(row.org_id)) {
            Some(node) => *node,
            None => continue,
        };
        graph.add_edge(
            person_node,
            org_node,
            EdgeKind::EmployedAt {
                rank: row.rank.clone(),
                start_date: row.start_date,
                end_date: row.end_date,
            },
        );
    }

    for org in orgs {
        if let Some(parent_id) = org.parent_org_id {
            if let (Some(&child), Some(&parent)) =
                (index.get(&Node::Org(org.id)), index.get(&Node::Org(parent_id)))
            {
                graph.add_edge(child, parent, EdgeKind::SubunitOf);
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

    #[test]
    fn builds_nodes_and_both_edge_kinds() {
        let people = vec![PersonRow {
            id: 1,
            name: "Jane Tan".into(),
            clean_name: "jane tan".into(),
            tel: None,
            email: None,
            disambiguation_key: 1,
            attributes: serde_json::Value::Null,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }];
        let orgs = vec![
            OrganizationRow {
                id: 10,
                name: "Child Unit".into(),
                department: None,
                url: Some("/child".into()),
                parent_org_id: Some(20),
                attributes: Default::default(),
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            },
            OrganizationRow {
                id: 20,
                name: "Parent Unit".into(),
                department: None,
                url: Some("/parent".into()),
                parent_org_id: None,
                attributes: Default::default(),
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            },
        ];
        let employment = vec![EmploymentRow {
            id: 1,
            person_id: 1,
            org_id: 10,
            rank: Some("Manager".into()),
            start_date: date("2020-01-01"),
            end_date: date("2020-12-31"),
            tenure_days: Some(365),
            raw_name: None,
            attributes: serde_json::Value::Null,
            created_at: chrono::Utc::now(),
        }];

        let (graph, index) = build_full_graph(&people, &orgs, &employment);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(index.contains_key(&Node::Person(1)));
        assert!(index.contains_key(&Node::Org(10)));
    }
}
