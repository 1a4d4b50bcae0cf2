//! Temporal Colleague Graph (C3, §4.4): two cached graphs built from the
//! store and a handful of read-only queries over them.
//!
//! Represented, per the Design Notes §9 ("cyclic graph structures"), as
//! adjacency lists keyed by integer/tagged ids with a side-table for
//! attributes — `petgraph`'s `Graph`/`UnGraph` give us exactly that without
//! a hand-rolled arena.

mod cache;
mod centrality;
mod colleague;
mod full;
mod path;

pub use cache::{CachedGraphs, GraphCache};
pub use centrality::{calculate_centrality_metrics, CentralityReport, PersonCentrality};
pub use path::{shortest_path_temporal, shortest_path_time_agnostic, PathNode, PathQuery, PathResult};

pub(crate) use colleague::build_colleague_graph;
pub(crate) use full::build_full_graph;
