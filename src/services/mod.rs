//! Services composing the repositories and graphs into the operations the
//! Facade exposes (§4.5-§4.7).

pub mod graph_service;
pub mod ingest;
pub mod org_service;
pub mod query_service;

pub use graph_service::{EnrichedPathNode, GraphService};
pub use ingest::{Ingest, IngestReport};
pub use org_service::{OrgService, PreseedReport, UnitSeed};
pub use query_service::{CareerEntry, ColleagueEntry, NetworkSnapshotEntry, PersonProfile, QueryService};
