//! Temporal organization graph: resolves messy, free-text employment
//! records into a canonical people/org graph with point-in-time queries.
//!
//! ## Architecture
//!
//! - `domain`: typed records for people, organizations, and employment (§3).
//! - `repositories`: `sqlx`-backed CRUD and query access per entity (§3, §6).
//! - `store`: pooled connection + migration runner tying repositories together.
//! - `rank`/`textsim`/`name_resolver`/`disambiguation`: the matching pipeline
//!   (§4.1-§4.3).
//! - `graph`: the two cached graphs (`G_full`, `G_colleague`) and the
//!   path/centrality algorithms over them (§4.4, §5).
//! - `services`: `OrgService`, `Ingest`, `QueryService`, `GraphService` (§4.5-§4.7).
//! - `facade`: the single public entry point, `Handle` (§4.5).
//! - `cancellation`: the `CancellationToken`/`cancellable` plumbing every
//!   `Handle` method races its body against (§5).
//! - `embedding`: reserved, unimplemented interface for future vector search.

pub mod cancellation;
pub mod config;
pub mod disambiguation;
pub mod domain;
pub mod embedding;
pub mod error;
pub mod facade;
pub mod graph;
pub mod name_resolver;
pub mod rank;
pub mod repositories;
pub mod retry;
pub mod services;
pub mod store;
pub mod textsim;

pub use cancellation::CancellationToken;
pub use config::Config;
pub use domain::{EdgeKind, EmploymentRecord, EmploymentRow, Node, OrganizationRow, PersonRow};
pub use error::{DomainError, DomainResult};
pub use facade::Handle;
pub use graph::{PathNode, PathQuery, PathResult};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
