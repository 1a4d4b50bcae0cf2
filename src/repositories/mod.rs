//! Typed repository layer over the store (§3, §4.2-§4.7), replacing the
//! hand-assembled SQL-per-call style of the original with `sqlx` query
//! functions returning the typed rows in [`crate::domain`].

mod employment;
mod organizations;
mod people;

pub use employment::{EmploymentRepository, EmploymentStats};
pub use organizations::{OrgDescendantsDiff, OrgStats, OrganizationsRepository};
pub use people::{NameStats, PeopleRepository};
