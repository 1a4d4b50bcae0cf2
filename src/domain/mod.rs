//! Typed records for the three store-backed entities (§3), replacing the
//! dynamic string-keyed maps of the original system per the Design Notes.

mod employment;
mod organization;
mod person;

pub use employment::{EmploymentRecord, EmploymentRow};
pub use organization::{OrgAttributes, OrganizationRow};
pub use person::PersonRow;

/// A stable node identity in the cached graphs (§4.4, §9 Design Notes:
/// "tagged variants for graph nodes instead of prefixed strings").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    Person(i64),
    Org(i64),
}

impl Node {
    pub fn is_person(&self) -> bool {
        matches!(self, Node::Person(_))
    }

    pub fn as_person_id(&self) -> Option<i64> {
        match self {
            Node::Person(id) => Some(*id),
            Node::Org(_) => None,
        }
    }
}

/// The relationship an edge in `G_full` carries (§4.4).
#[derive(Debug, Clone)]
pub enum EdgeKind {
    /// Person -> Org, carrying the employment interval and rank.
    EmployedAt {
        rank: Option<String>,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
    },
    /// Org -> parent Org.
    SubunitOf,
}
