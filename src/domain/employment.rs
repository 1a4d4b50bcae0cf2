use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A stored employment row (§3 "Employment"). `start_date <= end_date`;
/// `(person_id, org_id, rank-or-empty, start_date, end_date)` is unique.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct EmploymentRow {
    pub id: i64,
    pub person_id: i64,
    pub org_id: i64,
    pub rank: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub tenure_days: Option<i32>,
    pub raw_name: Option<String>,
    #[sqlx(json)]
    pub attributes: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl EmploymentRow {
    /// Inclusive-on-both-ends interval overlap (§4.2 "Hard conflict").
    pub fn overlaps(&self, other: &EmploymentRow) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }
}

/// A not-yet-ingested raw employment record, as produced by whatever
/// upstream preprocessing hands records to Ingest/Disambiguator. Mirrors
/// `original_source`'s `raw_record` dict, typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentRecord {
    /// The cleaned person name shared by all records in a disambiguation group.
    pub clean_name: String,
    /// Display name as it appeared in the source.
    pub raw_name: String,
    /// Natural key of the organization this record is attached to.
    pub org_url: String,
    /// Free-text job title, as given.
    pub rank: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub attributes: serde_json::Value,
}

impl EmploymentRecord {
    pub fn overlaps(&self, other: &EmploymentRecord) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }
}
