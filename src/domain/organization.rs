use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, Row};

/// Free-form attributes carried in the `organizations.metadata` JSONB column.
/// Typed rather than a raw `serde_json::Value` per the Design Notes, while
/// still tolerating unknown keys from pre-seed data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrgAttributes {
    /// Date this unit is first known to have existed.
    pub first_observed: Option<NaiveDate>,
    /// Date this unit is last known to have existed.
    pub last_observed: Option<NaiveDate>,
    /// Ordered ancestry tokens, used to determine hierarchical depth
    /// (`find_organizations_by_depth`).
    pub parts: Option<Vec<String>>,
    /// Anything else the source carried (`source`, `sgdi_entity_type`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An organizational unit (§3 "Organization"). `url` is the natural key
/// used for resolution during ingest/preseed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRow {
    pub id: i64,
    pub name: String,
    pub department: Option<String>,
    pub url: Option<String>,
    pub parent_org_id: Option<i64>,
    pub attributes: OrgAttributes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl sqlx::FromRow<'_, PgRow> for OrganizationRow {
    fn from_row(row: &PgRow) -> sqlx::Result<Self> {
        let raw_metadata: serde_json::Value = row.try_get("metadata")?;
        let attributes = serde_json::from_value(raw_metadata).unwrap_or_default();
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            department: row.try_get("department")?,
            url: row.try_get("url")?,
            parent_org_id: row.try_get("parent_org_id")?,
            attributes,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl OrganizationRow {
    /// Depth in the ancestry, as implied by `parts`. `find_organizations_by_depth`
    /// filters on this.
    pub fn depth(&self) -> Option<usize> {
        self.attributes.parts.as_ref().map(|p| p.len())
    }

    /// Whether this unit was active (existed) on `date`, per its recorded
    /// lifetime, defaulting to "always" when a bound is absent (§4.6).
    pub fn active_on(&self, date: NaiveDate) -> bool {
        let after_start = self
            .attributes
            .first_observed
            .map(|d| date >= d)
            .unwrap_or(true);
        let before_end = self
            .attributes
            .last_observed
            .map(|d| date <= d)
            .unwrap_or(true);
        after_start && before_end
    }
}
