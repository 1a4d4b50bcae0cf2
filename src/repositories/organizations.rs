use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Row};

use crate::domain::OrganizationRow;
use crate::error::{DomainError, DomainResult};
use crate::retry::{classify, with_retry};

#[derive(Debug, Clone, Copy, Default)]
pub struct OrgStats {
    pub total_units: i64,
    pub max_depth: i64,
}

/// One unit's membership in a diff between two dates (§4.6).
#[derive(Debug, Clone, PartialEq)]
pub struct OrgDescendantsDiff {
    pub org: OrganizationRow,
    pub status: DiffStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    Added,
    Removed,
    Unchanged,
}

pub struct OrganizationsRepository {
    pool: PgPool,
}

impl OrganizationsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts on the `url` unique constraint.
    pub async fn create(
        &self,
        name: &str,
        department: Option<&str>,
        url: Option<&str>,
        parent_org_id: Option<i64>,
        metadata: &serde_json::Value,
    ) -> DomainResult<OrganizationRow> {
        with_retry("organizations.create", || {
            Self::create_in(&self.pool, name, department, url, parent_org_id, metadata)
        })
        .await
    }

    /// Same upsert as [`Self::create`], run against an explicit executor —
    /// a `sqlx::Transaction` — instead of the pool. See
    /// [`crate::repositories::PeopleRepository::create_in`] for why this
    /// isn't wrapped in `with_retry`.
    pub async fn create_in<'e, E>(
        executor: E,
        name: &str,
        department: Option<&str>,
        url: Option<&str>,
        parent_org_id: Option<i64>,
        metadata: &serde_json::Value,
    ) -> DomainResult<OrganizationRow>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as::<_, OrganizationRow>(
            r#"
            INSERT INTO organizations (name, department, url, parent_org_id, metadata)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (url) DO UPDATE
                SET name = EXCLUDED.name,
                    department = EXCLUDED.department,
                    parent_org_id = EXCLUDED.parent_org_id,
                    metadata = EXCLUDED.metadata,
                    updated_at = now()
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(department)
        .bind(url)
        .bind(parent_org_id)
        .bind(metadata)
        .fetch_one(executor)
        .await
        .map_err(classify)
    }

    pub async fn find_by_org_id(&self, org_id: i64) -> DomainResult<Option<OrganizationRow>> {
        with_retry("organizations.find_by_org_id", || async {
            sqlx::query_as::<_, OrganizationRow>("SELECT * FROM organizations WHERE id = $1")
                .bind(org_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(classify)
        })
        .await
    }

    /// All known units, for graph construction (§4.4).
    pub async fn find_all(&self) -> DomainResult<Vec<OrganizationRow>> {
        with_retry("organizations.find_all", || async {
            sqlx::query_as::<_, OrganizationRow>("SELECT * FROM organizations")
                .fetch_all(&self.pool)
                .await
                .map_err(classify)
        })
        .await
    }

    pub async fn find_by_name(&self, name: &str) -> DomainResult<Vec<OrganizationRow>> {
        with_retry("organizations.find_by_name", || async {
            sqlx::query_as::<_, OrganizationRow>("SELECT * FROM organizations WHERE name = $1")
                .bind(name)
                .fetch_all(&self.pool)
                .await
                .map_err(classify)
        })
        .await
    }

    pub async fn find_by_url(&self, url: &str) -> DomainResult<Option<OrganizationRow>> {
        with_retry("organizations.find_by_url", || Self::find_by_url_in(&self.pool, url)).await
    }

    /// Same lookup as [`Self::find_by_url`], run against an explicit
    /// executor — a `sqlx::Transaction` — instead of the pool.
    pub async fn find_by_url_in<'e, E>(executor: E, url: &str) -> DomainResult<Option<OrganizationRow>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as::<_, OrganizationRow>("SELECT * FROM organizations WHERE url = $1")
            .bind(url)
            .fetch_optional(executor)
            .await
            .map_err(classify)
    }

    pub async fn get_children(&self, org_id: i64) -> DomainResult<Vec<OrganizationRow>> {
        with_retry("organizations.get_children", || async {
            sqlx::query_as::<_, OrganizationRow>(
                "SELECT * FROM organizations WHERE parent_org_id = $1 ORDER BY name",
            )
            .bind(org_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
        })
        .await
    }

    /// Active descendants of `root` at `date`: a recursive CTE over
    /// `parent_org_id` filtered on the unit's recorded lifetime (§4.6).
    pub async fn get_active_descendants(
        &self,
        root: i64,
        date: NaiveDate,
    ) -> DomainResult<Vec<OrganizationRow>> {
        with_retry("organizations.get_active_descendants", || async {
            sqlx::query_as::<_, OrganizationRow>(
                r#"
                WITH RECURSIVE descendants AS (
                    SELECT * FROM organizations WHERE id = $1
                    UNION ALL
                    SELECT o.* FROM organizations o
                    JOIN descendants d ON o.parent_org_id = d.id
                )
                SELECT * FROM descendants
                WHERE COALESCE((metadata->>'first_observed')::date, '1900-01-01') <= $2
                  AND COALESCE((metadata->>'last_observed')::date, '9999-12-31') >= $2
                ORDER BY name
                "#,
            )
            .bind(root)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
        })
        .await
    }

    pub async fn get_all_descendants(&self, root: i64) -> DomainResult<Vec<OrganizationRow>> {
        with_retry("organizations.get_all_descendants", || async {
            sqlx::query_as::<_, OrganizationRow>(
                r#"
                WITH RECURSIVE descendants AS (
                    SELECT * FROM organizations WHERE id = $1
                    UNION ALL
                    SELECT o.* FROM organizations o
                    JOIN descendants d ON o.parent_org_id = d.id
                )
                SELECT * FROM descendants WHERE id != $1 ORDER BY name
                "#,
            )
            .bind(root)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
        })
        .await
    }

    /// Ancestors of `org_id`, nearest root first (sorted by ancestry depth).
    pub async fn get_all_ancestors(&self, org_id: i64) -> DomainResult<Vec<OrganizationRow>> {
        with_retry("organizations.get_all_ancestors", || async {
            sqlx::query_as::<_, OrganizationRow>(
                r#"
                WITH RECURSIVE ancestors AS (
                    SELECT * FROM organizations WHERE id = $1
                    UNION ALL
                    SELECT o.* FROM organizations o
                    JOIN ancestors a ON o.id = a.parent_org_id
                )
                SELECT * FROM ancestors WHERE id != $1
                "#,
            )
            .bind(org_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
        })
        .await
        .map(|mut ancestors| {
            ancestors.sort_by_key(|org| org.depth().unwrap_or(usize::MAX));
            ancestors
        })
    }

    /// Calls the store function `find_organizations_by_depth` (§6).
    pub async fn find_by_depth(&self, depth: i64) -> DomainResult<Vec<OrganizationRow>> {
        with_retry("organizations.find_by_depth", || async {
            sqlx::query_as::<_, OrganizationRow>(
                "SELECT * FROM find_organizations_by_depth($1)",
            )
            .bind(depth)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
        })
        .await
    }

    /// Union of `first_observed`/`last_observed` across the subtree, sorted
    /// ascending. Distinctness collapsing (§4.5 "Timeline distinctness") is
    /// the caller's responsibility since it needs the full descendant-set
    /// comparison, not just the dates.
    pub async fn get_timeline_dates_for_subtree(&self, root: i64) -> DomainResult<Vec<NaiveDate>> {
        with_retry("organizations.get_timeline_dates_for_subtree", || async {
            sqlx::query_as::<_, (NaiveDate,)>(
                r#"
                WITH RECURSIVE descendants AS (
                    SELECT * FROM organizations WHERE id = $1
                    UNION ALL
                    SELECT o.* FROM organizations o
                    JOIN descendants d ON o.parent_org_id = d.id
                )
                SELECT DISTINCT date FROM (
                    SELECT (metadata->>'first_observed')::date AS date FROM descendants
                    WHERE metadata->>'first_observed' IS NOT NULL
                    UNION
                    SELECT (metadata->>'last_observed')::date AS date FROM descendants
                    WHERE metadata->>'last_observed' IS NOT NULL
                ) dates
                ORDER BY date
                "#,
            )
            .bind(root)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
        })
        .await
        .map(|rows| rows.into_iter().map(|(date,)| date).collect())
    }

    /// Calls the store function `get_org_descendants_diff` (§6), which takes
    /// its date bounds as text and casts them internally.
    pub async fn get_org_descendants_diff_between_dates(
        &self,
        root: i64,
        d1: NaiveDate,
        d2: NaiveDate,
    ) -> DomainResult<Vec<OrgDescendantsDiff>> {
        with_retry("organizations.get_org_descendants_diff_between_dates", || async {
            let rows = sqlx::query(
                "SELECT org.*, diff.status AS diff_status FROM get_org_descendants_diff($1, $2, $3) AS diff JOIN organizations org ON org.id = diff.org_id",
            )
            .bind(root)
            .bind(d1.to_string())
            .bind(d2.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(classify)?;

            rows.iter()
                .map(|row| {
                    let org = OrganizationRow::from_row(row).map_err(classify)?;
                    let status: String = row.try_get("diff_status").map_err(classify)?;
                    Ok(OrgDescendantsDiff {
                        org,
                        status: match status.as_str() {
                            "added" => DiffStatus::Added,
                            "removed" => DiffStatus::Removed,
                            _ => DiffStatus::Unchanged,
                        },
                    })
                })
                .collect()
        })
        .await
    }

    pub async fn update_parent_link(&self, org_id: i64, parent_org_id: Option<i64>) -> DomainResult<()> {
        with_retry("organizations.update_parent_link", || async {
            sqlx::query("UPDATE organizations SET parent_org_id = $1, updated_at = now() WHERE id = $2")
                .bind(parent_org_id)
                .bind(org_id)
                .execute(&self.pool)
                .await
                .map_err(classify)
                .map(|_| ())
        })
        .await
    }

    pub async fn get_org_stats(&self) -> DomainResult<OrgStats> {
        with_retry("organizations.get_org_stats", || async {
            sqlx::query_as::<_, (i64, Option<i64>)>(
                r#"
                SELECT COUNT(*), MAX(jsonb_array_length(metadata->'parts'))
                FROM organizations
                "#,
            )
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
        })
        .await
        .map(|(total_units, max_depth)| OrgStats {
            total_units,
            max_depth: max_depth.unwrap_or(0),
        })
    }

    pub async fn require(&self, org_id: i64) -> DomainResult<OrganizationRow> {
        self.find_by_org_id(org_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("organization {org_id}")))
    }
}
