use chrono::NaiveDate;
use sqlx::PgPool;

use crate::domain::EmploymentRow;
use crate::error::{DomainError, DomainResult};
use crate::retry::{classify, with_retry};

#[derive(Debug, Clone, Copy, Default)]
pub struct EmploymentStats {
    pub total_rows: i64,
    pub open_ended: i64,
}

pub struct EmploymentRepository {
    pool: PgPool,
}

impl EmploymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts by the unique tuple `(person_id, org_id, rank-or-empty,
    /// start_date, end_date)`, merging `tenure_days`/`raw_name`/attributes on
    /// conflict (§4.7 step 2).
    pub async fn create(
        &self,
        person_id: i64,
        org_id: i64,
        rank: Option<&str>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        raw_name: Option<&str>,
        attributes: &serde_json::Value,
    ) -> DomainResult<EmploymentRow> {
        with_retry("employment.create", || {
            Self::create_in(
                &self.pool,
                person_id,
                org_id,
                rank,
                start_date,
                end_date,
                raw_name,
                attributes,
            )
        })
        .await
    }

    /// Same upsert as [`Self::create`], run against an explicit executor —
    /// a `sqlx::Transaction` — instead of the pool. See
    /// [`crate::repositories::PeopleRepository::create_in`] for why this
    /// isn't wrapped in `with_retry`.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_in<'e, E>(
        executor: E,
        person_id: i64,
        org_id: i64,
        rank: Option<&str>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        raw_name: Option<&str>,
        attributes: &serde_json::Value,
    ) -> DomainResult<EmploymentRow>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let tenure_days = (end_date - start_date).num_days() as i32;

        sqlx::query_as::<_, EmploymentRow>(
            r#"
            INSERT INTO employment
                (person_id, org_id, rank, start_date, end_date, tenure_days, raw_name, attributes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (person_id, org_id, COALESCE(rank, ''), start_date, end_date) DO UPDATE
                SET tenure_days = EXCLUDED.tenure_days,
                    raw_name = EXCLUDED.raw_name,
                    attributes = EXCLUDED.attributes
            RETURNING *
            "#,
        )
        .bind(person_id)
        .bind(org_id)
        .bind(rank)
        .bind(start_date)
        .bind(end_date)
        .bind(tenure_days)
        .bind(raw_name)
        .bind(attributes)
        .fetch_one(executor)
        .await
        .map_err(classify)
    }

    /// All employment rows, for graph construction (§4.4).
    pub async fn find_all(&self) -> DomainResult<Vec<EmploymentRow>> {
        with_retry("employment.find_all", || async {
            sqlx::query_as::<_, EmploymentRow>("SELECT * FROM employment")
                .fetch_all(&self.pool)
                .await
                .map_err(classify)
        })
        .await
    }

    pub async fn find_by_employment_id(&self, id: i64) -> DomainResult<Option<EmploymentRow>> {
        with_retry("employment.find_by_employment_id", || async {
            sqlx::query_as::<_, EmploymentRow>("SELECT * FROM employment WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(classify)
        })
        .await
    }

    /// Ascending by `start_date`, as the Facade's `career_progression_by_*`
    /// operations expect (§4.5).
    pub async fn find_by_person_id(&self, person_id: i64) -> DomainResult<Vec<EmploymentRow>> {
        with_retry("employment.find_by_person_id", || async {
            sqlx::query_as::<_, EmploymentRow>(
                "SELECT * FROM employment WHERE person_id = $1 ORDER BY start_date ASC",
            )
            .bind(person_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
        })
        .await
    }

    pub async fn find_by_person_and_org(
        &self,
        person_id: i64,
        org_id: i64,
    ) -> DomainResult<Vec<EmploymentRow>> {
        with_retry("employment.find_by_person_and_org", || async {
            sqlx::query_as::<_, EmploymentRow>(
                "SELECT * FROM employment WHERE person_id = $1 AND org_id = $2 ORDER BY start_date ASC",
            )
            .bind(person_id)
            .bind(org_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
        })
        .await
    }

    pub async fn find_most_recent_end_date(&self, person_id: i64) -> DomainResult<Option<NaiveDate>> {
        with_retry("employment.find_most_recent_end_date", || async {
            sqlx::query_as::<_, (Option<NaiveDate>,)>(
                "SELECT MAX(end_date) FROM employment WHERE person_id = $1",
            )
            .bind(person_id)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
        })
        .await
        .map(|(date,)| date)
    }

    /// People who share a unit family (ancestors + descendants of `org_id`'s
    /// units) with `person_id` and whose interval overlaps theirs. A
    /// recursive CTE over the unit family, joined against overlapping
    /// employment rows (§4.5 `find_people_by_temporal_overlap`).
    ///
    /// `name_filter`, when given, ignores `limit` (matches the source's
    /// documented shape: a name search is not meant to be capped the way a
    /// browse listing is).
    pub async fn find_people_with_overlapping_employment(
        &self,
        person_id: i64,
        name_filter: Option<&str>,
        limit: i64,
    ) -> DomainResult<Vec<EmploymentRow>> {
        with_retry("employment.find_people_with_overlapping_employment", || async {
            let query = r#"
                WITH source_employments AS (
                    SELECT * FROM employment WHERE person_id = $1
                ),
                descendant_orgs AS (
                    WITH RECURSIVE d AS (
                        SELECT o.id FROM organizations o
                        JOIN source_employments se ON o.id = se.org_id
                        UNION ALL
                        SELECT o.id FROM organizations o
                        JOIN d ON o.parent_org_id = d.id
                    )
                    SELECT id FROM d
                ),
                ancestor_orgs AS (
                    WITH RECURSIVE a AS (
                        SELECT o.id, o.parent_org_id FROM organizations o
                        JOIN source_employments se ON o.id = se.org_id
                        UNION ALL
                        SELECT p.id, p.parent_org_id FROM organizations p
                        JOIN a ON p.id = a.parent_org_id
                    )
                    SELECT id FROM a
                ),
                org_family AS (
                    SELECT id FROM descendant_orgs UNION SELECT id FROM ancestor_orgs
                )
                SELECT e.* FROM employment e
                JOIN org_family f ON e.org_id = f.id
                JOIN source_employments se ON daterange(e.start_date, e.end_date, '[]')
                    && daterange(se.start_date, se.end_date, '[]')
                LEFT JOIN people p ON p.id = e.person_id
                WHERE e.person_id != $1
                    AND ($2::text IS NULL OR p.clean_name ILIKE '%' || $2 || '%')
                ORDER BY e.start_date
            "#;

            if name_filter.is_some() {
                sqlx::query_as::<_, EmploymentRow>(query)
                    .bind(person_id)
                    .bind(name_filter)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(classify)
            } else {
                sqlx::query_as::<_, EmploymentRow>(&format!("{query} LIMIT {limit}"))
                    .bind(person_id)
                    .bind(name_filter)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(classify)
            }
        })
        .await
    }

    pub async fn get_employment_stats(&self) -> DomainResult<EmploymentStats> {
        with_retry("employment.get_employment_stats", || async {
            sqlx::query_as::<_, (i64, i64)>(
                r#"
                SELECT COUNT(*), COUNT(*) FILTER (WHERE end_date >= '9999-01-01')
                FROM employment
                "#,
            )
            .fetch_one(&self.pool)
            .await
            .map_err(classify)
        })
        .await
        .map(|(total_rows, open_ended)| EmploymentStats {
            total_rows,
            open_ended,
        })
    }

    pub async fn require(&self, id: i64) -> DomainResult<EmploymentRow> {
        self.find_by_employment_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("employment row {id}")))
    }
}
