use sqlx::PgPool;
use tracing::warn;

use crate::domain::PersonRow;
use crate::error::{DomainError, DomainResult};
use crate::name_resolver::TrigramCandidate;
use crate::retry::{classify, with_retry};

/// `pg_trgm`'s "function does not exist" SQLSTATE, returned when the
/// extension isn't installed on the target database.
const UNDEFINED_FUNCTION: &str = "42883";

#[derive(Debug, Clone, Copy, Default)]
pub struct NameStats {
    pub distinct_names: i64,
}

pub struct PeopleRepository {
    pool: PgPool,
}

impl PeopleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts on the `(name, disambiguation_key)` unique constraint.
    pub async fn create(
        &self,
        name: &str,
        clean_name: &str,
        disambiguation_key: i32,
        attributes: &serde_json::Value,
    ) -> DomainResult<PersonRow> {
        with_retry("people.create", || {
            Self::create_in(&self.pool, name, clean_name, disambiguation_key, attributes)
        })
        .await
    }

    /// Same upsert as [`Self::create`], run against an explicit executor
    /// (typically a `sqlx::Transaction`) instead of the pool, so callers
    /// that need atomicity across several repository calls — `Ingest`,
    /// `OrgService::preseed_organizations` — can run it inside their own
    /// transaction. Not retried: a statement that fails mid-transaction
    /// leaves the transaction aborted, so there's nothing a retry of just
    /// this statement could recover.
    pub async fn create_in<'e, E>(
        executor: E,
        name: &str,
        clean_name: &str,
        disambiguation_key: i32,
        attributes: &serde_json::Value,
    ) -> DomainResult<PersonRow>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as::<_, PersonRow>(
            r#"
            INSERT INTO people (name, clean_name, disambiguation_key, attributes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name, disambiguation_key) DO UPDATE
                SET clean_name = EXCLUDED.clean_name,
                    attributes = EXCLUDED.attributes,
                    updated_at = now()
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(clean_name)
        .bind(disambiguation_key)
        .bind(attributes)
        .fetch_one(executor)
        .await
        .map_err(classify)
    }

    pub async fn find_by_person_id(&self, person_id: i64) -> DomainResult<Option<PersonRow>> {
        with_retry("people.find_by_person_id", || async {
            sqlx::query_as::<_, PersonRow>("SELECT * FROM people WHERE id = $1")
                .bind(person_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(classify)
        })
        .await
    }

    /// All known people, for graph construction (§4.4).
    pub async fn find_all(&self) -> DomainResult<Vec<PersonRow>> {
        with_retry("people.find_all", || async {
            sqlx::query_as::<_, PersonRow>("SELECT * FROM people")
                .fetch_all(&self.pool)
                .await
                .map_err(classify)
        })
        .await
    }

    pub async fn find_by_name(&self, clean_name: &str) -> DomainResult<Vec<PersonRow>> {
        with_retry("people.find_by_name", || async {
            sqlx::query_as::<_, PersonRow>(
                "SELECT * FROM people WHERE clean_name = $1 ORDER BY disambiguation_key",
            )
            .bind(clean_name)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
        })
        .await
    }

    /// Stage A of §4.3: up to `5*limit` rows by trigram similarity, falling
    /// back to substring containment (ordered by length then name) when
    /// `pg_trgm` isn't installed.
    pub async fn search_by_name_fuzzy(
        &self,
        query: &str,
        alpha: f64,
        limit: usize,
    ) -> DomainResult<Vec<TrigramCandidate>> {
        let prefilter_rows = (5 * limit) as i64;

        let trigram_result = sqlx::query_as::<_, (String, f32)>(
            r#"
            SELECT clean_name, similarity(clean_name, $1) AS score
            FROM people
            WHERE similarity(clean_name, $1) >= $2
            ORDER BY score DESC
            LIMIT $3
            "#,
        )
        .bind(query)
        .bind(alpha as f32)
        .bind(prefilter_rows)
        .fetch_all(&self.pool)
        .await;

        match trigram_result {
            Ok(rows) => Ok(rows
                .into_iter()
                .map(|(clean_name, score)| TrigramCandidate {
                    clean_name,
                    similarity: Some(score),
                })
                .collect()),
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some(UNDEFINED_FUNCTION) => {
                warn!("pg_trgm unavailable, falling back to substring search");
                self.search_by_name_substring(query, limit).await
            }
            Err(err) => Err(classify(err)),
        }
    }

    async fn search_by_name_substring(
        &self,
        query: &str,
        limit: usize,
    ) -> DomainResult<Vec<TrigramCandidate>> {
        with_retry("people.search_by_name_substring", || async {
            let pattern = format!("%{}%", query);
            sqlx::query_as::<_, (String,)>(
                r#"
                SELECT clean_name FROM people
                WHERE clean_name ILIKE $1
                ORDER BY length(clean_name), clean_name
                LIMIT $2
                "#,
            )
            .bind(pattern)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
        })
        .await
        .map(|rows| {
            rows.into_iter()
                .map(|(clean_name,)| TrigramCandidate {
                    clean_name,
                    similarity: None,
                })
                .collect()
        })
    }

    /// Per the Design Notes §9(b): the original's `get_name_stats` referenced
    /// a non-existent column in two variants; this crate defines the
    /// statistic as `count(distinct name)` only.
    pub async fn get_name_stats(&self) -> DomainResult<NameStats> {
        with_retry("people.get_name_stats", || async {
            sqlx::query_as::<_, (i64,)>("SELECT COUNT(DISTINCT name) FROM people")
                .fetch_one(&self.pool)
                .await
                .map_err(classify)
        })
        .await
        .map(|(distinct_names,)| NameStats { distinct_names })
    }

    pub async fn require(&self, person_id: i64) -> DomainResult<PersonRow> {
        self.find_by_person_id(person_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("person {person_id}")))
    }
}
