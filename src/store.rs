//! Store handle: owns the pooled connection and the migration runner
//! (§6 "Persistent store"). Generalizes the teacher's `NatsClient` wrapper
//! (connect once, hand out a cheap-to-clone handle) to a `sqlx::PgPool`.

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::config::StoreConfig;
use crate::error::DomainResult;
use crate::repositories::{EmploymentRepository, OrganizationsRepository, PeopleRepository};
use crate::retry::classify;

/// A connected store, with the three typed repositories over it.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connects with the given pool bounds and runs pending migrations.
    pub async fn connect(config: &StoreConfig) -> DomainResult<Self> {
        info!(host = %config.host, database = %config.database, "connecting to store");

        let pool = PgPoolOptions::new()
            .min_connections(config.pool_min)
            .max_connections(config.pool_max)
            .connect(&config.connection_string())
            .await
            .map_err(classify)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|err| classify(sqlx::Error::Migrate(Box::new(err))))?;

        Ok(Self { pool })
    }

    pub fn people(&self) -> PeopleRepository {
        PeopleRepository::new(self.pool.clone())
    }

    pub fn organizations(&self) -> OrganizationsRepository {
        OrganizationsRepository::new(self.pool.clone())
    }

    pub fn employment(&self) -> EmploymentRepository {
        EmploymentRepository::new(self.pool.clone())
    }

    /// Refreshes the `colleague_pairs` materialized view (§4.7, after an
    /// Ingest batch completes).
    pub async fn refresh_colleague_pairs(&self) -> DomainResult<()> {
        sqlx::query("SELECT refresh_colleague_pairs()")
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Starts a transaction (§4.6/§4.7: `preseed_organizations` and each
    /// Ingest cluster run inside one). Not retried: a connection-level
    /// failure at `begin()` has done no work yet, so callers that want a
    /// retry can simply call this again.
    pub async fn begin(&self) -> DomainResult<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(classify)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
