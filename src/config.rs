//! Runtime configuration (§6).
//!
//! Plain structs with documented defaults, read from `TEMPORAL_ORG_*`
//! environment variables when present. The teacher pulls in no dedicated
//! config crate anywhere in its dependency tree, so none is introduced here
//! either — this follows the same minimal style visible in its
//! `nats::PersonSubjectBuilder` and friends.

use std::env;

/// Store connection settings (§6 "Store").
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub pool_min: u32,
    pub pool_max: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "temporal_org".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            pool_min: 1,
            pool_max: 10,
        }
    }
}

impl StoreConfig {
    /// Reads overrides from the environment, falling back to defaults for
    /// anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("TEMPORAL_ORG_DB_HOST").unwrap_or(defaults.host),
            port: env::var("TEMPORAL_ORG_DB_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            database: env::var("TEMPORAL_ORG_DB_NAME").unwrap_or(defaults.database),
            user: env::var("TEMPORAL_ORG_DB_USER").unwrap_or(defaults.user),
            password: env::var("TEMPORAL_ORG_DB_PASSWORD").unwrap_or(defaults.password),
            pool_min: env::var("TEMPORAL_ORG_DB_POOL_MIN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.pool_min),
            pool_max: env::var("TEMPORAL_ORG_DB_POOL_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.pool_max),
        }
    }

    /// A `postgres://` connection string built from the fields above.
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// NameResolver tuning (§4.3, §6 "NameResolver").
#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    /// Stage A: minimum trigram similarity, store-side.
    pub alpha: f64,
    /// Stage B: minimum token-set ratio against the query (0.0-1.0).
    pub beta: f64,
    /// Stage C: minimum pairwise token-set ratio to count as a strong link.
    pub gamma: f64,
    /// Maximum number of canonical names returned.
    pub limit: usize,
    /// Whether Stage C runs at all.
    pub pairwise_enabled: bool,
    /// Minimum strong links required to survive Stage C.
    pub min_strong_links: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            beta: 0.3,
            gamma: 0.8,
            limit: 10,
            pairwise_enabled: true,
            min_strong_links: 1,
        }
    }
}

/// Disambiguator tuning (§4.2, §6 "Disambiguator").
#[derive(Debug, Clone, Copy)]
pub struct DisambiguatorConfig {
    pub cohesion_threshold: i32,
}

impl Default for DisambiguatorConfig {
    fn default() -> Self {
        Self {
            cohesion_threshold: 1,
        }
    }
}

/// Ingest tuning (§6 "Ingest").
#[derive(Debug, Clone, Copy)]
pub struct IngestConfig {
    pub batch_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { batch_size: 1000 }
    }
}

/// Aggregate configuration for the whole crate.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub store: StoreConfig,
    pub resolver: ResolverConfig,
    pub disambiguator: DisambiguatorConfig,
    pub ingest: IngestConfig,
}

impl Config {
    /// Builds configuration from environment variables where present,
    /// defaults everywhere else.
    pub fn from_env() -> Self {
        Self {
            store: StoreConfig::from_env(),
            resolver: ResolverConfig::default(),
            disambiguator: DisambiguatorConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}
