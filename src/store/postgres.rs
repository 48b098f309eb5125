//! PostgreSQL edge list persistence.
//!
//! Stores one row per user and one row per logical friendship:
//!
//! ```sql
//! social_users(id BIGSERIAL PRIMARY KEY, name TEXT UNIQUE)
//! social_friendships(user_low BIGINT, user_high BIGINT, PRIMARY KEY (user_low, user_high))
//! ```
//!
//! ## Configuration
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 5)
//! - `DB_CONNECT_TIMEOUT_SECS`: Connection timeout (default: 10)

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use super::{EdgeSource, EdgeSourceError};

/// Configuration for the PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL.
    pub database_url: String,
    /// Maximum connections in pool (default: 5).
    pub max_connections: u32,
    /// Connection acquire timeout in seconds (default: 10).
    pub connect_timeout_secs: u64,
}

impl PostgresConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` when `DATABASE_URL` is not set.
    pub fn from_env() -> Option<Self> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty())?;
        Some(Self {
            database_url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        })
    }
}

/// Error type for PostgreSQL persistence.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<PostgresError> for EdgeSourceError {
    fn from(err: PostgresError) -> Self {
        EdgeSourceError::Backend(Box::new(err))
    }
}

impl From<sqlx::Error> for EdgeSourceError {
    fn from(err: sqlx::Error) -> Self {
        PostgresError::from(err).into()
    }
}

/// PostgreSQL-backed edge source.
pub struct PostgresEdgeSource {
    pool: PgPool,
}

impl PostgresEdgeSource {
    /// Connect with the given configuration.
    pub async fn new(config: PostgresConfig) -> Result<Self, PostgresError> {
        tracing::info!(
            max_connections = config.max_connections,
            connect_timeout_secs = config.connect_timeout_secs,
            "Initializing PostgreSQL connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .test_before_acquire(true)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), PostgresError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS social_users (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            )
            "#
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS social_friendships (
                user_low BIGINT NOT NULL REFERENCES social_users(id) ON DELETE CASCADE,
                user_high BIGINT NOT NULL REFERENCES social_users(id) ON DELETE CASCADE,
                PRIMARY KEY (user_low, user_high),
                CHECK (user_low < user_high)
            )
            "#
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Check if the database is reachable.
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

#[async_trait]
impl EdgeSource for PostgresEdgeSource {
    async fn fetch_edges(&self) -> Result<Vec<[String; 2]>, EdgeSourceError> {
        let rows = sqlx::query(
            r#"
            SELECT a.name AS source, b.name AS target
            FROM social_friendships f
            JOIN social_users a ON a.id = f.user_low
            JOIN social_users b ON b.id = f.user_high
            ORDER BY f.user_low, f.user_high
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok([row.try_get("source")?, row.try_get("target")?]))
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(EdgeSourceError::from)
    }

    async fn replace_edges(&self, edges: &[[String; 2]]) -> Result<(), EdgeSourceError> {
        let names: Vec<String> = edges
            .iter()
            .flat_map(|[a, b]| [a.clone(), b.clone()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM social_friendships").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM social_users").execute(&mut *tx).await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO social_users (name)
            SELECT * FROM UNNEST($1::text[])
            RETURNING id, name
            "#
        )
        .bind(&names)
        .fetch_all(&mut *tx)
        .await?;

        let mut ids: HashMap<String, i64> = HashMap::with_capacity(inserted.len());
        for row in &inserted {
            ids.insert(row.try_get("name")?, row.try_get("id")?);
        }

        let mut lows = Vec::with_capacity(edges.len());
        let mut highs = Vec::with_capacity(edges.len());
        for [a, b] in edges {
            if let (Some(&x), Some(&y)) = (ids.get(a), ids.get(b)) {
                if x != y {
                    lows.push(x.min(y));
                    highs.push(x.max(y));
                }
            }
        }

        sqlx::query(
            r#"
            INSERT INTO social_friendships (user_low, user_high)
            SELECT * FROM UNNEST($1::bigint[], $2::bigint[])
            ON CONFLICT DO NOTHING
            "#
        )
        .bind(&lows)
        .bind(&highs)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            users = names.len(),
            edges = lows.len(),
            "Edge list persisted"
        );

        Ok(())
    }

    async fn clear(&self) -> Result<(), EdgeSourceError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM social_friendships").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM social_users").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}
