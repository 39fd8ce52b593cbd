use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use guri_types::STORY_TTL_HOURS;

use crate::error::{PersistError, Result};
use guri_types::StoreStats;
use crate::trait_client::PersistenceClient;

/// Effective expiry of a story row, matching `Story::effective_expiry`.
/// `alias` qualifies the columns when the stories table is joined.
pub(crate) fn story_expiry_sql(alias: &str) -> String {
    format!(
        "COALESCE({a}expires_at, DATE_ADD({a}created_at, INTERVAL {ttl} HOUR))",
        a = alias,
        ttl = STORY_TTL_HOURS
    )
}

pub struct MySqlPersistenceClient {
    pub(crate) pool: MySqlPool,
    pub(crate) story_ttl: Duration,
}

impl MySqlPersistenceClient {
    /// Open a connection pool against `database_url`
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: std::time::Duration,
        story_ttl: Duration,
    ) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        tracing::info!(max_connections, "MySQL pool ready");
        Ok(Self::from_pool(pool, story_ttl))
    }

    pub fn from_pool(pool: MySqlPool, story_ttl: Duration) -> Self {
        Self { pool, story_ttl }
    }

    /// The underlying pool, for maintenance tasks
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    async fn count(&self, sql: &str) -> Result<i64> {
        Ok(sqlx::query_scalar::<_, i64>(sql).fetch_one(&self.pool).await?)
    }
}

#[async_trait]
impl PersistenceClient for MySqlPersistenceClient {
    fn backend(&self) -> &'static str {
        "mysql"
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), err)]
    async fn stats(&self, now: DateTime<Utc>) -> Result<StoreStats> {
        let live_stories = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM stories WHERE {} >= ?",
            story_expiry_sql("")
        ))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(StoreStats {
            properties: self.count("SELECT COUNT(*) FROM properties").await?,
            featured_properties: self
                .count("SELECT COUNT(*) FROM properties WHERE featured = TRUE AND agent_id IS NOT NULL")
                .await?,
            agents: self.count("SELECT COUNT(*) FROM agents").await?,
            projects: self.count("SELECT COUNT(*) FROM projects").await?,
            categories: self.count("SELECT COUNT(*) FROM categories").await?,
            services: self.count("SELECT COUNT(*) FROM services").await?,
            contacts: self.count("SELECT COUNT(*) FROM contacts").await?,
            new_contacts: self
                .count("SELECT COUNT(*) FROM contacts WHERE status = 'new'")
                .await?,
            stories: self.count("SELECT COUNT(*) FROM stories").await?,
            live_stories,
            users: self.count("SELECT COUNT(*) FROM users").await?,
        })
    }
}
