// src/storage/sqlite.rs
use async_trait::async_trait;
use chrono::{SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use crate::market::models::{AuctionRecord, AuctionStatistics, StoredAuction};
use crate::storage::{AuctionStore, UsageDecision, UsageLedger};
use crate::utils::error::StorageError;

const MAX_CONNECTIONS: u32 = 5;

/// SQLite-backed store for auction records and the daily usage counter.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url` and applies migrations.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!("Database migrations applied");
        Ok(Self { pool })
    }

    /// Private in-memory database on a single connection.
    #[cfg(test)]
    pub async fn in_memory() -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        Self::from_pool(pool).await.expect("migrations")
    }
}

fn saturating_u32(n: i64) -> u32 {
    u32::try_from(n.max(0)).unwrap_or(u32::MAX)
}

#[async_trait]
impl AuctionStore for SqliteStore {
    async fn insert_many(&self, records: &[AuctionRecord]) -> Result<Vec<StoredAuction>, StorageError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        // Fixed-width timestamps keep text ordering chronological.
        let scraped_at = Utc::now().trunc_subsecs(6);
        let scraped_at_text = scraped_at.to_rfc3339_opts(SecondsFormat::Micros, true);

        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            let id = sqlx::query(
                r#"
                INSERT INTO auctions (
                    name, record_type, volume_offered, volume_allocated, weighted_avg_price, scraped_at
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.name)
            .bind(record.record_type)
            .bind(record.volume_offered)
            .bind(record.volume_allocated)
            .bind(record.weighted_avg_price)
            .bind(&scraped_at_text)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

            stored.push(StoredAuction {
                id,
                name: record.name.clone(),
                record_type: record.record_type,
                volume_offered: record.volume_offered,
                volume_allocated: record.volume_allocated,
                weighted_avg_price: record.weighted_avg_price,
                scraped_at,
            });
        }
        tx.commit().await?;

        tracing::info!("Stored {} auction records", stored.len());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<StoredAuction>, StorageError> {
        let rows = sqlx::query_as::<_, StoredAuction>(
            r#"
            SELECT id, name, record_type, volume_offered, volume_allocated, weighted_avg_price, scraped_at
            FROM auctions
            ORDER BY scraped_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn aggregate(&self) -> Result<AuctionStatistics, StorageError> {
        let stats = sqlx::query_as::<_, AuctionStatistics>(
            r#"
            SELECT
                COUNT(*) AS count,
                COALESCE(SUM(CASE WHEN record_type = 'region' THEN 1 ELSE 0 END), 0) AS total_regions,
                COALESCE(SUM(CASE WHEN record_type = 'technology' THEN 1 ELSE 0 END), 0) AS total_technologies,
                COALESCE(AVG(weighted_avg_price), 0.0) AS avg_price,
                COALESCE(AVG(volume_allocated), 0.0) AS avg_volume,
                COALESCE(SUM(volume_allocated), 0.0) AS total_volume,
                COALESCE(MIN(weighted_avg_price), 0.0) AS min_price,
                COALESCE(MAX(weighted_avg_price), 0.0) AS max_price
            FROM auctions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn delete_all(&self) -> Result<u64, StorageError> {
        let removed = sqlx::query("DELETE FROM auctions")
            .execute(&self.pool)
            .await?
            .rows_affected();
        tracing::info!("Deleted {} auction records", removed);
        Ok(removed)
    }
}

#[async_trait]
impl UsageLedger for SqliteStore {
    async fn try_increment(&self, day: &str, limit: u32) -> Result<UsageDecision, StorageError> {
        if limit == 0 {
            return Ok(UsageDecision::Exhausted { calls_used: self.usage(day).await? });
        }

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        // Check and increment in one statement; no row comes back once the limit is reached.
        let granted: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO api_usage (day, count, last_updated) VALUES (?, 1, ?)
            ON CONFLICT(day) DO UPDATE
                SET count = api_usage.count + 1, last_updated = excluded.last_updated
                WHERE api_usage.count < ?
            RETURNING count
            "#,
        )
        .bind(day)
        .bind(&now)
        .bind(i64::from(limit))
        .fetch_optional(&self.pool)
        .await?;

        match granted {
            Some(count) => Ok(UsageDecision::Granted { calls_used: saturating_u32(count) }),
            None => Ok(UsageDecision::Exhausted { calls_used: self.usage(day).await? }),
        }
    }

    async fn usage(&self, day: &str) -> Result<u32, StorageError> {
        let count: Option<i64> = sqlx::query_scalar("SELECT count FROM api_usage WHERE day = ?")
            .bind(day)
            .fetch_optional(&self.pool)
            .await?;
        Ok(count.map(saturating_u32).unwrap_or(0))
    }
}
