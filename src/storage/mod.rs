// src/storage/mod.rs
pub mod sqlite;

use async_trait::async_trait;
use crate::market::models::{AuctionRecord, AuctionStatistics, StoredAuction};
use crate::utils::error::StorageError;

pub use sqlite::SqliteStore;

/// Persistence for auction records. Append-only: bulk insert, list, aggregate, clear.
#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// Writes one run's records as a single batch, stamping them with the insert time.
    async fn insert_many(&self, records: &[AuctionRecord]) -> Result<Vec<StoredAuction>, StorageError>;

    /// All records, most recently scraped first.
    async fn list_all(&self) -> Result<Vec<StoredAuction>, StorageError>;

    async fn aggregate(&self) -> Result<AuctionStatistics, StorageError>;

    /// Removes every record and returns how many were removed.
    async fn delete_all(&self) -> Result<u64, StorageError>;
}

/// Outcome of a check-and-increment on the daily usage counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageDecision {
    Granted { calls_used: u32 },
    Exhausted { calls_used: u32 },
}

/// Calls-per-day bookkeeping for the extraction trigger.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Atomically increments `day`'s counter unless it already reached `limit`.
    async fn try_increment(&self, day: &str, limit: u32) -> Result<UsageDecision, StorageError>;

    async fn usage(&self, day: &str) -> Result<u32, StorageError>;
}
