// src/market/models.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Semantic type of a results table, and of every record extracted from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RecordType {
    Region,
    Technology,
    Calendar,
    Unknown,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Region => "region",
            RecordType::Technology => "technology",
            RecordType::Calendar => "calendar",
            RecordType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of auction results, as extracted from the page and before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct AuctionRecord {
    pub name: String,
    pub record_type: RecordType,
    pub volume_offered: Option<f64>,
    pub volume_allocated: f64,
    pub weighted_avg_price: f64,
}

/// A persisted record. `scraped_at` is stamped by the store when the batch is written.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct StoredAuction {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub volume_offered: Option<f64>,
    pub volume_allocated: f64,
    pub weighted_avg_price: f64,
    pub scraped_at: DateTime<Utc>,
}

/// Aggregate view over every stored record. All numeric fields are 0 on an empty store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct AuctionStatistics {
    pub count: i64,
    pub total_regions: i64,
    pub total_technologies: i64,
    pub avg_price: f64,
    pub avg_volume: f64,
    pub total_volume: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Daily trigger usage as reported to API callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSnapshot {
    pub today: String,
    pub calls_used: u32,
    pub calls_remaining: u32,
    pub daily_limit: u32,
}

impl UsageSnapshot {
    pub fn new(today: impl Into<String>, calls_used: u32, daily_limit: u32) -> Self {
        Self {
            today: today.into(),
            calls_used,
            calls_remaining: daily_limit.saturating_sub(calls_used),
            daily_limit,
        }
    }
}

/// Day key for the usage counter (UTC, `YYYY-MM-DD`).
pub fn day_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stored_record_serializes_type_in_lowercase() {
        let record = StoredAuction {
            id: 7,
            name: "Wind".to_string(),
            record_type: RecordType::Technology,
            volume_offered: None,
            volume_allocated: 1980.0,
            weighted_avg_price: 40.1,
            scraped_at: Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "technology");
        assert!(json["volume_offered"].is_null());
    }

    #[test]
    fn test_usage_snapshot_never_underflows() {
        let snapshot = UsageSnapshot::new("2026-10-16", 25, 20);
        assert_eq!(snapshot.calls_remaining, 0);
        assert_eq!(UsageSnapshot::new("2026-10-16", 3, 20).calls_remaining, 17);
    }

    #[test]
    fn test_day_key_is_iso_date() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 23, 59, 59).unwrap();
        assert_eq!(day_key(now), "2026-01-05");
    }
}
