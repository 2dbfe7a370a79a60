// src/api/routes.rs
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::market::models::{day_key, AuctionStatistics, StoredAuction, UsageSnapshot};
use crate::runner::Runner;
use crate::storage::{AuctionStore, UsageDecision, UsageLedger};
use crate::utils::AppError;

pub const DEFAULT_DAILY_LIMIT: u32 = 20;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn AuctionStore>,
    pub usage: Arc<dyn UsageLedger>,
    pub runner: Arc<Runner>,
    pub daily_limit: u32,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auctions", get(list_auctions).delete(clear_auctions))
        .route("/api/statistics", get(get_statistics))
        .route("/api/usage", get(get_usage))
        .route("/api/extract-data", post(extract_data))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct ExtractResponse {
    pub message: String,
    pub records_added: usize,
    pub data: Vec<StoredAuction>,
    pub calls_used: u32,
    pub calls_remaining: u32,
    pub daily_limit: u32,
}

#[derive(Serialize)]
pub struct RateLimitedResponse {
    pub error: String,
    pub calls_used: u32,
    pub calls_remaining: u32,
    pub daily_limit: u32,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn today() -> String {
    day_key(chrono::Utc::now())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_auctions(State(state): State<ApiState>) -> Result<Json<Vec<StoredAuction>>, AppError> {
    Ok(Json(state.store.list_all().await?))
}

async fn get_statistics(State(state): State<ApiState>) -> Result<Json<AuctionStatistics>, AppError> {
    Ok(Json(state.store.aggregate().await?))
}

async fn get_usage(State(state): State<ApiState>) -> Result<Json<UsageSnapshot>, AppError> {
    let today = today();
    let used = state.usage.usage(&today).await?;
    Ok(Json(UsageSnapshot::new(today, used, state.daily_limit)))
}

/// Runs one extraction if today's budget allows it. The call counts even if the run fails.
async fn extract_data(State(state): State<ApiState>) -> Result<Response, AppError> {
    let today = today();
    let calls_used = match state.usage.try_increment(&today, state.daily_limit).await? {
        UsageDecision::Granted { calls_used } => calls_used,
        UsageDecision::Exhausted { calls_used } => {
            tracing::warn!("Daily extraction limit reached ({}/{})", calls_used, state.daily_limit);
            let body = RateLimitedResponse {
                error: format!(
                    "Daily API limit reached ({} calls). Please try again tomorrow.",
                    state.daily_limit
                ),
                calls_used,
                calls_remaining: 0,
                daily_limit: state.daily_limit,
            };
            return Ok((StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response());
        }
    };
    tracing::info!("Extraction triggered ({}/{} calls today)", calls_used, state.daily_limit);

    let stored = state.runner.run().await?;

    let usage = UsageSnapshot::new(today, calls_used, state.daily_limit);
    Ok(Json(ExtractResponse {
        message: "Data extraction completed successfully".to_string(),
        records_added: stored.len(),
        data: stored,
        calls_used: usage.calls_used,
        calls_remaining: usage.calls_remaining,
        daily_limit: usage.daily_limit,
    })
    .into_response())
}

async fn clear_auctions(State(state): State<ApiState>) -> Result<Json<MessageResponse>, AppError> {
    let removed = state.store.delete_all().await?;
    tracing::info!("Cleared {} auction records via API", removed);
    Ok(Json(MessageResponse {
        message: "All auction data cleared".to_string(),
    }))
}
