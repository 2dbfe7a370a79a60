// src/runner.rs
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::extractors::AuctionExtractor;
use crate::market::client::DocumentSource;
use crate::market::models::StoredAuction;
use crate::storage::AuctionStore;
use crate::utils::{self, AppError};

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum RunPhase {
    Idle,
    Fetching,
    Parsing,
    Persisting,
    Succeeded(usize),
    Failed(String),
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => f.write_str("idle"),
            RunPhase::Fetching => f.write_str("fetching"),
            RunPhase::Parsing => f.write_str("parsing"),
            RunPhase::Persisting => f.write_str("persisting"),
            RunPhase::Succeeded(n) => write!(f, "succeeded ({} records)", n),
            RunPhase::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// One end-to-end extraction: fetch the page, extract records, store them as one batch.
/// Holds no per-run state, so concurrent runs are safe.
pub struct Runner {
    source: Arc<dyn DocumentSource>,
    store: Arc<dyn AuctionStore>,
    extractor: AuctionExtractor,
    url: String,
    debug_dir: Option<PathBuf>,
}

impl Runner {
    pub fn new(source: Arc<dyn DocumentSource>, store: Arc<dyn AuctionStore>, url: impl Into<String>) -> Self {
        Self {
            source,
            store,
            extractor: AuctionExtractor::new(),
            url: url.into(),
            debug_dir: None,
        }
    }

    /// Dump each run's page and outcome under `dir/<timestamp>/`.
    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    pub async fn run(&self) -> Result<Vec<StoredAuction>, AppError> {
        let mut phase = RunPhase::Idle;
        let dump_dir = self.debug_dir.as_ref().map(|root| {
            root.join(chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ").to_string())
        });

        let result = self.execute(&mut phase, dump_dir.as_deref()).await;

        match &result {
            Ok(stored) => advance(&mut phase, RunPhase::Succeeded(stored.len())),
            Err(e) => {
                advance(&mut phase, RunPhase::Failed(e.to_string()));
                if let Some(dir) = &dump_dir {
                    write_failure(dir, &self.url, e);
                }
            }
        }
        result
    }

    async fn execute(&self, phase: &mut RunPhase, dump_dir: Option<&Path>) -> Result<Vec<StoredAuction>, AppError> {
        advance(phase, RunPhase::Fetching);
        let html = self.source.fetch(&self.url).await?;
        tracing::info!("Fetched market page ({} bytes)", html.len());

        if let Some(dir) = dump_dir {
            write_page_dump(dir, &html);
        }

        advance(phase, RunPhase::Parsing);
        let records = self.extractor.run_extraction(&html)?;

        advance(phase, RunPhase::Persisting);
        let stored = self.store.insert_many(&records).await?;
        Ok(stored)
    }
}

fn advance(phase: &mut RunPhase, next: RunPhase) {
    match &next {
        RunPhase::Failed(_) => tracing::error!("Run {} -> {}", phase, next),
        _ => tracing::info!("Run {} -> {}", phase, next),
    }
    *phase = next;
}

// Dump failures are only logged; they never fail the run.
fn write_page_dump(dir: &Path, html: &str) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::warn!("Failed to create debug directory {}: {}", dir.display(), e);
        return;
    }

    let raw_path = dir.join("raw_page.html");
    match std::fs::write(&raw_path, html) {
        Ok(()) => tracing::info!("Saved raw page to: {}", raw_path.display()),
        Err(e) => tracing::warn!("Failed to save raw page: {}", e),
    }

    let annotated_path = dir.join("page_annotated.html");
    if let Err(e) = utils::html_debug::create_debug_html(html, &annotated_path, utils::html_debug::LOCATOR_ANCHOR_PATTERNS) {
        tracing::warn!("Failed to create debug HTML: {}", e);
    }
}

fn write_failure(dir: &Path, url: &str, error: &AppError) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::warn!("Failed to create debug directory {}: {}", dir.display(), e);
        return;
    }
    let path = dir.join("extraction_failure.txt");
    let info = format!("Extraction from {} failed: {}\n", url, error);
    if let Err(e) = std::fs::write(&path, info) {
        tracing::error!("Failed to save failure info: {}", e);
    }
}
