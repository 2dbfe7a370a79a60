// src/extractors/mod.rs
pub mod classifier;
pub mod locator;
pub mod numeric;
pub mod orchestrator;
pub mod rows;

// Re-export key extraction types for convenience
pub use orchestrator::AuctionExtractor;
