// src/market/mod.rs
pub mod client;
pub mod models;

pub use client::{HttpSource, AUCTION_PAGE_URL};
