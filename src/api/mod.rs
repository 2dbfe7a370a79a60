// src/api/mod.rs
pub mod routes;

pub use routes::{router, ApiState, DEFAULT_DAILY_LIMIT};
