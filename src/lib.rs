//! # Replay Coach
//!
//! A Rocket League match-history tracker with AI-powered coaching.
//!
//! ## Architecture
//!
//! - **models**: Replay API payloads and the flattened per-match record
//! - **client**: Ballchasing API client (search, detail fetch, extraction)
//! - **store**: SQLite persistence for players and match history
//! - **analytics**: Pure aggregation over stored match records
//! - **coach**: AI coaching advice and rule-based quick tips
//! - **ingest**: Fetch-vs-reuse orchestration
//! - **api**: REST API endpoints for the dashboard
//! - **config**: Configuration loading and validation

pub mod analytics;
pub mod api;
pub mod client;
pub mod coach;
pub mod config;
pub mod ingest;
pub mod models;
pub mod store;
