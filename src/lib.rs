//! # Points Ledger
//!
//! A local points tracker for a season of matches: per-match stat sheets are
//! scored and merged into a master player ledger, with undo/redo over every
//! change.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, ledger, match rows, uploads)
//! - **ingest**: CSV parsing and schema validation for match files and rosters
//! - **calculate**: Scoring weights and the match merge
//! - **storage**: Filesystem persistence (ledger CSV, upload log JSONL, archive)
//! - **history**: Snapshot-based undo/redo
//! - **leaderboard**: Ranking and leaderboard export
//! - **tracker**: The session that ties the above together
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod error;
pub mod history;
pub mod ingest;
pub mod leaderboard;
pub mod models;
pub mod storage;
pub mod tracker;

pub use models::*;
