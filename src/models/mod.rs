//! Core data models for the points ledger.

mod ids;
mod ledger;
mod match_stats;
mod player;
mod upload;

pub use ids::*;
pub use ledger::*;
pub use match_stats::*;
pub use player::*;
pub use upload::*;
