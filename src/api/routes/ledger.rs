use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::error::LedgerError;
use crate::ingest::parse_roster_csv;
use crate::leaderboard::{Standing, DEFAULT_TOP};
use crate::models::{Ledger, PlayerRecord};

/// Upper bound on `top` so a typo can't request an absurd page.
const MAX_TOP: usize = 1000;

#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    pub players: Vec<PlayerRecord>,
    pub player_count: usize,
    pub total_points: i64,
}

impl From<Ledger> for LedgerResponse {
    fn from(ledger: Ledger) -> Self {
        Self {
            player_count: ledger.len(),
            total_points: ledger.total_points(),
            players: ledger.into_records(),
        }
    }
}

pub async fn get_ledger(State(state): State<AppState>) -> Result<Json<LedgerResponse>, ApiError> {
    let tracker = state.tracker.lock().await;
    Ok(Json(tracker.ledger()?.into()))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub top: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub standings: Vec<Standing>,
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let top = params.top.unwrap_or(DEFAULT_TOP).min(MAX_TOP);
    let tracker = state.tracker.lock().await;
    Ok(Json(LeaderboardResponse {
        standings: tracker.leaderboard(top)?,
    }))
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub registered: usize,
    pub player_count: usize,
}

/// Register players from a roster CSV body.
pub async fn register_players(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let players = parse_roster_csv(body.as_bytes()).map_err(LedgerError::from)?;

    let mut tracker = state.tracker.lock().await;
    let registered = tracker.register_players(players)?;
    let player_count = tracker.ledger()?.len();

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            registered,
            player_count,
        }),
    ))
}
