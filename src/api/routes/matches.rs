use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::error::LedgerError;
use crate::ingest::parse_match_csv;
use crate::models::{MatchId, UploadEntry};
use crate::tracker::MatchReport;

/// Upload a match file (CSV body) and merge it into the ledger.
pub async fn upload_match(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<MatchReport>), ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::BadRequest("Empty match file".to_string()));
    }
    let upload = parse_match_csv(body.as_bytes()).map_err(LedgerError::from)?;

    let mut tracker = state.tracker.lock().await;
    let report = tracker.apply_match(&upload)?;
    Ok((StatusCode::CREATED, Json(report)))
}

#[derive(Debug, Serialize)]
pub struct MatchListResponse {
    pub matches: Vec<UploadEntry>,
}

/// Applied matches, most recent first.
pub async fn list_matches(State(state): State<AppState>) -> Json<MatchListResponse> {
    let tracker = state.tracker.lock().await;
    let matches = tracker.uploads().iter().rev().cloned().collect();
    Json(MatchListResponse { matches })
}

pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<UploadEntry>, ApiError> {
    let match_id = MatchId::new(match_id);
    let tracker = state.tracker.lock().await;
    tracker
        .upload(&match_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Match {} has not been applied", match_id)))
}
