use axum::extract::State;
use axum::Json;

use crate::api::routes::ledger::LedgerResponse;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::history::HistorySummary;

pub async fn reset(State(state): State<AppState>) -> Result<Json<LedgerResponse>, ApiError> {
    let mut tracker = state.tracker.lock().await;
    Ok(Json(tracker.reset()?.into()))
}

pub async fn undo(State(state): State<AppState>) -> Result<Json<LedgerResponse>, ApiError> {
    let mut tracker = state.tracker.lock().await;
    Ok(Json(tracker.undo()?.into()))
}

pub async fn redo(State(state): State<AppState>) -> Result<Json<LedgerResponse>, ApiError> {
    let mut tracker = state.tracker.lock().await;
    Ok(Json(tracker.redo()?.into()))
}

pub async fn get_history(State(state): State<AppState>) -> Json<HistorySummary> {
    let tracker = state.tracker.lock().await;
    Json(tracker.history().summary())
}
