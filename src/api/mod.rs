//! REST API endpoints.
//!
//! Axum-based HTTP API over a shared tracker session: match uploads,
//! reset, undo/redo and the leaderboard.

pub mod routes;
pub mod state;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::LedgerError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Ledger(e) => match e {
                LedgerError::Schema(_) => (StatusCode::BAD_REQUEST, "SCHEMA_ERROR"),
                LedgerError::DuplicateMatch(_) => (StatusCode::CONFLICT, "DUPLICATE_MATCH"),
                LedgerError::StoreUnavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE")
                }
                LedgerError::NothingToUndo => (StatusCode::CONFLICT, "NOTHING_TO_UNDO"),
                LedgerError::NothingToRedo => (StatusCode::CONFLICT, "NOTHING_TO_REDO"),
                LedgerError::PlayerNotFound(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "PLAYER_NOT_FOUND")
                }
                LedgerError::DuplicatePlayer(_) => (StatusCode::CONFLICT, "DUPLICATE_PLAYER"),
                LedgerError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/ledger", get(routes::ledger::get_ledger))
        .route("/api/leaderboard", get(routes::ledger::get_leaderboard))
        .route("/api/players", post(routes::ledger::register_players))
        .route(
            "/api/matches",
            get(routes::matches::list_matches).post(routes::matches::upload_match),
        )
        .route("/api/matches/:match_id", get(routes::matches::get_match))
        .route("/api/reset", post(routes::history::reset))
        .route("/api/undo", post(routes::history::undo))
        .route("/api/redo", post(routes::history::redo))
        .route("/api/history", get(routes::history::get_history))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
