//! HTTP API endpoints
//!
//! Read-only views of the bank and leaderboard plus the feedback form, for
//! clients that do not hold a WebSocket open.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::QuizError;
use crate::state::AppState;
use crate::types::LeaderboardEntry;

/// Theme list with question counts
#[derive(Debug, Clone, Serialize)]
pub struct ThemeInfo {
    pub name: String,
    pub questions: usize,
}

/// List themes in load order.
///
/// GET /api/themes
pub async fn list_themes(State(state): State<Arc<AppState>>) -> Json<Vec<ThemeInfo>> {
    Json(
        state
            .bank
            .themes()
            .into_iter()
            .map(|name| ThemeInfo {
                name: name.to_string(),
                questions: state.bank.questions(name).len(),
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub theme: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardResponse {
    pub theme: String,
    pub entries: Vec<LeaderboardEntry>,
}

/// Top scores of one theme.
///
/// GET /api/leaderboard?theme=Friends
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Response {
    if !state.bank.has_theme(&query.theme) {
        let err = QuizError::UnknownTheme(query.theme);
        return (StatusCode::NOT_FOUND, err.to_string()).into_response();
    }

    match state.leaderboard_top(&query.theme).await {
        Ok(entries) => Json(LeaderboardResponse {
            theme: query.theme,
            entries,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Leaderboard read failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Leaderboard unavailable").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub message: String,
}

/// Append to the feedback log.
///
/// POST /api/feedback
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FeedbackRequest>,
) -> Response {
    match state.submit_feedback(&request.message).await {
        Ok(()) => (StatusCode::OK, "Thanks for your feedback!").into_response(),
        Err(QuizError::Storage(e)) => {
            tracing::error!("Feedback write failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Feedback could not be saved").into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}
