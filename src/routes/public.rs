use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::{leaderboard::LeaderboardView, session::SessionView},
    services::public_service,
    state::SharedState,
};

/// Public read-only endpoints for presentation clients.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/public/leaderboard", get(leaderboard))
        .route("/public/session", get(session))
}

#[utoipa::path(
    get,
    path = "/public/leaderboard",
    tag = "public",
    responses((status = 200, description = "Current projected leaderboard", body = LeaderboardView))
)]
/// Return the leaderboard, best score first, with rank deltas.
pub async fn leaderboard(State(state): State<SharedState>) -> Json<LeaderboardView> {
    Json(public_service::get_leaderboard(&state).await)
}

#[utoipa::path(
    get,
    path = "/public/session",
    tag = "public",
    responses((status = 200, description = "Feed, countdown and celebration state", body = SessionView))
)]
/// Return the feed phase, countdown and celebration.
pub async fn session(State(state): State<SharedState>) -> Json<SessionView> {
    Json(public_service::get_session(&state).await)
}
