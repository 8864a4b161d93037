//! Read-only projections of the ranking session for presentation clients.

use crate::{
    dto::{leaderboard::LeaderboardView, session::SessionView},
    state::SharedState,
};

/// Current projected leaderboard.
pub async fn get_leaderboard(state: &SharedState) -> LeaderboardView {
    state
        .read_session(|session| LeaderboardView::new(session.id(), &session.leaderboard()))
        .await
}

/// Feed phase, countdown and celebration in one view.
pub async fn get_session(state: &SharedState) -> SessionView {
    state
        .read_session(|session| SessionView::from(session))
        .await
}
