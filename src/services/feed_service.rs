//! Drives one feed connection attempt: dial, request the ranking, then apply
//! every frame to the session until the channel ends or the attempt is superseded.

use tracing::{debug, info, warn};

use crate::{
    dto::feed::FeedOutbound,
    services::{feed_transport::FeedChannel, session_service, sse_events},
    state::{SessionError, SharedState, feed_session::AttemptId},
};

/// Run the connection attempt `attempt` to completion.
pub async fn run(state: SharedState, attempt: AttemptId) {
    let FeedChannel {
        outbound,
        mut inbound,
    } = match state.connector().connect().await {
        Ok(channel) => channel,
        Err(err) => {
            warn!(attempt, error = %err, "feed connection failed");
            report_channel_lost(&state, attempt).await;
            return;
        }
    };

    if outbound.send(FeedOutbound::GetRanking).is_err() {
        warn!(attempt, "feed channel closed before the ranking request");
        report_channel_lost(&state, attempt).await;
        return;
    }
    info!(attempt, "ranking requested from feed");

    while let Some(frame) = inbound.recv().await {
        let mut slot = state.lock_session().await;
        match slot.session.on_feed_frame(attempt, &frame) {
            Ok(effects) => session_service::execute(&state, &mut slot, effects),
            Err(SessionError::Malformed(err)) => {
                warn!(attempt, error = %err, "rejected feed message; keeping previous leaderboard");
                sse_events::broadcast_feed_rejected(&state, attempt, &err);
            }
            Err(err) => {
                debug!(attempt, error = %err, "feed attempt no longer accepted; stopping");
                return;
            }
        }
    }

    drop(outbound);
    info!(attempt, "feed channel ended");
    report_channel_lost(&state, attempt).await;
}

async fn report_channel_lost(state: &SharedState, attempt: AttemptId) {
    let mut slot = state.lock_session().await;
    match slot.session.on_channel_lost(attempt) {
        Ok(effects) => session_service::execute(state, &mut slot, effects),
        Err(err) => debug!(attempt, error = %err, "ignoring loss of a superseded channel"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        config::AppConfig,
        services::feed_transport::testing::{FeedPeer, MemoryConnector},
        state::{AppState, feed_session::FeedPhase},
    };

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    async fn live_state() -> (
        SharedState,
        Arc<MemoryConnector>,
        mpsc::UnboundedReceiver<FeedPeer>,
    ) {
        let (connector, peers) = MemoryConnector::new();
        let connector = Arc::new(connector);
        let state = AppState::new(AppConfig::default(), connector.clone());
        (state, connector, peers)
    }

    #[tokio::test]
    async fn first_snapshot_makes_feed_live() {
        let (state, _connector, mut peers) = live_state().await;
        let mut public = state.public_sse().subscribe();

        session_service::connect(&state).await.unwrap();
        let mut peer = peers.recv().await.unwrap();
        assert_eq!(peer.received.recv().await, Some(FeedOutbound::GetRanking));
        assert_eq!(
            state.read_session(|s| s.feed().phase).await,
            FeedPhase::Connecting
        );

        peer.push(r#"{"event":"ranking","data":[{"id":1,"name":"A","score":10},{"id":2,"name":"B","score":20}]}"#);
        settle().await;

        state
            .read_session(|s| {
                assert_eq!(s.feed().phase, FeedPhase::Live);
                let names: Vec<_> = s
                    .leaderboard()
                    .entries()
                    .iter()
                    .map(|e| e.player.name.clone())
                    .collect();
                assert_eq!(names, vec!["B", "A"]);
            })
            .await;

        let mut seen = Vec::new();
        while let Ok(event) = public.try_recv() {
            seen.extend(event.event);
        }
        assert!(seen.contains(&sse_events::EVENT_LEADERBOARD.to_string()));
        assert!(seen.contains(&sse_events::EVENT_FEED_PHASE.to_string()));
    }

    #[tokio::test]
    async fn malformed_frames_keep_previous_leaderboard() {
        let (state, _connector, mut peers) = live_state().await;
        session_service::connect(&state).await.unwrap();
        let peer = peers.recv().await.unwrap();
        peer.push(r#"{"event":"ranking","data":[{"id":1,"name":"A","score":10}]}"#);
        settle().await;

        let mut admin = state.admin_sse().subscribe();
        peer.push(r#"{"event":"rankingUpdate","data":[{"id":1,"name":"A","score":1},{"id":1,"name":"Z","score":2}]}"#);
        peer.push(r#"{"event":"ranking","data":[{"id":3,"name":"C"}]}"#);
        peer.push("not json");
        settle().await;

        state
            .read_session(|s| {
                assert_eq!(s.feed().phase, FeedPhase::Live);
                assert_eq!(s.leaderboard().len(), 1);
                assert_eq!(s.leaderboard().entries()[0].player.score, 10.0);
            })
            .await;

        let mut rejected = 0;
        while let Ok(event) = admin.try_recv() {
            if event.event.as_deref() == Some("feed.rejected") {
                rejected += 1;
            }
        }
        assert_eq!(rejected, 3);

        // The channel survives rejected frames.
        peer.push(r#"{"event":"rankingUpdate","data":[{"id":1,"name":"A","score":11}]}"#);
        settle().await;
        assert_eq!(
            state
                .read_session(|s| s.leaderboard().entries()[0].player.score)
                .await,
            11.0
        );
    }

    #[tokio::test]
    async fn refused_connection_reports_disconnected() {
        let (state, connector, _peers) = live_state().await;
        connector.refuse_connections(true);

        session_service::connect(&state).await.unwrap();
        settle().await;

        assert_eq!(
            state.read_session(|s| s.feed().phase).await,
            FeedPhase::Disconnected
        );
    }

    #[tokio::test]
    async fn frames_after_close_are_ignored() {
        let (state, _connector, mut peers) = live_state().await;
        session_service::connect(&state).await.unwrap();
        let peer = peers.recv().await.unwrap();
        peer.push(r#"{"event":"ranking","data":[{"id":1,"name":"A","score":10}]}"#);
        settle().await;

        session_service::teardown(&state).await;
        let _ = peer
            .frames
            .send(r#"{"event":"ranking","data":[{"id":2,"name":"B","score":99}]}"#.into());
        settle().await;

        state
            .read_session(|s| {
                assert_eq!(s.feed().phase, FeedPhase::Closed);
                assert!(s.leaderboard().is_empty());
            })
            .await;
    }

    #[tokio::test]
    async fn stale_attempt_frames_are_dropped() {
        let (state, _connector, mut peers) = live_state().await;
        session_service::connect(&state).await.unwrap();
        let first = peers.recv().await.unwrap();

        // A second connect while still connecting supersedes the first attempt.
        session_service::connect(&state).await.unwrap();
        let second = peers.recv().await.unwrap();

        // The superseded task is gone, so this frame may not even be delivered.
        let _ = first
            .frames
            .send(r#"{"event":"ranking","data":[{"id":9,"name":"Old","score":1}]}"#.into());
        settle().await;
        assert!(state.read_session(|s| s.leaderboard().is_empty()).await);

        second.push(r#"{"event":"ranking","data":[{"id":1,"name":"New","score":1}]}"#);
        settle().await;
        state
            .read_session(|s| {
                assert_eq!(s.feed().attempt, Some(2));
                assert_eq!(s.leaderboard().entries()[0].player.name, "New");
            })
            .await;
    }
}
