use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

use crate::{services::session_service, state::SharedState};

/// Tick the countdown once per configured interval until it stops running.
///
/// The first tick lands one full interval after start. A late tick delays the
/// following ones rather than bursting to catch up.
pub async fn run(state: SharedState) {
    let period = state.config().tick_interval();
    let mut ticks = interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticks.tick().await;

        let mut slot = state.lock_session().await;
        let effects = slot.session.tick();
        session_service::execute(&state, &mut slot, effects);

        if slot.session.is_torn_down() || !slot.session.countdown_running() {
            debug!("countdown ticker finished");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{
        config::AppConfig,
        services::feed_transport::testing::MemoryConnector,
        state::{AppState, countdown::CountdownPhase},
    };

    #[tokio::test(start_paused = true)]
    async fn ticks_follow_the_configured_interval() {
        let (connector, _peers) = MemoryConnector::new();
        let config = AppConfig::default().with_tick_interval(Duration::from_millis(250));
        let state = AppState::new(config, Arc::new(connector));
        let mut public = state.public_sse().subscribe();

        session_service::start_countdown(&state, Some(4)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(state.read_session(|s| s.countdown().remaining()).await, 2);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(
            state.read_session(|s| s.countdown().phase).await,
            CountdownPhase::Expired
        );

        let mut countdown_events = 0;
        while let Ok(event) = public.try_recv() {
            if event.event.as_deref() == Some("countdown") {
                countdown_events += 1;
            }
        }
        // Start plus one per tick.
        assert_eq!(countdown_events, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_length_countdown_expires_on_first_tick() {
        let (connector, _peers) = MemoryConnector::new();
        let state = AppState::new(AppConfig::default(), Arc::new(connector));

        session_service::start_countdown(&state, Some(0)).await.unwrap();
        assert!(state.read_session(|s| s.countdown_running()).await);

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        state
            .read_session(|s| {
                assert_eq!(s.countdown().phase, CountdownPhase::Expired);
                assert!(s.celebration().is_active());
                assert_eq!(s.celebration().leader_name(), "");
            })
            .await;
    }
}
