use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::sse::{AdminHandshake, ServerEvent},
    error::ServiceError,
    services::sse_events,
    state::{EventHub, SharedState},
};

/// A broadcast subscription plus the events that bring a new client up to date.
pub struct Subscription {
    receiver: broadcast::Receiver<ServerEvent>,
    primer: Vec<ServerEvent>,
    state: SharedState,
}

/// Subscribe to the public stream.
///
/// The subscription and the state snapshot are taken under the session lock,
/// so the client sees every change after the snapshot and none before it.
pub async fn subscribe_public(state: &SharedState) -> Subscription {
    let slot = state.lock_session().await;
    Subscription {
        receiver: state.public_sse().subscribe(),
        primer: sse_events::snapshot_events(&slot.session),
        state: state.clone(),
    }
}

/// Subscribe to the admin stream, claiming the single admin token.
pub async fn subscribe_admin(state: &SharedState) -> Result<(Subscription, String), ServiceError> {
    let token = claim_admin_token(state).await?;
    let slot = state.lock_session().await;
    let mut primer = Vec::with_capacity(5);
    if let Ok(handshake) = ServerEvent::json(
        Some("admin_token".to_string()),
        &AdminHandshake {
            token: token.clone(),
        },
    ) {
        primer.push(handshake);
    }
    primer.extend(sse_events::snapshot_events(&slot.session));

    let subscription = Subscription {
        receiver: state.admin_sse().subscribe(),
        primer,
        state: state.clone(),
    };
    Ok((subscription, token))
}

/// Identifies the target SSE stream so that stream-specific cleanup can run
/// when the client goes away.
#[derive(Clone)]
pub enum StreamKind {
    /// Presentation client.
    Public,
    /// Operator stream; releasing it frees the admin token.
    Admin(SharedState),
}

/// Convert a subscription into an SSE response: primer events first, then
/// everything broadcast afterwards.
pub fn to_sse_stream(
    subscription: Subscription,
    kind: StreamKind,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<ServerEvent>(8);

    tokio::spawn(async move {
        forward(subscription, tx).await;

        match kind {
            StreamKind::Public => info!("public SSE stream disconnected"),
            StreamKind::Admin(state) => {
                reset_admin_token(&state).await;
                info!("admin SSE stream disconnected");
            }
        }
    });

    let stream =
        ReceiverStream::new(rx).map(|payload| Ok::<_, Infallible>(to_event(payload)));
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Pump events to one client until it disconnects or the hub closes.
///
/// A subscriber that falls behind the hub gets the current state again in
/// place of the events it missed.
async fn forward(subscription: Subscription, tx: mpsc::Sender<ServerEvent>) {
    let Subscription {
        mut receiver,
        primer,
        state,
    } = subscription;

    for payload in primer {
        if tx.send(payload).await.is_err() {
            return;
        }
    }

    loop {
        let batch = tokio::select! {
            _ = tx.closed() => return,
            recv_result = receiver.recv() => match recv_result {
                Ok(payload) => vec![payload],
                Err(RecvError::Closed) => return,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "SSE subscriber lagged; resending current state");
                    let slot = state.lock_session().await;
                    sse_events::snapshot_events(&slot.session)
                }
            },
        };

        for payload in batch {
            if tx.send(payload).await.is_err() {
                return;
            }
        }
    }
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

/// Reserve the admin token for a new stream, failing if another connection holds it.
async fn claim_admin_token(state: &SharedState) -> Result<String, ServiceError> {
    let mut guard = state.admin_token().lock().await;
    match &mut *guard {
        slot @ None => {
            let token = Uuid::new_v4().simple().to_string();
            slot.replace(token.clone());
            Ok(token)
        }
        Some(_) => Err(ServiceError::Unauthorized(
            "another admin SSE stream is already active".into(),
        )),
    }
}

/// Send a human-readable info message onto a stream.
pub fn broadcast_info(hub: &EventHub, message: &str) {
    hub.broadcast(ServerEvent::new(
        Some("info".to_string()),
        message.to_string(),
    ));
}

/// Forget the admin token so the next operator connection gets a fresh one.
async fn reset_admin_token(state: &SharedState) {
    state.admin_token().lock().await.take();
}
