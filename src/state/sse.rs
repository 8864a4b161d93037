use tokio::sync::{Mutex, broadcast};

use crate::dto::sse::ServerEvent;

/// Public and admin event hubs held by [`super::AppState`].
pub struct SseState {
    public: EventHub,
    admin: AdminSseState,
}

impl SseState {
    /// Build both hubs with their channel capacities.
    pub fn new(public_capacity: usize, admin_capacity: usize) -> Self {
        Self {
            public: EventHub::new(public_capacity),
            admin: AdminSseState {
                hub: EventHub::new(admin_capacity),
                token: Mutex::new(None),
            },
        }
    }

    /// Hub for presentation clients.
    pub fn public(&self) -> &EventHub {
        &self.public
    }

    /// Hub and token for the single operator stream.
    pub fn admin(&self) -> &AdminSseState {
        &self.admin
    }
}

/// Operator stream: its hub plus the token that gates admin commands.
pub struct AdminSseState {
    hub: EventHub,
    token: Mutex<Option<String>>,
}

impl AdminSseState {
    /// Broadcast hub for operator-only events.
    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    /// Token held by the connected operator, if any.
    pub fn token(&self) -> &Mutex<Option<String>> {
        &self.token
    }
}

/// Fan-out of [`ServerEvent`]s to every current subscriber.
pub struct EventHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventHub {
    /// Create a hub whose subscribers may lag by at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a subscriber for subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send to all subscribers. Having none is not an error.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
