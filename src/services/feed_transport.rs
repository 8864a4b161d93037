//! Transport to the ranking feed. The session only sees a pair of in-process
//! channels; how frames travel is up to the [`FeedConnector`].

use futures::{SinkExt, StreamExt, future::BoxFuture};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};

use crate::dto::feed::FeedOutbound;

/// Transport-level failure talking to the feed.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The connection could not be established.
    #[error("failed to connect to feed at `{url}`: {source}")]
    Connect {
        /// Endpoint that was dialled.
        url: String,
        /// Underlying WebSocket error.
        #[source]
        source: Box<tungstenite::Error>,
    },
}

/// Open channel to the feed.
///
/// Dropping both halves closes the underlying connection.
pub struct FeedChannel {
    /// Messages to send to the feed.
    pub outbound: mpsc::UnboundedSender<FeedOutbound>,
    /// Raw text frames received from the feed. Ends when the connection does.
    pub inbound: mpsc::UnboundedReceiver<String>,
}

/// Opens channels to the ranking feed.
pub trait FeedConnector: Send + Sync {
    /// Open a fresh channel. Each call yields an independent connection.
    fn connect(&self) -> BoxFuture<'static, Result<FeedChannel, ChannelError>>;
}

/// [`FeedConnector`] dialling a WebSocket endpoint that speaks JSON envelopes.
pub struct WsFeedConnector {
    url: String,
}

impl WsFeedConnector {
    /// Connector for the feed at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl FeedConnector for WsFeedConnector {
    fn connect(&self) -> BoxFuture<'static, Result<FeedChannel, ChannelError>> {
        let url = self.url.clone();
        Box::pin(async move {
            let (socket, _response) = tokio_tungstenite::connect_async(url.as_str())
                .await
                .map_err(|source| ChannelError::Connect {
                    url: url.clone(),
                    source: Box::new(source),
                })?;
            info!(%url, "feed socket connected");

            let (mut sink, mut stream) = socket.split();
            let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<FeedOutbound>();
            let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<String>();

            // Writer: drains outbound messages and sends a close frame once the session drops its sender.
            tokio::spawn(async move {
                while let Some(message) = outbound_rx.recv().await {
                    let payload = match message.to_json_string() {
                        Ok(payload) => payload,
                        Err(err) => {
                            warn!(error = %err, ?message, "failed to encode feed message");
                            continue;
                        }
                    };
                    if let Err(err) = sink.send(Message::Text(payload.into())).await {
                        warn!(error = %err, "feed socket write failed");
                        break;
                    }
                }
                let _ = sink.close().await;
                debug!("feed socket writer finished");
            });

            // Reader: forwards text frames until the socket or the session goes away.
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = inbound_tx.closed() => break,
                        frame = stream.next() => match frame {
                            Some(Ok(Message::Text(text))) => {
                                if inbound_tx.send(text.as_str().to_owned()).is_err() {
                                    break;
                                }
                            }
                            Some(Ok(Message::Close(frame))) => {
                                info!(?frame, "feed closed the socket");
                                break;
                            }
                            // Pings are answered by tungstenite itself.
                            Some(Ok(_)) => {}
                            Some(Err(err)) => {
                                warn!(error = %err, "feed socket read failed");
                                break;
                            }
                            None => break,
                        }
                    }
                }
                debug!("feed socket reader finished");
            });

            Ok(FeedChannel {
                outbound: outbound_tx,
                inbound: inbound_rx,
            })
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory feed used by service tests.

    use std::sync::Mutex;

    use super::*;

    /// Far end of an in-memory channel, held by the test playing the feed.
    pub struct FeedPeer {
        /// What the session sent.
        pub received: mpsc::UnboundedReceiver<FeedOutbound>,
        /// Push frames to the session. Dropping it simulates a lost connection.
        pub frames: mpsc::UnboundedSender<String>,
    }

    impl FeedPeer {
        /// Push a raw text frame.
        pub fn push(&self, frame: &str) {
            self.frames.send(frame.to_string()).unwrap();
        }
    }

    /// Connector handing each new channel's far end to the test.
    pub struct MemoryConnector {
        peers: mpsc::UnboundedSender<FeedPeer>,
        refuse: Mutex<bool>,
    }

    impl MemoryConnector {
        /// Connector plus the receiver on which every opened peer is delivered.
        pub fn new() -> (Self, mpsc::UnboundedReceiver<FeedPeer>) {
            let (peers, peer_rx) = mpsc::unbounded_channel();
            (
                Self {
                    peers,
                    refuse: Mutex::new(false),
                },
                peer_rx,
            )
        }

        /// Make subsequent connection attempts fail.
        pub fn refuse_connections(&self, refuse: bool) {
            *self.refuse.lock().unwrap() = refuse;
        }
    }

    impl FeedConnector for MemoryConnector {
        fn connect(&self) -> BoxFuture<'static, Result<FeedChannel, ChannelError>> {
            let refused = *self.refuse.lock().unwrap();
            let peers = self.peers.clone();
            Box::pin(async move {
                if refused {
                    return Err(ChannelError::Connect {
                        url: "memory://feed".into(),
                        source: Box::new(tungstenite::Error::ConnectionClosed),
                    });
                }
                let (outbound, received) = mpsc::unbounded_channel();
                let (frames, inbound) = mpsc::unbounded_channel();
                let _ = peers.send(FeedPeer { received, frames });
                Ok(FeedChannel { outbound, inbound })
            })
        }
    }
}
