//! WebSocket-backed real-time collaborator.
//!
//! One socket per registration: registering opens a connection to
//! `<websocket base>/<channel>`, sends a subscribe frame carrying the
//! options, and routes incoming `{ "messages": [...] }` frames to the
//! responder. Deregistering closes the socket.
//!
//! A socket closing does NOT switch the subscription to polling —
//! transport selection is a one-time decision made by the subscription
//! manager at start.

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cirrus_core::channel::{ChannelName, ChannelProperties};
use cirrus_core::messages::MessageBatch;

use crate::realtime::RealTimeMessaging;
use crate::responder::{SharedResponder, same_responder};

struct Registration {
    channel: ChannelName,
    responder: SharedResponder,
    cancel: CancellationToken,
}

/// tokio-tungstenite implementation of [`RealTimeMessaging`].
pub struct WebSocketMessaging {
    base_url: Option<String>,
    registrations: Mutex<Vec<Registration>>,
}

impl WebSocketMessaging {
    /// Create a collaborator for the given WebSocket base URL.
    ///
    /// `None` means the environment has no real-time capability and
    /// [`is_available`](RealTimeMessaging::is_available) reports false.
    #[must_use]
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url,
            registrations: Mutex::new(Vec::new()),
        }
    }

    /// Create a collaborator from fetched channel properties.
    #[must_use]
    pub fn from_properties(properties: &ChannelProperties) -> Self {
        Self::new(properties.websocket.clone())
    }

    /// Number of active registrations.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.registrations.lock().len()
    }
}

impl RealTimeMessaging for WebSocketMessaging {
    fn is_available(&self) -> bool {
        self.base_url.is_some()
    }

    fn on_message(&self, channel: &ChannelName, options: &Value, responder: SharedResponder) {
        let Some(base_url) = &self.base_url else {
            warn!(%channel, "real-time registration without websocket URL, ignoring");
            return;
        };
        let url = format!("{}/{channel}", base_url.trim_end_matches('/'));
        let cancel = CancellationToken::new();
        drop(tokio::spawn(socket_loop(
            url,
            options.clone(),
            responder.clone(),
            cancel.clone(),
        )));
        self.registrations.lock().push(Registration {
            channel: channel.clone(),
            responder,
            cancel,
        });
    }

    fn off_message(&self, channel: &ChannelName, _options: &Value, responder: &SharedResponder) {
        let mut registrations = self.registrations.lock();
        let position = registrations
            .iter()
            .position(|r| r.channel == *channel && same_responder(&r.responder, responder));
        match position {
            Some(position) => {
                let registration = registrations.remove(position);
                registration.cancel.cancel();
                debug!(%channel, "real-time registration removed");
            }
            // Never registered (or already removed): no-op by contract.
            None => debug!(%channel, "off_message for unknown key, ignoring"),
        }
    }
}

/// Connect, send the subscribe frame, and route batches until cancelled
/// or the socket closes.
async fn socket_loop(
    url: String,
    options: Value,
    responder: SharedResponder,
    cancel: CancellationToken,
) {
    let (ws, _) = match connect_async(&url).await {
        Ok(connected) => connected,
        Err(e) => {
            warn!(url, error = %e, "websocket connect failed");
            return;
        }
    };
    let (mut ws_tx, mut ws_rx) = ws.split();

    let subscribe_frame = json!({ "options": options }).to_string();
    if ws_tx.send(WsMessage::Text(subscribe_frame.into())).await.is_err() {
        warn!(url, "websocket closed before subscribe frame");
        return;
    }
    debug!(url, "websocket connected");

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                let _ = ws_tx.send(WsMessage::Close(None)).await;
                break;
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        let batch: MessageBatch = match serde_json::from_str(&text) {
                            Ok(batch) => batch,
                            Err(e) => {
                                warn!(url, error = %e, "unparseable frame, skipping");
                                continue;
                            }
                        };
                        if cancel.is_cancelled() {
                            break;
                        }
                        if !batch.is_empty() {
                            responder.on_messages(&batch);
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | None => {
                        // One-time transport selection: no fallback here.
                        info!(url, "websocket closed");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(url, error = %e, "websocket read error");
                        break;
                    }
                }
            }
        }
    }
    debug!(url, "websocket loop stopped");
}
