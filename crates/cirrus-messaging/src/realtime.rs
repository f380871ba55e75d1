//! Real-time collaborator seam.
//!
//! The subscription manager delegates real-time delivery to a collaborator
//! keyed by `(channel, options, responder)`. The SDK ships a
//! tokio-tungstenite implementation ([`crate::socket::WebSocketMessaging`]);
//! embedders can substitute their own.

use serde_json::Value;

use cirrus_core::channel::ChannelName;

use crate::responder::SharedResponder;

/// Real-time message delivery collaborator.
pub trait RealTimeMessaging: Send + Sync {
    /// Whether the host environment supports persistent full-duplex
    /// connections. Consulted once per subscription, at transport
    /// selection time.
    fn is_available(&self) -> bool;

    /// Register a responder for messages on `channel`.
    ///
    /// The registration is keyed by the channel and the responder's
    /// pointer identity; `options` are forwarded to the remote side
    /// unchanged.
    fn on_message(&self, channel: &ChannelName, options: &Value, responder: SharedResponder);

    /// Deregister a responder.
    ///
    /// Always safe to call, even for a key that was never registered —
    /// an unknown key is a no-op, never an error.
    fn off_message(&self, channel: &ChannelName, options: &Value, responder: &SharedResponder);
}
