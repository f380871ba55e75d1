//! # cirrus-messaging
//!
//! Channel subscriptions for the Cirrus SDK.
//!
//! A [`subscription::Subscription`] owns one channel subscription's
//! lifecycle: it registers with the remote service, selects a transport
//! exactly once (real-time when the environment supports persistent
//! full-duplex connections, polling otherwise), and relays delivered
//! message batches to a caller-supplied [`responder::MessageResponder`]
//! until cancelled.
//!
//! - [`client::MessagingClient`]: entry point — channel properties and
//!   subscribe
//! - [`polling::PollingProxy`]: the fixed-interval polling transport
//! - [`realtime::RealTimeMessaging`]: the real-time collaborator seam
//! - [`socket::WebSocketMessaging`]: tokio-tungstenite collaborator

#![deny(unsafe_code)]

pub mod client;
pub mod errors;
pub mod polling;
pub mod realtime;
pub mod responder;
pub mod socket;
pub mod subscription;

pub use client::MessagingClient;
pub use errors::{MessagingError, MessagingResult};
pub use polling::PollingProxy;
pub use realtime::RealTimeMessaging;
pub use responder::{MessageResponder, SharedResponder, responder_from_fn};
pub use socket::WebSocketMessaging;
pub use subscription::{SubscribeOptions, Subscription, SubscriptionPhase, TransportMode};
