//! Messaging facade.
//!
//! [`MessagingClient`] ties the REST client, the optional real-time
//! collaborator, and the polling interval together, and hands out
//! [`Subscription`] handles.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use cirrus_core::channel::{ChannelName, ChannelProperties};
use cirrus_rest::RestClient;

use crate::errors::MessagingResult;
use crate::realtime::RealTimeMessaging;
use crate::responder::SharedResponder;
use crate::socket::WebSocketMessaging;
use crate::subscription::{SubscribeOptions, Subscription};

/// Entry point for channel subscriptions.
#[derive(Clone)]
pub struct MessagingClient {
    rest: RestClient,
    realtime: Option<Arc<dyn RealTimeMessaging>>,
    poll_interval: Duration,
}

impl MessagingClient {
    /// Create a polling-only messaging client.
    ///
    /// The poll interval comes from the client configuration.
    #[must_use]
    pub fn new(rest: RestClient) -> Self {
        let poll_interval = Duration::from_millis(rest.config().poll_interval_ms);
        Self {
            rest,
            realtime: None,
            poll_interval,
        }
    }

    /// Attach a real-time collaborator. Subscriptions prefer it over
    /// polling whenever it reports the environment as capable.
    #[must_use]
    pub fn with_realtime(mut self, realtime: Arc<dyn RealTimeMessaging>) -> Self {
        self.realtime = Some(realtime);
        self
    }

    /// Fetch the properties of a channel.
    pub async fn channel_properties(
        &self,
        channel: &ChannelName,
    ) -> MessagingResult<ChannelProperties> {
        let url = self.rest.urls().channel_properties(channel);
        let properties = self.rest.get_json(&url).await?;
        Ok(properties)
    }

    /// Fetch channel properties and attach a websocket collaborator when
    /// the channel advertises one, then subscribe.
    ///
    /// Convenience over [`MessagingClient::subscribe`] for callers that
    /// want real-time delivery without wiring a collaborator themselves.
    pub async fn subscribe_with_discovery(
        &self,
        channel: ChannelName,
        options: SubscribeOptions,
        responder: SharedResponder,
    ) -> MessagingResult<Subscription> {
        let properties = self.channel_properties(&channel).await?;
        let client = match properties.websocket {
            Some(_) => {
                debug!(channel = %channel, "channel advertises a websocket endpoint");
                self.clone()
                    .with_realtime(Arc::new(WebSocketMessaging::from_properties(&properties)))
            }
            None => self.clone(),
        };
        Ok(client.subscribe(channel, options, responder))
    }

    /// Subscribe to a channel.
    ///
    /// Returns immediately; the subscribe request and transport startup
    /// run on a spawned task. Observe progress through the returned
    /// [`Subscription`].
    #[must_use]
    pub fn subscribe(
        &self,
        channel: ChannelName,
        options: SubscribeOptions,
        responder: SharedResponder,
    ) -> Subscription {
        Subscription::start(
            self.rest.clone(),
            channel,
            options,
            self.realtime.clone(),
            responder,
            self.poll_interval,
        )
    }
}
