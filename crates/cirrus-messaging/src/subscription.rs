//! Channel subscription lifecycle.
//!
//! One [`Subscription`] owns one channel subscription: it issues the
//! subscribe request, selects a transport exactly once, relays message
//! batches to the responder, and tears everything down on cancellation.
//!
//! The lifecycle runs on a spawned driver task; [`Subscription::start`]
//! returns a handle immediately, so cancellation is possible while the
//! subscribe request is still in flight. Progress is observable through
//! [`Subscription::phase`] / [`Subscription::wait_until_live`].

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use cirrus_core::channel::ChannelName;
use cirrus_core::ids::SubscriptionId;
use cirrus_rest::RestClient;

use crate::errors::{MessagingError, MessagingResult};
use crate::polling::{BatchHandler, PollingProxy};
use crate::realtime::RealTimeMessaging;
use crate::responder::SharedResponder;

/// Opaque filter/config forwarded to the remote subscribe call and the
/// real-time transport.
pub type SubscribeOptions = Value;

/// Transport carrying messages for a subscription.
///
/// Selected exactly once per subscription lifetime; never changes
/// afterward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportMode {
    /// No transport selected yet (subscribe still in flight, failed, or
    /// cancelled early).
    Unselected,
    /// Delivery via the real-time collaborator.
    RealTime,
    /// Delivery via the polling proxy.
    Polling,
}

/// Observable lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscriptionPhase {
    /// Subscribe request in flight.
    Pending,
    /// Subscription ID assigned and a transport started.
    Live,
    /// Subscribe request failed; permanently dead.
    Failed,
    /// Cancelled by the caller.
    Cancelled,
}

/// Wire shape of the subscribe response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeResponse {
    subscription_id: SubscriptionId,
}

#[derive(Default)]
struct SubscriptionState {
    subscription_id: Option<SubscriptionId>,
    transport: Option<TransportMode>,
    proxy: Option<PollingProxy>,
    realtime_registered: bool,
    failure: Option<String>,
}

struct Inner {
    channel: ChannelName,
    options: SubscribeOptions,
    responder: SharedResponder,
    realtime: Option<Arc<dyn RealTimeMessaging>>,
    cancel: CancellationToken,
    state: Mutex<SubscriptionState>,
    phase: watch::Sender<SubscriptionPhase>,
}

/// Handle for one channel subscription.
pub struct Subscription {
    inner: Arc<Inner>,
    phase_rx: watch::Receiver<SubscriptionPhase>,
}

impl Subscription {
    /// Start a subscription: issue the subscribe request and, once the
    /// subscription ID is assigned, select a transport.
    ///
    /// Returns immediately; the lifecycle runs on a spawned task. Must be
    /// called within a tokio runtime.
    #[must_use]
    pub fn start(
        rest: RestClient,
        channel: ChannelName,
        options: SubscribeOptions,
        realtime: Option<Arc<dyn RealTimeMessaging>>,
        responder: SharedResponder,
        poll_interval: Duration,
    ) -> Self {
        let (phase_tx, phase_rx) = watch::channel(SubscriptionPhase::Pending);
        let inner = Arc::new(Inner {
            channel,
            options,
            responder,
            realtime,
            cancel: CancellationToken::new(),
            state: Mutex::new(SubscriptionState::default()),
            phase: phase_tx,
        });
        drop(tokio::spawn(drive(inner.clone(), rest, poll_interval)));
        Self { inner, phase_rx }
    }

    /// Channel this subscription is attached to.
    #[must_use]
    pub fn channel(&self) -> &ChannelName {
        &self.inner.channel
    }

    /// Server-issued subscription ID, once assigned.
    #[must_use]
    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.inner.state.lock().subscription_id.clone()
    }

    /// Selected transport. [`TransportMode::Unselected`] until live.
    #[must_use]
    pub fn transport_mode(&self) -> TransportMode {
        self.inner
            .state
            .lock()
            .transport
            .unwrap_or(TransportMode::Unselected)
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SubscriptionPhase {
        *self.phase_rx.borrow()
    }

    /// Wait until the subscription is live, failed, or cancelled.
    ///
    /// Returns the subscription ID once a transport is running.
    pub async fn wait_until_live(&self) -> MessagingResult<SubscriptionId> {
        let mut phase_rx = self.phase_rx.clone();
        loop {
            let phase = *phase_rx.borrow_and_update();
            match phase {
                SubscriptionPhase::Live => {
                    let state = self.inner.state.lock();
                    return state
                        .subscription_id
                        .clone()
                        .ok_or(MessagingError::Cancelled);
                }
                SubscriptionPhase::Failed => {
                    let message = self
                        .inner
                        .state
                        .lock()
                        .failure
                        .clone()
                        .unwrap_or_else(|| "subscribe failed".into());
                    return Err(MessagingError::Subscribe {
                        channel: self.inner.channel.to_string(),
                        message,
                    });
                }
                SubscriptionPhase::Cancelled => return Err(MessagingError::Cancelled),
                SubscriptionPhase::Pending => {}
            }
            if phase_rx.changed().await.is_err() {
                return Err(MessagingError::Cancelled);
            }
        }
    }

    /// Cancel the subscription. Idempotent.
    ///
    /// Stops the active transport and deregisters any real-time listener.
    /// After this returns, the responder is never invoked again — a
    /// subscribe response or poll already in flight is suppressed by the
    /// cancellation flag, which is consulted before any transport starts
    /// and before every delivery.
    pub fn cancel(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        self.inner.cancel.cancel();

        let mut state = self.inner.state.lock();
        if state.realtime_registered {
            if let Some(realtime) = &self.inner.realtime {
                realtime.off_message(&self.inner.channel, &self.inner.options, &self.inner.responder);
            }
            state.realtime_registered = false;
        }
        if let Some(proxy) = state.proxy.take() {
            proxy.close();
        }
        drop(state);

        // Cancel after failure stays Failed; anything else becomes Cancelled.
        let _ = self.inner.phase.send_if_modified(|phase| {
            if *phase == SubscriptionPhase::Failed || *phase == SubscriptionPhase::Cancelled {
                false
            } else {
                *phase = SubscriptionPhase::Cancelled;
                true
            }
        });
        info!(channel = %self.inner.channel, "subscription cancelled");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Driver: subscribe, then select and start the transport.
async fn drive(inner: Arc<Inner>, rest: RestClient, poll_interval: Duration) {
    let urls = rest.urls();
    let subscribe_url = urls.channel_subscribe(&inner.channel);
    debug!(channel = %inner.channel, "subscribing");

    let response: Result<SubscribeResponse, _> =
        rest.post_json(&subscribe_url, &inner.options).await;

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            if inner.cancel.is_cancelled() {
                // Cancelled while in flight: no fault either.
                return;
            }
            error!(channel = %inner.channel, error = %e, "subscribe failed");
            let err = MessagingError::Rest(e);
            inner.state.lock().failure = Some(err.to_string());
            inner.responder.on_fault(&err);
            set_phase(&inner, SubscriptionPhase::Failed);
            return;
        }
    };

    let mut state = inner.state.lock();
    // Cancellation flag recorded before the response arrived: never start
    // a transport.
    if inner.cancel.is_cancelled() {
        drop(state);
        debug!(channel = %inner.channel, "cancelled before transport start");
        return;
    }

    let subscription_id = response.subscription_id;
    state.subscription_id = Some(subscription_id.clone());

    // Transport selection: exactly once, based on environment capability.
    let realtime_available = inner
        .realtime
        .as_ref()
        .is_some_and(|realtime| realtime.is_available());

    if realtime_available {
        state.transport = Some(TransportMode::RealTime);
        if let Some(realtime) = &inner.realtime {
            realtime.on_message(&inner.channel, &inner.options, inner.responder.clone());
        }
        state.realtime_registered = true;
    } else {
        state.transport = Some(TransportMode::Polling);
        let poll_url = urls.channel_subscription(&inner.channel, &subscription_id);
        let responder = inner.responder.clone();
        let cancel = inner.cancel.clone();
        let handler: BatchHandler = Arc::new(move |batch| {
            if cancel.is_cancelled() {
                return;
            }
            responder.on_messages(&batch);
        });
        state.proxy = Some(PollingProxy::start(
            rest.clone(),
            poll_url,
            poll_interval,
            handler,
        ));
    }
    let transport = state.transport;
    drop(state);

    info!(
        channel = %inner.channel,
        subscription_id = %subscription_id,
        ?transport,
        "subscription live"
    );
    set_phase(&inner, SubscriptionPhase::Live);
}

/// Transition the phase, but only from `Pending`.
fn set_phase(inner: &Inner, new_phase: SubscriptionPhase) {
    let _ = inner.phase.send_if_modified(|phase| {
        if *phase == SubscriptionPhase::Pending {
            *phase = new_phase;
            true
        } else {
            false
        }
    });
}
