//! Fixed-interval polling transport.
//!
//! The proxy repeats: GET the subscription URL, await the response,
//! deliver the batch when non-empty, then wait one interval before the
//! next poll. Batches reach the handler in request-completion order; the
//! proxy performs no reordering or de-duplication.
//!
//! Poll failures are transient: they are logged and the loop continues on
//! the next tick. Closing is cooperative — the cancellation token is
//! consulted before each poll and again between response arrival and
//! delivery, so a poll in flight at close time never delivers late.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use cirrus_core::messages::MessageBatch;
use cirrus_rest::RestClient;

/// Handler invoked with each non-empty batch.
pub type BatchHandler = Arc<dyn Fn(MessageBatch) + Send + Sync>;

/// Polling transport for one subscription.
///
/// Exclusively owned by its subscription; dropping the proxy closes it.
pub struct PollingProxy {
    cancel: CancellationToken,
}

impl PollingProxy {
    /// Start polling `url` every `interval`, delivering non-empty batches
    /// to `on_messages`.
    ///
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn start(
        rest: RestClient,
        url: String,
        interval: Duration,
        on_messages: BatchHandler,
    ) -> Self {
        let cancel = CancellationToken::new();
        drop(tokio::spawn(poll_loop(
            rest,
            url,
            interval,
            cancel.clone(),
            on_messages,
        )));
        Self { cancel }
    }

    /// Stop scheduling polls. Idempotent.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether the proxy has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for PollingProxy {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_loop(
    rest: RestClient,
    url: String,
    interval: Duration,
    cancel: CancellationToken,
    on_messages: BatchHandler,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match rest.get_json::<MessageBatch>(&url).await {
            Ok(batch) => {
                // Closed while the poll was in flight: suppress delivery.
                if cancel.is_cancelled() {
                    break;
                }
                if batch.is_empty() {
                    trace!(url, "empty poll");
                } else {
                    debug!(url, count = batch.len(), "messages received");
                    on_messages(batch);
                }
            }
            Err(e) => {
                if cancel.is_cancelled() {
                    break;
                }
                warn!(url, error = %e, "poll failed, retrying next tick");
            }
        }
    }
    debug!(url, "polling stopped");
}
