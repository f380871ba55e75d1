//! The caller-supplied message handler.

use std::sync::Arc;

use cirrus_core::messages::MessageBatch;

use crate::errors::MessagingError;

/// Handler for messages delivered on a subscribed channel.
///
/// The subscription holds the responder for its lifetime and invokes
/// [`on_messages`](MessageResponder::on_messages) once per delivered
/// non-empty batch. Subscribe failures are reported once through
/// [`on_fault`](MessageResponder::on_fault). After cancellation neither
/// method is invoked again.
pub trait MessageResponder: Send + Sync {
    /// Called with each delivered non-empty message batch.
    fn on_messages(&self, batch: &MessageBatch);

    /// Called once if the subscribe request fails.
    fn on_fault(&self, error: &MessagingError) {
        let _ = error;
    }
}

/// Shared responder handle.
///
/// Real-time deregistration is keyed by pointer identity
/// ([`same_responder`]), so the same `Arc` must be passed to both
/// registration and deregistration.
pub type SharedResponder = Arc<dyn MessageResponder>;

/// Whether two responder handles refer to the same responder.
#[must_use]
pub fn same_responder(a: &SharedResponder, b: &SharedResponder) -> bool {
    Arc::ptr_eq(a, b)
}

struct FnResponder<F>(F);

impl<F> MessageResponder for FnResponder<F>
where
    F: Fn(&MessageBatch) + Send + Sync,
{
    fn on_messages(&self, batch: &MessageBatch) {
        (self.0)(batch);
    }
}

/// Wrap a plain function as a responder with a no-op fault path.
pub fn responder_from_fn<F>(f: F) -> SharedResponder
where
    F: Fn(&MessageBatch) + Send + Sync + 'static,
{
    Arc::new(FnResponder(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn fn_responder_receives_batches() {
        let seen = Arc::new(Mutex::new(0usize));
        let seen2 = seen.clone();
        let responder = responder_from_fn(move |batch| {
            *seen2.lock() += batch.len();
        });

        let batch: MessageBatch = serde_json::from_str(
            r#"{"messages":[{"messageId":"m-1","data":"hi"}]}"#,
        )
        .unwrap();
        responder.on_messages(&batch);
        assert_eq!(*seen.lock(), 1);
    }

    #[test]
    fn default_fault_path_is_noop() {
        let responder = responder_from_fn(|_| {});
        responder.on_fault(&MessagingError::Cancelled);
    }

    #[test]
    fn identity_is_pointer_equality() {
        let a = responder_from_fn(|_| {});
        let b = responder_from_fn(|_| {});
        let a2 = a.clone();
        assert!(same_responder(&a, &a2));
        assert!(!same_responder(&a, &b));
    }
}
