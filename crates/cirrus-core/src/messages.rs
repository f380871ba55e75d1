//! Channel message payloads.
//!
//! The wire format for both the polling endpoint and real-time frames is
//! `{ "messages": [ ... ] }`. A missing or empty `messages` array means
//! "nothing pending" and must never reach a subscriber.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::ids::MessageId;

/// A single message delivered on a channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier.
    pub message_id: MessageId,

    /// Opaque message payload.
    pub data: Value,

    /// Optional publisher-supplied headers.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    /// Identifier of the publisher, if the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_id: Option<String>,

    /// Publish timestamp in milliseconds since the epoch, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<i64>,
}

/// An ordered batch of messages, as returned by one poll response or one
/// real-time frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageBatch {
    /// Messages in delivery order.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl MessageBatch {
    /// Number of messages in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the batch carries no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
