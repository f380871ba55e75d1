//! REST endpoint catalog.
//!
//! Pure string builders over the application root path. Path segments that
//! may contain arbitrary caller data (object IDs) are percent-encoded;
//! channel names are validated at construction and embedded as-is.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use cirrus_core::channel::ChannelName;
use cirrus_core::ids::{ObjectId, SubscriptionId};

/// Characters escaped in path segments, matching `encodeURIComponent`.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'&')
    .add(b'=')
    .add(b'+')
    .add(b'\\');

/// Percent-encode one path segment.
pub(crate) fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Endpoint catalog rooted at one application path.
#[derive(Clone, Debug)]
pub struct Urls {
    root: String,
}

impl Urls {
    /// Build a catalog over the given application root
    /// (`<base_url>/<app_id>/<api_key>`).
    #[must_use]
    pub fn new(app_path: impl Into<String>) -> Self {
        Self {
            root: app_path.into(),
        }
    }

    /// Application root path.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    // ── Logging ─────────────────────────────────────────────────────

    /// Log batch upload endpoint.
    #[must_use]
    pub fn logging(&self) -> String {
        format!("{}/log", self.root)
    }

    // ── Messaging ───────────────────────────────────────────────────

    /// Messaging service root.
    #[must_use]
    pub fn messaging(&self) -> String {
        format!("{}/messaging", self.root)
    }

    /// A single channel.
    #[must_use]
    pub fn channel(&self, channel: &ChannelName) -> String {
        format!("{}/{channel}", self.messaging())
    }

    /// Channel properties endpoint.
    #[must_use]
    pub fn channel_properties(&self, channel: &ChannelName) -> String {
        format!("{}/properties", self.channel(channel))
    }

    /// Subscribe endpoint for a channel.
    #[must_use]
    pub fn channel_subscribe(&self, channel: &ChannelName) -> String {
        format!("{}/subscribe", self.channel(channel))
    }

    /// Poll endpoint for an active subscription.
    #[must_use]
    pub fn channel_subscription(
        &self,
        channel: &ChannelName,
        subscription_id: &SubscriptionId,
    ) -> String {
        format!("{}/{subscription_id}", self.channel(channel))
    }

    // ── Data ────────────────────────────────────────────────────────

    /// Data service root.
    #[must_use]
    pub fn data(&self) -> String {
        format!("{}/data", self.root)
    }

    /// A data table.
    #[must_use]
    pub fn table(&self, table: &str) -> String {
        format!("{}/{table}", self.data())
    }

    /// A single object in a table.
    #[must_use]
    pub fn table_object(&self, table: &str, object_id: &ObjectId) -> String {
        format!("{}/{}", self.table(table), encode_segment(object_id.as_str()))
    }

    /// Object count endpoint for a table.
    #[must_use]
    pub fn table_count(&self, table: &str) -> String {
        format!("{}/count", self.table(table))
    }

    /// Schema properties endpoint for a table.
    #[must_use]
    pub fn table_properties(&self, table: &str) -> String {
        format!("{}/properties", self.table(table))
    }
}
