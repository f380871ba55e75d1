//! Channel names and channel properties.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned for a channel name that cannot be embedded in a URL path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelNameError {
    /// The name was empty.
    #[error("channel name must not be empty")]
    Empty,

    /// The name contained a path separator.
    #[error("channel name {name:?} must not contain '/'")]
    ContainsSlash {
        /// The rejected name.
        name: String,
    },
}

/// A named message topic that can be subscribed to.
///
/// Channel names are embedded directly in REST URL paths, so they must be
/// non-empty and must not contain `/`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelName(String);

impl ChannelName {
    /// Validate and wrap a channel name.
    pub fn new(name: impl Into<String>) -> Result<Self, ChannelNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ChannelNameError::Empty);
        }
        if name.contains('/') {
            return Err(ChannelNameError::ContainsSlash { name });
        }
        Ok(Self(name))
    }

    /// Return the name as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-channel properties returned by the channel-properties endpoint.
///
/// The `websocket` base URL, when present, signals that the host
/// environment can hold persistent full-duplex connections for this
/// channel; its absence forces the polling transport.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProperties {
    /// WebSocket base URL for the real-time transport, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub websocket: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn valid_name_accepted() {
        let name = ChannelName::new("chat").unwrap();
        assert_eq!(name.as_str(), "chat");
        assert_eq!(name.to_string(), "chat");
    }

    #[test]
    fn empty_name_rejected() {
        assert_matches!(ChannelName::new(""), Err(ChannelNameError::Empty));
    }

    #[test]
    fn slash_rejected() {
        let err = ChannelName::new("a/b").unwrap_err();
        assert_matches!(err, ChannelNameError::ContainsSlash { name } if name == "a/b");
    }

    #[test]
    fn properties_parse_with_websocket() {
        let props: ChannelProperties =
            serde_json::from_str(r#"{"websocket":"wss://rt.example.com/chat"}"#).unwrap();
        assert_eq!(props.websocket.as_deref(), Some("wss://rt.example.com/chat"));
    }

    #[test]
    fn properties_parse_empty_object() {
        let props: ChannelProperties = serde_json::from_str("{}").unwrap();
        assert!(props.websocket.is_none());
    }
}
