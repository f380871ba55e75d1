//! Branded ID newtypes for type safety.
//!
//! Server-issued handles (`SubscriptionId`, `ObjectId`) and message
//! identifiers are distinct newtype wrappers around `String`, so a
//! subscription handle can never be passed where an object ID is expected.
//!
//! Server-issued IDs are only constructed from wire strings. [`MessageId`]
//! additionally supports client-side generation as UUID v7 (time-ordered),
//! used for request correlation.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generate a new UUID v7 string (time-ordered).
pub(crate) fn new_v7() -> String {
    Uuid::now_v7().to_string()
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from a wire string.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

branded_id! {
    /// Handle for an active channel subscription, issued by the remote
    /// service in the subscribe response.
    SubscriptionId
}

branded_id! {
    /// Identifier of a stored data object, assigned by the remote service
    /// on first save.
    ObjectId
}

branded_id! {
    /// Identifier of a published message.
    MessageId
}

impl MessageId {
    /// Create a new client-generated ID (UUID v7, time-ordered).
    #[must_use]
    pub fn new() -> Self {
        Self(new_v7())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}
