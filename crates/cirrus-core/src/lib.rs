//! # cirrus-core
//!
//! Shared vocabulary for the Cirrus SDK.
//!
//! This crate provides the types every other Cirrus crate depends on:
//!
//! - **Branded IDs**: `SubscriptionId`, `ObjectId`, `MessageId` as newtypes
//!   for type safety
//! - **Channels**: validated [`channel::ChannelName`] and the
//!   [`channel::ChannelProperties`] wire struct
//! - **Messages**: [`messages::Message`] and [`messages::MessageBatch`],
//!   the payloads delivered to channel subscribers

#![deny(unsafe_code)]

pub mod channel;
pub mod ids;
pub mod messages;

pub use channel::{ChannelName, ChannelProperties};
pub use ids::{MessageId, ObjectId, SubscriptionId};
pub use messages::{Message, MessageBatch};
