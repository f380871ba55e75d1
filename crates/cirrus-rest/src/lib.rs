//! # cirrus-rest
//!
//! REST layer for the Cirrus SDK.
//!
//! - [`config::CirrusConfig`]: explicit application configuration (base URL,
//!   app identifiers), loaded from defaults + optional JSON file + env
//!   overrides — passed into every component at construction, never global
//! - [`urls::Urls`]: the endpoint catalog as pure string builders
//! - [`client::RestClient`]: JSON verbs over a shared `reqwest::Client`,
//!   with platform error-body mapping
//! - [`data::DataStore`]: table-scoped persistence operations (save, find,
//!   remove, count)

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod data;
pub mod errors;
pub mod urls;

pub use client::RestClient;
pub use config::CirrusConfig;
pub use data::{DataQuery, DataStore};
pub use errors::{RestError, RestResult};
pub use urls::Urls;
