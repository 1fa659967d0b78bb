//! Method-channel dispatcher for device location lookup.
//!
//! The host application forwards calls arriving on its location channel to
//! [`LocationChannel::handle`] (or [`LocationChannel::handle_json`] for JSON
//! envelopes) and sends the returned [`MethodResult`] back. Four methods are
//! answered:
//!
//! | Method | Success value | Error codes |
//! |---|---|---|
//! | `getCurrentLocationWithAddress` | address, `"lat, lon"`, or [`LOCATION_UNAVAILABLE`] | `PERMISSION_DENIED`, `LOCATION_DISABLED`, `LOCATION_ERROR` |
//! | `requestLocationPermission` | whether permission was granted | none |
//! | `isLocationServiceEnabled` | whether a provider is enabled | none |
//! | `openLocationSettings` | null | `SETTINGS_ERROR` |
//!
//! Any other method name yields [`MethodResult::NotImplemented`].

#![warn(missing_docs)]

mod config;
mod dispatch;
mod error;
mod method;
mod result;

/// Platform-specific implementations.
pub mod sys;

pub use config::{ChannelConfig, DEFAULT_CHANNEL_NAME};
pub use dispatch::{LOCATION_UNAVAILABLE, LocationChannel};
pub use error::ChannelError;
pub use method::{Method, MethodCall};
pub use result::{ErrorCode, MethodResult};
