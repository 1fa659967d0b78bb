//! # Geokit
//!
//! Device location lookup for applications that talk to native code over a
//! method channel.
//!
//! Geokit answers four channel methods: fetching the current location as a
//! human-readable address, requesting location permission, checking whether
//! location services are on, and opening the location settings screen. The
//! platform services behind them (permission checks, the fused location
//! provider, the geocoder) are reached through backend traits, so the same
//! dispatcher runs against Android's JNI backend or an in-memory one.
//!
//! ## Features
//!
//! - `permission`: the location permission gate.
//! - `location`: provider availability, location fetching and the settings launcher.
//! - `geocoder`: reverse geocoding with coordinate fallback.
//! - `channel`: the method-channel dispatcher, its wire codec and the Android backend.
//!
//! `channel` is on by default and pulls in the other three. Use the `full`
//! feature to enable everything explicitly.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! geokit = { version = "0.1", features = ["channel"] }
//! ```
//!
//! ```rust,ignore
//! use geokit::channel::sys::UnsupportedPlatform;
//! use geokit::channel::{ChannelConfig, LocationChannel, Method};
//!
//! let platform = UnsupportedPlatform;
//! let channel = LocationChannel::new(ChannelConfig::default(), platform, platform, platform, platform);
//!
//! let result = channel.handle(Method::IsLocationServiceEnabled.into()).await;
//! println!("{}", result.encode()?);
//! ```

#[cfg(feature = "channel")]
pub use geokit_channel as channel;

#[cfg(feature = "geocoder")]
pub use geokit_geocoder as geocoder;

#[cfg(feature = "location")]
pub use geokit_location as location;

#[cfg(feature = "permission")]
pub use geokit_permission as permission;
