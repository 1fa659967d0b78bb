//! Device location access.
//!
//! This crate covers the location side of the channel: checking whether a
//! location provider is enabled, fetching a fix from a fused location
//! provider, and opening the system's location settings. Platform services
//! are reached through the [`ProviderStatus`], [`LocationProvider`] and
//! [`SettingsLauncher`] traits.

#![warn(missing_docs)]

mod fetch;
mod subscription;

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use fetch::{Fix, LocationFetcher};
pub use subscription::{OneShotFix, SubscriptionId, UpdateSink};

/// A geographic location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
}

impl Location {
    /// Create a location from coordinates in degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Location providers whose availability can be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Satellite positioning.
    Gps,
    /// Cell and Wi-Fi positioning.
    Network,
}

impl Provider {
    /// The Android provider name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gps => "gps",
            Self::Network => "network",
        }
    }
}

/// Accuracy/power trade-off for a location request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    /// Most accurate fix available, typically satellite based.
    #[default]
    HighAccuracy,
    /// Block-level accuracy.
    BalancedPowerAccuracy,
    /// City-level accuracy.
    LowPower,
    /// Only fixes other clients already requested.
    Passive,
}

impl Priority {
    /// The fused provider's numeric priority constant.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::HighAccuracy => 100,
            Self::BalancedPowerAccuracy => 102,
            Self::LowPower => 104,
            Self::Passive => 105,
        }
    }
}

/// Parameters for a fresh location request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationRequest {
    /// Requested accuracy.
    pub priority: Priority,
    /// Desired interval between updates, in milliseconds.
    pub interval_ms: u64,
    /// Fastest interval the caller can handle, in milliseconds.
    pub fastest_interval_ms: u64,
    /// Number of updates after which the provider stops delivering.
    pub num_updates: u32,
}

impl LocationRequest {
    /// Desired interval between updates.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Fastest interval the caller can handle.
    #[must_use]
    pub const fn fastest_interval(&self) -> Duration {
        Duration::from_millis(self.fastest_interval_ms)
    }
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            priority: Priority::HighAccuracy,
            interval_ms: 10_000,
            fastest_interval_ms: 5_000,
            num_updates: 1,
        }
    }
}

/// Errors that can occur when fetching a location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// The platform rejected the call for lack of permission.
    #[error("location permission denied")]
    PermissionDenied,
    /// The provider failed to produce the cached location.
    #[error("failed to get location: {0}")]
    Provider(String),
    /// Any other platform failure.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Errors that can occur when opening the location settings screen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unable to open location settings: {0}")]
pub struct SettingsError(pub String);

/// Availability of the device's location providers.
pub trait ProviderStatus {
    /// Whether `provider` is currently enabled.
    fn is_provider_enabled(&self, provider: Provider) -> bool;
}

/// Returns true if either the GPS or the network provider is enabled.
pub fn is_location_enabled<S: ProviderStatus + ?Sized>(status: &S) -> bool {
    status.is_provider_enabled(Provider::Gps) || status.is_provider_enabled(Provider::Network)
}

/// A fused location provider.
pub trait LocationProvider {
    /// The most recent cached location, if the provider has one.
    fn last_location(&self) -> impl Future<Output = Result<Option<Location>, LocationError>>;

    /// Subscribe to location updates.
    ///
    /// Updates are delivered through `sink`. The subscription stays active
    /// until [`Self::remove_location_updates`] is called with the returned id.
    ///
    /// # Errors
    /// Returns [`LocationError::PermissionDenied`] if the platform refuses the
    /// subscription for lack of permission.
    fn request_location_updates(
        &self,
        request: &LocationRequest,
        sink: UpdateSink,
    ) -> Result<SubscriptionId, LocationError>;

    /// Cancel a subscription created by [`Self::request_location_updates`].
    fn remove_location_updates(&self, subscription: SubscriptionId);
}

/// Opens the system's location settings.
pub trait SettingsLauncher {
    /// Open the location source settings screen.
    ///
    /// # Errors
    /// Returns a [`SettingsError`] if the screen could not be launched.
    fn open_location_settings(&self) -> Result<(), SettingsError>;
}

impl<T: ProviderStatus + ?Sized> ProviderStatus for std::sync::Arc<T> {
    fn is_provider_enabled(&self, provider: Provider) -> bool {
        (**self).is_provider_enabled(provider)
    }
}

impl<T: SettingsLauncher + ?Sized> SettingsLauncher for std::sync::Arc<T> {
    fn open_location_settings(&self) -> Result<(), SettingsError> {
        (**self).open_location_settings()
    }
}
