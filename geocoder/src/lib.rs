//! Reverse geocoding.
//!
//! Turns a [`Location`] into a single-line address. Geocoding is treated as
//! best-effort enrichment: whenever the platform geocoder is missing, fails,
//! or has nothing to say, the coordinates themselves are returned instead.

#![warn(missing_docs)]

mod address;
mod reverse;

use std::future::Future;

pub use address::{Address, format_coordinate, format_coordinates};
pub use geokit_location::Location;
pub use reverse::ReverseGeocoder;

/// Errors reported by a platform geocoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    /// The geocoding service could not be reached.
    #[error("geocoding service unavailable: {0}")]
    Unavailable(String),
    /// The platform call failed.
    #[error("platform error: {0}")]
    Platform(String),
}

/// A platform geocoder.
pub trait Geocoder {
    /// Whether a geocoding service exists on this device at all.
    fn is_present(&self) -> bool;

    /// Look up at most `max_results` addresses near the given coordinates,
    /// best match first.
    fn from_location(
        &self,
        latitude: f64,
        longitude: f64,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<Address>, GeocodeError>>;
}
