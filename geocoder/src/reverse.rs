use log::{debug, warn};

use crate::{Address, Geocoder, Location, format_coordinates};

/// Describes locations as addresses, falling back to coordinates.
#[derive(Debug)]
pub struct ReverseGeocoder<G> {
    geocoder: G,
}

impl<G: Geocoder> ReverseGeocoder<G> {
    /// Wrap a platform geocoder.
    pub const fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    /// The underlying platform geocoder.
    pub const fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Describe `location` as a single-line address.
    ///
    /// Never fails: if no address can be produced the result is
    /// `"<lat>, <lon>"`.
    pub async fn describe(&self, location: &Location) -> String {
        if !self.geocoder.is_present() {
            debug!("no geocoder on this device, using coordinates");
            return format_coordinates(location);
        }

        match self
            .geocoder
            .from_location(location.latitude, location.longitude, 1)
            .await
        {
            Ok(addresses) => addresses
                .first()
                .and_then(Address::format)
                .unwrap_or_else(|| format_coordinates(location)),
            Err(err) => {
                warn!("reverse geocoding failed, using coordinates: {err}");
                format_coordinates(location)
            }
        }
    }
}
