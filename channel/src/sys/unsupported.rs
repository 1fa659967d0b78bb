use geokit_geocoder::{Address, GeocodeError, Geocoder};
use geokit_location::{
    Location, LocationError, LocationProvider, LocationRequest, Provider, ProviderStatus,
    SettingsError, SettingsLauncher, SubscriptionId, UpdateSink,
};
use geokit_permission::{Permission, PermissionBackend, PermissionError, PermissionStatus};

/// Backend for platforms without location services.
///
/// Permission is never granted, no provider is enabled, and there is no
/// geocoder, so every location call is answered without touching the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPlatform;

impl PermissionBackend for UnsupportedPlatform {
    fn check(&self, _permission: Permission) -> PermissionStatus {
        PermissionStatus::Denied
    }

    fn request(
        &self,
        _permissions: &[Permission],
        _request_code: i32,
    ) -> Result<(), PermissionError> {
        Err(PermissionError::NotSupported)
    }
}

impl ProviderStatus for UnsupportedPlatform {
    fn is_provider_enabled(&self, _provider: Provider) -> bool {
        false
    }
}

impl LocationProvider for UnsupportedPlatform {
    async fn last_location(&self) -> Result<Option<Location>, LocationError> {
        Ok(None)
    }

    fn request_location_updates(
        &self,
        _request: &LocationRequest,
        _sink: UpdateSink,
    ) -> Result<SubscriptionId, LocationError> {
        Err(LocationError::Unexpected(
            "location updates are not supported on this platform".into(),
        ))
    }

    fn remove_location_updates(&self, _subscription: SubscriptionId) {}
}

impl Geocoder for UnsupportedPlatform {
    fn is_present(&self) -> bool {
        false
    }

    async fn from_location(
        &self,
        _latitude: f64,
        _longitude: f64,
        _max_results: usize,
    ) -> Result<Vec<Address>, GeocodeError> {
        Err(GeocodeError::Unavailable(
            "no geocoder on this platform".into(),
        ))
    }
}

impl SettingsLauncher for UnsupportedPlatform {
    fn open_location_settings(&self) -> Result<(), SettingsError> {
        Err(SettingsError(
            "no settings screen on this platform".into(),
        ))
    }
}
