use geokit_geocoder::{Geocoder, ReverseGeocoder};
use geokit_location::{
    Fix, LocationError, LocationFetcher, LocationProvider, ProviderStatus, SettingsLauncher,
    is_location_enabled,
};
use geokit_permission::{Permission, PermissionBackend, PermissionGate, PermissionStatus};
use log::{debug, warn};
use serde_json::Value;

use crate::{ChannelConfig, ErrorCode, Method, MethodCall, MethodResult};

/// Reported when neither a cached nor a fresh fix could be obtained.
pub const LOCATION_UNAVAILABLE: &str = "Unable to detect precise location";

const NOT_IMPLEMENTED_ENVELOPE: &str = r#"{"status":"notImplemented"}"#;

/// Answers location method calls.
///
/// `P` checks and requests permission, `L` is the fused location provider
/// (which also reports provider availability), `G` is the platform
/// geocoder and `S` opens the settings screen. On a real device these are
/// usually the same platform object.
#[derive(Debug)]
pub struct LocationChannel<P, L, G, S> {
    config: ChannelConfig,
    permissions: PermissionGate<P>,
    fetcher: LocationFetcher<L>,
    geocoder: ReverseGeocoder<G>,
    settings: S,
}

impl<P, L, G, S> LocationChannel<P, L, G, S>
where
    P: PermissionBackend,
    L: LocationProvider + ProviderStatus,
    G: Geocoder,
    S: SettingsLauncher,
{
    /// Assemble a channel from its platform services.
    pub fn new(config: ChannelConfig, permissions: P, location: L, geocoder: G, settings: S) -> Self {
        let permissions = PermissionGate::new(permissions)
            .with_request_code(config.permission_request_code)
            .await_result(config.await_permission_result);
        let fetcher = LocationFetcher::new(location)
            .with_request(config.request.clone())
            .with_fix_timeout(config.fix_timeout());

        Self {
            config,
            permissions,
            fetcher,
            geocoder: ReverseGeocoder::new(geocoder),
            settings,
        }
    }

    /// The configuration the channel was built with.
    pub const fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// The channel name to register with the host.
    pub fn name(&self) -> &str {
        &self.config.channel_name
    }

    /// The permission gate, for wiring up permission-result events.
    pub const fn permissions(&self) -> &PermissionGate<P> {
        &self.permissions
    }

    /// Route the platform's permission-result event to the waiting request.
    pub fn on_permission_result(
        &self,
        request_code: i32,
        grants: Vec<(Permission, PermissionStatus)>,
    ) -> bool {
        self.permissions.on_permission_result(request_code, grants)
    }

    /// Answer a method call.
    pub async fn handle(&self, call: MethodCall) -> MethodResult {
        let Some(method) = Method::from_name(&call.method) else {
            debug!("{}: {} is not implemented", self.name(), call.method);
            return MethodResult::NotImplemented;
        };

        debug!("{}: handling {}", self.name(), method.name());
        match method {
            Method::GetCurrentLocationWithAddress => self.current_location_with_address().await,
            Method::RequestLocationPermission => self.request_location_permission().await,
            Method::IsLocationServiceEnabled => {
                MethodResult::success(is_location_enabled(self.fetcher.provider()))
            }
            Method::OpenLocationSettings => self.open_location_settings(),
        }
    }

    /// Decode a call envelope, answer it and encode the result envelope.
    ///
    /// Every payload gets a reply: a malformed envelope is answered with the
    /// not-implemented envelope.
    pub async fn handle_json(&self, payload: &str) -> String {
        let result = match MethodCall::decode(payload) {
            Ok(call) => self.handle(call).await,
            Err(err) => {
                warn!("{}: malformed method call: {err}", self.name());
                MethodResult::NotImplemented
            }
        };

        result.encode().unwrap_or_else(|err| {
            warn!("{}: failed to encode result: {err}", self.name());
            NOT_IMPLEMENTED_ENVELOPE.to_owned()
        })
    }

    async fn current_location_with_address(&self) -> MethodResult {
        if !self.permissions.has_location_permission() {
            return MethodResult::error(
                ErrorCode::PermissionDenied,
                "Location permission not granted",
            );
        }

        if !is_location_enabled(self.fetcher.provider()) {
            return MethodResult::error(
                ErrorCode::LocationDisabled,
                "Location services are disabled",
            );
        }

        match self.fetcher.current().await {
            Ok(Fix::Located(location)) => {
                MethodResult::success(self.geocoder.describe(&location).await)
            }
            Ok(Fix::Unavailable) => MethodResult::success(LOCATION_UNAVAILABLE),
            Err(LocationError::PermissionDenied) => {
                MethodResult::error(ErrorCode::PermissionDenied, "Location permission denied")
            }
            Err(LocationError::Provider(message)) => MethodResult::error(
                ErrorCode::LocationError,
                format!("Failed to get location: {message}"),
            ),
            Err(LocationError::Unexpected(message)) => MethodResult::error(
                ErrorCode::LocationError,
                format!("Unexpected error: {message}"),
            ),
        }
    }

    async fn request_location_permission(&self) -> MethodResult {
        match self.permissions.request_location_permission().await {
            Ok(granted) => MethodResult::success(granted),
            Err(err) => {
                warn!("{}: permission prompt failed: {err}", self.name());
                MethodResult::success(false)
            }
        }
    }

    fn open_location_settings(&self) -> MethodResult {
        match self.settings.open_location_settings() {
            Ok(()) => MethodResult::success(Value::Null),
            Err(err) => {
                warn!("{}: {err}", self.name());
                MethodResult::error(ErrorCode::SettingsError, "Unable to open location settings")
            }
        }
    }
}
