use std::time::Duration;

use geokit_location::LocationRequest;
use geokit_permission::LOCATION_PERMISSION_REQUEST_CODE;
use serde::{Deserialize, Serialize};

use crate::ChannelError;

/// Channel name the host registers by default.
pub const DEFAULT_CHANNEL_NAME: &str = "safe_voice/location";

/// Runtime configuration handed over by the host application.
///
/// Every field is optional in the serialized form; missing fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelConfig {
    /// Name of the method channel.
    pub channel_name: String,
    /// Request code for the location permission prompt.
    pub permission_request_code: i32,
    /// Wait for the user's decision before answering `requestLocationPermission`.
    pub await_permission_result: bool,
    /// Upper bound on the wait for a fresh fix, in milliseconds. `None`
    /// leaves the wait to the provider.
    pub fix_timeout_ms: Option<u64>,
    /// BCP 47 tag for geocoder output; `None` uses the device locale.
    pub geocoder_locale: Option<String>,
    /// Parameters of the fresh location request.
    pub request: LocationRequest,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            channel_name: DEFAULT_CHANNEL_NAME.to_owned(),
            permission_request_code: LOCATION_PERMISSION_REQUEST_CODE,
            await_permission_result: true,
            fix_timeout_ms: Some(30_000),
            geocoder_locale: None,
            request: LocationRequest::default(),
        }
    }
}

impl ChannelConfig {
    /// Parse a JSON configuration.
    ///
    /// # Errors
    /// Returns [`ChannelError::Codec`] if `json` is not a valid configuration.
    pub fn from_json(json: &str) -> Result<Self, ChannelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The fresh-fix wait bound.
    #[must_use]
    pub fn fix_timeout(&self) -> Option<Duration> {
        self.fix_timeout_ms.map(Duration::from_millis)
    }
}
