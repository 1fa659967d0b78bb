use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ChannelError;

/// The operations the location channel answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Resolve the current location to an address.
    GetCurrentLocationWithAddress,
    /// Ask the user for location permission.
    RequestLocationPermission,
    /// Whether any location provider is enabled.
    IsLocationServiceEnabled,
    /// Open the location settings screen.
    OpenLocationSettings,
}

impl Method {
    /// Every supported method.
    pub const ALL: [Self; 4] = [
        Self::GetCurrentLocationWithAddress,
        Self::RequestLocationPermission,
        Self::IsLocationServiceEnabled,
        Self::OpenLocationSettings,
    ];

    /// The name the method is called by on the channel.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetCurrentLocationWithAddress => "getCurrentLocationWithAddress",
            Self::RequestLocationPermission => "requestLocationPermission",
            Self::IsLocationServiceEnabled => "isLocationServiceEnabled",
            Self::OpenLocationSettings => "openLocationSettings",
        }
    }

    /// Look a method up by its channel name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.name() == name)
    }
}

/// A request arriving over the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Name of the invoked method.
    pub method: String,
    /// Method arguments. None of the location methods take any.
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    /// A call without arguments.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Value::Null,
        }
    }

    /// Decode a call envelope.
    ///
    /// # Errors
    /// Returns [`ChannelError::Codec`] if `json` is not a call envelope.
    pub fn decode(json: &str) -> Result<Self, ChannelError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<Method> for MethodCall {
    fn from(method: Method) -> Self {
        Self::new(method.name())
    }
}
