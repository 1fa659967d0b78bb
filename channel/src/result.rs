use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ChannelError;

/// Kinds of failure reported back over the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Location permission is missing or was refused by the platform.
    PermissionDenied,
    /// No location provider is enabled.
    LocationDisabled,
    /// The location provider failed.
    LocationError,
    /// The settings screen could not be opened.
    SettingsError,
}

impl ErrorCode {
    /// The code as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::LocationDisabled => "LOCATION_DISABLED",
            Self::LocationError => "LOCATION_ERROR",
            Self::SettingsError => "SETTINGS_ERROR",
        }
    }
}

/// The answer to a single method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResult {
    /// The call succeeded.
    Success {
        /// A boolean, string or null.
        value: Value,
    },
    /// The call failed.
    Error {
        /// Failure kind.
        code: ErrorCode,
        /// Human-readable description.
        message: String,
        /// Always null.
        #[serde(default)]
        details: Value,
    },
    /// The method is not known to this channel.
    NotImplemented,
}

impl MethodResult {
    /// A successful result carrying `value`.
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success {
            value: value.into(),
        }
    }

    /// A failed result.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
            details: Value::Null,
        }
    }

    /// The error code, if this is a failure.
    #[must_use]
    pub const fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Error { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Encode the result envelope.
    ///
    /// # Errors
    /// Returns [`ChannelError::Codec`] if serialization fails.
    pub fn encode(&self) -> Result<String, ChannelError> {
        Ok(serde_json::to_string(self)?)
    }
}
