//! Location permission handling.
//!
//! The platform side is abstracted by [`PermissionBackend`]; [`PermissionGate`]
//! layers the request/result handshake on top of it so that a permission
//! request resolves with the user's actual decision.

#![warn(missing_docs)]

mod gate;

pub use gate::{LOCATION_PERMISSION_REQUEST_CODE, PermissionGate};

/// Permissions the gate knows how to check and request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Precise location (`ACCESS_FINE_LOCATION` on Android).
    FineLocation,
    /// Approximate location (`ACCESS_COARSE_LOCATION` on Android).
    CoarseLocation,
}

impl Permission {
    /// The Android manifest name of this permission.
    #[must_use]
    pub const fn manifest_name(self) -> &'static str {
        match self {
            Self::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
            Self::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
        }
    }

    /// Parse an Android manifest permission name.
    #[must_use]
    pub fn from_manifest_name(name: &str) -> Option<Self> {
        match name {
            "android.permission.ACCESS_FINE_LOCATION" => Some(Self::FineLocation),
            "android.permission.ACCESS_COARSE_LOCATION" => Some(Self::CoarseLocation),
            _ => None,
        }
    }
}

/// The current status of a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionStatus {
    /// Permission has been granted by the user.
    Granted,
    /// Permission has been denied by the user.
    Denied,
    /// Permission has not been requested yet.
    NotDetermined,
}

/// Errors that can occur when requesting permissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    /// Permission prompts are not available on this platform.
    #[error("permission requests not supported on this platform")]
    NotSupported,
    /// The platform refused to show the permission prompt.
    #[error("failed to request permission: {0}")]
    Request(String),
}

/// Platform side of the permission gate.
pub trait PermissionBackend {
    /// Check the current status of a permission without prompting.
    fn check(&self, permission: Permission) -> PermissionStatus;

    /// Show the system prompt for `permissions`.
    ///
    /// Returns once the prompt has been issued. The user's decision arrives
    /// later through [`PermissionGate::on_permission_result`] under the same
    /// `request_code`.
    ///
    /// # Errors
    /// Returns a [`PermissionError`] if the prompt could not be shown.
    fn request(&self, permissions: &[Permission], request_code: i32)
    -> Result<(), PermissionError>;
}

impl<T: PermissionBackend + ?Sized> PermissionBackend for std::sync::Arc<T> {
    fn check(&self, permission: Permission) -> PermissionStatus {
        (**self).check(permission)
    }

    fn request(
        &self,
        permissions: &[Permission],
        request_code: i32,
    ) -> Result<(), PermissionError> {
        (**self).request(permissions, request_code)
    }
}
