//! Platform-specific channel backends.

/// Android platform implementation.
#[cfg(target_os = "android")]
pub mod android;

mod unsupported;

pub use unsupported::UnsupportedPlatform;
