use std::time::Duration;

use log::debug;

use crate::{Location, LocationError, LocationProvider, LocationRequest, OneShotFix, UpdateSink};

/// Outcome of a location fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fix {
    /// The provider produced a location.
    Located(Location),
    /// Neither a cached nor a fresh location was available.
    Unavailable,
}

/// Fetches the device location, preferring the provider's cached fix.
#[derive(Debug)]
pub struct LocationFetcher<P> {
    provider: P,
    request: LocationRequest,
    fix_timeout: Option<Duration>,
}

impl<P: LocationProvider> LocationFetcher<P> {
    /// How long a fresh request waits for its update by default.
    pub const DEFAULT_FIX_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a fetcher issuing the default high-accuracy single-update request.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            request: LocationRequest::default(),
            fix_timeout: Some(Self::DEFAULT_FIX_TIMEOUT),
        }
    }

    /// Use different parameters for fresh requests.
    #[must_use]
    pub fn with_request(mut self, request: LocationRequest) -> Self {
        self.request = request;
        self
    }

    /// Bound the wait for a fresh update; `None` waits for the provider.
    #[must_use]
    pub const fn with_fix_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fix_timeout = timeout;
        self
    }

    /// The underlying provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Parameters used for fresh requests.
    pub const fn request(&self) -> &LocationRequest {
        &self.request
    }

    /// Fetch the current location.
    ///
    /// Returns the cached location when the provider has one, otherwise
    /// waits for a single fresh update.
    ///
    /// # Errors
    /// Returns a [`LocationError`] if the cached lookup fails or the fresh
    /// request cannot be issued.
    pub async fn current(&self) -> Result<Fix, LocationError> {
        if let Some(location) = self.provider.last_location().await? {
            return Ok(Fix::Located(location));
        }

        debug!("no cached location, requesting a fresh fix");
        let fix = self.fresh()?.await;
        Ok(fix.map_or(Fix::Unavailable, Fix::Located))
    }

    /// Issue one fresh location request.
    ///
    /// # Errors
    /// Returns a [`LocationError`] if the provider refuses the subscription.
    pub fn fresh(&self) -> Result<OneShotFix<'_, P>, LocationError> {
        let (sink, receiver) = UpdateSink::channel();
        let subscription = self.provider.request_location_updates(&self.request, sink)?;
        Ok(OneShotFix::new(
            &self.provider,
            subscription,
            receiver,
            self.fix_timeout,
        ))
    }
}
