use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use futures::channel::oneshot;
use log::{debug, warn};

use crate::{Permission, PermissionBackend, PermissionError, PermissionStatus};

/// Request code used for the location permission prompt.
pub const LOCATION_PERMISSION_REQUEST_CODE: i32 = 1001;

const LOCATION_PERMISSIONS: [Permission; 2] =
    [Permission::FineLocation, Permission::CoarseLocation];

type Grants = Vec<(Permission, PermissionStatus)>;

/// Checks and requests location permission.
pub struct PermissionGate<B> {
    backend: B,
    request_code: i32,
    await_result: bool,
    pending: Mutex<HashMap<i32, oneshot::Sender<Grants>>>,
}

impl<B> fmt::Debug for PermissionGate<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionGate")
            .field("request_code", &self.request_code)
            .field("await_result", &self.await_result)
            .finish_non_exhaustive()
    }
}

impl<B: PermissionBackend> PermissionGate<B> {
    /// Create a gate that awaits the user's decision.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            request_code: LOCATION_PERMISSION_REQUEST_CODE,
            await_result: true,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Use a different request code for the permission prompt.
    #[must_use]
    pub const fn with_request_code(mut self, request_code: i32) -> Self {
        self.request_code = request_code;
        self
    }

    /// Choose whether [`Self::request_location_permission`] waits for the
    /// user's decision. When `false`, the prompt is issued and `true` is
    /// reported straight away.
    #[must_use]
    pub const fn await_result(mut self, await_result: bool) -> Self {
        self.await_result = await_result;
        self
    }

    /// The request code the prompt is issued under.
    pub const fn request_code(&self) -> i32 {
        self.request_code
    }

    /// The underlying platform backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Whether precise location permission is currently granted.
    pub fn has_location_permission(&self) -> bool {
        self.backend.check(Permission::FineLocation) == PermissionStatus::Granted
    }

    /// Request location permission.
    ///
    /// Returns `true` without prompting if permission is already granted.
    /// Otherwise prompts for fine and coarse location and resolves with
    /// whether fine location was granted. A request superseded by a newer
    /// one under the same request code resolves to `false`.
    ///
    /// # Errors
    /// Returns a [`PermissionError`] if the prompt could not be shown.
    pub async fn request_location_permission(&self) -> Result<bool, PermissionError> {
        if self.has_location_permission() {
            return Ok(true);
        }

        if !self.await_result {
            self.backend
                .request(&LOCATION_PERMISSIONS, self.request_code)?;
            return Ok(true);
        }

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().expect("pending mutex poisoned");
            if pending.insert(self.request_code, tx).is_some() {
                debug!(
                    "superseding pending permission request {}",
                    self.request_code
                );
            }
        }

        if let Err(err) = self
            .backend
            .request(&LOCATION_PERMISSIONS, self.request_code)
        {
            // A newer request may have taken the slot in the meantime.
            let mut pending = self.pending.lock().expect("pending mutex poisoned");
            if pending
                .get(&self.request_code)
                .is_some_and(|sender| sender.is_connected_to(&rx))
            {
                pending.remove(&self.request_code);
            }
            return Err(err);
        }

        let Ok(grants) = rx.await else {
            return Ok(false);
        };

        Ok(grants.iter().any(|&(permission, status)| {
            permission == Permission::FineLocation && status == PermissionStatus::Granted
        }))
    }

    /// Deliver the platform's permission-result event.
    ///
    /// Returns `false` if no request was waiting on `request_code`.
    pub fn on_permission_result(
        &self,
        request_code: i32,
        grants: Vec<(Permission, PermissionStatus)>,
    ) -> bool {
        let sender = self
            .pending
            .lock()
            .expect("pending mutex poisoned")
            .remove(&request_code);

        match sender {
            Some(sender) => sender.send(grants).is_ok(),
            None => {
                warn!("dropping permission result for unknown request code {request_code}");
                false
            }
        }
    }
}
