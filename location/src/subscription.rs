use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::FutureExt;
use futures::channel::oneshot;
use futures_timer::Delay;
use log::debug;

use crate::{Location, LocationProvider};

/// Identifies a location update subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

type Slot = Arc<Mutex<Option<oneshot::Sender<Option<Location>>>>>;

/// Receiving end a provider delivers location updates into.
///
/// Only the first delivery is kept; later ones are ignored. Dropping every
/// clone of the sink without delivering resolves the waiting side with no
/// location.
#[derive(Clone)]
pub struct UpdateSink {
    slot: Slot,
}

impl fmt::Debug for UpdateSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateSink")
            .field("delivered", &self.is_done())
            .finish()
    }
}

impl UpdateSink {
    /// Create a sink and the receiver its first delivery lands in.
    #[must_use]
    pub fn channel() -> (Self, oneshot::Receiver<Option<Location>>) {
        let (tx, rx) = oneshot::channel();
        let sink = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (sink, rx)
    }

    /// Deliver an update. `None` means the provider produced a result
    /// without a location.
    ///
    /// Returns `false` if an update was already delivered or nobody is
    /// waiting any more.
    pub fn deliver(&self, location: Option<Location>) -> bool {
        let sender = self.slot.lock().expect("sink mutex poisoned").take();
        sender.is_some_and(|sender| sender.send(location).is_ok())
    }

    /// Whether further deliveries would be ignored.
    pub fn is_done(&self) -> bool {
        self.slot
            .lock()
            .expect("sink mutex poisoned")
            .as_ref()
            .is_none_or(oneshot::Sender::is_canceled)
    }
}

/// A pending fresh location fix.
///
/// Resolves with the first update the provider delivers, or `None` if the
/// provider reports no location, drops the subscription, or the wait bound
/// elapses. The subscription is removed exactly once: when the future
/// resolves or when it is dropped before resolving.
pub struct OneShotFix<'a, P: LocationProvider> {
    provider: &'a P,
    subscription: Option<SubscriptionId>,
    receiver: oneshot::Receiver<Option<Location>>,
    deadline: Option<Delay>,
}

impl<P: LocationProvider> fmt::Debug for OneShotFix<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneShotFix")
            .field("subscription", &self.subscription)
            .field("bounded", &self.deadline.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, P: LocationProvider> OneShotFix<'a, P> {
    pub(crate) fn new(
        provider: &'a P,
        subscription: SubscriptionId,
        receiver: oneshot::Receiver<Option<Location>>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            provider,
            subscription: Some(subscription),
            receiver,
            deadline: timeout.map(Delay::new),
        }
    }

    /// The subscription backing this fix, until it has been released.
    pub const fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.provider.remove_location_updates(subscription);
        }
    }
}

impl<P: LocationProvider> Future for OneShotFix<'_, P> {
    type Output = Option<Location>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;

        if let Poll::Ready(result) = this.receiver.poll_unpin(cx) {
            this.release();
            return Poll::Ready(result.ok().flatten());
        }

        if let Some(deadline) = this.deadline.as_mut() {
            if deadline.poll_unpin(cx).is_ready() {
                debug!("fresh location request timed out");
                this.deadline = None;
                this.release();
                return Poll::Ready(None);
            }
        }

        Poll::Pending
    }
}

impl<P: LocationProvider> Drop for OneShotFix<'_, P> {
    fn drop(&mut self) {
        self.release();
    }
}
