use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use geokit_location::{
    Fix, Location, LocationError, LocationFetcher, LocationProvider, LocationRequest, Priority,
    Provider, ProviderStatus, SubscriptionId, UpdateSink, is_location_enabled,
};

enum OnSubscribe {
    Deliver(Option<Location>),
    DropSink,
    Hold,
    Refuse(LocationError),
}

struct FakeProvider {
    cached: Result<Option<Location>, LocationError>,
    on_subscribe: OnSubscribe,
    held: Mutex<Vec<UpdateSink>>,
    requests: Mutex<Vec<LocationRequest>>,
    removed: Mutex<Vec<SubscriptionId>>,
    next_id: AtomicU64,
}

impl FakeProvider {
    fn new(cached: Option<Location>, on_subscribe: OnSubscribe) -> Self {
        Self {
            cached: Ok(cached),
            on_subscribe,
            held: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn removed(&self) -> Vec<SubscriptionId> {
        self.removed.lock().unwrap().clone()
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl LocationProvider for FakeProvider {
    async fn last_location(&self) -> Result<Option<Location>, LocationError> {
        self.cached.clone()
    }

    fn request_location_updates(
        &self,
        request: &LocationRequest,
        sink: UpdateSink,
    ) -> Result<SubscriptionId, LocationError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.on_subscribe {
            OnSubscribe::Deliver(location) => {
                sink.deliver(*location);
            }
            OnSubscribe::DropSink => drop(sink),
            OnSubscribe::Hold => self.held.lock().unwrap().push(sink),
            OnSubscribe::Refuse(err) => return Err(err.clone()),
        }
        Ok(SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    fn remove_location_updates(&self, subscription: SubscriptionId) {
        self.removed.lock().unwrap().push(subscription);
    }
}

const BERLIN: Location = Location::new(52.52, 13.405);

#[tokio::test]
async fn cached_location_skips_fresh_request() {
    let fetcher = LocationFetcher::new(FakeProvider::new(Some(BERLIN), OnSubscribe::Hold));

    assert_eq!(fetcher.current().await, Ok(Fix::Located(BERLIN)));
    assert_eq!(fetcher.provider().request_count(), 0);
}

#[tokio::test]
async fn fresh_fix_is_used_when_cache_is_empty() {
    let fetcher = LocationFetcher::new(FakeProvider::new(
        None,
        OnSubscribe::Deliver(Some(BERLIN)),
    ));

    assert_eq!(fetcher.current().await, Ok(Fix::Located(BERLIN)));
    assert_eq!(fetcher.provider().removed(), vec![SubscriptionId(1)]);

    let requests = fetcher.provider().requests.lock().unwrap().clone();
    assert_eq!(requests, vec![LocationRequest::default()]);
}

#[tokio::test]
async fn empty_fresh_result_is_unavailable() {
    let fetcher = LocationFetcher::new(FakeProvider::new(None, OnSubscribe::Deliver(None)));

    assert_eq!(fetcher.current().await, Ok(Fix::Unavailable));
    assert_eq!(fetcher.provider().removed(), vec![SubscriptionId(1)]);
}

#[tokio::test]
async fn dropped_sink_is_unavailable() {
    let fetcher = LocationFetcher::new(FakeProvider::new(None, OnSubscribe::DropSink));

    assert_eq!(fetcher.current().await, Ok(Fix::Unavailable));
    assert_eq!(fetcher.provider().removed(), vec![SubscriptionId(1)]);
}

#[tokio::test]
async fn fresh_request_times_out() {
    let fetcher = LocationFetcher::new(FakeProvider::new(None, OnSubscribe::Hold))
        .with_fix_timeout(Some(Duration::from_millis(20)));

    assert_eq!(fetcher.current().await, Ok(Fix::Unavailable));
    assert_eq!(fetcher.provider().removed(), vec![SubscriptionId(1)]);

    let held = fetcher.provider().held.lock().unwrap();
    assert!(held[0].is_done());
}

#[tokio::test]
async fn late_update_after_first_is_ignored() {
    let fetcher = LocationFetcher::new(FakeProvider::new(None, OnSubscribe::Hold))
        .with_fix_timeout(None);

    let pending = fetcher.fresh().unwrap();
    let sink = fetcher.provider().held.lock().unwrap()[0].clone();
    assert!(sink.deliver(Some(BERLIN)));
    assert!(!sink.deliver(Some(Location::new(0.0, 0.0))));

    assert_eq!(pending.await, Some(BERLIN));
    assert_eq!(fetcher.provider().removed(), vec![SubscriptionId(1)]);
}

#[test]
fn dropping_a_pending_fix_unsubscribes() {
    let fetcher = LocationFetcher::new(FakeProvider::new(None, OnSubscribe::Hold));

    let pending = fetcher.fresh().unwrap();
    assert_eq!(pending.subscription(), Some(SubscriptionId(1)));
    drop(pending);

    assert_eq!(fetcher.provider().removed(), vec![SubscriptionId(1)]);
    assert!(fetcher.provider().held.lock().unwrap()[0].is_done());
}

#[tokio::test]
async fn provider_failures_propagate() {
    let mut provider = FakeProvider::new(None, OnSubscribe::Hold);
    provider.cached = Err(LocationError::Provider("play services unavailable".into()));
    let fetcher = LocationFetcher::new(provider);
    assert_eq!(
        fetcher.current().await,
        Err(LocationError::Provider("play services unavailable".into()))
    );

    let fetcher = LocationFetcher::new(FakeProvider::new(
        None,
        OnSubscribe::Refuse(LocationError::PermissionDenied),
    ));
    assert_eq!(fetcher.current().await, Err(LocationError::PermissionDenied));
    assert!(fetcher.provider().removed().is_empty());
}

#[test]
fn default_request_is_high_accuracy_single_update() {
    let request = LocationRequest::default();
    assert_eq!(request.priority, Priority::HighAccuracy);
    assert_eq!(request.priority.code(), 100);
    assert_eq!(request.interval(), Duration::from_secs(10));
    assert_eq!(request.fastest_interval(), Duration::from_secs(5));
    assert_eq!(request.num_updates, 1);
}

#[test]
fn request_fields_default_when_omitted() {
    let request: LocationRequest =
        serde_json::from_str(r#"{"priority":"balancedPowerAccuracy","intervalMs":60000}"#).unwrap();
    assert_eq!(request.priority, Priority::BalancedPowerAccuracy);
    assert_eq!(request.interval_ms, 60_000);
    assert_eq!(request.fastest_interval_ms, 5_000);
    assert_eq!(request.num_updates, 1);
}

struct Providers {
    gps: bool,
    network: bool,
}

impl ProviderStatus for Providers {
    fn is_provider_enabled(&self, provider: Provider) -> bool {
        match provider {
            Provider::Gps => self.gps,
            Provider::Network => self.network,
        }
    }
}

#[test]
fn either_provider_enables_location() {
    let cases = [
        (false, false, false),
        (true, false, true),
        (false, true, true),
        (true, true, true),
    ];
    for (gps, network, expected) in cases {
        assert_eq!(is_location_enabled(&Providers { gps, network }), expected);
    }
}
