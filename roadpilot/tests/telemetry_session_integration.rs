//! Integration tests for the telemetry session.
//!
//! These tests drive a complete session through its public channels:
//! - location events in, display snapshots and notices out
//! - speed limits resolved through the Overpass client over a fake transport
//! - alert tones recorded by a sink
//!
//! Run with: `cargo test --test telemetry_session_integration`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use roadpilot::alert::{HazardKind, NoHazards, RecordingSink, ReferenceSpeedClassifier, Tone};
use roadpilot::notice::Notice;
use roadpilot::provider::{AsyncHttpClient, BoxFuture, OverpassClient, ProviderError};
use roadpilot::speed_limit::SpeedLimitConfig;
use roadpilot::telemetry::{
    FixStatus, LocationEvent, LocationSample, SessionStats, TelemetryOutputs, TelemetrySession,
};

// ============================================================================
// Helpers
// ============================================================================

/// Overpass transport that answers every query with the same body after a
/// fixed delay.
struct DelayedOverpass {
    body: String,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl DelayedOverpass {
    fn new(maxspeed: &str, delay: Duration) -> Self {
        Self {
            body: format!(r#"{{"elements":[{{"tags":{{"maxspeed":"{}"}}}}]}}"#, maxspeed),
            delay,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn empty(delay: Duration) -> Self {
        Self {
            body: r#"{"elements":[]}"#.to_string(),
            delay,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl AsyncHttpClient for DelayedOverpass {
    fn get<'a>(
        &'a self,
        _url: &'a str,
        _query: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            Ok(self.body.clone().into_bytes())
        })
    }

    fn post_json<'a>(
        &'a self,
        url: &'a str,
        _headers: &'a [(&'a str, String)],
        _body: Vec<u8>,
    ) -> BoxFuture<'a, Result<Vec<u8>, ProviderError>> {
        Box::pin(async move {
            Err(ProviderError::Status {
                status: 405,
                url: url.to_string(),
            })
        })
    }
}

/// Sample at a fixed spot near Kadıköy.
fn sample(speed_mps: f64, timestamp_millis: i64) -> LocationEvent {
    LocationEvent::Samples(vec![LocationSample::new(
        40.9903,
        29.0290,
        speed_mps,
        timestamp_millis,
    )])
}

struct Harness {
    events: mpsc::Sender<LocationEvent>,
    outputs: TelemetryOutputs,
    sink: Arc<RecordingSink>,
    handle: JoinHandle<SessionStats>,
}

fn start(
    transport: DelayedOverpass,
    config: SpeedLimitConfig,
    reference_hazards: bool,
) -> Harness {
    let sink = Arc::new(RecordingSink::new());
    let classifier: Box<dyn roadpilot::alert::HazardClassifier> = if reference_hazards {
        Box::new(ReferenceSpeedClassifier)
    } else {
        Box::new(NoHazards)
    };

    let (session, outputs) = TelemetrySession::with_provider(
        OverpassClient::new(transport),
        config,
        classifier,
        sink.clone(),
    );
    let (events, rx) = mpsc::channel(16);
    let handle = tokio::spawn(session.run(rx, CancellationToken::new()));

    Harness {
        events,
        outputs,
        sink,
        handle,
    }
}

/// Yields long enough for in-flight lookups to resolve and the session to
/// consume them.
async fn settle(duration: Duration) {
    tokio::time::sleep(duration).await;
    tokio::task::yield_now().await;
}

// ============================================================================
// Integration Tests
// ============================================================================

/// A resolved limit below the current speed raises exactly one tone, and
/// samples inside the debounce window do not query again.
#[tokio::test(start_paused = true)]
async fn test_resolved_limit_triggers_single_alert() {
    let transport = DelayedOverpass::new("30", Duration::from_millis(100));
    let calls = Arc::clone(&transport.calls);
    let mut h = start(transport, SpeedLimitConfig::default(), false);

    // 10 m/s = 36 km/h, under the default limit of 50
    h.events.send(sample(10.0, 0)).await.unwrap();
    settle(Duration::from_millis(10)).await;
    {
        let display = h.outputs.display.borrow_and_update();
        assert_eq!(display.fix, FixStatus::Fixed);
        assert_eq!(display.speed_kph, 36);
        assert_eq!(display.limit_kph, 50);
        assert!(!display.limit_known);
        assert!(!display.over_limit);
    }

    settle(Duration::from_millis(200)).await;
    {
        let display = h.outputs.display.borrow_and_update();
        assert_eq!(display.limit_kph, 30);
        assert!(display.limit_known);
        assert!(display.over_limit);
    }

    h.events.send(sample(10.0, 500)).await.unwrap();
    h.events.send(sample(10.0, 1500)).await.unwrap();
    drop(h.events);

    let stats = h.handle.await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(stats.samples, 3);
    assert_eq!(stats.queries_issued, 1);
    assert_eq!(stats.limit_updates, 1);
    assert_eq!(stats.tones_played, 1);
    assert_eq!(h.sink.tones(), vec![Tone::OverLimit]);
}

/// Queries are spaced by the debounce interval measured on sample time.
#[tokio::test(start_paused = true)]
async fn test_debounce_spaces_queries_by_sample_time() {
    let transport = DelayedOverpass::new("50", Duration::from_millis(10));
    let calls = Arc::clone(&transport.calls);
    let h = start(transport, SpeedLimitConfig::default(), false);

    for ts in [0, 1000, 2000, 2001, 3000, 4002] {
        h.events.send(sample(5.0, ts)).await.unwrap();
        settle(Duration::from_millis(20)).await;
    }
    drop(h.events);

    let stats = h.handle.await.unwrap();
    // 0, 2001 and 4002 pass; 2000 is not strictly past the interval
    assert_eq!(stats.queries_issued, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(stats.tones_played, 0);
}

/// An empty Overpass answer leaves the default limit in force.
#[tokio::test(start_paused = true)]
async fn test_unusable_answer_keeps_default_limit() {
    let mut h = start(
        DelayedOverpass::empty(Duration::from_millis(10)),
        SpeedLimitConfig::default().with_default_limit_kph(70),
        false,
    );

    // 20 m/s = 72 km/h, over the fallback of 70
    h.events.send(sample(20.0, 0)).await.unwrap();
    settle(Duration::from_millis(100)).await;

    {
        let display = h.outputs.display.borrow_and_update();
        assert_eq!(display.limit_kph, 70);
        assert!(!display.limit_known);
        assert!(display.over_limit);
    }

    drop(h.events);
    let stats = h.handle.await.unwrap();
    assert_eq!(stats.limit_updates, 0);
    assert_eq!(h.sink.tones(), vec![Tone::OverLimit]);
}

/// Lookups issued before the source closes still land in the final display.
#[tokio::test(start_paused = true)]
async fn test_closed_source_waits_for_pending_lookups() {
    let transport = DelayedOverpass::new("30", Duration::from_millis(50));
    let calls = Arc::clone(&transport.calls);
    let h = start(transport, SpeedLimitConfig::default(), false);

    for ts in [0, 2001, 4002, 6003, 8004] {
        h.events.send(sample(10.0, ts)).await.unwrap();
    }
    drop(h.events);

    let stats = h.handle.await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert_eq!(stats.queries_issued, 5);
    assert!(stats.limit_updates >= 1);

    let display = h.outputs.display.borrow().clone();
    assert_eq!(display.limit_kph, 30);
    assert!(display.limit_known);
    assert!(display.over_limit);
    assert_eq!(h.sink.tones(), vec![Tone::OverLimit]);
}

/// Hazards follow the reference speeds; the banner sounds only when it
/// becomes visible.
#[tokio::test(start_paused = true)]
async fn test_reference_hazards_show_and_clear() {
    let mut h = start(
        DelayedOverpass::new("120", Duration::from_millis(10)),
        SpeedLimitConfig::default().with_default_limit_kph(120),
        true,
    );

    // 8.34 m/s truncates to 30 km/h
    h.events.send(sample(8.34, 0)).await.unwrap();
    settle(Duration::from_millis(50)).await;
    let hazard = h.outputs.display.borrow_and_update().hazard.clone();
    assert_eq!(hazard.map(|hz| hz.kind), Some(HazardKind::SchoolZone));

    // Same hazard again: no new tone
    h.events.send(sample(8.34, 100)).await.unwrap();
    // 12.5 m/s = 45 km/h replaces it without a tone
    h.events.send(sample(12.5, 200)).await.unwrap();
    settle(Duration::from_millis(10)).await;
    let hazard = h.outputs.display.borrow_and_update().hazard.clone();
    assert_eq!(hazard.map(|hz| hz.kind), Some(HazardKind::SpeedBump));

    h.events.send(sample(16.67, 300)).await.unwrap();
    settle(Duration::from_millis(10)).await;
    assert_eq!(h.outputs.display.borrow_and_update().hazard, None);

    drop(h.events);
    h.handle.await.unwrap();
    assert_eq!(h.sink.tones(), vec![Tone::Hazard]);
}

/// Losing location permission resets the fix and notifies once.
#[tokio::test(start_paused = true)]
async fn test_permission_denied_notifies_once() {
    let mut h = start(
        DelayedOverpass::new("50", Duration::from_millis(10)),
        SpeedLimitConfig::default(),
        false,
    );

    h.events.send(sample(10.0, 0)).await.unwrap();
    h.events.send(LocationEvent::PermissionDenied).await.unwrap();
    h.events.send(LocationEvent::PermissionDenied).await.unwrap();
    settle(Duration::from_millis(50)).await;

    {
        let display = h.outputs.display.borrow_and_update();
        assert_eq!(display.fix, FixStatus::WaitingForFix);
        assert_eq!(display.camera, None);
    }

    drop(h.events);
    h.handle.await.unwrap();

    assert_eq!(
        h.outputs.notices.recv().await,
        Some(Notice::LocationPermissionMissing)
    );
    assert_eq!(h.outputs.notices.recv().await, None);
}

/// Cancelling the session stops it even while the location source is open.
#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_open_session() {
    let sink: Arc<RecordingSink> = Arc::new(RecordingSink::new());
    let (session, _outputs) = TelemetrySession::with_provider(
        OverpassClient::new(DelayedOverpass::new("50", Duration::from_millis(10))),
        SpeedLimitConfig::default(),
        Box::new(NoHazards),
        sink,
    );
    let (events, rx) = mpsc::channel(4);
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(session.run(rx, shutdown.clone()));

    events.send(sample(10.0, 0)).await.unwrap();
    settle(Duration::from_millis(5)).await;
    shutdown.cancel();

    let stats = tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("session should stop on shutdown")
        .unwrap();
    assert_eq!(stats.samples, 1);
}
