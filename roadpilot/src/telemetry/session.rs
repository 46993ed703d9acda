//! The telemetry event loop.
//!
//! A [`TelemetrySession`] owns the processor and drives it from two inputs:
//! location events from the provider and limit updates from background
//! lookups. Tones go to an [`AlertSink`]; the latest state is published on a
//! `watch` channel for whatever renders it.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::alert::{AlertSink, Hazard, HazardAlertStateMachine, HazardClassifier};
use crate::notice::Notice;
use crate::provider::SpeedLimitProvider;
use crate::speed_limit::{SpeedLimitConfig, SpeedLimitLookup, SpeedLimitUpdate};

use super::processor::{CameraDirective, RecenterHandle, TelemetryProcessor, TelemetryUpdate};
use super::sample::LocationEvent;

/// Whether a position fix is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixStatus {
    #[default]
    WaitingForFix,
    Fixed,
}

/// What the driver sees.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryDisplay {
    pub fix: FixStatus,
    pub speed_kph: u32,
    pub limit_kph: u32,
    pub limit_known: bool,
    pub over_limit: bool,
    pub hazard: Option<Hazard>,
    /// Camera move requested by the most recent update, if any.
    pub camera: Option<CameraDirective>,
}

impl TelemetryDisplay {
    fn waiting(default_limit_kph: u32) -> Self {
        Self {
            fix: FixStatus::WaitingForFix,
            speed_kph: 0,
            limit_kph: default_limit_kph,
            limit_known: false,
            over_limit: false,
            hazard: None,
            camera: None,
        }
    }
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub samples: u64,
    pub queries_issued: u64,
    pub limit_updates: u64,
    pub tones_played: u64,
}

/// Receiving ends handed to the UI.
#[derive(Debug)]
pub struct TelemetryOutputs {
    pub display: watch::Receiver<TelemetryDisplay>,
    pub notices: mpsc::UnboundedReceiver<Notice>,
}

/// Single-consumer loop over location events and limit updates.
pub struct TelemetrySession<P: SpeedLimitProvider> {
    processor: TelemetryProcessor<P>,
    limit_updates: mpsc::UnboundedReceiver<SpeedLimitUpdate>,
    sink: Arc<dyn AlertSink>,
    display: watch::Sender<TelemetryDisplay>,
    notices: mpsc::UnboundedSender<Notice>,
    raised: HashSet<Notice>,
    stats: SessionStats,
}

impl<P: SpeedLimitProvider> TelemetrySession<P> {
    /// Assembles a session from an existing processor and the update
    /// channel of its lookup.
    pub fn new(
        processor: TelemetryProcessor<P>,
        limit_updates: mpsc::UnboundedReceiver<SpeedLimitUpdate>,
        sink: Arc<dyn AlertSink>,
    ) -> (Self, TelemetryOutputs) {
        let default_limit = processor.lookup().config().default_limit_kph;
        let (display_tx, display_rx) = watch::channel(TelemetryDisplay::waiting(default_limit));
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();

        let session = Self {
            processor,
            limit_updates,
            sink,
            display: display_tx,
            notices: notice_tx,
            raised: HashSet::new(),
            stats: SessionStats::default(),
        };
        let outputs = TelemetryOutputs {
            display: display_rx,
            notices: notice_rx,
        };
        (session, outputs)
    }

    /// Builds the lookup, alert machine and processor in one go.
    pub fn with_provider(
        provider: P,
        config: SpeedLimitConfig,
        classifier: Box<dyn HazardClassifier>,
        sink: Arc<dyn AlertSink>,
    ) -> (Self, TelemetryOutputs) {
        let (lookup, limit_updates) = SpeedLimitLookup::new(provider, config);
        let processor = TelemetryProcessor::new(lookup, HazardAlertStateMachine::new(classifier));
        Self::new(processor, limit_updates, sink)
    }

    pub fn recenter_handle(&self) -> RecenterHandle {
        self.processor.recenter_handle()
    }

    /// Runs until `events` closes or `shutdown` fires. After `events` closes,
    /// limit updates from lookups already issued are still applied.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<LocationEvent>,
        shutdown: CancellationToken,
    ) -> SessionStats {
        info!("Telemetry session started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Telemetry session shutting down");
                    break;
                }

                Some(update) = self.limit_updates.recv() => {
                    self.handle_limit_update(update);
                }

                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        self.drain_lookups(&shutdown).await;
                        break;
                    }
                },
            }
        }

        info!(
            samples = self.stats.samples,
            queries = self.stats.queries_issued,
            limit_updates = self.stats.limit_updates,
            tones = self.stats.tones_played,
            "Telemetry session stopped"
        );
        self.stats
    }

    /// Applies the answers of lookups still in flight once the source has
    /// closed. Each lookup ends by its `request_timeout`, so this returns
    /// within one timeout of the last query.
    async fn drain_lookups(&mut self, shutdown: &CancellationToken) {
        let tracker = self.processor.lookup().task_tracker();
        tracker.close();
        debug!(
            in_flight = tracker.len(),
            "Location source closed, waiting for speed limit lookups"
        );

        let idle = tracker.wait();
        tokio::pin!(idle);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Telemetry session shutting down");
                    return;
                }

                Some(update) = self.limit_updates.recv() => {
                    self.handle_limit_update(update);
                }

                _ = &mut idle => {
                    while let Ok(update) = self.limit_updates.try_recv() {
                        self.handle_limit_update(update);
                    }
                    return;
                }
            }
        }
    }

    /// Processes one location event.
    pub fn handle_event(&mut self, event: LocationEvent) {
        match event {
            LocationEvent::Samples(samples) => {
                for sample in &samples {
                    let update = self.processor.on_location(sample);
                    self.stats.samples += 1;
                    if update.query_issued {
                        self.stats.queries_issued += 1;
                    }
                    self.publish(update);
                }
            }
            LocationEvent::PermissionDenied => {
                self.display.send_modify(|d| {
                    d.fix = FixStatus::WaitingForFix;
                    d.camera = None;
                });
                self.raise(Notice::LocationPermissionMissing);
            }
        }
    }

    /// Applies a resolved speed limit.
    pub fn handle_limit_update(&mut self, update: SpeedLimitUpdate) {
        self.stats.limit_updates += 1;
        debug!(limit_kph = update.limit_kph, sequence = update.sequence, "Limit update received");

        match self.processor.on_limit_resolved() {
            Some(update) => self.publish(update),
            None => self.display.send_modify(|d| {
                d.limit_kph = update.limit_kph;
                d.limit_known = true;
            }),
        }
    }

    fn publish(&mut self, update: TelemetryUpdate) {
        for tone in update.alert_events.iter().filter_map(|e| e.tone()) {
            self.sink.play_tone(tone);
            self.stats.tones_played += 1;
        }

        let over_limit = update.over_limit();
        self.display.send_modify(|d| {
            d.camera = update.camera;
            d.fix = FixStatus::Fixed;
            d.speed_kph = update.speed_kph;
            d.limit_kph = update.limit_kph;
            d.limit_known = update.limit_known;
            d.over_limit = over_limit;
            d.hazard = update.hazard;
        });
    }

    fn raise(&mut self, notice: Notice) {
        if !self.raised.insert(notice) {
            return;
        }
        warn!(notice = ?notice, "{}", notice);
        let _ = self.notices.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{RecordingSink, ReferenceSpeedClassifier, Tone};
    use crate::coord::LatLng;
    use crate::provider::{BoxFuture, ProviderError};
    use crate::telemetry::LocationSample;
    use std::time::Duration;

    struct SlowLimit {
        tag: &'static str,
        delay: Duration,
    }

    impl SpeedLimitProvider for SlowLimit {
        fn fetch_maxspeed_tags(
            &self,
            _position: LatLng,
        ) -> BoxFuture<'_, Result<Vec<Option<String>>, ProviderError>> {
            let tag = self.tag.to_string();
            let delay = self.delay;
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                Ok(vec![Some(tag)])
            })
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    fn session(
        tag: &'static str,
        delay_ms: u64,
    ) -> (TelemetrySession<SlowLimit>, TelemetryOutputs, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let (session, outputs) = TelemetrySession::with_provider(
            SlowLimit {
                tag,
                delay: Duration::from_millis(delay_ms),
            },
            SpeedLimitConfig::default(),
            Box::new(ReferenceSpeedClassifier),
            sink.clone(),
        );
        (session, outputs, sink)
    }

    fn kph(speed_kph: f64, t: i64) -> LocationSample {
        LocationSample::new(41.0, 29.0, speed_kph / 3.6 + 0.001, t)
    }

    #[tokio::test]
    async fn test_initial_display_waits_for_fix() {
        let (_session, outputs, _sink) = session("50", 0);
        let display = outputs.display.borrow().clone();
        assert_eq!(display.fix, FixStatus::WaitingForFix);
        assert_eq!(display.limit_kph, 50);
        assert!(!display.limit_known);
    }

    #[tokio::test]
    async fn test_permission_notice_raised_once() {
        let (mut session, mut outputs, _sink) = session("50", 0);

        session.handle_event(LocationEvent::PermissionDenied);
        session.handle_event(LocationEvent::PermissionDenied);

        assert_eq!(outputs.notices.try_recv().unwrap(), Notice::LocationPermissionMissing);
        assert!(outputs.notices.try_recv().is_err());
        assert_eq!(outputs.display.borrow().fix, FixStatus::WaitingForFix);
    }

    #[tokio::test]
    async fn test_burst_of_samples_processed_in_order() {
        let (mut session, outputs, sink) = session("50", 60_000);

        session.handle_event(LocationEvent::Samples(vec![
            kph(40.0, 0),
            kph(60.0, 100),
            kph(60.0, 200),
            kph(60.0, 300),
            kph(40.0, 400),
        ]));

        assert_eq!(sink.tones(), vec![Tone::OverLimit]);
        let display = outputs.display.borrow().clone();
        assert_eq!(display.fix, FixStatus::Fixed);
        assert_eq!(display.speed_kph, 40);
        assert!(!display.over_limit);
        assert_eq!(session.stats.samples, 5);
        assert_eq!(session.stats.queries_issued, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_applies_limit_updates_and_stops_on_shutdown() {
        let (session, outputs, sink) = session("30", 100);
        let (tx, rx) = mpsc::channel(16);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(session.run(rx, shutdown.clone()));

        tx.send(LocationEvent::Samples(vec![kph(40.0, 0)])).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        let display = outputs.display.borrow().clone();
        assert_eq!(display.limit_kph, 30);
        assert!(display.limit_known);
        assert!(display.over_limit);
        assert_eq!(sink.tones(), vec![Tone::OverLimit]);

        shutdown.cancel();
        let stats = handle.await.unwrap();
        assert_eq!(stats.samples, 1);
        assert_eq!(stats.limit_updates, 1);
        assert_eq!(stats.tones_played, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_applies_lookups_in_flight_when_source_closes() {
        let (session, outputs, sink) = session("30", 50);
        let (tx, rx) = mpsc::channel(16);
        for t in [0, 2001, 4002, 6003, 8004] {
            tx.send(LocationEvent::Samples(vec![kph(36.0, t)])).await.unwrap();
        }
        drop(tx);

        let stats = session.run(rx, CancellationToken::new()).await;

        assert_eq!(stats.samples, 5);
        assert_eq!(stats.queries_issued, 5);
        assert!(stats.limit_updates >= 1);
        let display = outputs.display.borrow().clone();
        assert_eq!(display.limit_kph, 30);
        assert!(display.limit_known);
        assert!(display.over_limit);
        assert_eq!(sink.tones(), vec![Tone::OverLimit]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_lookup_drain() {
        let (session, outputs, _sink) = session("30", 60_000);
        let (tx, rx) = mpsc::channel(4);
        tx.send(LocationEvent::Samples(vec![kph(36.0, 0)])).await.unwrap();
        drop(tx);

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(session.run(rx, shutdown.clone()));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!handle.is_finished());

        shutdown.cancel();
        let stats = handle.await.unwrap();
        assert_eq!(stats.queries_issued, 1);
        assert_eq!(stats.limit_updates, 0);
        assert!(!outputs.display.borrow().limit_known);
    }

    #[tokio::test]
    async fn test_run_ends_when_source_closes() {
        let (session, _outputs, _sink) = session("50", 0);
        let (tx, rx) = mpsc::channel(4);
        tx.send(LocationEvent::Samples(vec![kph(20.0, 0)])).await.unwrap();
        drop(tx);

        let stats = session.run(rx, CancellationToken::new()).await;
        assert_eq!(stats.samples, 1);
    }
}
