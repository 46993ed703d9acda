//! Concurrent route computation.
//!
//! The [`RouteComputationEngine`] fans one request per profile out to the
//! route provider and fans the answers back into a [`RouteSession`].
//!
//! # Architecture
//!
//! ```text
//!                    ┌──► task(fastest)   ──┐
//! compute_routes ────┼──► task(toll-free) ──┼──► SessionShared ──► RouteSession
//!                    └──► task(...)       ──┘   (token check,      (Stream, arrival
//!                                                append, notify)    order)
//! ```
//!
//! Each task is independent: a failure, timeout or empty answer for one
//! profile is logged and dropped without touching its siblings. Results are
//! delivered as they arrive.
//!
//! Starting a new computation supersedes the previous session. Its in-flight
//! tasks keep running, but their late results fail the session token check
//! and are discarded.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::coord::LatLng;
use crate::provider::{ProviderError, RouteProvider};

use super::profile::RouteRequestProfile;
use super::types::{RouteRequest, RouteResult};

/// Default deadline for a single provider request.
pub const DEFAULT_ROUTE_TIMEOUT: Duration = Duration::from_secs(8);

/// Configuration for the route engine.
#[derive(Debug, Clone)]
pub struct RouteEngineConfig {
    /// Deadline applied to each profile's request.
    pub request_timeout: Duration,
}

impl Default for RouteEngineConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_ROUTE_TIMEOUT,
        }
    }
}

impl RouteEngineConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Identifies one route computation. Only the most recent one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionToken(u64);

impl SessionToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct SessionState {
    results: Vec<RouteResult>,
    pending: Vec<String>,
}

/// State shared between a session and its request tasks.
#[derive(Debug)]
struct SessionShared {
    token: SessionToken,
    active: Arc<AtomicU64>,
    state: Mutex<SessionState>,
}

impl SessionShared {
    fn is_current(&self) -> bool {
        self.active.load(Ordering::SeqCst) == self.token.0
    }

    /// Appends and notifies in one critical section so the stream order
    /// matches `results` order. Returns false for orphaned results.
    fn deliver(&self, result: RouteResult, tx: &mpsc::UnboundedSender<RouteResult>) -> bool {
        let mut state = self.state.lock();
        if !self.is_current() {
            return false;
        }
        state.results.push(result.clone());
        let _ = tx.send(result);
        true
    }

    fn resolve(&self, label: &str) {
        let mut state = self.state.lock();
        if let Some(index) = state.pending.iter().position(|p| p == label) {
            state.pending.remove(index);
        }
    }
}

/// Issues concurrent per-profile route requests.
pub struct RouteComputationEngine<P: RouteProvider> {
    provider: Arc<P>,
    config: RouteEngineConfig,
    active: Arc<AtomicU64>,
}

impl<P: RouteProvider> RouteComputationEngine<P> {
    pub fn new(provider: P, config: RouteEngineConfig) -> Self {
        Self::with_shared_provider(Arc::new(provider), config)
    }

    pub fn with_shared_provider(provider: Arc<P>, config: RouteEngineConfig) -> Self {
        Self {
            provider,
            config,
            active: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Token of the active session, if any computation was started.
    pub fn active_token(&self) -> Option<SessionToken> {
        match self.active.load(Ordering::SeqCst) {
            0 => None,
            token => Some(SessionToken(token)),
        }
    }

    /// Marks the active session stale without starting a new one.
    pub fn invalidate(&self) {
        self.active.fetch_add(1, Ordering::SeqCst);
    }

    /// Starts one request per profile and returns the session collecting
    /// their results.
    ///
    /// Must be called from within a tokio runtime. Any previous session is
    /// superseded.
    pub fn compute_routes(
        &self,
        origin: LatLng,
        destination: LatLng,
        profiles: &[RouteRequestProfile],
    ) -> RouteSession {
        let token = SessionToken(self.active.fetch_add(1, Ordering::SeqCst) + 1);
        let shared = Arc::new(SessionShared {
            token,
            active: Arc::clone(&self.active),
            state: Mutex::new(SessionState {
                results: Vec::with_capacity(profiles.len()),
                pending: profiles.iter().map(|p| p.label.clone()).collect(),
            }),
        });
        let (tx, rx) = mpsc::unbounded_channel();

        info!(
            session = token.0,
            profiles = profiles.len(),
            provider = self.provider.name(),
            "Computing routes"
        );

        for profile in profiles {
            let request = RouteRequest {
                origin,
                destination,
                profile: profile.clone(),
            };
            let provider = Arc::clone(&self.provider);
            let shared = Arc::clone(&shared);
            let tx = tx.clone();
            let deadline = self.config.request_timeout;

            tokio::spawn(async move {
                let label = request.profile.label.clone();

                match request_route(provider.as_ref(), &request, deadline).await {
                    Ok(result) => {
                        let duration_seconds = result.duration_seconds;
                        if shared.deliver(result, &tx) {
                            debug!(
                                session = shared.token.0,
                                profile = %label,
                                duration_seconds,
                                "Route option received"
                            );
                        } else {
                            debug!(
                                session = shared.token.0,
                                profile = %label,
                                "Discarding result from superseded session"
                            );
                        }
                    }
                    Err(e) if e.is_transport() => {
                        warn!(session = shared.token.0, profile = %label, error = %e, "Route request failed");
                    }
                    Err(e) => {
                        debug!(session = shared.token.0, profile = %label, error = %e, "No usable route");
                    }
                }

                shared.resolve(&label);
            });
        }

        RouteSession {
            shared,
            origin,
            destination,
            updates: rx,
        }
    }
}

async fn request_route<P: RouteProvider + ?Sized>(
    provider: &P,
    request: &RouteRequest,
    deadline: Duration,
) -> Result<RouteResult, ProviderError> {
    let candidates = tokio::time::timeout(deadline, provider.compute_routes(request))
        .await
        .map_err(|_| ProviderError::Timeout(deadline.as_millis() as u64))??;

    let first = candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Malformed("no routes returned".to_string()))?;

    RouteResult::from_candidate(request.profile.label.clone(), first)
}

/// Orders results best-first: shortest duration, then shortest distance,
/// then cheapest toll (free counts as zero).
pub fn rank_results(results: &[RouteResult]) -> Vec<RouteResult> {
    let mut ranked = results.to_vec();
    ranked.sort_by(|a, b| {
        a.duration_seconds
            .cmp(&b.duration_seconds)
            .then(a.distance_meters.cmp(&b.distance_meters))
            .then_with(|| {
                let cost = |r: &RouteResult| r.toll_estimate.as_ref().map_or(0.0, |m| m.value());
                cost(a).total_cmp(&cost(b))
            })
    });
    ranked
}

/// One route computation: origin, destination and its arriving results.
///
/// Implements [`Stream`], yielding each result as soon as it arrives. The
/// stream ends once every profile has resolved, or immediately once the
/// session has been superseded.
pub struct RouteSession {
    shared: Arc<SessionShared>,
    origin: LatLng,
    destination: LatLng,
    updates: mpsc::UnboundedReceiver<RouteResult>,
}

impl RouteSession {
    pub fn token(&self) -> SessionToken {
        self.shared.token
    }

    pub fn origin(&self) -> LatLng {
        self.origin
    }

    pub fn destination(&self) -> LatLng {
        self.destination
    }

    /// False once a newer computation has started.
    pub fn is_current(&self) -> bool {
        self.shared.is_current()
    }

    /// Results received so far, in arrival order.
    pub fn results(&self) -> Vec<RouteResult> {
        self.shared.state.lock().results.clone()
    }

    /// Results received so far, best first.
    pub fn ranked(&self) -> Vec<RouteResult> {
        rank_results(&self.shared.state.lock().results)
    }

    /// Labels of profiles that have not resolved yet.
    pub fn pending_labels(&self) -> Vec<String> {
        self.shared.state.lock().pending.clone()
    }

    /// True when every profile has resolved (success or failure).
    pub fn is_complete(&self) -> bool {
        self.shared.state.lock().pending.is_empty()
    }

    /// Waits for the next result of this session.
    pub async fn next_result(&mut self) -> Option<RouteResult> {
        futures::StreamExt::next(self).await
    }

    /// Drains the stream and returns every result in arrival order.
    pub async fn collect_all(mut self) -> Vec<RouteResult> {
        while self.next_result().await.is_some() {}
        self.results()
    }
}

impl Stream for RouteSession {
    type Item = RouteResult;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if !this.shared.is_current() {
                return Poll::Ready(None);
            }
            match this.updates.poll_recv(cx) {
                Poll::Ready(Some(result)) => {
                    if this.shared.is_current() {
                        return Poll::Ready(Some(result));
                    }
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::BoxFuture;
    use crate::routes::{format_distance, format_duration, CandidateRoute, FormatLocale, Money};
    use std::collections::HashMap;

    /// What the scripted provider does for a given profile label.
    #[derive(Clone)]
    enum Script {
        Route {
            delay: Duration,
            duration: &'static str,
            distance: u64,
            toll: Option<Money>,
        },
        Fail(ProviderError),
        Empty,
        Hang,
    }

    struct ScriptedProvider {
        scripts: HashMap<String, Script>,
    }

    impl ScriptedProvider {
        fn new(scripts: Vec<(&str, Script)>) -> Self {
            Self {
                scripts: scripts
                    .into_iter()
                    .map(|(label, script)| (label.to_string(), script))
                    .collect(),
            }
        }
    }

    impl RouteProvider for ScriptedProvider {
        fn compute_routes<'a>(
            &'a self,
            request: &'a RouteRequest,
        ) -> BoxFuture<'a, Result<Vec<CandidateRoute>, ProviderError>> {
            let script = self.scripts.get(&request.profile.label).cloned();
            Box::pin(async move {
                match script {
                    Some(Script::Route {
                        delay,
                        duration,
                        distance,
                        toll,
                    }) => {
                        tokio::time::sleep(delay).await;
                        Ok(vec![CandidateRoute {
                            duration: duration.to_string(),
                            distance_meters: distance,
                            estimated_prices: toll.into_iter().collect(),
                            route_labels: Vec::new(),
                        }])
                    }
                    Some(Script::Fail(e)) => Err(e),
                    Some(Script::Empty) | None => Ok(Vec::new()),
                    Some(Script::Hang) => futures::future::pending().await,
                }
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn route(delay_ms: u64, duration: &'static str, distance: u64) -> Script {
        Script::Route {
            delay: Duration::from_millis(delay_ms),
            duration,
            distance,
            toll: None,
        }
    }

    fn profiles(labels: &[&str]) -> Vec<RouteRequestProfile> {
        labels
            .iter()
            .map(|l| RouteRequestProfile::fastest().with_label(*l))
            .collect()
    }

    fn origin() -> LatLng {
        LatLng::new(41.0, 29.0)
    }

    fn destination() -> LatLng {
        LatLng::new(40.9, 29.3)
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_is_isolated() {
        let provider = ScriptedProvider::new(vec![
            ("A", route(0, "5400s", 12500)),
            ("B", Script::Fail(ProviderError::Http("connection reset".into()))),
        ]);
        let engine = RouteComputationEngine::new(provider, RouteEngineConfig::default());

        let session = engine.compute_routes(origin(), destination(), &profiles(&["A", "B"]));
        let results = session.collect_all().await;

        assert_eq!(results.len(), 1);
        let tr = FormatLocale::turkish();
        assert_eq!(format_duration(results[0].duration_seconds, &tr), "1 sa 30 dk");
        assert_eq!(format_distance(results[0].distance_meters), "12.5 km");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_sibling_does_not_block_first_result() {
        let provider = ScriptedProvider::new(vec![
            ("A", route(10, "600s", 5000)),
            ("B", Script::Hang),
        ]);
        let engine = RouteComputationEngine::new(
            provider,
            RouteEngineConfig::default().with_request_timeout(Duration::from_secs(5)),
        );

        let mut session = engine.compute_routes(origin(), destination(), &profiles(&["A", "B"]));
        let start = tokio::time::Instant::now();

        let first = session.next_result().await.unwrap();
        assert_eq!(first.label, "A");
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(session.pending_labels(), vec!["B".to_string()]);

        // B times out, which ends the stream
        assert!(session.next_result().await.is_none());
        assert!(session.is_complete());
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_stream_in_arrival_order() {
        let provider = ScriptedProvider::new(vec![
            ("slow", route(300, "600s", 5000)),
            ("quick", route(100, "900s", 7000)),
            ("middle", route(200, "700s", 6000)),
        ]);
        let engine = RouteComputationEngine::new(provider, RouteEngineConfig::default());

        let session = engine.compute_routes(
            origin(),
            destination(),
            &profiles(&["slow", "quick", "middle"]),
        );
        let labels: Vec<String> = session
            .collect_all()
            .await
            .into_iter()
            .map(|r| r.label)
            .collect();

        assert_eq!(labels, vec!["quick", "middle", "slow"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_and_malformed_responses_dropped() {
        let provider = ScriptedProvider::new(vec![
            ("ok", route(0, "60s", 100)),
            ("empty", Script::Empty),
            ("bad", route(0, "later", 100)),
        ]);
        let engine = RouteComputationEngine::new(provider, RouteEngineConfig::default());

        let session = engine.compute_routes(origin(), destination(), &profiles(&["ok", "empty", "bad"]));
        let results = session.collect_all().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_session_discards_late_results() {
        let provider = ScriptedProvider::new(vec![
            ("old", route(500, "600s", 5000)),
            ("new", route(100, "300s", 2000)),
        ]);
        let engine = RouteComputationEngine::new(provider, RouteEngineConfig::default());

        let mut first = engine.compute_routes(origin(), destination(), &profiles(&["old"]));
        let second = engine.compute_routes(origin(), destination(), &profiles(&["new"]));

        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(second.token() > first.token());
        assert_eq!(engine.active_token(), Some(second.token()));

        let results = second.collect_all().await;
        assert_eq!(results.len(), 1);

        // Let the orphaned request finish
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(first.next_result().await.is_none());
        assert!(first.results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_marks_session_stale() {
        let provider = ScriptedProvider::new(vec![("A", route(100, "60s", 100))]);
        let engine = RouteComputationEngine::new(provider, RouteEngineConfig::default());

        let session = engine.compute_routes(origin(), destination(), &profiles(&["A"]));
        engine.invalidate();
        assert!(!session.is_current());
        assert!(session.collect_all().await.is_empty());
    }

    #[test]
    fn test_rank_results() {
        let make = |label: &str, duration: u64, distance: u64, toll: Option<Money>| RouteResult {
            label: label.to_string(),
            duration_seconds: duration,
            distance_meters: distance,
            toll_estimate: toll,
            route_labels: Vec::new(),
        };
        let results = vec![
            make("slow", 900, 1000, None),
            make("tolled", 600, 1000, Some(Money::new("TRY", 50, 0))),
            make("free", 600, 1000, None),
            make("short", 600, 800, Some(Money::new("TRY", 90, 0))),
        ];

        let labels: Vec<String> = rank_results(&results).into_iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["short", "free", "tolled", "slow"]);
    }
}
