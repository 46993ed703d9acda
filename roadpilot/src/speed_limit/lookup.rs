//! Debounced, non-blocking speed-limit lookup.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;
use tracing::{debug, trace, warn};

use crate::coord::LatLng;
use crate::provider::{ProviderError, SpeedLimitProvider};
use crate::telemetry::LocationSample;

use super::cache::{LimitOrdering, SpeedLimitCache};
use super::gate::IntervalGate;
use super::parse::first_tagged_limit;

/// Minimum spacing between two queries, in sample-time milliseconds.
pub const DEFAULT_DEBOUNCE_MS: i64 = 2000;

/// Limit assumed while nothing has been resolved yet.
pub const DEFAULT_SPEED_LIMIT_KPH: u32 = 50;

/// Default deadline for one provider request.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);

/// Configuration for [`SpeedLimitLookup`].
#[derive(Debug, Clone)]
pub struct SpeedLimitConfig {
    pub debounce_ms: i64,
    pub default_limit_kph: u32,
    pub request_timeout: Duration,
    pub ordering: LimitOrdering,
}

impl Default for SpeedLimitConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            default_limit_kph: DEFAULT_SPEED_LIMIT_KPH,
            request_timeout: DEFAULT_LOOKUP_TIMEOUT,
            ordering: LimitOrdering::default(),
        }
    }
}

impl SpeedLimitConfig {
    pub fn with_debounce_ms(mut self, debounce_ms: i64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_default_limit_kph(mut self, limit: u32) -> Self {
        self.default_limit_kph = limit;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_ordering(mut self, ordering: LimitOrdering) -> Self {
        self.ordering = ordering;
        self
    }
}

/// A query admitted by the debounce gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimitQuery {
    pub position: LatLng,
    pub issued_at_millis: i64,
    pub sequence: u64,
}

/// Sent when a query resolved a limit and the cache accepted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedLimitUpdate {
    pub limit_kph: u32,
    pub sequence: u64,
}

/// Issues speed-limit queries for incoming samples, at most one per
/// debounce window, and caches whatever they resolve.
pub struct SpeedLimitLookup<P: SpeedLimitProvider> {
    provider: Arc<P>,
    config: SpeedLimitConfig,
    gate: IntervalGate,
    cache: Arc<SpeedLimitCache>,
    next_sequence: u64,
    updates: mpsc::UnboundedSender<SpeedLimitUpdate>,
    tasks: TaskTracker,
}

impl<P: SpeedLimitProvider> SpeedLimitLookup<P> {
    /// Creates the lookup and the receiving end of its update channel.
    pub fn new(
        provider: P,
        config: SpeedLimitConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SpeedLimitUpdate>) {
        Self::with_shared_provider(Arc::new(provider), config)
    }

    pub fn with_shared_provider(
        provider: Arc<P>,
        config: SpeedLimitConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SpeedLimitUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let lookup = Self {
            provider,
            gate: IntervalGate::new(config.debounce_ms),
            cache: Arc::new(SpeedLimitCache::new(config.ordering)),
            config,
            next_sequence: 0,
            updates: tx,
            tasks: TaskTracker::new(),
        };
        (lookup, rx)
    }

    pub fn config(&self) -> &SpeedLimitConfig {
        &self.config
    }

    /// Last resolved limit, if any.
    pub fn cached_limit(&self) -> Option<u32> {
        self.cache.get()
    }

    /// Cached limit, or the configured default.
    pub fn effective_limit(&self) -> u32 {
        self.cached_limit().unwrap_or(self.config.default_limit_kph)
    }

    pub fn cache(&self) -> Arc<SpeedLimitCache> {
        Arc::clone(&self.cache)
    }

    /// Number of queries still waiting on the provider.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Handle on the query tasks. Closing it and awaiting `wait()` resolves
    /// once every issued query has finished; each is bounded by
    /// `request_timeout`.
    pub fn task_tracker(&self) -> TaskTracker {
        self.tasks.clone()
    }

    /// Issues a query for `sample` if the debounce window has elapsed.
    ///
    /// Returns true when a query was issued. The request runs on its own
    /// task, so this never waits on the network. Must be called from within
    /// a tokio runtime.
    pub fn maybe_query(&mut self, sample: &LocationSample) -> bool {
        if !self.gate.try_admit(sample.timestamp_millis) {
            trace!(timestamp = sample.timestamp_millis, "Speed limit query debounced");
            return false;
        }

        self.next_sequence += 1;
        let query = SpeedLimitQuery {
            position: sample.position(),
            issued_at_millis: sample.timestamp_millis,
            sequence: self.next_sequence,
        };

        debug!(
            sequence = query.sequence,
            lat = query.position.latitude,
            lon = query.position.longitude,
            provider = self.provider.name(),
            "Speed limit query issued"
        );

        let provider = Arc::clone(&self.provider);
        let cache = Arc::clone(&self.cache);
        let updates = self.updates.clone();
        let deadline = self.config.request_timeout;

        self.tasks.spawn(async move {
            resolve_query(provider.as_ref(), &cache, &updates, query, deadline).await;
        });

        true
    }
}

async fn resolve_query<P: SpeedLimitProvider + ?Sized>(
    provider: &P,
    cache: &SpeedLimitCache,
    updates: &mpsc::UnboundedSender<SpeedLimitUpdate>,
    query: SpeedLimitQuery,
    deadline: Duration,
) {
    let tags = match tokio::time::timeout(deadline, provider.fetch_maxspeed_tags(query.position))
        .await
        .map_err(|_| ProviderError::Timeout(deadline.as_millis() as u64))
        .and_then(|r| r)
    {
        Ok(tags) => tags,
        Err(e) if e.is_transport() => {
            warn!(sequence = query.sequence, error = %e, "Speed limit request failed");
            return;
        }
        Err(e) => {
            debug!(sequence = query.sequence, error = %e, "Speed limit response unusable");
            return;
        }
    };

    let Some(limit_kph) = first_tagged_limit(&tags) else {
        debug!(
            sequence = query.sequence,
            elements = tags.len(),
            first = ?tags.first(),
            "No parsable speed limit near position"
        );
        return;
    };

    if !cache.apply(query.sequence, limit_kph) {
        debug!(
            sequence = query.sequence,
            limit_kph, "Discarding speed limit from older query"
        );
        return;
    }

    debug!(sequence = query.sequence, limit_kph, "Speed limit updated");
    let _ = updates.send(SpeedLimitUpdate {
        limit_kph,
        sequence: query.sequence,
    });
}
