//! The main Monitor type for recording flow outcomes and raising alerts.

use std::fmt;
use std::sync::Arc;

use leadsbox_types::{Alert, Flow, MonitoringState, RequestOutcome, Snapshot};
use tracing::{debug, warn};

use crate::alerting::{apply_cooldowns, evaluate};
use crate::classify::classify;
use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::listeners::{ListenerRegistry, Subscription};
use crate::state::StateStore;
use crate::store::{KeyValueStore, MemoryStore};
use crate::summary::summarize;
use crate::timer::RequestTimer;

/// Storage key holding the serialized [`MonitoringState`].
pub const STATE_KEY: &str = "leadsbox.api-monitoring";

/// The main entry point for monitoring API flows.
///
/// A Monitor is cheap to clone; clones share storage, listeners and clock.
///
/// # Example
///
/// ```rust
/// use leadsbox_monitor::{Flow, Monitor, MemoryStore};
///
/// let monitor = Monitor::builder()
///     .store(MemoryStore::new())
///     .build();
///
/// for _ in 0..8 {
///     monitor.record_result(Flow::SalesQuickCapture, 120, 500, false);
/// }
///
/// let snapshot = monitor.snapshot();
/// let view = snapshot.get(Flow::SalesQuickCapture).unwrap();
/// assert_eq!(view.failure, 8);
/// assert_eq!(view.failure_rate, 1.0);
/// ```
#[derive(Clone)]
pub struct Monitor {
    state: Arc<StateStore>,
    listeners: Arc<ListenerRegistry>,
    config: Arc<MonitorConfig>,
    clock: Arc<dyn Clock>,
}

impl Monitor {
    /// Create a monitor with default settings and in-memory storage.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for configuring the monitor.
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::new()
    }

    /// Map a request onto a monitored flow. See [`classify`].
    pub fn classify(&self, url: &str, method: &str) -> Option<Flow> {
        classify(url, method)
    }

    /// Classify and record a completed request.
    ///
    /// Requests outside the monitored flows are ignored.
    pub fn observe(&self, outcome: &RequestOutcome) -> Vec<Alert> {
        match classify(&outcome.url, &outcome.method) {
            Some(flow) => self.record_result(flow, outcome.duration_ms, outcome.status, outcome.ok),
            None => Vec::new(),
        }
    }

    /// Record the outcome of one request to `flow`.
    ///
    /// The persisted state is loaded, updated and written back on every
    /// call. Alerts that clear their cooldown are delivered to listeners
    /// and returned.
    pub fn record_result(&self, flow: Flow, duration_ms: u64, status: u16, ok: bool) -> Vec<Alert> {
        let now_ms = self.clock.now_ms();
        let config = &self.config;

        let alerts = self.state.update(|state| {
            let metric = state.metric_mut(flow);
            metric.record(duration_ms, status, ok, now_ms, config.window_size);

            let candidates = evaluate(flow, metric, config);
            apply_cooldowns(
                &mut state.alert_cooldowns,
                candidates,
                now_ms,
                config.cooldown_ms(),
            )
        });

        debug!(%flow, duration_ms, status, ok, "Recorded request");

        for alert in &alerts {
            warn!(
                flow = %alert.flow,
                reason = %alert.reason,
                severity = %alert.severity,
                "{}",
                alert.title
            );
            self.listeners.notify(alert);
        }

        alerts
    }

    /// Start timing a request. Finish the returned timer with the response.
    pub fn start_request(&self, method: &str, url: &str) -> RequestTimer {
        RequestTimer::new(self.clone(), classify(url, method), self.clock.now_ms())
    }

    /// Compute the current per-flow view. Does not modify state.
    pub fn snapshot(&self) -> Snapshot {
        summarize(&self.state.load(), &self.config, self.clock.now_ms())
    }

    /// The persisted state as currently stored.
    pub fn state(&self) -> MonitoringState {
        self.state.load()
    }

    /// Register a listener invoked synchronously for every emitted alert.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Alert) + Send + Sync + 'static,
    {
        let id = self.listeners.subscribe(Arc::new(listener));
        Subscription::new(id, &self.listeners)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Replace the stored state with a zeroed one, clearing cooldowns.
    pub fn reset(&self) {
        self.state.reset();
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("key", &self.state.key())
            .field("listeners", &self.listeners.len())
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish()
    }
}

/// Builder for configuring a Monitor.
#[derive(Debug, Default)]
pub struct MonitorBuilder {
    store: Option<Arc<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
    config: Option<MonitorConfig>,
    key: Option<String>,
}

impl MonitorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage backend. Defaults to a fresh [`MemoryStore`].
    pub fn store(self, store: impl KeyValueStore + 'static) -> Self {
        self.store_arc(Arc::new(store))
    }

    /// Set a storage backend that is shared with other owners.
    pub fn store_arc(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the time source. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set thresholds and window sizes.
    pub fn config(mut self, config: MonitorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the storage key. Defaults to [`STATE_KEY`].
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Build the monitor.
    pub fn build(self) -> Monitor {
        let config = self.config.unwrap_or_default();
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let key = self.key.unwrap_or_else(|| STATE_KEY.to_string());

        Monitor {
            state: Arc::new(StateStore::new(store, key, config.window_size)),
            listeners: Arc::new(ListenerRegistry::default()),
            config: Arc::new(config),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        }
    }
}
