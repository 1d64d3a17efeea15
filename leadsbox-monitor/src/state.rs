//! Load/save of the persisted monitoring state.

use std::sync::Arc;

use leadsbox_types::MonitoringState;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::store::{KeyValueStore, StoreError};

/// Reads and writes the whole [`MonitoringState`] blob under one key.
///
/// Every failure degrades to a fresh state (on read) or a dropped write;
/// nothing here returns an error to the monitor.
#[derive(Debug)]
pub(crate) struct StateStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    window: usize,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl StateStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, window: usize) -> Self {
        Self {
            store,
            key: key.into(),
            window,
            lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn try_load(&self) -> Result<Option<MonitoringState>, StoreError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        let mut state: MonitoringState = serde_json::from_str(&raw)?;
        state.normalize(self.window);
        Ok(Some(state))
    }

    fn load_unlocked(&self) -> MonitoringState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => MonitoringState::new(),
            Err(err) => {
                warn!(key = %self.key, error = %err, "Discarding unreadable monitoring state");
                MonitoringState::new()
            }
        }
    }

    fn save_unlocked(&self, state: &MonitoringState) {
        let result = serde_json::to_string(state)
            .map_err(StoreError::from)
            .and_then(|json| self.store.set(&self.key, &json));

        if let Err(err) = result {
            warn!(key = %self.key, error = %err, "Failed to persist monitoring state");
        }
    }

    /// Current state, or a fresh one if nothing usable is stored.
    pub fn load(&self) -> MonitoringState {
        let _guard = self.lock.lock();
        self.load_unlocked()
    }

    /// Load, mutate and persist the state as one step.
    ///
    /// The state is written back even when `f` changes nothing.
    pub fn update<R>(&self, f: impl FnOnce(&mut MonitoringState) -> R) -> R {
        let _guard = self.lock.lock();
        let mut state = self.load_unlocked();
        let result = f(&mut state);
        self.save_unlocked(&state);
        result
    }

    /// Replace the stored state with a fresh one.
    pub fn reset(&self) {
        let _guard = self.lock.lock();
        debug!(key = %self.key, "Resetting monitoring state");
        self.save_unlocked(&MonitoringState::new());
    }
}
