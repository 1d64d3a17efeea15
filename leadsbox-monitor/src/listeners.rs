//! Alert listener registry.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use leadsbox_types::Alert;
use parking_lot::RwLock;
use tracing::error;

type Listener = Arc<dyn Fn(&Alert) + Send + Sync>;

/// Callbacks that receive every alert the monitor emits.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(u64, Listener)>>,
}

impl ListenerRegistry {
    pub fn subscribe(&self, listener: Listener) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().push((id, listener));
        id
    }

    pub fn unsubscribe(&self, id: u64) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// Deliver an alert to every listener, in registration order.
    ///
    /// Listeners run without the registry lock held, so they may subscribe
    /// or unsubscribe. A panicking listener is logged and skipped.
    pub fn notify(&self, alert: &Alert) {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(alert))).is_err() {
                error!(flow = %alert.flow, reason = %alert.reason, "Alert listener panicked");
            }
        }
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Registration handle returned by [`Monitor::subscribe`](crate::Monitor::subscribe).
///
/// Dropping the handle leaves the listener registered; call
/// [`Subscription::unsubscribe`] to stop receiving alerts.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<ListenerRegistry>,
}

impl Subscription {
    pub(crate) fn new(id: u64, registry: &Arc<ListenerRegistry>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    /// Deregister the listener.
    ///
    /// Returns `false` if it was already gone (or the monitor was dropped).
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.unsubscribe(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadsbox_types::{AlertReason, Flow, Severity};
    use parking_lot::Mutex;

    fn alert() -> Alert {
        Alert {
            flow: Flow::InboxSend,
            reason: AlertReason::Latency,
            severity: Severity::Warning,
            title: "Inbox send is slow".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn notify_in_registration_order() {
        let registry = ListenerRegistry::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["a", "b"] {
            let seen = seen.clone();
            registry.subscribe(Arc::new(move |_| seen.lock().push(tag)));
        }

        registry.notify(&alert());
        assert_eq!(*seen.lock(), vec!["a", "b"]);
    }

    #[test]
    fn panicking_listener_does_not_stop_delivery() {
        let registry = ListenerRegistry::default();
        let delivered = Arc::new(AtomicU64::new(0));

        registry.subscribe(Arc::new(|_| panic!("listener failure")));
        let counter = delivered.clone();
        registry.subscribe(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));

        registry.notify(&alert());
        assert_eq!(delivered.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let registry = Arc::new(ListenerRegistry::default());
        let first = Subscription::new(registry.subscribe(Arc::new(|_| {})), &registry);
        let _second = Subscription::new(registry.subscribe(Arc::new(|_| {})), &registry);

        assert_eq!(registry.len(), 2);
        assert!(first.unsubscribe());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unsubscribe_after_registry_dropped() {
        let registry = Arc::new(ListenerRegistry::default());
        let sub = Subscription::new(registry.subscribe(Arc::new(|_| {})), &registry);
        drop(registry);
        assert!(!sub.unsubscribe());
    }
}
