//! # Network Monitor
//!
//! Tracks the host platform's connectivity signal and tells interested
//! parties when it changes.
//!
//! ## Features
//!
//! - **Connectivity State**: current online/offline belief, defaulting to online
//! - **Transition Events**: listeners fire once per genuine change; repeated
//!   identical signals are dropped
//! - **Scoped Subscriptions**: dropping a [`Subscription`] unregisters its listener
//! - **Async Watch**: a `tokio::sync::watch` receiver for tasks that await changes
//!
//! The monitor never probes the network itself. A signal that says "online"
//! while requests still fail is handled by the sync engine's failure path.
//!
//! ## Usage
//!
//! ```rust
//! use studycache::client::sync::network_monitor::{NetworkStatus, ReachabilityMonitor};
//!
//! let monitor = ReachabilityMonitor::default();
//! let subscription = monitor.on_change(|transition| {
//!     println!("{:?} -> {:?}", transition.from, transition.to);
//! });
//!
//! assert!(monitor.report(NetworkStatus::Offline));
//! assert!(!monitor.report(NetworkStatus::Offline));
//! subscription.unsubscribe();
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::watch;

/// Connectivity as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkStatus {
    Online,
    Offline,
}

impl NetworkStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, NetworkStatus::Online)
    }
}

impl From<bool> for NetworkStatus {
    fn from(online: bool) -> Self {
        if online {
            NetworkStatus::Online
        } else {
            NetworkStatus::Offline
        }
    }
}

/// A genuine change of connectivity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: NetworkStatus,
    pub to: NetworkStatus,
}

impl Transition {
    /// Offline to online: the moment pending work should be flushed
    pub fn is_reconnect(&self) -> bool {
        self.from == NetworkStatus::Offline && self.to == NetworkStatus::Online
    }
}

type Listener = Arc<dyn Fn(Transition) + Send + Sync>;

struct Inner {
    status: watch::Sender<NetworkStatus>,
    listeners: Mutex<BTreeMap<u64, Listener>>,
    next_id: AtomicU64,
}

/// Shared handle to the connectivity signal
///
/// Clones observe and drive the same state.
#[derive(Clone)]
pub struct ReachabilityMonitor {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ReachabilityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReachabilityMonitor")
            .field("status", &self.status())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Default for ReachabilityMonitor {
    /// Starts online so cached content is never blocked on a missing signal
    fn default() -> Self {
        Self::new(NetworkStatus::Online)
    }
}

impl ReachabilityMonitor {
    pub fn new(initial: NetworkStatus) -> Self {
        let (status, _) = watch::channel(initial);
        Self {
            inner: Arc::new(Inner {
                status,
                listeners: Mutex::new(BTreeMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Best-effort current connectivity
    pub fn status(&self) -> NetworkStatus {
        *self.inner.status.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.status().is_online()
    }

    /// Feed a platform signal
    ///
    /// Returns `true` when the signal changed the state. Listeners are called
    /// synchronously, outside the registry lock, in registration order.
    pub fn report(&self, status: impl Into<NetworkStatus>) -> bool {
        let status = status.into();
        let mut previous = status;
        let changed = self.inner.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                previous = *current;
                *current = status;
                true
            }
        });

        if !changed {
            return false;
        }

        let transition = Transition {
            from: previous,
            to: status,
        };
        tracing::info!(from = ?transition.from, to = ?transition.to, "Connectivity changed");

        let listeners: Vec<Listener> = match self.inner.listeners.lock() {
            Ok(listeners) => listeners.values().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
        };
        for listener in listeners {
            listener(transition);
        }
        true
    }

    /// Register a listener for transitions
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or unsubscribed.
    pub fn on_change<F>(&self, handler: F) -> Subscription
    where
        F: Fn(Transition) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.with_listeners(|listeners| {
            listeners.insert(id, Arc::new(handler));
        });
        Subscription {
            id,
            monitor: Arc::downgrade(&self.inner),
        }
    }

    /// Receiver that yields every new status, for async consumers
    pub fn watch(&self) -> watch::Receiver<NetworkStatus> {
        self.inner.status.subscribe()
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        let mut count = 0;
        self.with_listeners(|listeners| count = listeners.len());
        count
    }

    fn with_listeners(&self, f: impl FnOnce(&mut BTreeMap<u64, Listener>)) {
        with_listeners(&self.inner, f);
    }
}

fn with_listeners(inner: &Inner, f: impl FnOnce(&mut BTreeMap<u64, Listener>)) {
    let mut listeners = match inner.listeners.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    f(&mut *listeners);
}

/// Keeps a transition listener registered
///
/// Holds only a weak reference, so an outstanding subscription never keeps
/// the monitor alive.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    id: u64,
    monitor: Weak<Inner>,
}

impl Subscription {
    /// Unregister the listener now
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.monitor.upgrade() {
            let id = self.id;
            with_listeners(&inner, |listeners| {
                listeners.remove(&id);
            });
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
