//! Change listeners and asynchronous notification
//!
//! Every committed mutation produces one [`ChangeEvent`]. The store hands the
//! event to a [`Dispatcher`], which runs each registered [`Listener`] as its own
//! task. A failing or panicking listener never reaches the mutator or the other
//! listeners; its error is routed to the context's listener-error handler.

use crate::context::ListenerErrorFn;
use crate::features::Features;
use parking_lot::Mutex;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, error, warn};

/// Payload delivered to change listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    /// Snapshot of the feature set taken right after the mutation
    pub features: Features,

    /// Name of the feature that changed
    pub name: String,

    /// New value, or `None` if the feature was removed
    pub value: Option<bool>,
}

/// Error raised by a change listener
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListenerError {
    #[error("Listener failed: {0}")]
    Failed(String),

    #[error("Listener panicked: {0}")]
    Panicked(String),
}

impl ListenerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked(message)
    }
}

type ListenerFn = dyn Fn(&ChangeEvent) -> Result<(), ListenerError> + Send + Sync;

/// Shared handle to a change-listener callback.
///
/// Cloning is cheap and keeps identity; use [`Listener::ptr_eq`] to check whether
/// two handles refer to the same callback.
#[derive(Clone)]
pub struct Listener {
    callback: Arc<ListenerFn>,
}

impl Listener {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&ChangeEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Invoke the callback, converting a panic into [`ListenerError::Panicked`].
    pub fn call(&self, event: &ChangeEvent) -> Result<(), ListenerError> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(event)))
            .unwrap_or_else(|payload| Err(ListenerError::from_panic(payload)))
    }

    pub fn ptr_eq(&self, other: &Listener) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("callback", &Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// Where listener tasks run.
#[derive(Debug, Clone)]
pub enum Dispatcher {
    /// Spawn one task per listener on a tokio runtime
    ///
    /// Notifications issued after the runtime has shut down are dropped and
    /// logged; use [`Dispatcher::Thread`] for stores that outlive their runtime.
    Runtime(Handle),

    /// Spawn one OS thread per listener
    Thread,
}

impl Dispatcher {
    /// Use the current tokio runtime if there is one, threads otherwise.
    pub fn detect() -> Self {
        match Handle::try_current() {
            Ok(handle) => Self::Runtime(handle),
            Err(_) => Self::Thread,
        }
    }

    pub(crate) fn spawn<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match self {
            Self::Runtime(handle) => {
                let mut pending = PendingTask(Some(task));
                handle.spawn(async move {
                    if let Some(task) = pending.0.take() {
                        task();
                    }
                });
            }
            Self::Thread => {
                let spawned = std::thread::Builder::new()
                    .name("featureswitch-listener".to_string())
                    .spawn(task);
                if let Err(e) = spawned {
                    error!("Failed to spawn listener thread: {}", e);
                }
            }
        }
    }
}

/// Listener task that warns if it is dropped without running, which happens
/// when its runtime shuts down first.
struct PendingTask<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> Drop for PendingTask<F> {
    fn drop(&mut self) {
        if self.0.is_some() {
            warn!("Change notification dropped: listener runtime has shut down");
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::detect()
    }
}

/// Run one listener against one event, routing failures to `on_error`.
pub(crate) fn deliver(listener: &Listener, event: &ChangeEvent, on_error: &ListenerErrorFn) {
    let Err(err) = listener.call(event) else {
        return;
    };

    let reported = panic::catch_unwind(AssertUnwindSafe(|| on_error(&err, listener, event)));
    if reported.is_err() {
        error!(
            feature = %event.name,
            "listener error handler panicked while reporting: {}", err
        );
    }
}

struct Registration {
    id: u64,
    listener: Listener,
}

/// Ordered listener registrations.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
}

impl Registry {
    pub(crate) fn register(self: &Arc<Self>, listener: Listener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.lock().push(Registration {
            id,
            listener: listener.clone(),
        });
        debug!(id, "change listener registered");

        Subscription {
            id,
            listener,
            registry: Arc::downgrade(self),
        }
    }

    fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter().position(|r| r.id == id) {
            Some(index) => {
                entries.remove(index);
                debug!(id, "change listener removed");
                true
            }
            None => false,
        }
    }

    fn contains(&self, id: u64) -> bool {
        self.entries.lock().iter().any(|r| r.id == id)
    }

    /// Listeners in registration order.
    pub(crate) fn listeners(&self) -> Vec<Listener> {
        self.entries
            .lock()
            .iter()
            .map(|r| r.listener.clone())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Handle returned when a listener is registered.
///
/// [`Subscription::unsubscribe`] removes exactly this registration. It may be
/// called any number of times, including after the store is gone. Dropping a
/// subscription does not unsubscribe.
#[derive(Clone)]
pub struct Subscription {
    id: u64,
    listener: Listener,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }

    /// Whether the registration is still present in a live store.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.contains(self.id))
            .unwrap_or(false)
    }

    /// The registered listener
    pub fn listener(&self) -> &Listener {
        &self.listener
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
