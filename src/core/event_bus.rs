//! Synchronous pub/sub event bus, keyed by event kind.
//!
//! Architecture:
//! - Listeners subscribe to one event kind with a callback (immediate invocation)
//! - emit() invokes callbacks synchronously, in subscription order, before returning
//! - A buffered bus also queues every emitted event for poll() in a host loop
//!
//! The same bus type carries the backend's raw media events and the session's
//! canonical events; only the event type differs.
//!
//! Callback order: FIFO (first-subscribed, first-called) within the same kind.
//! emit() works on a snapshot of the listener list, so callbacks may subscribe
//! or unsubscribe while an event is being delivered. Such changes take effect
//! from the next emit().

use log::warn;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Maximum events in queue before oldest are evicted
const MAX_QUEUE_SIZE: usize = 1000;

/// An event that can travel on an [`EventBus`].
pub trait BusEvent: Clone + Send + Sync + 'static {
    /// Subscription key (the event "name").
    type Kind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

/// Handle returned by [`EventBus::on`] / [`EventBus::once`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Listener<E> {
    id: ListenerId,
    once: bool,
    callback: Callback<E>,
}

type ListenerMap<E> = HashMap<<E as BusEvent>::Kind, Vec<Listener<E>>>;

/// Pub/Sub event bus with optional deferred processing.
///
/// Two modes of operation:
/// 1. Immediate: on() + emit() triggers callbacks instantly
/// 2. Deferred (buffered bus only): emit() also queues events for poll()
///
/// Cloning the bus yields another handle to the same listeners and queue.
pub struct EventBus<E: BusEvent> {
    listeners: Arc<RwLock<ListenerMap<E>>>,
    queue: Option<Arc<Mutex<Vec<E>>>>,
    next_id: Arc<AtomicU64>,
}

impl<E: BusEvent> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
            queue: self.queue.as_ref().map(Arc::clone),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("kinds", &self.listeners.read().map(|l| l.len()).unwrap_or(0))
            .field("buffered", &self.queue.is_some())
            .field("queue_len", &self.queue_len())
            .finish()
    }
}

impl<E: BusEvent> EventBus<E> {
    /// Immediate-only bus: events are delivered to listeners and then dropped.
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(HashMap::new())),
            queue: None,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Bus that also keeps emitted events for [`EventBus::poll`].
    pub fn buffered() -> Self {
        Self {
            queue: Some(Arc::new(Mutex::new(Vec::new()))),
            ..Self::new()
        }
    }

    // ========== Pub/Sub (immediate) ==========

    /// Subscribe to every future event of `kind`.
    pub fn on<F>(&self, kind: E::Kind, callback: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.add_listener(kind, false, Arc::new(callback))
    }

    /// Subscribe to the next event of `kind` only.
    ///
    /// The listener is detached before it runs, so it fires at most once even
    /// when the callback itself causes another event of the same kind.
    pub fn once<F>(&self, kind: E::Kind, callback: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.add_listener(kind, true, Arc::new(callback))
    }

    fn add_listener(&self, kind: E::Kind, once: bool, callback: Callback<E>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(kind)
            .or_default()
            .push(Listener { id, once, callback });
        id
    }

    /// Remove one listener. Returns false if it was already gone.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        for list in listeners.values_mut() {
            if let Some(pos) = list.iter().position(|l| l.id == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Remove every listener of `kind`.
    pub fn off_kind(&self, kind: E::Kind) {
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&kind);
    }

    /// Emit event: invoke callbacks immediately, then queue if buffered.
    pub fn emit(&self, event: E) {
        let kind = event.kind();

        // Snapshot under the lock, call outside of it.
        let callbacks: Vec<Callback<E>> = {
            let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
            match listeners.get_mut(&kind) {
                Some(list) => {
                    let snapshot = list.iter().map(|l| Arc::clone(&l.callback)).collect();
                    list.retain(|l| !l.once);
                    snapshot
                }
                None => Vec::new(),
            }
        };

        for cb in &callbacks {
            cb(&event);
        }

        if let Some(queue) = &self.queue {
            let mut queue = queue.lock().unwrap_or_else(|e| e.into_inner());
            if queue.len() >= MAX_QUEUE_SIZE {
                let evict_count = queue.len() / 2;
                warn!("EventBus queue full ({} events), evicting oldest {}", queue.len(), evict_count);
                queue.drain(0..evict_count);
            }
            queue.push(event);
        }
    }

    // ========== Deferred Processing ==========

    /// Take all queued events (always empty for an immediate-only bus).
    pub fn poll(&self) -> Vec<E> {
        match &self.queue {
            Some(queue) => std::mem::take(&mut *queue.lock().unwrap_or_else(|e| e.into_inner())),
            None => Vec::new(),
        }
    }

    /// Check queue length
    pub fn queue_len(&self) -> usize {
        self.queue
            .as_ref()
            .map(|q| q.lock().unwrap_or_else(|e| e.into_inner()).len())
            .unwrap_or(0)
    }

    // ========== Utilities ==========

    /// Clear all listeners and queue
    pub fn clear(&self) {
        self.listeners.write().unwrap_or_else(|e| e.into_inner()).clear();
        if let Some(queue) = &self.queue {
            queue.lock().unwrap_or_else(|e| e.into_inner()).clear();
        }
    }

    /// Check if there are listeners for `kind`
    pub fn has_subscribers(&self, kind: E::Kind) -> bool {
        self.listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&kind)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }
}
