//! Signal/slot notifications for listview.
//!
//! A [`Signal<Args>`] is the one-way notification channel the list components
//! use to tell their host that something happened: an item was removed from
//! the bound collection, the selection changed, edit mode was toggled. Hosts
//! connect slots (closures); the component emits, and every connected slot is
//! invoked synchronously on the emitting thread.
//!
//! # Example
//!
//! ```
//! use listview_core::Signal;
//!
//! let removed = Signal::<String>::new();
//!
//! let conn_id = removed.connect(|name| {
//!     println!("removed {name}");
//! });
//!
//! removed.emit("b".to_string());
//! removed.disconnect(conn_id);
//! ```
//!
//! Slots are collected before invocation and the connection lock is released
//! while they run, so a slot may connect, disconnect, or trigger another
//! emission of the same signal without deadlocking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Returned by [`Signal::connect`]; pass it to [`Signal::disconnect`] to
    /// remove the slot again.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A type-safe signal that can have multiple connected slots.
///
/// - `Args`: the argument type passed to connected slots. Use `()` for
///   signals with no arguments, or a tuple for several.
///
/// `Signal<Args>` is `Send + Sync` whenever `Args` is `Send`.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Disconnect a slot. Returns `true` if the connection existed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect every slot.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Temporarily block (or unblock) emission. Emits while blocked are dropped.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Whether emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking every connected slot with `args`.
    #[tracing::instrument(skip_all, target = "listview_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .field("blocked", &self.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + Send + 'static>(signal: &Signal<T>) -> Arc<Mutex<Vec<T>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        signal.connect(move |args: &T| sink.lock().push(args.clone()));
        log
    }

    #[test]
    fn test_slots_see_every_emission_in_order() {
        let edit_mode = Signal::<bool>::new();
        let first = recorder(&edit_mode);
        let second = recorder(&edit_mode);

        edit_mode.emit(true);
        edit_mode.emit(false);

        assert_eq!(*first.lock(), [true, false]);
        assert_eq!(*second.lock(), [true, false]);
    }

    #[test]
    fn test_disconnected_slot_is_not_called() {
        let removed = Signal::<&'static str>::new();
        let kept = recorder(&removed);
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let id = removed.connect(move |item| sink.lock().push(*item));

        removed.emit("a");
        assert!(removed.disconnect(id));
        assert!(!removed.disconnect(id), "second disconnect finds nothing");
        removed.emit("b");

        assert_eq!(*log.lock(), ["a"]);
        assert_eq!(*kept.lock(), ["a", "b"]);
    }

    #[test]
    fn test_blocking_drops_emissions() {
        let signal = Signal::<u8>::new();
        let log = recorder(&signal);

        signal.set_blocked(true);
        assert!(signal.is_blocked());
        signal.emit(1);
        signal.set_blocked(false);
        signal.emit(2);

        assert_eq!(*log.lock(), [2]);
    }

    #[test]
    fn test_disconnect_all_clears_connections() {
        let signal = Signal::<()>::new();
        signal.connect(|_| {});
        signal.connect(|_| {});
        assert_eq!(signal.connection_count(), 2);

        signal.disconnect_all();
        assert_eq!(signal.connection_count(), 0);
        signal.emit(());
    }

    #[test]
    fn test_tuple_payload() {
        let selection_changed = Signal::<(Vec<&'static str>, Vec<&'static str>)>::new();
        let log = recorder(&selection_changed);

        selection_changed.emit((vec!["b"], vec!["a"]));

        assert_eq!(*log.lock(), [(vec!["b"], vec!["a"])]);
    }

    #[test]
    fn test_slot_can_reenter_signal() {
        let signal = Arc::new(Signal::<u32>::new());
        let log = recorder(&signal);

        let weak = Arc::downgrade(&signal);
        signal.connect(move |&depth| {
            if depth < 2 {
                if let Some(signal) = weak.upgrade() {
                    signal.emit(depth + 1);
                }
            }
        });

        signal.emit(0);
        assert_eq!(*log.lock(), [0, 1, 2]);
    }

    #[test]
    fn test_concurrent_emitters() {
        let signal = Arc::new(Signal::<usize>::new());
        let log = recorder(&signal);

        std::thread::scope(|threads| {
            for n in 0..8 {
                let signal = &signal;
                threads.spawn(move || signal.emit(n));
            }
        });

        let mut seen = log.lock().clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
    }
}
