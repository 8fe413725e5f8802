//! Signal/slot system for Sightline.
//!
//! This module provides a type-safe signal/slot mechanism for change
//! notification. Signals are emitted by the engine when its state changes,
//! and connected slots (callbacks) are invoked in response.
//!
//! Sightline's host model is single-threaded and cooperative: every slot is
//! invoked directly, in emission order, on the emitting call stack. There is
//! no queued or cross-thread dispatch.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Example
//!
//! ```
//! use sightline_core::Signal;
//!
//! let filter_applied = Signal::<usize>::new();
//!
//! let conn_id = filter_applied.connect(|hidden_count| {
//!     println!("{hidden_count} tiles hidden");
//! });
//!
//! filter_applied.emit(3);
//! filter_applied.disconnect(conn_id);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via
    /// [`Signal::disconnect`]. The ID remains valid until the connection is
    /// explicitly disconnected or the signal is dropped.
    pub struct ConnectionId;
}

/// A connected slot.
struct Connection<Args> {
    slot: Arc<dyn Fn(&Args) + Send + Sync>,
}

/// A signal that notifies connected slots when emitted.
///
/// Signals are cheap to create and clone-free to share behind a reference.
/// Slots are invoked in connection order.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// When set, `emit` is a no-op. Used to suppress notification storms
    /// during batch mutations.
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> Signal<Args> {
    /// Creates a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connects a slot to this signal.
    ///
    /// Returns a [`ConnectionId`] that can be used to disconnect later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Connection {
            slot: Arc::new(slot),
        })
    }

    /// Connects a slot and returns a guard that disconnects on drop.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<'_, Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard { signal: self, id }
    }

    /// Disconnects a previously connected slot.
    ///
    /// Returns `true` if the connection existed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnects all slots.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Returns the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Blocks or unblocks emission.
    ///
    /// While blocked, `emit` does nothing. Returns the previous state.
    pub fn set_blocked(&self, blocked: bool) -> bool {
        self.blocked.swap(blocked, Ordering::SeqCst)
    }

    /// Returns `true` if emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emits the signal, invoking every connected slot with `args`.
    ///
    /// Slots are collected under the lock and invoked outside it, so a slot
    /// may connect or disconnect other slots without deadlocking.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            return;
        }

        let slots: Vec<Arc<dyn Fn(&Args) + Send + Sync>> = self
            .connections
            .lock()
            .values()
            .map(|conn| conn.slot.clone())
            .collect();

        for slot in slots {
            slot(&args);
        }
    }
}

/// RAII guard that disconnects a slot when dropped.
///
/// Returned by [`Signal::connect_scoped`]. Useful for temporary observers
/// whose lifetime is tied to a scope, e.g. a test assertion block.
pub struct ConnectionGuard<'a, Args> {
    signal: &'a Signal<Args>,
    id: ConnectionId,
}

impl<Args> ConnectionGuard<'_, Args> {
    /// Returns the underlying connection ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args> Drop for ConnectionGuard<'_, Args> {
    fn drop(&mut self) {
        self.signal.disconnect(self.id);
    }
}
