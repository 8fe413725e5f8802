//! Core systems for Sightline.
//!
//! This crate provides the foundational components of the Sightline
//! collection-view engine:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Transition Scheduler**: Deterministic virtual-clock scheduling for
//!   animated transitions
//! - **Logging**: `tracing` target conventions
//!
//! # Signal/Slot Example
//!
//! ```
//! use sightline_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Scheduler Example
//!
//! ```
//! use std::time::Duration;
//! use sightline_core::TransitionScheduler;
//!
//! let mut scheduler = TransitionScheduler::new();
//! scheduler.schedule(Duration::from_millis(150), 42u64);
//!
//! // The clock only moves when the host advances it.
//! let completed = scheduler.advance(Duration::from_millis(150));
//! assert_eq!(completed.len(), 1);
//! ```

pub mod error;
pub mod logging;
mod scheduler;
mod signal;

pub use error::{CoreError, Result, SchedulerError, SignalError};
pub use scheduler::{TransitionId, TransitionScheduler};
pub use signal::{ConnectionGuard, ConnectionId, Signal};

use static_assertions::assert_impl_all;

assert_impl_all!(Signal<u32>: Send, Sync);
assert_impl_all!(ConnectionId: Copy, Send, Sync);
assert_impl_all!(TransitionId: Copy, Send, Sync);
