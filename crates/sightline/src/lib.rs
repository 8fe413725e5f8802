//! Sightline: a virtualized, filtered collection-view engine.
//!
//! Sightline manages large item collections for a scrolling grid UI without
//! being a UI: items are opaque, rendering goes through the [`TileHost`]
//! boundary, and the engine concerns itself with which tiles exist, which
//! are visible, which are selected and which are materialized.
//!
//! # Architecture
//!
//! - [`TileGrid`] — the facade: collection mutation, filtering, sorting,
//!   selection and scrolling, coordinated so every operation does minimal
//!   host work and redundant operations do none.
//! - [`FilterChain`] — keyed predicates combined with logical AND, reporting
//!   visibility changes as deltas.
//! - [`Selection`] — selection and focus state under a configurable policy.
//! - [`VirtualScroller`](scroll::VirtualScroller) — maps scroll offsets to a
//!   materialized row window and plans minimal window moves.
//! - Placeholders — synthetic trailing tiles padding the last grid row to a
//!   fixed column count.
//!
//! State change notification uses the signal/slot system from
//! [`sightline_core`]; removal animations run on its deterministic
//! transition scheduler, driven by [`TileGrid::advance_transitions`].
//!
//! # Example
//!
//! ```
//! use sightline::host::testing::RecordingHost;
//! use sightline::{ClosureFilter, SelectionMode, TileGrid};
//!
//! let mut grid = TileGrid::new(RecordingHost::new(600.0, 40.0));
//! grid.set_selection_mode(SelectionMode::MultiSelection);
//!
//! let ids = grid.insert_tiles(vec!["alpha", "beta", "gamma"]).unwrap();
//! grid.select_tiles(&ids[..2]);
//!
//! // Hiding a selected tile deselects it.
//! let not_beta = ClosureFilter::new("not-beta", |s: &&str| *s != "beta");
//! grid.add_filter(Box::new(not_beta), true).unwrap();
//! assert!(!grid.selection().is_selected(ids[1]));
//! ```

pub mod error;
pub mod filter;
pub mod grid;
pub mod host;
pub mod placeholder;
pub mod range;
pub mod scroll;
pub mod selection;
pub mod tile;

pub use sightline_core as core;
pub use sightline_core::{Signal, TransitionId};

pub use error::{GridError, Result};
pub use filter::{ClosureFilter, FilterChain, FilterDelta, TileFilter};
pub use grid::{GridSignals, TileGrid};
pub use host::TileHost;
pub use range::RowRange;
pub use scroll::ScrollMode;
pub use selection::{Selection, SelectionMode};
pub use tile::{GridPosition, Tile, TileEntry, TileId, TileStore};
