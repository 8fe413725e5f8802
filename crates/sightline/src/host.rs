//! Host boundary: the interfaces the engine consumes.
//!
//! The engine never touches a rendering technology directly. Everything it
//! needs from the outside world — viewport geometry, row heights, creating
//! and destroying rendered representations — goes through [`TileHost`].
//! Tiles cross the boundary as opaque [`TileId`] handles; the host maps
//! them to whatever it renders with.

use crate::tile::TileId;

/// The rendering/measurement surface a grid is mounted on.
///
/// Contract notes:
///
/// - [`render`](Self::render) must be an idempotent no-op if the tile is
///   already rendered (the engine additionally guards with its own
///   `rendered` flag, so double calls are rare but must be safe).
/// - [`remove`](Self::remove) must be safe to call on a tile whose removal
///   animation is still running; no double-teardown.
/// - Render and remove are best-effort side effects, not transactions; the
///   engine updates its own bookkeeping regardless of what the host does.
pub trait TileHost {
    /// Current viewport height in pixels.
    fn viewport_height(&self) -> f64;

    /// Current scroll offset in pixels.
    fn scroll_offset(&self) -> f64;

    /// Height in pixels of the given row.
    ///
    /// Supplied per row, not as a constant: grid layouts may size their
    /// last row differently.
    fn row_height(&self, row: usize) -> f64;

    /// Materializes a tile.
    fn render(&mut self, tile: TileId);

    /// Tears down a tile's rendered representation.
    fn remove(&mut self, tile: TileId);

    /// Reorders already-materialized tiles to match the given logical order.
    ///
    /// Move operations only; the handles stay alive, which preserves
    /// in-flight animations.
    fn reorder(&mut self, _order: &[TileId]) {}

    /// Updates the filler heights before and after the materialized range,
    /// preserving total scrollable height in virtual mode.
    fn set_filler_heights(&mut self, _before: f64, _after: f64) {}

    /// Scrolls the viewport to the given pixel offset.
    fn scroll_to_offset(&mut self, _offset: f64) {}
}

/// Test doubles for the host boundary.
pub mod testing {
    use std::collections::HashMap;

    use super::TileHost;
    use crate::tile::TileId;

    /// Everything a [`RecordingHost`] observed, in call order.
    #[derive(Debug, Clone, PartialEq)]
    pub enum HostEvent {
        /// `render` was called.
        Render(TileId),
        /// `remove` was called.
        Remove(TileId),
        /// `reorder` was called with this order.
        Reorder(Vec<TileId>),
        /// `set_filler_heights` was called.
        Filler { before: f64, after: f64 },
        /// `scroll_to_offset` was called.
        ScrollTo(f64),
    }

    /// A fake host that records every call for assertion.
    pub struct RecordingHost {
        /// Reported viewport height.
        pub viewport_height: f64,
        /// Reported scroll offset.
        pub scroll_offset: f64,
        /// Uniform row height unless overridden per row.
        pub uniform_row_height: f64,
        /// Per-row height overrides.
        pub row_heights: HashMap<usize, f64>,
        /// Chronological call log.
        pub events: Vec<HostEvent>,
    }

    impl RecordingHost {
        /// Creates a host with the given geometry and uniform row height.
        pub fn new(viewport_height: f64, row_height: f64) -> Self {
            Self {
                viewport_height,
                scroll_offset: 0.0,
                uniform_row_height: row_height,
                row_heights: HashMap::new(),
                events: Vec::new(),
            }
        }

        /// Drops the recorded log.
        pub fn clear_events(&mut self) {
            self.events.clear();
        }

        /// Returns the rendered tile IDs in call order.
        pub fn rendered(&self) -> Vec<TileId> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    HostEvent::Render(id) => Some(*id),
                    _ => None,
                })
                .collect()
        }

        /// Returns the removed tile IDs in call order.
        pub fn removed(&self) -> Vec<TileId> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    HostEvent::Remove(id) => Some(*id),
                    _ => None,
                })
                .collect()
        }
    }

    impl TileHost for RecordingHost {
        fn viewport_height(&self) -> f64 {
            self.viewport_height
        }

        fn scroll_offset(&self) -> f64 {
            self.scroll_offset
        }

        fn row_height(&self, row: usize) -> f64 {
            self.row_heights
                .get(&row)
                .copied()
                .unwrap_or(self.uniform_row_height)
        }

        fn render(&mut self, tile: TileId) {
            self.events.push(HostEvent::Render(tile));
        }

        fn remove(&mut self, tile: TileId) {
            self.events.push(HostEvent::Remove(tile));
        }

        fn reorder(&mut self, order: &[TileId]) {
            self.events.push(HostEvent::Reorder(order.to_vec()));
        }

        fn set_filler_heights(&mut self, before: f64, after: f64) {
            self.events.push(HostEvent::Filler { before, after });
        }

        fn scroll_to_offset(&mut self, offset: f64) {
            self.scroll_offset = offset;
            self.events.push(HostEvent::ScrollTo(offset));
        }
    }
}
