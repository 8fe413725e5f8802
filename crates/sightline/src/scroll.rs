//! Virtual scrolling controller.
//!
//! In virtual mode only a window of rows is materialized: enough to cover
//! the viewport plus an overscan margin on each side. This module owns the
//! arithmetic for that window — a prefix-sum cache over row heights maps
//! scroll offsets to row indices in O(log rows), and range subtraction
//! turns a window move into minimal remove/render deltas.
//!
//! The controller plans deltas; the grid applies them, because only the
//! grid knows which tiles occupy which row. A plan is committed once
//! applied, which is what makes redundant scroll/resize events harmless:
//! planning against an unchanged window yields nothing to do.

use crate::error::{GridError, Result};
use crate::host::TileHost;
use crate::range::RowRange;

/// Observable state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    /// Virtual scrolling is off; every filtered tile is materialized.
    Disabled,
    /// The materialized range matches the last computed window.
    Idle,
    /// A scroll/resize/mutation invalidated the window; a recompute is due.
    Recomputing,
}

/// Remove/render work required to move the materialized window.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRangePlan {
    /// Row ranges to tear down, in order.
    pub remove: Vec<RowRange>,
    /// Row ranges to materialize, in order.
    pub render: Vec<RowRange>,
    /// Pixel height of rows before the window.
    pub filler_before: f64,
    /// Pixel height of rows after the window.
    pub filler_after: f64,
    /// The window this plan materializes.
    pub target: RowRange,
}

/// Computes and tracks the materialized row window.
pub struct VirtualScroller {
    enabled: bool,
    /// Set by scroll/resize/mutation events until the next commit.
    dirty: bool,
    rendered: RowRange,
    /// `false` until the first commit after enable/reset. Distinguishes an
    /// empty committed window from a window that was never materialized.
    committed: bool,
    /// Fixed window size override; computed from the viewport when `None`.
    view_range_size: Option<usize>,
    /// Extra rows materialized on each side of the visible rows.
    overscan: usize,
    /// `prefix[i]` is the pixel offset of row `i`; length `row_count + 1`.
    prefix: Vec<f64>,
    prefix_dirty: bool,
}

impl VirtualScroller {
    /// Creates a disabled controller.
    pub fn new() -> Self {
        Self {
            enabled: false,
            dirty: false,
            rendered: RowRange::empty(),
            committed: false,
            view_range_size: None,
            overscan: 1,
            prefix: Vec::new(),
            prefix_dirty: true,
        }
    }

    /// Enables or disables virtual scrolling.
    ///
    /// Disabling forgets the materialized window; the grid re-materializes
    /// everything itself.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        self.rendered = RowRange::empty();
        self.committed = false;
        self.dirty = enabled;
    }

    /// Returns `true` if virtual scrolling is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the observable controller state.
    pub fn mode(&self) -> ScrollMode {
        if !self.enabled {
            ScrollMode::Disabled
        } else if self.dirty {
            ScrollMode::Recomputing
        } else {
            ScrollMode::Idle
        }
    }

    /// Sets the overscan margin in rows per side.
    pub fn set_overscan(&mut self, rows: usize) {
        self.overscan = rows;
        self.dirty = true;
    }

    /// Returns the overscan margin in rows per side.
    pub fn overscan(&self) -> usize {
        self.overscan
    }

    /// Overrides the window size; `None` returns to viewport-derived sizing.
    pub fn set_view_range_size(&mut self, size: Option<usize>) {
        self.view_range_size = size;
        self.dirty = true;
    }

    /// Returns the currently materialized window.
    pub fn rendered_range(&self) -> RowRange {
        self.rendered
    }

    /// Marks the window stale (scroll, resize, shape change).
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Marks the row-height cache stale as well as the window.
    pub fn invalidate_heights(&mut self) {
        self.prefix_dirty = true;
        self.dirty = true;
    }

    /// Forgets the materialized window entirely.
    pub fn reset(&mut self) {
        self.rendered = RowRange::empty();
        self.committed = false;
        self.dirty = self.enabled;
    }

    /// Rebuilds the prefix-sum cache if stale.
    fn ensure_prefix<H: TileHost>(&mut self, row_count: usize, host: &H) {
        if !self.prefix_dirty && self.prefix.len() == row_count + 1 {
            return;
        }
        self.prefix.clear();
        self.prefix.reserve(row_count + 1);
        self.prefix.push(0.0);
        let mut acc = 0.0;
        for row in 0..row_count {
            acc += host.row_height(row);
            self.prefix.push(acc);
        }
        self.prefix_dirty = false;
    }

    /// Returns the pixel offset of the given row.
    pub fn offset_of_row<H: TileHost>(&mut self, row: usize, row_count: usize, host: &H) -> f64 {
        self.ensure_prefix(row_count, host);
        let idx = row.min(self.prefix.len() - 1);
        self.prefix[idx]
    }

    /// Returns how many rows the window must span.
    ///
    /// Without an override: the rows needed to cover the viewport starting
    /// at the first visible row, summed incrementally so non-uniform row
    /// heights are handled, plus the overscan margin on each side.
    pub fn view_range_size<H: TileHost>(&mut self, row_count: usize, host: &H) -> usize {
        if let Some(size) = self.view_range_size {
            return size;
        }
        if row_count == 0 {
            return 0;
        }
        self.ensure_prefix(row_count, host);

        let first = self.first_visible_row(row_count, host);
        let viewport = host.viewport_height();
        let mut covered = 0.0;
        let mut rows = 0;
        let mut row = first;
        while row < row_count && covered < viewport {
            covered += self.prefix[row + 1] - self.prefix[row];
            rows += 1;
            row += 1;
        }

        rows + 2 * self.overscan
    }

    /// Maps the current scroll offset to the window that should be
    /// materialized.
    pub fn current_view_range<H: TileHost>(&mut self, row_count: usize, host: &H) -> RowRange {
        if row_count == 0 {
            return RowRange::empty();
        }
        self.ensure_prefix(row_count, host);

        let size = self.view_range_size(row_count, host);
        let first = self.first_visible_row(row_count, host);
        let from = first.saturating_sub(self.overscan);
        let to = (from + size).min(row_count);
        RowRange::new(from.min(to), to)
    }

    /// Largest row whose offset is at or before the scroll offset.
    fn first_visible_row<H: TileHost>(&self, row_count: usize, host: &H) -> usize {
        let offset = host.scroll_offset().max(0.0);
        let idx = self.prefix.partition_point(|&p| p <= offset);
        idx.saturating_sub(1).min(row_count - 1)
    }

    /// Plans the remove/render work to move the window to `range`.
    ///
    /// Returns `Ok(None)` when nothing needs doing (the requested window is
    /// the one last committed). A window that neither overlaps nor
    /// touches the current one plans a full re-render — remove everything,
    /// render everything — because an incremental delta is meaningless for
    /// a discontinuous jump. An overlapping transition whose difference
    /// splits into two pieces is a logic error and fails loudly; rendering
    /// only one piece would corrupt the materialized state.
    pub fn plan_view_range<H: TileHost>(
        &mut self,
        range: RowRange,
        row_count: usize,
        host: &H,
    ) -> Result<Option<ViewRangePlan>> {
        self.ensure_prefix(row_count, host);

        if self.committed && range == self.rendered {
            self.dirty = false;
            return Ok(None);
        }
        if range.is_empty() && self.rendered.is_empty() {
            // Zero-item grid: only the fillers need (re)rendering.
            return Ok(Some(ViewRangePlan {
                remove: Vec::new(),
                render: Vec::new(),
                filler_before: 0.0,
                filler_after: self.total_height(row_count),
                target: range,
            }));
        }

        let remove = self.rendered.subtract(&range);
        let render = range.subtract(&self.rendered);

        if remove.len() == 2 || render.len() == 2 {
            return Err(GridError::DisjointRangeDelta {
                rendered: self.rendered,
                requested: range,
            });
        }

        let filler_before = self.prefix[range.from.min(row_count)];
        let filler_after = self.total_height(row_count) - self.prefix[range.to.min(row_count)];

        tracing::trace!(
            target: "sightline::scroll",
            rendered = %self.rendered,
            requested = %range,
            "view range delta planned"
        );

        Ok(Some(ViewRangePlan {
            remove,
            render,
            filler_before,
            filler_after,
            target: range,
        }))
    }

    /// Records that a plan's target window has been materialized.
    pub fn commit(&mut self, range: RowRange) {
        self.rendered = range;
        self.committed = true;
        self.dirty = false;
    }

    fn total_height(&self, row_count: usize) -> f64 {
        self.prefix.get(row_count).copied().unwrap_or(0.0)
    }
}

impl Default for VirtualScroller {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::RecordingHost;

    fn enabled_scroller() -> VirtualScroller {
        let mut s = VirtualScroller::new();
        s.set_enabled(true);
        s
    }

    #[test]
    fn test_mode_transitions() {
        let mut s = VirtualScroller::new();
        assert_eq!(s.mode(), ScrollMode::Disabled);

        s.set_enabled(true);
        assert_eq!(s.mode(), ScrollMode::Recomputing);

        s.commit(RowRange::new(0, 5));
        assert_eq!(s.mode(), ScrollMode::Idle);

        s.invalidate();
        assert_eq!(s.mode(), ScrollMode::Recomputing);
    }

    #[test]
    fn test_view_range_size_uniform_rows() {
        let mut s = enabled_scroller();
        let host = RecordingHost::new(100.0, 20.0);

        // 5 rows cover the viewport, plus 1 overscan row per side.
        assert_eq!(s.view_range_size(50, &host), 7);
    }

    #[test]
    fn test_view_range_size_non_uniform_rows() {
        let mut s = enabled_scroller();
        let mut host = RecordingHost::new(100.0, 20.0);
        host.row_heights.insert(0, 60.0);
        host.row_heights.insert(1, 40.0);

        // Rows 0 and 1 alone cover the 100px viewport.
        assert_eq!(s.view_range_size(50, &host), 4);
    }

    #[test]
    fn test_view_range_size_override() {
        let mut s = enabled_scroller();
        let host = RecordingHost::new(100.0, 20.0);
        s.set_view_range_size(Some(12));
        assert_eq!(s.view_range_size(50, &host), 12);
    }

    #[test]
    fn test_current_view_range_follows_scroll() {
        let mut s = enabled_scroller();
        let mut host = RecordingHost::new(100.0, 20.0);

        assert_eq!(s.current_view_range(50, &host), RowRange::new(0, 7));

        // Scroll to row 10 (200px). First visible row 10, minus overscan.
        host.scroll_offset = 200.0;
        assert_eq!(s.current_view_range(50, &host), RowRange::new(9, 16));
    }

    #[test]
    fn test_current_view_range_clamps_to_row_count() {
        let mut s = enabled_scroller();
        let mut host = RecordingHost::new(100.0, 20.0);
        host.scroll_offset = 1e9;

        let range = s.current_view_range(10, &host);
        assert_eq!(range.to, 10);
        assert!(range.from <= range.to);
    }

    #[test]
    fn test_plan_initial_render() {
        let mut s = enabled_scroller();
        let host = RecordingHost::new(100.0, 20.0);

        let plan = s
            .plan_view_range(RowRange::new(0, 7), 50, &host)
            .unwrap()
            .unwrap();
        assert!(plan.remove.is_empty());
        assert_eq!(plan.render, vec![RowRange::new(0, 7)]);
        assert_eq!(plan.filler_before, 0.0);
        assert_eq!(plan.filler_after, (50.0 - 7.0) * 20.0);
    }

    #[test]
    fn test_plan_forward_scroll_delta() {
        let mut s = enabled_scroller();
        let host = RecordingHost::new(100.0, 20.0);
        s.commit(RowRange::new(0, 10));

        let plan = s
            .plan_view_range(RowRange::new(5, 15), 50, &host)
            .unwrap()
            .unwrap();
        assert_eq!(plan.remove, vec![RowRange::new(0, 5)]);
        assert_eq!(plan.render, vec![RowRange::new(10, 15)]);
        assert_eq!(plan.filler_before, 5.0 * 20.0);
        assert_eq!(plan.filler_after, 35.0 * 20.0);
    }

    #[test]
    fn test_plan_same_range_is_noop() {
        let mut s = enabled_scroller();
        let host = RecordingHost::new(100.0, 20.0);
        s.commit(RowRange::new(3, 10));

        assert!(s
            .plan_view_range(RowRange::new(3, 10), 50, &host)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_plan_empty_grid_renders_fillers_only() {
        let mut s = enabled_scroller();
        let host = RecordingHost::new(100.0, 20.0);

        let plan = s
            .plan_view_range(RowRange::empty(), 0, &host)
            .unwrap()
            .unwrap();
        assert!(plan.remove.is_empty());
        assert!(plan.render.is_empty());
        assert_eq!(plan.filler_after, 0.0);
    }

    #[test]
    fn test_plan_empty_grid_replan_is_noop() {
        let mut s = enabled_scroller();
        let host = RecordingHost::new(100.0, 20.0);

        let plan = s
            .plan_view_range(RowRange::empty(), 0, &host)
            .unwrap()
            .unwrap();
        s.commit(plan.target);

        // A still-empty grid plans nothing on redundant viewport events.
        s.invalidate();
        assert!(s.plan_view_range(RowRange::empty(), 0, &host).unwrap().is_none());
        assert_eq!(s.mode(), ScrollMode::Idle);
    }

    #[test]
    fn test_plan_discontinuous_jump_is_full_rerender() {
        let mut s = enabled_scroller();
        let host = RecordingHost::new(100.0, 20.0);
        s.commit(RowRange::new(0, 10));

        let plan = s
            .plan_view_range(RowRange::new(40, 47), 50, &host)
            .unwrap()
            .unwrap();
        // Nothing shared: everything out, everything in.
        assert_eq!(plan.remove, vec![RowRange::new(0, 10)]);
        assert_eq!(plan.render, vec![RowRange::new(40, 47)]);
    }

    #[test]
    fn test_plan_interior_shrink_is_fatal() {
        let mut s = enabled_scroller();
        let host = RecordingHost::new(100.0, 20.0);
        s.commit(RowRange::new(0, 10));

        let err = s
            .plan_view_range(RowRange::new(3, 7), 50, &host)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("[0, 10)"), "message names rendered: {msg}");
        assert!(msg.contains("[3, 7)"), "message names requested: {msg}");
    }

    #[test]
    fn test_offset_of_row_prefix_sums() {
        let mut s = enabled_scroller();
        let mut host = RecordingHost::new(100.0, 20.0);
        host.row_heights.insert(0, 50.0);

        assert_eq!(s.offset_of_row(0, 10, &host), 0.0);
        assert_eq!(s.offset_of_row(1, 10, &host), 50.0);
        assert_eq!(s.offset_of_row(2, 10, &host), 70.0);
    }

    #[test]
    fn test_invalidate_heights_rebuilds_prefix() {
        let mut s = enabled_scroller();
        let mut host = RecordingHost::new(100.0, 20.0);

        assert_eq!(s.offset_of_row(2, 10, &host), 40.0);

        host.row_heights.insert(0, 100.0);
        // Stale cache until invalidated.
        assert_eq!(s.offset_of_row(2, 10, &host), 40.0);
        s.invalidate_heights();
        assert_eq!(s.offset_of_row(2, 10, &host), 120.0);
    }
}
