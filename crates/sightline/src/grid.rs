//! The tile grid: a filtered, sortable, virtually-scrolled collection view.
//!
//! [`TileGrid`] is the engine's facade. It owns the tile store, the raw
//! collection order, the filter chain, the selection state and the virtual
//! scrolling controller, and coordinates them through one rule: every
//! mutation updates logical state first, then reconciles the host with
//! minimal render/remove work. Benign redundant operations (re-applying an
//! unchanged filter chain, setting the same tile order, scrolling without
//! moving) produce no host calls and no signals.
//!
//! Two orders are maintained. The *raw* order is every tile including
//! trailing placeholders, in collection order; filters and sorting operate
//! on it. The *visible* order is the filter-accepted subset, rebuilt lazily
//! after any change, and is what rows, grid positions and the scroll window
//! are computed from.
//!
//! # Example
//!
//! ```
//! use sightline::host::testing::RecordingHost;
//! use sightline::{ClosureFilter, TileGrid};
//!
//! let mut grid = TileGrid::new(RecordingHost::new(600.0, 40.0));
//! let ids = grid.insert_tiles(vec!["alpha", "beta", "gamma"]).unwrap();
//!
//! let min_len = ClosureFilter::new("min-len", |s: &&str| s.len() > 4);
//! grid.add_filter(Box::new(min_len), true).unwrap();
//!
//! assert!(grid.tile(ids[1]).is_some_and(|t| !t.is_filter_accepted()));
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::Duration;

use sightline_core::{Signal, TransitionId, TransitionScheduler};

use crate::error::Result;
use crate::filter::{FilterChain, TileFilter};
use crate::host::TileHost;
use crate::placeholder::{obsolete_placeholders, placeholders_needed};
use crate::range::RowRange;
use crate::scroll::{ScrollMode, VirtualScroller};
use crate::selection::{Selection, SelectionMode};
use crate::tile::{GridPosition, TileEntry, TileId, TileStore};

/// Signals emitted by a [`TileGrid`].
pub struct GridSignals {
    /// Emitted after tiles are inserted. Args: the new tile IDs.
    pub tiles_inserted: Signal<Vec<TileId>>,
    /// Emitted after tiles are deleted. Args: the deleted tile IDs.
    ///
    /// Emitted when deletion is committed logically, which may be before
    /// the removal transition finishes visually.
    pub tiles_deleted: Signal<Vec<TileId>>,
    /// Emitted after a filter pass that changed visibility.
    /// Args: (newly shown, newly hidden).
    pub filter_applied: Signal<(Vec<TileId>, Vec<TileId>)>,
    /// Emitted after the collection order changes (sort or `set_tiles`).
    pub order_changed: Signal<()>,
    /// Emitted after the materialized scroll window moves.
    pub view_range_changed: Signal<RowRange>,
    /// Emitted with the tiles a reconciliation pass newly materialized.
    ///
    /// Hosts hook insertion animations here: these are exactly the tiles
    /// whose representations did not exist before the pass. Not emitted
    /// when a pass materializes nothing.
    pub tiles_rendered: Signal<Vec<TileId>>,
}

impl GridSignals {
    fn new() -> Self {
        Self {
            tiles_inserted: Signal::new(),
            tiles_deleted: Signal::new(),
            filter_applied: Signal::new(),
            order_changed: Signal::new(),
            view_range_changed: Signal::new(),
            tiles_rendered: Signal::new(),
        }
    }
}

type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// A virtualized, filtered, selectable collection view over items of `T`,
/// mounted on a host `H`.
pub struct TileGrid<T, H: TileHost> {
    host: H,
    store: TileStore<T>,

    /// Raw collection order, trailing placeholders included.
    order: Vec<TileId>,

    /// Filter-accepted tiles in collection order. Rebuilt lazily.
    filtered: Vec<TileId>,
    filtered_dirty: bool,

    filters: FilterChain<T>,
    selection: Selection,
    scroller: VirtualScroller,

    comparator: Option<Comparator<T>>,
    column_count: usize,
    placeholders_enabled: bool,

    /// Duration of the removal transition; `None` tears down immediately.
    removal_transition: Option<Duration>,
    transitions: TransitionScheduler<TileId>,

    /// Last window reported through `view_range_changed`.
    last_view_range: RowRange,

    /// Signals emitted by this grid.
    pub signals: GridSignals,
}

impl<T, H: TileHost> TileGrid<T, H> {
    /// Creates an empty grid mounted on the given host.
    ///
    /// Defaults: one column, placeholders off, virtual scrolling off,
    /// single selection, no removal transition.
    pub fn new(host: H) -> Self {
        Self {
            host,
            store: TileStore::new(),
            order: Vec::new(),
            filtered: Vec::new(),
            filtered_dirty: false,
            filters: FilterChain::new(),
            selection: Selection::new(),
            scroller: VirtualScroller::new(),
            comparator: None,
            column_count: 1,
            placeholders_enabled: false,
            removal_transition: None,
            transitions: TransitionScheduler::new(),
            last_view_range: RowRange::empty(),
            signals: GridSignals::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the host mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Returns the entry for a tile, if it is alive.
    pub fn tile(&self, id: TileId) -> Option<&TileEntry<T>> {
        self.store.get(id)
    }

    /// Returns the application item behind a tile.
    pub fn item(&self, id: TileId) -> Option<&T> {
        self.store.get(id).and_then(TileEntry::item)
    }

    /// Returns the raw collection order, trailing placeholders included.
    pub fn tile_order(&self) -> &[TileId] {
        &self.order
    }

    /// Returns the number of real tiles in the collection.
    pub fn tile_count(&self) -> usize {
        self.order.len() - self.trailing_placeholders()
    }

    /// Returns `true` if the collection holds no real tiles.
    pub fn is_empty(&self) -> bool {
        self.tile_count() == 0
    }

    /// Returns the filter-accepted tiles in collection order.
    pub fn visible_tiles(&mut self) -> &[TileId] {
        self.ensure_filtered();
        &self.filtered
    }

    /// Returns the selection state.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Returns the selection state mutably (for focus handling and signal
    /// connections).
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Returns the number of visible rows.
    pub fn row_count(&mut self) -> usize {
        self.ensure_filtered();
        self.row_count_internal()
    }

    /// Returns the visible tiles in the given row.
    pub fn tiles_in_row(&mut self, row: usize) -> &[TileId] {
        self.ensure_filtered();
        let cols = self.column_count.max(1);
        let lo = (row * cols).min(self.filtered.len());
        let hi = ((row + 1) * cols).min(self.filtered.len());
        &self.filtered[lo..hi]
    }

    /// Returns the visible tiles in the given row range, in row order.
    pub fn tiles_in_range(&mut self, range: RowRange) -> Vec<TileId> {
        self.ensure_filtered();
        let cols = self.column_count.max(1);
        let lo = (range.from * cols).min(self.filtered.len());
        let hi = (range.to * cols).min(self.filtered.len());
        self.filtered[lo..hi].to_vec()
    }

    /// Returns the observable virtual scrolling state.
    pub fn scroll_mode(&self) -> ScrollMode {
        self.scroller.mode()
    }

    /// Returns the currently materialized row window.
    pub fn rendered_range(&self) -> RowRange {
        self.scroller.rendered_range()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Sets the selection policy.
    ///
    /// An existing selection is not clipped; the next selection operation
    /// applies the new policy.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.selection.set_mode(mode);
    }

    /// Sets the number of columns (clamped to at least 1).
    pub fn set_column_count(&mut self, columns: usize) -> Result<()> {
        let columns = columns.max(1);
        if columns == self.column_count {
            return Ok(());
        }
        self.column_count = columns;
        self.repad_placeholders();
        self.filtered_dirty = true;
        self.scroller.invalidate_heights();
        self.scroller.reset();
        self.refresh()
    }

    /// Enables or disables trailing-row placeholder padding.
    pub fn set_placeholders_enabled(&mut self, enabled: bool) -> Result<()> {
        if enabled == self.placeholders_enabled {
            return Ok(());
        }
        self.placeholders_enabled = enabled;
        self.repad_placeholders();
        self.filtered_dirty = true;
        self.refresh()
    }

    /// Sets the removal transition duration; `None` disables animation.
    pub fn set_removal_transition(&mut self, duration: Option<Duration>) {
        self.removal_transition = duration;
    }

    /// Sets the sort comparator. Takes effect on the next [`sort`](Self::sort).
    pub fn set_comparator(&mut self, comparator: Option<Comparator<T>>) {
        self.comparator = comparator;
    }

    /// Enables or disables virtual scrolling.
    pub fn set_virtual(&mut self, enabled: bool) -> Result<()> {
        if enabled == self.scroller.is_enabled() {
            return Ok(());
        }
        self.scroller.set_enabled(enabled);
        if !enabled {
            self.host.set_filler_heights(0.0, 0.0);
            self.last_view_range = RowRange::empty();
        }
        self.refresh()
    }

    /// Returns `true` if virtual scrolling is active.
    pub fn is_virtual(&self) -> bool {
        self.scroller.is_enabled()
    }

    /// Overrides the window size; `None` returns to viewport-derived sizing.
    pub fn set_view_range_size(&mut self, size: Option<usize>) -> Result<()> {
        self.scroller.set_view_range_size(size);
        self.refresh_if_virtual()
    }

    /// Sets the overscan margin in rows per side.
    pub fn set_overscan(&mut self, rows: usize) -> Result<()> {
        self.scroller.set_overscan(rows);
        self.refresh_if_virtual()
    }

    // =========================================================================
    // Collection mutation
    // =========================================================================

    /// Inserts one item as a selectable tile.
    pub fn insert_tile(&mut self, item: T) -> Result<TileId> {
        let ids = self.insert_tiles(vec![item])?;
        Ok(ids[0])
    }

    /// Inserts items at the end of the collection.
    ///
    /// Each insertion consumes one trailing placeholder slot if available;
    /// the tail is re-padded afterwards, so a fixed column count stays
    /// satisfied throughout. New items are evaluated against the active
    /// filter chain immediately. If a comparator is set the collection is
    /// kept sorted.
    pub fn insert_tiles(&mut self, items: Vec<T>) -> Result<Vec<TileId>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut new_ids = Vec::with_capacity(items.len());
        for item in items {
            if let Some(&last) = self.order.last() {
                if self.store.is_placeholder(last) {
                    self.order.pop();
                    self.destroy_tile(last);
                }
            }

            let accepted = self.filters.accepts(&item);
            let mut entry = TileEntry::new_item(item, true);
            entry.accepted = accepted;
            let id = self.store.insert(entry);

            let at = self.order.len() - self.trailing_placeholders();
            self.order.insert(at, id);
            new_ids.push(id);
        }

        self.resort();
        self.repad_placeholders();
        self.filtered_dirty = true;
        self.scroller.reset();

        tracing::debug!(
            target: "sightline::grid",
            count = new_ids.len(),
            total = self.tile_count(),
            "tiles inserted"
        );
        self.signals.tiles_inserted.emit(new_ids.clone());
        self.refresh()?;
        Ok(new_ids)
    }

    /// Deletes a single tile. Unknown IDs are ignored.
    pub fn delete_tile(&mut self, id: TileId) -> Result<()> {
        self.delete_tiles(&[id])
    }

    /// Deletes tiles from the collection.
    ///
    /// Unknown IDs and placeholders are ignored. Deleted tiles leave the
    /// collection (and the selection) immediately; if a removal transition
    /// is configured and the tile is rendered, the host-side teardown is
    /// deferred until the transition completes via
    /// [`advance_transitions`](Self::advance_transitions).
    pub fn delete_tiles(&mut self, ids: &[TileId]) -> Result<()> {
        let mut removed = Vec::new();
        for &id in ids {
            if self.store.is_placeholder(id) {
                continue;
            }
            if let Some(pos) = self.order.iter().position(|&o| o == id) {
                self.order.remove(pos);
                removed.push(id);
            }
        }
        if removed.is_empty() {
            return Ok(());
        }

        self.selection.handle_deleted(&removed);
        self.teardown_tiles(&removed);
        self.repad_placeholders();
        self.filtered_dirty = true;
        self.scroller.reset();

        tracing::debug!(
            target: "sightline::grid",
            count = removed.len(),
            total = self.tile_count(),
            "tiles deleted"
        );
        self.signals.tiles_deleted.emit(removed);
        self.refresh()
    }

    /// Replaces the collection order with the given tiles.
    ///
    /// Dead IDs and placeholders are stripped and duplicates keep their
    /// first occurrence. Tiles currently in the collection but not listed
    /// are deleted (honoring the removal transition); listed tiles whose
    /// removal is still animating are revived in place, keeping their
    /// rendered representation alive. Setting the current order is a no-op.
    pub fn set_tiles(&mut self, ids: Vec<TileId>) -> Result<()> {
        let mut seen = HashSet::new();
        let incoming: Vec<TileId> = ids
            .into_iter()
            .filter(|&id| {
                self.store.contains(id) && !self.store.is_placeholder(id) && seen.insert(id)
            })
            .collect();

        let real = self.order.len() - self.trailing_placeholders();
        if incoming[..] == self.order[..real] {
            return Ok(());
        }

        let revivals: Vec<(TileId, TransitionId)> = incoming
            .iter()
            .filter_map(|&id| {
                self.store
                    .get(id)
                    .and_then(|e| e.pending_removal.map(|tid| (id, tid)))
            })
            .collect();
        let filters = &self.filters;
        for (id, tid) in revivals {
            let _ = self.transitions.cancel(tid);
            if let Some(entry) = self.store.get_mut(id) {
                entry.pending_removal = None;
                // Filter passes walk the collection order; a tile
                // mid-transition sits outside it, so its accepted flag
                // may be stale.
                let accepted = entry.item().map(|item| filters.accepts(item));
                if let Some(accepted) = accepted {
                    entry.accepted = accepted;
                }
            }
        }

        let dropped: Vec<TileId> = self.order[..real]
            .iter()
            .copied()
            .filter(|id| !seen.contains(id))
            .collect();

        // Trailing placeholders are engine-managed; repad rebuilds them.
        let pads: Vec<TileId> = self.order[real..].to_vec();
        for id in pads {
            self.destroy_tile(id);
        }
        self.order = incoming;

        if !dropped.is_empty() {
            self.selection.handle_deleted(&dropped);
            self.teardown_tiles(&dropped);
        }

        self.repad_placeholders();
        self.filtered_dirty = true;
        self.scroller.reset();

        self.signals.order_changed.emit(());
        if !dropped.is_empty() {
            self.signals.tiles_deleted.emit(dropped);
        }
        self.reorder_host();
        self.refresh()
    }

    /// Removes every tile without signals.
    ///
    /// Rendered representations are torn down immediately (transitions
    /// included); selection and focus are reset silently.
    pub fn clear(&mut self) {
        let rendered: Vec<TileId> = self
            .store
            .iter()
            .filter(|&(_, e)| e.rendered)
            .map(|(id, _)| id)
            .collect();
        for id in rendered {
            self.host.remove(id);
        }
        let pending: Vec<TransitionId> = self
            .store
            .iter()
            .filter_map(|(_, e)| e.pending_removal)
            .collect();
        for tid in pending {
            let _ = self.transitions.cancel(tid);
        }

        self.store = TileStore::new();
        self.order.clear();
        self.filtered.clear();
        self.filtered_dirty = false;
        self.selection.reset();
        self.scroller.reset();
        self.last_view_range = RowRange::empty();
        if self.scroller.is_enabled() {
            self.host.set_filler_heights(0.0, 0.0);
        }
    }

    /// Sorts the collection with the configured comparator.
    ///
    /// The sort is stable and covers real tiles only; trailing placeholders
    /// keep their position at the tail. A no-op without a comparator or
    /// when the order is already sorted.
    pub fn sort(&mut self) -> Result<()> {
        if self.comparator.is_none() {
            return Ok(());
        }
        let before = self.order.clone();
        self.resort();
        if self.order == before {
            return Ok(());
        }

        self.filtered_dirty = true;
        self.scroller.reset();
        self.signals.order_changed.emit(());
        self.reorder_host();
        self.refresh()
    }

    /// Completes removal transitions that became due within `delta`.
    ///
    /// Each completion re-validates against current state: a tile that was
    /// revived (or already destroyed) in the meantime is left alone.
    pub fn advance_transitions(&mut self, delta: Duration) {
        for (tid, id) in self.transitions.advance(delta) {
            let due = self
                .store
                .get(id)
                .is_some_and(|e| e.pending_removal == Some(tid));
            if due {
                self.host.remove(id);
                self.store.remove(id);
            }
        }
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Replaces the filter chain, optionally applying it immediately.
    pub fn set_filters(
        &mut self,
        filters: Vec<Box<dyn TileFilter<T>>>,
        apply: bool,
    ) -> Result<()> {
        self.filters.set_filters(filters);
        if apply {
            self.apply_filters()?;
        }
        Ok(())
    }

    /// Adds a filter (replacing any with the same key), optionally applying
    /// the chain immediately.
    pub fn add_filter(&mut self, filter: Box<dyn TileFilter<T>>, apply: bool) -> Result<()> {
        self.filters.add_filter(filter);
        if apply {
            self.apply_filters()?;
        }
        Ok(())
    }

    /// Removes the filter with the given key, optionally applying the chain
    /// immediately. Returns `true` if a filter was removed.
    pub fn remove_filter(&mut self, key: &str, apply: bool) -> Result<bool> {
        let removed = self.filters.remove_filter(key);
        if removed && apply {
            self.apply_filters()?;
        }
        Ok(removed)
    }

    /// Returns `true` if a filter with the given key is active.
    pub fn has_filter(&self, key: &str) -> bool {
        self.filters.has_filter(key)
    }

    /// Re-evaluates the filter chain against every tile.
    ///
    /// When visibility actually changes: newly hidden tiles are deselected
    /// (newly shown ones are *not* re-selected), `filter_applied` fires and
    /// the host is reconciled. When nothing changes, nothing happens: no
    /// signal, no host calls.
    pub fn apply_filters(&mut self) -> Result<()> {
        let delta = self.filters.apply(&mut self.store, &self.order);
        if delta.is_empty() {
            return Ok(());
        }

        self.selection.reconcile_hidden(&delta.newly_hidden);
        self.filtered_dirty = true;
        self.scroller.reset();
        self.signals
            .filter_applied
            .emit((delta.newly_shown, delta.newly_hidden));
        self.refresh()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Replaces the selection with the given tiles.
    ///
    /// Candidates are clamped first: hidden, unselectable, placeholder and
    /// removal-pending tiles are silently dropped, then the selection policy
    /// applies. Returns `true` if the selection changed.
    pub fn select_tiles(&mut self, ids: &[TileId]) -> bool {
        let candidates: Vec<TileId> = ids
            .iter()
            .copied()
            .filter(|&id| self.is_selectable_now(id))
            .collect();
        self.selection.replace(candidates)
    }

    /// Selects every visible selectable tile.
    ///
    /// Only meaningful under [`SelectionMode::MultiSelection`]; a no-op
    /// otherwise. Returns `true` if the selection changed.
    pub fn select_all(&mut self) -> bool {
        if self.selection.mode() != SelectionMode::MultiSelection {
            return false;
        }
        self.ensure_filtered();
        let candidates: Vec<TileId> = self
            .filtered
            .iter()
            .copied()
            .filter(|&id| self.is_selectable_now(id))
            .collect();
        self.selection.replace(candidates)
    }

    /// Removes the given tiles from the selection.
    pub fn deselect_tiles(&mut self, ids: &[TileId]) -> bool {
        self.selection.deselect(ids)
    }

    /// Clears the selection.
    pub fn deselect_all(&mut self) -> bool {
        self.selection.deselect_all()
    }

    fn is_selectable_now(&self, id: TileId) -> bool {
        self.store.get(id).is_some_and(|e| {
            !e.is_placeholder() && e.selectable && e.accepted && e.pending_removal.is_none()
        })
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    /// Recomputes the scroll window after a scroll or resize.
    ///
    /// Idempotent: if the window did not move, no host calls are made.
    pub fn update_viewport(&mut self) -> Result<()> {
        if !self.scroller.is_enabled() {
            return Ok(());
        }
        self.scroller.invalidate();
        self.refresh()
    }

    /// Invalidates cached row heights (call after the host's rows resize).
    pub fn invalidate_row_heights(&mut self) -> Result<()> {
        self.scroller.invalidate_heights();
        self.refresh_if_virtual()
    }

    /// Scrolls the viewport so the given tile's row is at the top.
    ///
    /// Hidden, dead and removal-pending tiles are ignored.
    pub fn scroll_to(&mut self, id: TileId) -> Result<()> {
        self.ensure_filtered();
        let row = match self.store.get(id) {
            Some(e) if e.accepted && e.pending_removal.is_none() => e.position.y,
            _ => return Ok(()),
        };
        let row_count = self.row_count_internal();
        let offset = self.scroller.offset_of_row(row, row_count, &self.host);
        self.host.scroll_to_offset(offset);
        self.update_viewport()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn ensure_filtered(&mut self) {
        if !self.filtered_dirty {
            return;
        }
        self.filtered.clear();
        for &id in &self.order {
            if self.store.is_accepted(id) {
                self.filtered.push(id);
            }
        }
        let cols = self.column_count.max(1);
        for (i, &id) in self.filtered.iter().enumerate() {
            if let Some(entry) = self.store.get_mut(id) {
                entry.position = GridPosition {
                    x: i % cols,
                    y: i / cols,
                    width: 1,
                    height: 1,
                };
            }
        }
        self.filtered_dirty = false;
    }

    fn row_count_internal(&self) -> usize {
        self.filtered.len().div_ceil(self.column_count.max(1))
    }

    fn trailing_placeholders(&self) -> usize {
        self.order
            .iter()
            .rev()
            .take_while(|&&id| self.store.is_placeholder(id))
            .count()
    }

    /// Re-sorts real tiles in place if a comparator is configured.
    fn resort(&mut self) {
        let Some(cmp) = self.comparator.as_ref() else {
            return;
        };
        let real = self.order.len() - self.trailing_placeholders();
        let store = &self.store;
        self.order[..real].sort_by(|&a, &b| {
            match (
                store.get(a).and_then(TileEntry::item),
                store.get(b).and_then(TileEntry::item),
            ) {
                (Some(x), Some(y)) => cmp(x, y),
                _ => Ordering::Equal,
            }
        });
    }

    /// Brings the trailing placeholder padding in line with the current
    /// real-tile count and column count.
    fn repad_placeholders(&mut self) {
        let mut trailing = self.trailing_placeholders();
        let real = self.order.len() - trailing;
        let (demand, obsolete) = if self.placeholders_enabled {
            (
                placeholders_needed(real, self.column_count),
                obsolete_placeholders(real, trailing, self.column_count),
            )
        } else {
            (0, trailing)
        };

        for _ in 0..obsolete {
            if let Some(id) = self.order.pop() {
                self.destroy_tile(id);
            }
            trailing -= 1;
        }
        while trailing < demand {
            let id = self.store.insert(TileEntry::new_placeholder());
            self.order.push(id);
            trailing += 1;
        }
    }

    /// Destroys a tile immediately, transition or not.
    fn destroy_tile(&mut self, id: TileId) {
        if let Some(entry) = self.store.remove(id) {
            if entry.rendered {
                self.host.remove(id);
            }
            if let Some(tid) = entry.pending_removal {
                let _ = self.transitions.cancel(tid);
            }
        }
    }

    /// Tears down deleted tiles, deferring rendered ones to the removal
    /// transition when one is configured.
    fn teardown_tiles(&mut self, ids: &[TileId]) {
        for &id in ids {
            let rendered = self.store.get(id).is_some_and(|e| e.rendered);
            match self.removal_transition {
                Some(duration) if rendered => {
                    let tid = self.transitions.schedule(duration, id);
                    if let Some(entry) = self.store.get_mut(id) {
                        entry.pending_removal = Some(tid);
                    }
                }
                _ => {
                    if rendered {
                        self.host.remove(id);
                    }
                    self.store.remove(id);
                }
            }
        }
    }

    /// Matches the host's materialized order to the logical order.
    ///
    /// Move operations only, and only outside virtual mode; in virtual mode
    /// the window reconciliation re-derives placement from row indices.
    fn reorder_host(&mut self) {
        if self.scroller.is_enabled() {
            return;
        }
        self.ensure_filtered();
        self.host.reorder(&self.filtered);
    }

    fn refresh_if_virtual(&mut self) -> Result<()> {
        if self.scroller.is_enabled() {
            self.refresh()
        } else {
            Ok(())
        }
    }

    /// Reconciles the host with current logical state.
    fn refresh(&mut self) -> Result<()> {
        self.ensure_filtered();
        let rendered = if self.scroller.is_enabled() {
            self.render_view_range()?
        } else {
            self.render_all()
        };
        if !rendered.is_empty() {
            self.signals.tiles_rendered.emit(rendered);
        }
        Ok(())
    }

    /// Non-virtual reconciliation: every visible tile rendered, everything
    /// else removed. Tiles mid removal-transition are left to the scheduler.
    /// Returns the newly materialized tiles.
    fn render_all(&mut self) -> Vec<TileId> {
        let to_remove: Vec<TileId> = self
            .store
            .iter()
            .filter(|&(_, e)| e.rendered && !e.accepted && e.pending_removal.is_none())
            .map(|(id, _)| id)
            .collect();
        for id in to_remove {
            self.mark_removed(id);
        }

        let to_render: Vec<TileId> = self
            .filtered
            .iter()
            .copied()
            .filter(|&id| self.store.get(id).is_some_and(|e| !e.rendered))
            .collect();
        for &id in &to_render {
            self.mark_rendered(id);
        }
        to_render
    }

    /// Virtual reconciliation: plan the window move, then bring the
    /// materialized tile set in line with it. Returns the newly
    /// materialized tiles.
    fn render_view_range(&mut self) -> Result<Vec<TileId>> {
        let row_count = self.row_count_internal();
        let target = self.scroller.current_view_range(row_count, &self.host);
        let rendered = match self.scroller.plan_view_range(target, row_count, &self.host)? {
            None => {
                // Window unchanged; its contents may still have changed.
                self.sync_tiles_to_range(target)
            }
            Some(plan) => {
                let rendered = self.sync_tiles_to_range(plan.target);
                self.host
                    .set_filler_heights(plan.filler_before, plan.filler_after);
                self.scroller.commit(plan.target);
                if plan.target != self.last_view_range {
                    self.last_view_range = plan.target;
                    tracing::trace!(
                        target: "sightline::grid",
                        range = %plan.target,
                        "view range moved"
                    );
                    self.signals.view_range_changed.emit(plan.target);
                }
                rendered
            }
        };
        Ok(rendered)
    }

    /// Removes rendered tiles outside the window, then renders missing ones
    /// inside it, in row order. Removes always precede renders so the host
    /// never holds more tiles than the window plus one delta. Returns the
    /// newly materialized tiles.
    fn sync_tiles_to_range(&mut self, range: RowRange) -> Vec<TileId> {
        let cols = self.column_count.max(1);
        let lo = (range.from * cols).min(self.filtered.len());
        let hi = (range.to * cols).min(self.filtered.len());
        let desired: HashSet<TileId> = self.filtered[lo..hi].iter().copied().collect();

        let strays: Vec<TileId> = self
            .store
            .iter()
            .filter(|&(id, e)| e.rendered && e.pending_removal.is_none() && !desired.contains(&id))
            .map(|(id, _)| id)
            .collect();
        for id in strays {
            self.mark_removed(id);
        }

        let missing: Vec<TileId> = self.filtered[lo..hi]
            .iter()
            .copied()
            .filter(|&id| self.store.get(id).is_some_and(|e| !e.rendered))
            .collect();
        for &id in &missing {
            self.mark_rendered(id);
        }
        missing
    }

    fn mark_rendered(&mut self, id: TileId) {
        if let Some(entry) = self.store.get_mut(id) {
            entry.rendered = true;
        }
        self.host.render(id);
    }

    fn mark_removed(&mut self, id: TileId) {
        if let Some(entry) = self.store.get_mut(id) {
            entry.rendered = false;
        }
        self.host.remove(id);
    }
}
