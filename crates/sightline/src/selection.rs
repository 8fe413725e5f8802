//! Selection state for tile grids.
//!
//! [`Selection`] tracks which tiles are selected and which tile holds the
//! keyboard-navigation focus. It enforces the selection policy (none /
//! single / multi) and is reconciled against every filter pass so that the
//! visibility invariant holds: a selected tile is always filter-accepted.
//!
//! The grid clamps selection *candidates* before they reach this type
//! (hidden, unselectable and placeholder tiles never get here), so the
//! policy enforced here is purely about cardinality and idempotence.
//!
//! # Signals
//!
//! - `selection_changed`: emitted with `(selected, deselected)` tile IDs
//! - `focus_changed`: emitted with `(new, old)` focused tile

use std::collections::HashSet;

use sightline_core::Signal;

use crate::tile::TileId;

/// Selection policy for a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// No tiles can be selected.
    NoSelection,
    /// At most one tile can be selected (default).
    #[default]
    SingleSelection,
    /// Any number of tiles can be selected.
    MultiSelection,
}

/// Manages selection and focus state for a grid.
pub struct Selection {
    mode: SelectionMode,

    /// Set of selected IDs for O(1) membership checks.
    selected_ids: HashSet<TileId>,

    /// Selected tiles in selection order.
    selected: Vec<TileId>,

    /// The tile holding keyboard focus, if any.
    focused: Option<TileId>,

    /// Emitted when selection changes. Args: (selected, deselected)
    pub selection_changed: Signal<(Vec<TileId>, Vec<TileId>)>,

    /// Emitted when the focused tile changes. Args: (new, old)
    pub focus_changed: Signal<(Option<TileId>, Option<TileId>)>,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    /// Creates an empty selection with the default (single) policy.
    pub fn new() -> Self {
        Self {
            mode: SelectionMode::default(),
            selected_ids: HashSet::new(),
            selected: Vec::new(),
            focused: None,
            selection_changed: Signal::new(),
            focus_changed: Signal::new(),
        }
    }

    /// Returns the current selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Sets the selection mode.
    ///
    /// Changing the mode does not clip an existing selection; the next
    /// selection operation applies the new policy.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
    }

    /// Checks whether a tile is selected.
    pub fn is_selected(&self, id: TileId) -> bool {
        self.selected_ids.contains(&id)
    }

    /// Returns `true` if any tile is selected.
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Returns the number of selected tiles.
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Returns the selected tiles in selection order.
    pub fn selected_tiles(&self) -> &[TileId] {
        &self.selected
    }

    /// Returns the focused tile, if any.
    pub fn focused_tile(&self) -> Option<TileId> {
        self.focused
    }

    /// Moves keyboard focus, emitting `focus_changed` on change.
    pub fn set_focused_tile(&mut self, tile: Option<TileId>) {
        if self.focused != tile {
            let old = std::mem::replace(&mut self.focused, tile);
            self.focus_changed.emit((tile, old));
        }
    }

    /// Replaces the selection with the given candidates.
    ///
    /// Candidates must already be visible and selectable; this method only
    /// applies the cardinality policy (empty under `NoSelection`, first
    /// candidate under `SingleSelection`) and deduplicates by identity while
    /// preserving order.
    ///
    /// Idempotent: if the resulting set equals the current selection
    /// (regardless of order), nothing is mutated and no signal is emitted.
    /// Returns `true` if the selection changed.
    pub fn replace(&mut self, candidates: Vec<TileId>) -> bool {
        let mut next: Vec<TileId> = Vec::new();
        let mut next_ids: HashSet<TileId> = HashSet::new();

        for id in candidates {
            if next_ids.insert(id) {
                next.push(id);
            }
        }

        match self.mode {
            SelectionMode::NoSelection => {
                next.clear();
                next_ids.clear();
            }
            SelectionMode::SingleSelection => {
                next.truncate(1);
                next_ids = next.iter().copied().collect();
            }
            SelectionMode::MultiSelection => {}
        }

        if next_ids == self.selected_ids {
            return false;
        }

        let newly_selected: Vec<TileId> = next
            .iter()
            .copied()
            .filter(|id| !self.selected_ids.contains(id))
            .collect();
        let newly_deselected: Vec<TileId> = self
            .selected
            .iter()
            .copied()
            .filter(|id| !next_ids.contains(id))
            .collect();

        self.selected = next;
        self.selected_ids = next_ids;

        tracing::debug!(
            target: "sightline::selection",
            selected = newly_selected.len(),
            deselected = newly_deselected.len(),
            total = self.selected.len(),
            "selection replaced"
        );
        self.selection_changed
            .emit((newly_selected, newly_deselected));
        true
    }

    /// Removes the given tiles from the selection.
    ///
    /// Tiles that are not selected are ignored. Returns `true` if the
    /// selection changed.
    pub fn deselect(&mut self, ids: &[TileId]) -> bool {
        let removed: Vec<TileId> = ids
            .iter()
            .copied()
            .filter(|id| self.selected_ids.remove(id))
            .collect();

        if removed.is_empty() {
            return false;
        }

        self.selected.retain(|id| self.selected_ids.contains(id));
        self.selection_changed.emit((Vec::new(), removed));
        true
    }

    /// Clears the selection entirely.
    pub fn deselect_all(&mut self) -> bool {
        if self.selected.is_empty() {
            return false;
        }
        let removed = std::mem::take(&mut self.selected);
        self.selected_ids.clear();
        self.selection_changed.emit((Vec::new(), removed));
        true
    }

    /// Reconciles the selection after a filter pass.
    ///
    /// Every selected tile that just became hidden is deselected; the rest
    /// of the selection is untouched. Focus is cleared if the focused tile
    /// was hidden. Returns `true` if the selection changed.
    pub fn reconcile_hidden(&mut self, newly_hidden: &[TileId]) -> bool {
        if let Some(focused) = self.focused {
            if newly_hidden.contains(&focused) {
                self.set_focused_tile(None);
            }
        }
        self.deselect(newly_hidden)
    }

    /// Drops deleted tiles from selection and focus.
    pub fn handle_deleted(&mut self, deleted: &[TileId]) -> bool {
        if let Some(focused) = self.focused {
            if deleted.contains(&focused) {
                self.set_focused_tile(None);
            }
        }
        self.deselect(deleted)
    }

    /// Resets selection and focus without emitting signals.
    ///
    /// Used when the whole collection is torn down; per-tile notification
    /// would be noise at that point.
    pub fn reset(&mut self) {
        self.selected.clear();
        self.selected_ids.clear();
        self.focused = None;
    }
}
