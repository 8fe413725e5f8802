//! Tile identity and engine-owned per-tile state.
//!
//! Application items are opaque to the engine. Each inserted item gets a
//! stable [`TileId`] and an engine-owned [`TileEntry`] record holding the
//! state the engine needs to track for it (filter acceptance, rendering,
//! pending removal, grid position). The application's value is never
//! mutated; all bookkeeping lives in the entry, keyed by identity.
//!
//! A tile is either a real item or a [placeholder](Tile::Placeholder) — a
//! synthetic filler with no business identity, used only to pad the trailing
//! grid row. The tagged union makes placeholder handling exhaustive at
//! compile time: there is no runtime type inspection anywhere in the engine.

use sightline_core::TransitionId;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable identity of a tile within one grid.
    ///
    /// IDs are never reused while the entry is alive; a deleted tile's ID
    /// becomes invalid once its removal transition (if any) completes.
    pub struct TileId;
}

/// A tile payload: an application item or a synthetic placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tile<T> {
    /// A real, application-supplied item.
    Item(T),
    /// Trailing-row filler. Never selected, never filtered, never sorted.
    Placeholder,
}

impl<T> Tile<T> {
    /// Returns `true` for placeholder tiles.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Tile::Placeholder)
    }

    /// Returns the application item, or `None` for placeholders.
    pub fn item(&self) -> Option<&T> {
        match self {
            Tile::Item(item) => Some(item),
            Tile::Placeholder => None,
        }
    }
}

/// Logical grid position in column/row units (not pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    /// Column offset within the row.
    pub x: usize,
    /// Row index.
    pub y: usize,
    /// Width in columns.
    pub width: usize,
    /// Height in rows.
    pub height: usize,
}

impl Default for GridPosition {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 1,
            height: 1,
        }
    }
}

/// Engine-owned state record for one tile.
#[derive(Debug)]
pub struct TileEntry<T> {
    tile: Tile<T>,
    pub(crate) selectable: bool,
    /// Result of the last filter evaluation. The single source of truth for
    /// "is this tile currently visible"; selection and rendering consult it
    /// in O(1) instead of re-running filters.
    pub(crate) accepted: bool,
    /// Whether the host currently holds a rendered representation.
    pub(crate) rendered: bool,
    /// Set while a removal transition is in flight. The completion handler
    /// checks this before tearing down: a revived tile clears it.
    pub(crate) pending_removal: Option<TransitionId>,
    pub(crate) position: GridPosition,
}

impl<T> TileEntry<T> {
    pub(crate) fn new_item(item: T, selectable: bool) -> Self {
        Self {
            tile: Tile::Item(item),
            selectable,
            accepted: true,
            rendered: false,
            pending_removal: None,
            position: GridPosition::default(),
        }
    }

    pub(crate) fn new_placeholder() -> Self {
        Self {
            tile: Tile::Placeholder,
            selectable: false,
            accepted: true,
            rendered: false,
            pending_removal: None,
            position: GridPosition::default(),
        }
    }

    /// Returns the tile payload.
    pub fn tile(&self) -> &Tile<T> {
        &self.tile
    }

    /// Returns the application item, or `None` for placeholders.
    pub fn item(&self) -> Option<&T> {
        self.tile.item()
    }

    /// Returns `true` for placeholder tiles.
    pub fn is_placeholder(&self) -> bool {
        self.tile.is_placeholder()
    }

    /// Returns `true` if this tile may be selected.
    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    /// Returns the result of the last filter evaluation.
    pub fn is_filter_accepted(&self) -> bool {
        self.accepted
    }

    /// Returns `true` if the host currently renders this tile.
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    /// Returns `true` while a removal transition is in flight.
    pub fn is_removal_pending(&self) -> bool {
        self.pending_removal.is_some()
    }

    /// Returns the tile's logical grid position.
    pub fn position(&self) -> GridPosition {
        self.position
    }
}

/// Identity-keyed storage for tile entries.
#[derive(Debug)]
pub struct TileStore<T> {
    entries: SlotMap<TileId, TileEntry<T>>,
}

impl<T> TileStore<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
        }
    }

    pub(crate) fn insert(&mut self, entry: TileEntry<T>) -> TileId {
        self.entries.insert(entry)
    }

    pub(crate) fn remove(&mut self, id: TileId) -> Option<TileEntry<T>> {
        self.entries.remove(id)
    }

    pub(crate) fn get_mut(&mut self, id: TileId) -> Option<&mut TileEntry<T>> {
        self.entries.get_mut(id)
    }

    /// Returns the entry for `id`, if the tile is alive.
    pub fn get(&self, id: TileId) -> Option<&TileEntry<T>> {
        self.entries.get(id)
    }

    /// Returns `true` if the tile is alive (including pending removal).
    pub fn contains(&self, id: TileId) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns the number of alive entries (including pending removals).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (TileId, &TileEntry<T>)> {
        self.entries.iter()
    }

    pub(crate) fn is_placeholder(&self, id: TileId) -> bool {
        self.get(id).is_some_and(|e| e.is_placeholder())
    }

    pub(crate) fn is_accepted(&self, id: TileId) -> bool {
        self.get(id).is_some_and(|e| e.accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_entry_defaults() {
        let mut store = TileStore::new();
        let id = store.insert(TileEntry::new_item("a", true));

        let entry = store.get(id).unwrap();
        assert_eq!(entry.item(), Some(&"a"));
        assert!(entry.is_selectable());
        assert!(entry.is_filter_accepted());
        assert!(!entry.is_rendered());
        assert!(!entry.is_removal_pending());
        assert_eq!(entry.position(), GridPosition::default());
    }

    #[test]
    fn test_placeholder_entry() {
        let mut store = TileStore::<&str>::new();
        let id = store.insert(TileEntry::new_placeholder());

        let entry = store.get(id).unwrap();
        assert!(entry.is_placeholder());
        assert!(entry.item().is_none());
        assert!(!entry.is_selectable());
        // Placeholders are implicitly filter-accepted.
        assert!(entry.is_filter_accepted());
    }

    #[test]
    fn test_identity_survives_other_removals() {
        let mut store = TileStore::new();
        let a = store.insert(TileEntry::new_item(1, true));
        let b = store.insert(TileEntry::new_item(2, true));

        store.remove(a);
        assert!(!store.contains(a));
        assert!(store.contains(b));
        assert_eq!(store.get(b).unwrap().item(), Some(&2));
    }
}
