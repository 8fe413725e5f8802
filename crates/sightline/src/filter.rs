//! Filter chain: keyed predicates whose logical AND decides tile visibility.
//!
//! Filters are stateless with respect to the grid: their verdict depends
//! only on the item and whatever external state the filter itself carries
//! (e.g. a search string). The chain writes each tile's `filter_accepted`
//! flag during [`FilterChain::apply`] and reports the symmetric difference
//! against the previous pass as a [`FilterDelta`], which downstream code
//! uses for minimal render/remove work and selection reconciliation.
//!
//! Placeholders never participate: they are skipped during evaluation and
//! always accepted, so business filtering cannot disturb layout padding.

use crate::tile::{TileId, TileStore};

/// A visibility predicate over application items.
///
/// The key identifies the filter within the chain so it can be replaced or
/// removed without holding a reference to the original object.
pub trait TileFilter<T>: Send + Sync {
    /// Identity key used for add/remove/replace within the chain.
    fn key(&self) -> &str;

    /// Returns `true` if the item should be visible.
    fn accept(&self, item: &T) -> bool;
}

/// A [`TileFilter`] built from a closure.
///
/// # Example
///
/// ```
/// use sightline::ClosureFilter;
///
/// let min_len = ClosureFilter::new("min-len", |s: &String| s.len() >= 3);
/// ```
pub struct ClosureFilter<T> {
    key: String,
    predicate: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> ClosureFilter<T> {
    /// Creates a filter from a key and a predicate closure.
    pub fn new<F>(key: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            predicate: Box::new(predicate),
        }
    }
}

impl<T> TileFilter<T> for ClosureFilter<T> {
    fn key(&self) -> &str {
        &self.key
    }

    fn accept(&self, item: &T) -> bool {
        (self.predicate)(item)
    }
}

/// Visibility changes produced by one filter pass.
#[derive(Debug, Default)]
pub struct FilterDelta {
    /// Tiles accepted now but rejected by the previous pass.
    pub newly_shown: Vec<TileId>,
    /// Tiles rejected now but accepted by the previous pass.
    pub newly_hidden: Vec<TileId>,
}

impl FilterDelta {
    /// Returns `true` if the pass changed nothing.
    pub fn is_empty(&self) -> bool {
        self.newly_shown.is_empty() && self.newly_hidden.is_empty()
    }
}

/// Ordered set of filters combined with logical AND.
pub struct FilterChain<T> {
    filters: Vec<Box<dyn TileFilter<T>>>,
}

impl<T> FilterChain<T> {
    /// Creates an empty chain (everything accepted).
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Replaces the active filter set.
    pub fn set_filters(&mut self, filters: Vec<Box<dyn TileFilter<T>>>) {
        self.filters = filters;
    }

    /// Adds a filter, replacing any existing filter with the same key.
    pub fn add_filter(&mut self, filter: Box<dyn TileFilter<T>>) {
        if let Some(existing) = self
            .filters
            .iter_mut()
            .find(|f| f.key() == filter.key())
        {
            *existing = filter;
        } else {
            self.filters.push(filter);
        }
    }

    /// Removes the filter with the given key.
    ///
    /// Returns `true` if a filter was removed.
    pub fn remove_filter(&mut self, key: &str) -> bool {
        let before = self.filters.len();
        self.filters.retain(|f| f.key() != key);
        self.filters.len() != before
    }

    /// Returns `true` if a filter with the given key is active.
    pub fn has_filter(&self, key: &str) -> bool {
        self.filters.iter().any(|f| f.key() == key)
    }

    /// Returns the number of active filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if no filters are active.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Evaluates the chain against a single item: all filters must accept.
    pub fn accepts(&self, item: &T) -> bool {
        self.filters.iter().all(|f| f.accept(item))
    }

    /// Re-evaluates every filter against every tile in collection order.
    ///
    /// Writes each tile's `filter_accepted` flag and returns the tiles whose
    /// visibility changed relative to the previous pass. Placeholders are
    /// excluded from evaluation entirely and forced accepted.
    pub(crate) fn apply(&self, store: &mut TileStore<T>, order: &[TileId]) -> FilterDelta {
        let mut delta = FilterDelta::default();

        for &id in order {
            let Some(entry) = store.get_mut(id) else {
                continue;
            };

            let accepted = match entry.tile().item() {
                Some(item) => self.accepts(item),
                None => true,
            };

            if accepted != entry.accepted {
                entry.accepted = accepted;
                if accepted {
                    delta.newly_shown.push(id);
                } else {
                    delta.newly_hidden.push(id);
                }
            }
        }

        tracing::debug!(
            target: "sightline::filter",
            filters = self.filters.len(),
            shown = delta.newly_shown.len(),
            hidden = delta.newly_hidden.len(),
            "filter pass"
        );

        delta
    }
}

impl<T> Default for FilterChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileEntry;

    fn store_with(items: &[i32]) -> (TileStore<i32>, Vec<TileId>) {
        let mut store = TileStore::new();
        let order = items
            .iter()
            .map(|&i| store.insert(TileEntry::new_item(i, true)))
            .collect();
        (store, order)
    }

    #[test]
    fn test_empty_chain_accepts_everything() {
        let (mut store, order) = store_with(&[1, 2, 3]);
        let chain = FilterChain::new();

        let delta = chain.apply(&mut store, &order);
        assert!(delta.is_empty());
        assert!(order.iter().all(|&id| store.is_accepted(id)));
    }

    #[test]
    fn test_filters_and_together() {
        let (mut store, order) = store_with(&[1, 2, 3, 4, 5, 6]);
        let mut chain = FilterChain::new();
        chain.add_filter(Box::new(ClosureFilter::new("even", |i: &i32| i % 2 == 0)));
        chain.add_filter(Box::new(ClosureFilter::new("small", |i: &i32| *i < 5)));

        let delta = chain.apply(&mut store, &order);
        // Only 2 and 4 pass both filters.
        assert_eq!(delta.newly_hidden.len(), 4);
        assert!(delta.newly_shown.is_empty());
        assert!(store.is_accepted(order[1]));
        assert!(store.is_accepted(order[3]));
        assert!(!store.is_accepted(order[4]));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let (mut store, order) = store_with(&[1, 2, 3]);
        let mut chain = FilterChain::new();
        chain.add_filter(Box::new(ClosureFilter::new("odd", |i: &i32| i % 2 == 1)));

        let first = chain.apply(&mut store, &order);
        assert_eq!(first.newly_hidden, vec![order[1]]);

        // Same chain, no mutation in between: no deltas.
        let second = chain.apply(&mut store, &order);
        assert!(second.is_empty());
    }

    #[test]
    fn test_delta_reports_both_directions() {
        let (mut store, order) = store_with(&[1, 2, 3]);
        let mut chain = FilterChain::new();
        chain.add_filter(Box::new(ClosureFilter::new("odd", |i: &i32| i % 2 == 1)));
        chain.apply(&mut store, &order);

        // Flip the criterion: odd tiles hide, even tiles show.
        chain.add_filter(Box::new(ClosureFilter::new("odd", |i: &i32| i % 2 == 0)));
        let delta = chain.apply(&mut store, &order);
        assert_eq!(delta.newly_shown, vec![order[1]]);
        assert_eq!(delta.newly_hidden, vec![order[0], order[2]]);
    }

    #[test]
    fn test_placeholders_skip_evaluation() {
        let mut store = TileStore::new();
        let item = store.insert(TileEntry::new_item(1, true));
        let pad = store.insert(TileEntry::new_placeholder());
        let order = vec![item, pad];

        let mut chain = FilterChain::new();
        chain.add_filter(Box::new(ClosureFilter::new("none", |_: &i32| false)));

        let delta = chain.apply(&mut store, &order);
        assert_eq!(delta.newly_hidden, vec![item]);
        // The reject-everything filter never sees the placeholder.
        assert!(store.is_accepted(pad));
    }

    #[test]
    fn test_add_filter_replaces_by_key() {
        let mut chain: FilterChain<i32> = FilterChain::new();
        chain.add_filter(Box::new(ClosureFilter::new("k", |_: &i32| true)));
        chain.add_filter(Box::new(ClosureFilter::new("k", |_: &i32| false)));

        assert_eq!(chain.len(), 1);
        assert!(!chain.accepts(&1));
    }

    #[test]
    fn test_remove_filter_by_key() {
        let mut chain: FilterChain<i32> = FilterChain::new();
        chain.add_filter(Box::new(ClosureFilter::new("k", |_: &i32| false)));

        assert!(chain.remove_filter("k"));
        assert!(!chain.remove_filter("k"));
        assert!(chain.accepts(&1));
    }
}
