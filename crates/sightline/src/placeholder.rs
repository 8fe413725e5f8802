//! Placeholder filler arithmetic.
//!
//! Placeholders pad the trailing grid row so a fixed column count is always
//! satisfied. They live only at the tail of the raw order and never take
//! part in filtering, selection or sorting. Demand is computed from the raw
//! real-tile count: padding reflects collection geometry, never transient
//! filter state.

/// Returns how many placeholders are needed to complete the last row.
///
/// Zero when the last row is already full, when the grid is empty, or when
/// `column_count` is zero.
pub fn placeholders_needed(real_count: usize, column_count: usize) -> usize {
    if column_count == 0 || real_count == 0 {
        return 0;
    }
    let last_offset = (real_count - 1) % column_count;
    column_count - 1 - last_offset
}

/// Returns how many trailing placeholders are obsolete.
///
/// A placeholder at column offset 0 starts a row containing no real tiles;
/// a row cannot be padding-only except past the true tail, so that
/// placeholder and everything after it must go. Given `trailing` existing
/// placeholders behind `real_count` real tiles, this is simply the excess
/// over the current demand.
pub fn obsolete_placeholders(real_count: usize, trailing: usize, column_count: usize) -> usize {
    trailing.saturating_sub(placeholders_needed(real_count, column_count))
}
