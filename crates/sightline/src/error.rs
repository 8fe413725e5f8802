//! Error types for the collection-view engine.

use crate::range::RowRange;

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors that can occur in the collection-view engine.
///
/// Everything here is an internal-consistency failure. Benign conditions
/// (deleting a tile that is not in the grid, selecting while selection is
/// disabled, setting the same tile set twice) are handled as silent no-ops
/// and never surface as errors.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A view-range delta would split the rendered range into two disjoint
    /// pieces while the ranges overlap.
    ///
    /// During normal scrolling the materialized range only ever grows or
    /// shrinks at one end, so a two-piece subtract means the controller was
    /// driven with an impossible range transition. Rendering only one piece
    /// would permanently desynchronize the materialized rows from the
    /// logical rows, so this fails loudly instead.
    #[error(
        "non-contiguous view-range delta: rendered {rendered} and requested {requested} \
         overlap but their difference is two disjoint pieces"
    )]
    DisjointRangeDelta {
        /// The range materialized before the operation.
        rendered: RowRange,
        /// The range the controller was asked to materialize.
        requested: RowRange,
    },
}
