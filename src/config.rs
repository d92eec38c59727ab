//! Fixed board dimensions and per-search tuning.

use derive_new::new;

/// Rows on the standard board.
pub const ROWS: usize = 40;
/// Columns on the standard board.
pub const COLUMNS: usize = 50;
/// Side length of one square cell, in pixels.
pub const CELL_SIZE: u32 = 15;
/// Pixel offset of the board's top-left corner.
pub const GRID_ORIGIN_X: i32 = 0;
pub const GRID_ORIGIN_Y: i32 = 0;

/// Limits applied to a single search run.
///
/// The default places no limit on the run; it ends when the goal is popped or the frontier
/// empties.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, new)]
pub struct SearchConfig {
    /// Stop with [`crate::Outcome::BudgetExceeded`] after this many expansions.
    pub max_expansions: Option<usize>,
}

impl SearchConfig {
    pub fn with_max_expansions(max_expansions: usize) -> Self {
        Self::new(Some(max_expansions))
    }
}
