use std::fmt::{Display, Formatter};

use derive_new::new;
use serde::{Deserialize, Serialize};

pub mod config;
mod grid;
mod route;
mod search;

pub use config::SearchConfig;
pub use grid::{Cell, Grid, GridError};
pub use route::{reconstruct, Route};
pub use search::{find_path, find_path_with, Found, Outcome, Search, SearchError, SearchStats, Step};

/// A `(row, col)` address inside a [`Grid`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, new)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Straight-line distance over `(col, row)`. Orthogonal steps cost 1, diagonal steps √2.
pub fn euclidean(a: &Position, b: &Position) -> f64 {
    let dx = a.col as f64 - b.col as f64;
    let dy = a.row as f64 - b.row as f64;
    (dx * dx + dy * dy).sqrt()
}

fn heuristic(a: &Position, b: &Position) -> f64 {
    euclidean(a, b)
}

/// Keeps only the first cell, the cells where the direction of travel changes, and the last cell.
pub fn minify_path(path: Vec<Position>) -> Vec<Position> {
    let mut iter = path.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut minified = vec![first];
    let mut prev = first;
    let mut heading = None;
    for curr in iter {
        let step = direction(&prev, &curr);
        if heading.is_some_and(|h| h != step) {
            minified.push(prev);
        }
        heading = Some(step);
        prev = curr;
    }

    if minified.last() != Some(&prev) {
        minified.push(prev);
    }
    minified
}

fn direction(from: &Position, to: &Position) -> (isize, isize) {
    (
        to.row as isize - from.row as isize,
        to.col as isize - from.col as isize,
    )
}
