use log::debug;
use serde::Serialize;

use crate::{Found, Grid, Position, SearchError};

/// A reconstructed start-to-goal route, both endpoints included.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    cells: Vec<Position>,
    cost: f64,
}

impl Route {
    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    /// The cells strictly between start and goal.
    pub fn interior(&self) -> &[Position] {
        match self.cells.len() {
            0..=2 => &[],
            len => &self.cells[1..len - 1],
        }
    }

    /// Movement cost from start to goal.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn into_cells(self) -> Vec<Position> {
        self.cells
    }
}

/**
 * Returns the route from start to goal, inclusive of both, by walking the parent links written
 * by the run that produced `found`.
 * Err if the grid has been searched again or edited since, or if the parent chain does not
 * reach the start within one step per cell.
 */
pub fn reconstruct(grid: &Grid, found: &Found) -> Result<Route, SearchError> {
    if found.epoch != grid.epoch {
        return Err(SearchError::StaleWitness);
    }

    let broken = SearchError::BrokenParentChain {
        start: found.start,
        end: found.end,
    };

    let mut cells = vec![found.end];
    let mut curr = found.end;
    while curr != found.start {
        if cells.len() >= grid.cell_count() {
            return Err(broken);
        }

        curr = grid.cell(&curr).parent().ok_or(broken)?;
        cells.push(curr);
    }

    cells.reverse();
    let cost = grid.cell(&found.end).g_score();
    debug!("route {} cells, cost {:.3}", cells.len(), cost);

    Ok(Route { cells, cost })
}
