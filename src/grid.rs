use derive_more::Display;

use crate::config::{CELL_SIZE, COLUMNS, GRID_ORIGIN_X, GRID_ORIGIN_Y, ROWS};
use crate::Position;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[display(fmt = "Grid dimensions must be positive, got {}x{}", rows, columns)]
    EmptyDimensions { rows: usize, columns: usize },
    #[display(fmt = "Cell ({},{}) out of range", row, col)]
    OutOfRange { row: usize, col: usize },
    #[display(fmt = "Pixel ({},{}) is outside the grid", x, y)]
    PixelOutOfRange { x: i32, y: i32 },
}

impl std::error::Error for GridError {}

/// One square of the grid together with the bookkeeping of the last search run.
#[derive(Clone, Debug)]
pub struct Cell {
    pub(crate) position: Position,
    pub(crate) passable: bool,
    pub(crate) visited: bool,
    pub(crate) parent: Option<Position>,
    pub(crate) g_score: f64,
    pub(crate) f_score: f64,
    pub(crate) neighbors: Vec<Position>,
}

impl Cell {
    fn new(position: Position) -> Self {
        Self {
            position,
            passable: true,
            visited: false,
            parent: None,
            g_score: 0.0,
            f_score: f64::INFINITY,
            neighbors: Vec::new(),
        }
    }

    fn reset_search_state(&mut self) {
        self.visited = false;
        self.parent = None;
        self.g_score = 0.0;
        self.f_score = f64::INFINITY;
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn row(&self) -> usize {
        self.position.row
    }

    pub fn col(&self) -> usize {
        self.position.col
    }

    pub fn is_passable(&self) -> bool {
        self.passable
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    /// The cell this one was best reached from in the last search run.
    pub fn parent(&self) -> Option<Position> {
        self.parent
    }

    pub fn g_score(&self) -> f64 {
        self.g_score
    }

    pub fn f_score(&self) -> f64 {
        self.f_score
    }

    /// Passable neighbors as of the last [`Grid::compute_adjacency`].
    pub fn neighbors(&self) -> &[Position] {
        &self.neighbors
    }
}

/// A fixed `rows x columns` board of [`Cell`]s stored row-major.
///
/// Neighbor lists are a snapshot: after toggling passability, call
/// [`Grid::compute_adjacency`] again before the next search.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: usize,
    columns: usize,
    pub(crate) cells: Vec<Cell>,
    adjacency_current: bool,
    // Bumped whenever per-run state or passability changes, so a `Found` from an earlier run
    // can be told apart from the current one.
    pub(crate) epoch: u64,
}

impl Default for Grid {
    /// The standard `ROWS x COLUMNS` board.
    fn default() -> Self {
        Self::allocate(ROWS, COLUMNS)
    }
}

impl Grid {
    pub fn build(rows: usize, columns: usize) -> Result<Self, GridError> {
        if rows == 0 || columns == 0 {
            return Err(GridError::EmptyDimensions { rows, columns });
        }
        Ok(Self::allocate(rows, columns))
    }

    fn allocate(rows: usize, columns: usize) -> Self {
        let cells = (0..rows)
            .flat_map(|row| (0..columns).map(move |col| Cell::new(Position::new(row, col))))
            .collect();

        Self {
            rows,
            columns,
            cells,
            adjacency_current: false,
            epoch: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Result<&Cell, GridError> {
        if !self.in_bounds(row, col) {
            return Err(GridError::OutOfRange { row, col });
        }
        Ok(&self.cells[row * self.columns + col])
    }

    pub fn set_passable(&mut self, row: usize, col: usize, passable: bool) -> Result<(), GridError> {
        if !self.in_bounds(row, col) {
            return Err(GridError::OutOfRange { row, col });
        }

        let idx = row * self.columns + col;
        if self.cells[idx].passable != passable {
            self.cells[idx].passable = passable;
            self.adjacency_current = false;
            self.epoch += 1;
        }
        Ok(())
    }

    /// Makes every cell passable again.
    pub fn clear_obstacles(&mut self) {
        let mut changed = false;
        for cell in self.cells.iter_mut().filter(|cell| !cell.passable) {
            cell.passable = true;
            changed = true;
        }

        if changed {
            self.adjacency_current = false;
            self.epoch += 1;
        }
    }

    /// Rebuilds every cell's neighbor list from the current passability flags.
    pub fn compute_adjacency(&mut self) {
        for idx in 0..self.cells.len() {
            let Position { row, col } = self.cells[idx].position;

            let mut neighbors = Vec::with_capacity(8);
            for dr in -1..=1isize {
                for dc in -1..=1isize {
                    if dr == 0 && dc == 0 {
                        continue;
                    }

                    let (Some(adj_row), Some(adj_col)) =
                        (row.checked_add_signed(dr), col.checked_add_signed(dc))
                    else {
                        continue;
                    };

                    if self.in_bounds(adj_row, adj_col)
                        && self.cells[adj_row * self.columns + adj_col].passable
                    {
                        neighbors.push(Position::new(adj_row, adj_col));
                    }
                }
            }

            self.cells[idx].neighbors = neighbors;
        }

        self.adjacency_current = true;
    }

    pub fn is_adjacency_current(&self) -> bool {
        self.adjacency_current
    }

    /// Clears `visited`, `parent` and both scores on every cell.
    pub fn reset_search_state(&mut self) {
        for cell in &mut self.cells {
            cell.reset_search_state();
        }
        self.epoch += 1;
    }

    /// Maps a pixel on the rendered board to the cell underneath it.
    pub fn position_at_pixel(&self, x: i32, y: i32) -> Result<Position, GridError> {
        let (dx, dy) = (x - GRID_ORIGIN_X, y - GRID_ORIGIN_Y);
        if dx < 0 || dy < 0 {
            return Err(GridError::PixelOutOfRange { x, y });
        }

        let col = (dx as u32 / CELL_SIZE) as usize;
        let row = (dy as u32 / CELL_SIZE) as usize;
        if !self.in_bounds(row, col) {
            return Err(GridError::PixelOutOfRange { x, y });
        }
        Ok(Position::new(row, col))
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.in_bounds(position.row, position.col)
    }

    fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.columns
    }

    pub(crate) fn index(&self, position: &Position) -> usize {
        position.row * self.columns + position.col
    }

    pub(crate) fn cell(&self, position: &Position) -> &Cell {
        &self.cells[self.index(position)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbors_of(grid: &Grid, row: usize, col: usize) -> Vec<(usize, usize)> {
        grid.cell_at(row, col)
            .unwrap()
            .neighbors()
            .iter()
            .map(|p| (p.row, p.col))
            .collect()
    }

    #[test]
    fn test_build() {
        let grid = Grid::build(3, 4).unwrap();
        assert_eq!(grid.cell_count(), 12);
        assert!(!grid.is_adjacency_current());

        for cell in grid.cells() {
            assert!(cell.is_passable());
            assert!(!cell.is_visited());
            assert_eq!(cell.parent(), None);
            assert_eq!(cell.g_score(), 0.0);
            assert_eq!(cell.f_score(), f64::INFINITY);
            assert!(cell.neighbors().is_empty());
        }

        let cell = grid.cell_at(2, 3).unwrap();
        assert_eq!((cell.row(), cell.col()), (2, 3));
    }

    #[test]
    fn test_build_empty() {
        assert_eq!(
            Grid::build(0, 5).unwrap_err(),
            GridError::EmptyDimensions { rows: 0, columns: 5 }
        );
        assert!(Grid::build(5, 0).is_err());
    }

    #[test]
    fn test_default_board() {
        let grid = Grid::default();
        assert_eq!(grid.rows(), ROWS);
        assert_eq!(grid.columns(), COLUMNS);
    }

    #[test]
    fn test_cell_at_out_of_range() {
        let grid = Grid::build(3, 4).unwrap();
        assert_eq!(
            grid.cell_at(3, 0).unwrap_err(),
            GridError::OutOfRange { row: 3, col: 0 }
        );
        assert!(grid.cell_at(0, 4).is_err());
    }

    #[test]
    fn test_adjacency_open() {
        let mut grid = Grid::build(3, 3).unwrap();
        grid.compute_adjacency();

        assert_eq!(
            neighbors_of(&grid, 1, 1),
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1), (2, 2)]
        );
        assert_eq!(neighbors_of(&grid, 0, 0), vec![(0, 1), (1, 0), (1, 1)]);
        assert_eq!(neighbors_of(&grid, 2, 1), vec![(1, 0), (1, 1), (1, 2), (2, 0), (2, 2)]);
    }

    #[test]
    fn test_adjacency_skips_obstacles() {
        let mut grid = Grid::build(3, 3).unwrap();
        grid.set_passable(1, 1, false).unwrap();
        grid.compute_adjacency();

        assert_eq!(neighbors_of(&grid, 0, 0), vec![(0, 1), (1, 0)]);
        for cell in grid.cells() {
            assert!(!cell.neighbors().contains(&Position::new(1, 1)));
            assert!(!cell.neighbors().contains(&cell.position()));
        }
        // an obstacle still lists its passable neighbors
        assert_eq!(neighbors_of(&grid, 1, 1).len(), 8);
    }

    #[test]
    fn test_adjacency_is_a_snapshot() {
        let mut grid = Grid::build(2, 2).unwrap();
        grid.compute_adjacency();
        assert!(grid.is_adjacency_current());

        grid.set_passable(1, 1, false).unwrap();
        assert!(!grid.is_adjacency_current());
        assert_eq!(neighbors_of(&grid, 0, 0), vec![(0, 1), (1, 0), (1, 1)]);

        grid.compute_adjacency();
        assert_eq!(neighbors_of(&grid, 0, 0), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_set_passable_same_value_keeps_adjacency() {
        let mut grid = Grid::build(2, 2).unwrap();
        grid.compute_adjacency();
        grid.set_passable(0, 0, true).unwrap();
        assert!(grid.is_adjacency_current());
    }

    #[test]
    fn test_set_passable_out_of_range() {
        let mut grid = Grid::build(2, 2).unwrap();
        assert_eq!(
            grid.set_passable(0, 2, false).unwrap_err(),
            GridError::OutOfRange { row: 0, col: 2 }
        );
    }

    #[test]
    fn test_clear_obstacles() {
        let mut grid = Grid::build(3, 3).unwrap();
        grid.set_passable(0, 1, false).unwrap();
        grid.set_passable(2, 2, false).unwrap();
        grid.compute_adjacency();

        grid.clear_obstacles();
        assert!(grid.cells().all(Cell::is_passable));
        assert!(!grid.is_adjacency_current());
    }

    #[test]
    fn test_reset_search_state() {
        let mut grid = Grid::build(2, 2).unwrap();
        {
            let cell = &mut grid.cells[3];
            cell.visited = true;
            cell.parent = Some(Position::new(0, 0));
            cell.g_score = 1.5;
            cell.f_score = 2.5;
        }
        let epoch = grid.epoch;

        grid.reset_search_state();
        let cell = grid.cell_at(1, 1).unwrap();
        assert!(!cell.is_visited());
        assert_eq!(cell.parent(), None);
        assert_eq!(cell.g_score(), 0.0);
        assert_eq!(cell.f_score(), f64::INFINITY);
        assert!(grid.epoch > epoch);
    }

    #[test]
    fn test_position_at_pixel() {
        let grid = Grid::default();
        let size = CELL_SIZE as i32;

        assert_eq!(grid.position_at_pixel(0, 0).unwrap(), Position::new(0, 0));
        assert_eq!(grid.position_at_pixel(size - 1, size).unwrap(), Position::new(1, 0));
        assert_eq!(
            grid.position_at_pixel(size * 49 + 3, size * 39 + 14).unwrap(),
            Position::new(39, 49)
        );
        assert_eq!(
            grid.position_at_pixel(size * 50, 0).unwrap_err(),
            GridError::PixelOutOfRange { x: size * 50, y: 0 }
        );
        assert!(grid.position_at_pixel(-1, 0).is_err());
    }
}
