//! Game of Life rules implementation

use super::grid::{GridState, ALIVE, DEAD};
use crate::config::BoundaryCondition;
use rayon::prelude::*;

const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies the B3/S23 rule to a whole generation at once.
///
/// Every cell of generation N+1 is computed from an immutable borrow of
/// generation N and written to a fresh buffer, so no transition can observe
/// a partially updated generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepEngine {
    boundary: BoundaryCondition,
}

impl StepEngine {
    pub fn new(boundary: BoundaryCondition) -> Self {
        Self { boundary }
    }

    pub fn boundary(&self) -> BoundaryCondition {
        self.boundary
    }

    /// Apply Game of Life rules to evolve the grid one generation forward
    pub fn evolve(&self, current: &GridState) -> GridState {
        if current.rows == 0 || current.cols == 0 {
            return current.clone();
        }

        let cols = current.cols;
        let next_cells: Vec<u8> = (0..current.rows)
            .into_par_iter()
            .flat_map_iter(|row| {
                (0..cols).map(move |col| {
                    let neighbors = self.count_neighbors(current, row, col);
                    let alive = current.cells[current.index(row, col)] == ALIVE;
                    if Self::should_be_alive(alive, neighbors) {
                        ALIVE
                    } else {
                        DEAD
                    }
                })
            })
            .collect();

        GridState {
            cells: next_cells,
            ..current.clone()
        }
    }

    /// Evolve the grid for multiple generations
    pub fn evolve_generations(&self, mut grid: GridState, generations: usize) -> GridState {
        for _ in 0..generations {
            grid = self.evolve(&grid);
        }
        grid
    }

    /// Count living neighbors of a cell under this engine's edge policy
    pub fn count_neighbors(&self, grid: &GridState, row: usize, col: usize) -> u8 {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| {
                let r = self.neighbor_coord(row, dr, grid.rows)?;
                let c = self.neighbor_coord(col, dc, grid.cols)?;
                Some(grid.cells[grid.index(r, c)])
            })
            .filter(|&cell| cell == ALIVE)
            .count() as u8
    }

    fn neighbor_coord(&self, pos: usize, delta: isize, len: usize) -> Option<usize> {
        match self.boundary {
            BoundaryCondition::Wrap => Some((pos + len).wrapping_add_signed(delta) % len),
            BoundaryCondition::Dead => pos.checked_add_signed(delta).filter(|&p| p < len),
        }
    }

    /// Check if a cell should be alive in the next generation given its current state and neighbor count
    pub fn should_be_alive(current_state: bool, neighbor_count: u8) -> bool {
        matches!((current_state, neighbor_count), (true, 2) | (true, 3) | (false, 3))
    }
}
