//! Grid state and geometry for the Game of Life

use crate::config::CellFill;
use crate::error::{LifeError, LifeResult};
use rand::Rng;
use std::fmt;

pub const DEAD: u8 = 0;
pub const ALIVE: u8 = 1;

/// Cell array plus the pixel geometry it is laid out on.
///
/// Cells are stored row-major in a flat vector of `rows * cols` values, each
/// either [`DEAD`] or [`ALIVE`]. The logical cell counts are fixed when the
/// grid is built; resizing only changes the pixel geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GridState {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) cell_width: f64,
    pub(crate) cell_height: f64,
    pub(crate) cells: Vec<u8>,
}

/// Snapshot of a grid's shape and geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub rows: usize,
    pub cols: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub width: f64,
    pub height: f64,
}

impl GridState {
    /// Create a grid covering a `width` x `height` surface with cells of
    /// `cell_width` x `cell_height`, filled from the thread-local RNG when
    /// `fill` is random.
    pub fn create(
        width: u32,
        height: u32,
        cell_width: u32,
        cell_height: u32,
        fill: CellFill,
    ) -> LifeResult<Self> {
        Self::create_with_rng(width, height, cell_width, cell_height, fill, &mut rand::rng())
    }

    /// Same as [`GridState::create`] but draws random cells from `rng`
    pub fn create_with_rng<R: Rng + ?Sized>(
        width: u32,
        height: u32,
        cell_width: u32,
        cell_height: u32,
        fill: CellFill,
        rng: &mut R,
    ) -> LifeResult<Self> {
        if cell_width == 0
            || cell_height == 0
            || width % cell_width != 0
            || height % cell_height != 0
        {
            return Err(LifeError::InvalidDimensions {
                width,
                height,
                cell_width,
                cell_height,
            });
        }

        let rows = (height / cell_height) as usize;
        let cols = (width / cell_width) as usize;
        let cells = match fill {
            CellFill::Zero => vec![DEAD; rows * cols],
            CellFill::Random => (0..rows * cols).map(|_| rng.random_range(DEAD..=ALIVE)).collect(),
        };

        Ok(Self {
            rows,
            cols,
            width: f64::from(width),
            height: f64::from(height),
            cell_width: f64::from(cell_width),
            cell_height: f64::from(cell_height),
            cells,
        })
    }

    /// Build a grid from explicit rows, deriving the surface size from the
    /// cell size
    pub fn from_cells(cells: Vec<Vec<u8>>, cell_width: u32, cell_height: u32) -> LifeResult<Self> {
        let rows = cells.len();
        let cols = cells.first().map_or(0, Vec::len);
        // Surface size along one axis, saturated for error reporting
        let span = |count: usize, cell: u32| u32::try_from(count).unwrap_or(u32::MAX).saturating_mul(cell);
        let invalid = |cols: usize| LifeError::InvalidDimensions {
            width: span(cols, cell_width),
            height: span(rows, cell_height),
            cell_width,
            cell_height,
        };

        for line in &cells {
            if line.len() != cols {
                return Err(invalid(line.len()));
            }
            if let Some(&bad) = line.iter().find(|&&value| value > ALIVE) {
                return Err(LifeError::InvalidCellValue(bad));
            }
        }

        let checked_span = |count: usize, cell: u32| u32::try_from(count).ok()?.checked_mul(cell);
        let (Some(width), Some(height)) =
            (checked_span(cols, cell_width), checked_span(rows, cell_height))
        else {
            return Err(invalid(cols));
        };

        let mut grid = Self::create(width, height, cell_width, cell_height, CellFill::Zero)?;
        grid.cells = cells.into_iter().flatten().collect();
        Ok(grid)
    }

    /// Assemble a grid from already validated parts
    pub(crate) fn from_parts(dimensions: Dimensions, cells: Vec<u8>) -> Self {
        debug_assert_eq!(cells.len(), dimensions.rows * dimensions.cols);
        Self {
            rows: dimensions.rows,
            cols: dimensions.cols,
            width: dimensions.width,
            height: dimensions.height,
            cell_width: dimensions.cell_width,
            cell_height: dimensions.cell_height,
            cells,
        }
    }

    /// An all-dead grid with the same shape and geometry
    pub fn cleared(&self) -> Self {
        Self {
            cells: vec![DEAD; self.cells.len()],
            ..self.clone()
        }
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn check_bounds(&self, row: usize, col: usize) -> LifeResult<()> {
        if row < self.rows && col < self.cols {
            Ok(())
        } else {
            Err(LifeError::OutOfBounds {
                row: row as i64,
                col: col as i64,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Get cell value at coordinates
    pub fn get(&self, row: usize, col: usize) -> LifeResult<u8> {
        self.check_bounds(row, col)?;
        Ok(self.cells[self.index(row, col)])
    }

    /// Whether the cell is alive; out of bounds cells are considered dead
    #[inline]
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[self.index(row, col)] == ALIVE
    }

    /// Set cell value at coordinates
    pub fn set(&mut self, row: usize, col: usize, value: u8) -> LifeResult<()> {
        if value > ALIVE {
            return Err(LifeError::InvalidCellValue(value));
        }
        self.check_bounds(row, col)?;
        let idx = self.index(row, col);
        self.cells[idx] = value;
        Ok(())
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            rows: self.rows,
            cols: self.cols,
            cell_width: self.cell_width,
            cell_height: self.cell_height,
            width: self.width,
            height: self.height,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major view of every cell
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Iterate over the grid one row slice at a time
    pub fn row_slices(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.rows).map(move |row| &self.cells[row * self.cols..(row + 1) * self.cols])
    }

    /// Translate a pixel position into the `(row, col)` of the cell under it
    pub fn pixel_to_cell(&self, px: f64, py: f64) -> LifeResult<(usize, usize)> {
        let row = (py / self.cell_height).floor();
        let col = (px / self.cell_width).floor();

        let in_bounds = row.is_finite()
            && col.is_finite()
            && row >= 0.0
            && col >= 0.0
            && (row as usize) < self.rows
            && (col as usize) < self.cols;

        if in_bounds {
            Ok((row as usize, col as usize))
        } else {
            Err(LifeError::OutOfBounds {
                row: row as i64,
                col: col as i64,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Count total living cells
    pub fn living_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell == ALIVE).count()
    }

    /// Check whether every cell is dead
    pub fn is_all_dead(&self) -> bool {
        self.cells.iter().all(|&cell| cell == DEAD)
    }

    /// Get all living cell coordinates
    pub fn living_cells(&self) -> Vec<(usize, usize)> {
        let mut living = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.is_alive(row, col) {
                    living.push((row, col));
                }
            }
        }
        living
    }
}

impl fmt::Display for GridState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.row_slices() {
            for &cell in row {
                let symbol = if cell == ALIVE { "⬛" } else { "⬜" };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
