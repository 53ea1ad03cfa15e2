//! Display and output formatting utilities

use crate::game_of_life::{Dimensions, GridState, ALIVE};
use crate::session::{Canvas, CellColor, CellRect};
use std::fmt;

/// Format grids for console output
pub struct GridFormatter;

impl GridFormatter {
    /// Format a grid in compact form
    pub fn format_grid_compact(grid: &GridState) -> String {
        let mut output = String::new();
        for row in grid.row_slices() {
            for &cell in row {
                output.push(if cell == ALIVE { '█' } else { '·' });
            }
            output.push('\n');
        }
        output
    }

    /// Format a grid with coordinates
    pub fn format_grid_with_coords(grid: &GridState) -> String {
        let mut output = String::new();

        // Header with column numbers
        output.push_str("   ");
        for x in 0..grid.cols() {
            output.push_str(&format!("{:2}", x % 10));
        }
        output.push('\n');

        // Rows with row numbers
        for y in 0..grid.rows() {
            output.push_str(&format!("{:2} ", y));
            for x in 0..grid.cols() {
                output.push_str(if grid.is_alive(y, x) { "██" } else { "··" });
            }
            output.push('\n');
        }

        output
    }

    /// One-line geometry and population summary
    pub fn format_summary(grid: &GridState) -> String {
        let dims = grid.dimensions();
        let total = dims.rows * dims.cols;
        let density = if total > 0 {
            grid.living_count() as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        format!(
            "{}x{} cells of {}x{}px on a {}x{}px surface, {} alive ({:.1}%)",
            dims.cols,
            dims.rows,
            dims.cell_width,
            dims.cell_height,
            dims.width,
            dims.height,
            grid.living_count(),
            density
        )
    }
}

/// Character-cell canvas: one character per grid cell
pub struct AsciiCanvas {
    dims: Dimensions,
    pixels: Vec<char>,
}

impl AsciiCanvas {
    pub fn for_grid(grid: &GridState) -> Self {
        let dims = grid.dimensions();
        Self {
            dims,
            pixels: vec![' '; dims.rows * dims.cols],
        }
    }
}

impl Canvas for AsciiCanvas {
    fn fill_rect(&mut self, rect: CellRect, color: CellColor) {
        let row = (rect.y / self.dims.cell_height).round();
        let col = (rect.x / self.dims.cell_width).round();
        if row < 0.0 || col < 0.0 {
            return;
        }
        let (row, col) = (row as usize, col as usize);
        if row < self.dims.rows && col < self.dims.cols {
            self.pixels[row * self.dims.cols + col] = match color {
                CellColor::White => '#',
                CellColor::Black => '.',
            };
        }
    }
}

impl fmt::Display for AsciiCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dims.cols == 0 {
            return Ok(());
        }
        for line in self.pixels.chunks(self.dims.cols) {
            writeln!(f, "{}", line.iter().collect::<String>())?;
        }
        Ok(())
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    /// Check if terminal supports color
    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    /// Format success message
    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    /// Format error message
    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    /// Format warning message
    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    /// Format info message
    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}
