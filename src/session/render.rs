//! Render interface towards an external drawing collaborator

use crate::game_of_life::{GridState, ALIVE};

/// Pixel rectangle covered by one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellColor {
    White,
    Black,
}

impl CellColor {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            CellColor::White => (255, 255, 255),
            CellColor::Black => (0, 0, 0),
        }
    }
}

/// Anything that can paint filled rectangles
pub trait Canvas {
    fn fill_rect(&mut self, rect: CellRect, color: CellColor);
}

/// Draw every cell once: alive cells white, dead cells black
pub fn render_frame<C: Canvas + ?Sized>(grid: &GridState, canvas: &mut C) {
    let dims = grid.dimensions();
    for (row, cells) in grid.row_slices().enumerate() {
        for (col, &cell) in cells.iter().enumerate() {
            let rect = CellRect {
                x: col as f64 * dims.cell_width,
                y: row as f64 * dims.cell_height,
                width: dims.cell_width,
                height: dims.cell_height,
            };
            let color = if cell == ALIVE {
                CellColor::White
            } else {
                CellColor::Black
            };
            canvas.fill_rect(rect, color);
        }
    }
}
