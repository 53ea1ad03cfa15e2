//! Game of Life core functionality

pub mod grid;
pub mod io;
pub mod resize;
pub mod rules;

pub use grid::{Dimensions, GridState, ALIVE, DEAD};
pub use io::{create_example_grids, load_grid, parse_grid, save_grid};
pub use resize::rescale;
pub use rules::StepEngine;
