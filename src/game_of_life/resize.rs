//! Rescaling grid geometry when the display surface changes size

use super::grid::GridState;
use crate::error::{LifeError, LifeResult};
use tracing::debug;

/// Rescale `state` onto a `new_width` x `new_height` surface.
///
/// Logical cell counts and the cell array are left untouched; only the
/// surface size and the per-cell pixel size change, each cell dimension
/// being stretched by `new / old` along its axis. Cell size is recomputed
/// from the new surface size and the fixed cell count, which keeps
/// `cell * count == surface` exact and makes repeated identical requests
/// produce identical geometry.
pub fn rescale(state: &GridState, new_width: u32, new_height: u32) -> LifeResult<GridState> {
    if new_width == 0 || new_height == 0 {
        return Err(LifeError::InvalidDimensions {
            width: new_width,
            height: new_height,
            cell_width: state.cell_width.round() as u32,
            cell_height: state.cell_height.round() as u32,
        });
    }

    let width = f64::from(new_width);
    let height = f64::from(new_height);

    let cell_width = if state.cols == 0 {
        state.cell_width
    } else {
        width / state.cols as f64
    };
    let cell_height = if state.rows == 0 {
        state.cell_height
    } else {
        height / state.rows as f64
    };

    debug!(
        scale_w = width / state.width,
        scale_h = height / state.height,
        cell_width,
        cell_height,
        "rescaled grid geometry"
    );

    Ok(GridState {
        width,
        height,
        cell_width,
        cell_height,
        ..state.clone()
    })
}
