//! Saving and loading grid snapshots
//!
//! Two on-disk formats are supported:
//!
//! * JSON (canonical): a tagged record
//!   `{format_version, width, height, cell_w, cell_h, n_cells_w, n_cells_h, cells}`
//!   with `cells` as an array of rows.
//! * Text: first line `<width> <height>`, then one line per row of
//!   space-separated `0`/`1` tokens, each followed by a separator. Cell size
//!   is derived from the surface size and token counts, so a text snapshot
//!   cannot describe an empty grid.

use super::grid::{Dimensions, GridState, ALIVE};
use crate::config::SaveFormat;
use crate::error::{LifeError, LifeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const SNAPSHOT_VERSION: u32 = 1;

/// Relative tolerance when checking that cell size times cell count matches
/// the surface size
const GEOMETRY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Snapshot {
    format_version: u32,
    width: f64,
    height: f64,
    cell_w: f64,
    cell_h: f64,
    n_cells_w: usize,
    n_cells_h: usize,
    cells: Vec<Vec<u8>>,
}

impl From<&GridState> for Snapshot {
    fn from(grid: &GridState) -> Self {
        Self {
            format_version: SNAPSHOT_VERSION,
            width: grid.width,
            height: grid.height,
            cell_w: grid.cell_width,
            cell_h: grid.cell_height,
            n_cells_w: grid.cols,
            n_cells_h: grid.rows,
            cells: grid.row_slices().map(<[u8]>::to_vec).collect(),
        }
    }
}

/// Save a grid to `path` in the given format, creating parent directories
pub fn save_grid<P: AsRef<Path>>(grid: &GridState, path: P, format: SaveFormat) -> LifeResult<()> {
    let path = path.as_ref();
    let content = match format {
        SaveFormat::Json => {
            grid_to_json(grid).map_err(|e| LifeError::io(path, e.into()))?
        }
        SaveFormat::Text => grid_to_text(grid),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LifeError::io(parent, e))?;
    }

    std::fs::write(path, content).map_err(|e| LifeError::io(path, e))?;

    info!(path = %path.display(), ?format, rows = grid.rows, cols = grid.cols, "grid saved");
    Ok(())
}

/// Load a grid from `path`, expecting the given format
pub fn load_grid<P: AsRef<Path>>(path: P, format: SaveFormat) -> LifeResult<GridState> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| LifeError::io(path, e))?;

    let grid = parse_grid(&content, format, &path.display().to_string())?;

    info!(path = %path.display(), ?format, rows = grid.rows, cols = grid.cols, "grid loaded");
    Ok(grid)
}

/// Parse a snapshot held in memory; `name` labels parse errors
pub fn parse_grid(content: &str, format: SaveFormat, name: &str) -> LifeResult<GridState> {
    match format {
        SaveFormat::Json => parse_grid_json(content, name),
        SaveFormat::Text => parse_grid_text(content, name),
    }
}

/// Serialize a grid as a pretty-printed JSON snapshot
pub fn grid_to_json(grid: &GridState) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Snapshot::from(grid))
}

fn parse_grid_json(content: &str, name: &str) -> LifeResult<GridState> {
    let snapshot: Snapshot =
        serde_json::from_str(content).map_err(|e| LifeError::parse(name, e.to_string()))?;

    if snapshot.format_version != SNAPSHOT_VERSION {
        return Err(LifeError::parse(
            name,
            format!("unsupported format version {}", snapshot.format_version),
        ));
    }

    let dimensions = Dimensions {
        rows: snapshot.n_cells_h,
        cols: snapshot.n_cells_w,
        cell_width: snapshot.cell_w,
        cell_height: snapshot.cell_h,
        width: snapshot.width,
        height: snapshot.height,
    };
    validate_geometry(&dimensions).map_err(|message| LifeError::parse(name, message))?;

    if snapshot.cells.len() != dimensions.rows {
        return Err(LifeError::parse(
            name,
            format!("expected {} rows, found {}", dimensions.rows, snapshot.cells.len()),
        ));
    }

    // Capacity comes from the rows actually present, never the header counts
    let mut cells = Vec::with_capacity(snapshot.cells.iter().map(Vec::len).sum());
    for (row_idx, row) in snapshot.cells.into_iter().enumerate() {
        if row.len() != dimensions.cols {
            return Err(LifeError::parse(
                name,
                format!("row {} has {} cells, expected {}", row_idx, row.len(), dimensions.cols),
            ));
        }
        if let Some(col_idx) = row.iter().position(|&value| value > ALIVE) {
            return Err(LifeError::parse(
                name,
                format!("invalid cell value {} at ({}, {})", row[col_idx], row_idx, col_idx),
            ));
        }
        cells.extend(row);
    }

    debug!(source = name, rows = dimensions.rows, cols = dimensions.cols, "parsed JSON snapshot");
    Ok(GridState::from_parts(dimensions, cells))
}

fn validate_geometry(dims: &Dimensions) -> Result<(), String> {
    let values = [dims.width, dims.height, dims.cell_width, dims.cell_height];
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err("dimensions must be finite and non-negative".to_string());
    }
    if dims.cell_width <= 0.0 || dims.cell_height <= 0.0 {
        return Err("cell dimensions must be positive".to_string());
    }

    let span_matches = |cell: f64, count: usize, total: f64| {
        (cell * count as f64 - total).abs() <= GEOMETRY_TOLERANCE * total.max(1.0)
    };
    if !span_matches(dims.cell_width, dims.cols, dims.width)
        || !span_matches(dims.cell_height, dims.rows, dims.height)
    {
        return Err(format!(
            "{}x{} cells of {}x{} do not cover a {}x{} surface",
            dims.cols, dims.rows, dims.cell_width, dims.cell_height, dims.width, dims.height
        ));
    }

    Ok(())
}

/// Convert a grid to the plain-text representation
pub fn grid_to_text(grid: &GridState) -> String {
    let mut result = String::with_capacity(32 + grid.rows * (grid.cols * 2 + 1));
    result.push_str(&format!("{} {}\n", grid.width, grid.height));

    for row in grid.row_slices() {
        for &cell in row {
            result.push(if cell == ALIVE { '1' } else { '0' });
            result.push(' ');
        }
        result.push('\n');
    }

    result
}

fn parse_grid_text(content: &str, name: &str) -> LifeResult<GridState> {
    let mut lines = content.lines();

    let header = lines
        .next()
        .ok_or_else(|| LifeError::parse(name, "missing dimension header"))?;
    let (width, height) = parse_header(header).map_err(|message| LifeError::parse(name, message))?;

    let mut cells = Vec::new();
    let mut cols = None;
    let mut rows = 0;

    for (row_idx, line) in lines.filter(|line| !line.trim().is_empty()).enumerate() {
        let start = cells.len();
        for (col_idx, token) in line.split_whitespace().enumerate() {
            match token {
                "0" => cells.push(0),
                "1" => cells.push(1),
                _ => {
                    return Err(LifeError::parse(
                        name,
                        format!("invalid token '{}' at ({}, {})", token, row_idx, col_idx),
                    ))
                }
            }
        }

        let count = cells.len() - start;
        match cols {
            None => cols = Some(count),
            Some(expected) if expected != count => {
                return Err(LifeError::parse(
                    name,
                    format!("row {} has {} cells, expected {}", row_idx, count, expected),
                ));
            }
            Some(_) => {}
        }
        rows += 1;
    }

    let cols = cols.unwrap_or(0);
    if rows == 0 || cols == 0 {
        return Err(LifeError::parse(name, "text snapshot contains no cells"));
    }

    let dimensions = Dimensions {
        rows,
        cols,
        cell_width: width / cols as f64,
        cell_height: height / rows as f64,
        width,
        height,
    };
    validate_geometry(&dimensions).map_err(|message| LifeError::parse(name, message))?;

    debug!(source = name, rows, cols, "parsed text snapshot");
    Ok(GridState::from_parts(dimensions, cells))
}

fn parse_header(header: &str) -> Result<(f64, f64), String> {
    let tokens: Vec<&str> = header.split_whitespace().collect();
    let [width, height] = tokens[..] else {
        return Err(format!("malformed dimension header '{}'", header.trim()));
    };

    let parse = |token: &str| {
        token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| format!("invalid dimension '{}' in header", token))
    };
    Ok((parse(width)?, parse(height)?))
}

/// Create example pattern files for testing
pub fn create_example_grids<P: AsRef<Path>>(output_dir: P, format: SaveFormat) -> LifeResult<()> {
    let dir = output_dir.as_ref();

    for (name, cells) in example_patterns() {
        let grid = GridState::from_cells(cells, 10, 10)?;
        let path = dir.join(name).with_extension(format.extension());
        save_grid(&grid, path, format)?;
    }

    Ok(())
}

fn example_patterns() -> Vec<(&'static str, Vec<Vec<u8>>)> {
    vec![
        (
            "glider",
            vec![
                vec![0, 0, 1, 0, 0, 0],
                vec![1, 0, 1, 0, 0, 0],
                vec![0, 1, 1, 0, 0, 0],
                vec![0, 0, 0, 0, 0, 0],
                vec![0, 0, 0, 0, 0, 0],
                vec![0, 0, 0, 0, 0, 0],
            ],
        ),
        (
            "blinker",
            vec![
                vec![0, 0, 0, 0, 0],
                vec![0, 0, 0, 0, 0],
                vec![0, 1, 1, 1, 0],
                vec![0, 0, 0, 0, 0],
                vec![0, 0, 0, 0, 0],
            ],
        ),
        (
            "block",
            vec![
                vec![0, 0, 0, 0],
                vec![0, 1, 1, 0],
                vec![0, 1, 1, 0],
                vec![0, 0, 0, 0],
            ],
        ),
        (
            "beacon",
            vec![
                vec![0, 0, 0, 0, 0, 0],
                vec![0, 1, 1, 0, 0, 0],
                vec![0, 1, 1, 0, 0, 0],
                vec![0, 0, 0, 1, 1, 0],
                vec![0, 0, 0, 1, 1, 0],
                vec![0, 0, 0, 0, 0, 0],
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CellFill;
    use crate::game_of_life::rescale;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn random_grid(seed: u64) -> GridState {
        let mut rng = StdRng::seed_from_u64(seed);
        GridState::create_with_rng(640, 480, 16, 12, CellFill::Random, &mut rng).unwrap()
    }

    #[test]
    fn test_grid_to_text() {
        let grid = GridState::from_cells(vec![vec![0, 1, 0], vec![1, 0, 1]], 10, 10).unwrap();
        assert_eq!(grid_to_text(&grid), "30 20\n0 1 0 \n1 0 1 \n");
    }

    #[test]
    fn test_parse_text() {
        let grid = parse_grid("30 20\n0 1 0 \n1 0 1 \n", SaveFormat::Text, "inline").unwrap();
        let dims = grid.dimensions();
        assert_eq!((dims.rows, dims.cols), (2, 3));
        assert_eq!((dims.cell_width, dims.cell_height), (10.0, 10.0));
        assert_eq!(grid.living_cells(), vec![(0, 1), (1, 0), (1, 2)]);
    }

    #[test]
    fn test_json_round_trip_random_grid() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested/random.json");
        let original = random_grid(5);

        save_grid(&original, &path, SaveFormat::Json).unwrap();
        let loaded = load_grid(&path, SaveFormat::Json).unwrap();

        assert_eq!(loaded, original);
        assert!(loaded.living_count() > 0);
    }

    #[test]
    fn test_text_round_trip_random_grid() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("random.txt");
        let original = random_grid(9);

        save_grid(&original, &path, SaveFormat::Text).unwrap();
        let loaded = load_grid(&path, SaveFormat::Text).unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn test_json_round_trip_empty_grid() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("empty.json");
        let original = GridState::create(0, 0, 8, 8, CellFill::Zero).unwrap();

        save_grid(&original, &path, SaveFormat::Json).unwrap();
        assert_eq!(load_grid(&path, SaveFormat::Json).unwrap(), original);
    }

    #[test]
    fn test_missing_file_is_io_failure() {
        let temp_dir = tempdir().unwrap();
        let result = load_grid(temp_dir.path().join("absent.json"), SaveFormat::Json);
        assert!(matches!(result, Err(LifeError::IoFailure { .. })));
    }

    #[test]
    fn test_unwritable_destination_is_io_failure() {
        let temp_dir = tempdir().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let grid = random_grid(1);
        let result = save_grid(&grid, blocker.join("save.json"), SaveFormat::Json);
        assert!(matches!(result, Err(LifeError::IoFailure { .. })));
    }

    #[test]
    fn test_malformed_text() {
        let cases = [
            "",
            "30\n0 1 0 \n",
            "30 x\n0 1 0 \n",
            "30 20\n0 1 0 \n1 0 \n",
            "30 20\n0 2 0 \n",
            "30 20\n",
        ];
        for content in cases {
            let result = parse_grid(content, SaveFormat::Text, "inline");
            assert!(
                matches!(result, Err(LifeError::ParseError { .. })),
                "expected parse error for {:?}",
                content
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        let valid = grid_to_json(&GridState::from_cells(vec![vec![1, 0]], 5, 5).unwrap()).unwrap();
        assert!(parse_grid(&valid, SaveFormat::Json, "inline").is_ok());

        let cases = [
            "not json".to_string(),
            valid.replace("\"n_cells_w\": 2", "\"n_cells_w\": 3"),
            valid.replace("\"cell_w\": 5.0", "\"cell_w\": 0.0"),
            valid.replace("\"format_version\": 1", "\"format_version\": 9"),
            valid.replace("\"cells\"", "\"cellz\""),
            valid.replace("\"width\": 10.0", "\"width\": \"ten\""),
        ];
        for content in cases {
            let result = parse_grid(&content, SaveFormat::Json, "inline");
            assert!(
                matches!(result, Err(LifeError::ParseError { .. })),
                "expected parse error for {}",
                content
            );
        }
    }

    #[test]
    fn test_json_rejects_bad_cell_value() {
        let content = r#"{"format_version":1,"width":10.0,"height":5.0,"cell_w":5.0,"cell_h":5.0,
            "n_cells_w":2,"n_cells_h":1,"cells":[[1,7]]}"#;
        let err = parse_grid(content, SaveFormat::Json, "inline").unwrap_err();
        assert!(err.to_string().contains("invalid cell value 7"));
    }

    #[test]
    fn test_json_rejects_oversized_header() {
        // Header claims 2^62 columns but the rows are empty
        let content = r#"{"format_version":1,"width":4611686018427387904.0,"height":2.0,
            "cell_w":1.0,"cell_h":1.0,"n_cells_w":4611686018427387904,"n_cells_h":2,
            "cells":[[],[]]}"#;
        let result = parse_grid(content, SaveFormat::Json, "inline");
        assert!(matches!(result, Err(LifeError::ParseError { .. })));
    }

    #[test]
    fn test_json_round_trip_after_uneven_rescale() {
        let targets = [(1000, 997), (1234, 777), (999, 1001), (7, 3)];
        for cells in 1..=12u32 {
            let grid = GridState::create(cells * 10, cells * 10, 10, 10, CellFill::Zero).unwrap();
            for (width, height) in targets {
                let resized = rescale(&grid, width, height).unwrap();
                let json = grid_to_json(&resized).unwrap();
                let loaded = parse_grid(&json, SaveFormat::Json, "inline").unwrap();
                assert_eq!(loaded, resized, "{} cells resized to {}x{}", cells, width, height);
            }
        }
    }

    #[test]
    fn test_create_example_grids() {
        let temp_dir = tempdir().unwrap();
        create_example_grids(temp_dir.path(), SaveFormat::Text).unwrap();

        for name in ["glider.txt", "blinker.txt", "block.txt", "beacon.txt"] {
            assert!(temp_dir.path().join(name).exists());
        }

        let glider = load_grid(temp_dir.path().join("glider.txt"), SaveFormat::Text).unwrap();
        assert_eq!(glider.cols(), 6);
        assert_eq!(glider.rows(), 6);
        assert_eq!(glider.living_count(), 5);
    }
}
