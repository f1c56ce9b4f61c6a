//! Initial populations, either read from a text file or picked from a few
//! well known presets. Pattern cells are column/row indices, not arena pixels.

use std::{fs, path::Path};

use crate::{error::PatternError, pos, Grid, Pos};

pub struct Preset {
    pub name: &'static str,
    pub cells: &'static [(i32, i32)],
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "block",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
    },
    Preset {
        name: "blinker",
        cells: &[(0, 0), (1, 0), (2, 0)],
    },
    Preset {
        name: "toad",
        cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
    },
    Preset {
        name: "beacon",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
    },
    Preset {
        name: "glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Preset {
        name: "r-pentomino",
        cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
    },
];

pub fn preset(name: &str) -> Result<Vec<Pos>, PatternError> {
    PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(|p| p.cells.iter().map(|&(x, y)| pos!(x, y)).collect())
        .ok_or_else(|| PatternError::UnknownPreset(name.to_string()))
}

/// `#` is an alive cell, any other character a dead one, each line a row.
pub fn deserialize(str: &str) -> Vec<Pos> {
    let mut result = vec![];
    let mut pos = pos!(0, 0);
    for c in str.chars() {
        match c {
            '#' => {
                result.push(pos);
                pos.x += 1
            }
            '\n' => pos = pos!(0, pos.y + 1),
            '\r' => (),
            _ => pos.x += 1,
        }
    }
    result
}

pub fn read(path: &Path) -> Result<Vec<Pos>, PatternError> {
    let content = fs::read_to_string(path).map_err(|source| PatternError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(deserialize(&content))
}

/// turns pattern indices into cell centers, shifted by `offset` or centered
/// on the grid when there is none.
pub fn place(grid: &Grid, cells: &[Pos], offset: Option<Pos>) -> Result<Vec<Pos>, PatternError> {
    let Some(min_x) = cells.iter().map(|p| p.x).min() else {
        return Ok(vec![]);
    };
    let min_y = cells.iter().map(|p| p.y).min().unwrap_or(min_x);
    let max_x = cells.iter().map(|p| p.x).max().unwrap_or(min_x);
    let max_y = cells.iter().map(|p| p.y).max().unwrap_or(min_y);
    let origin = pos!(min_x, min_y);

    let side = grid.cells_per_side();
    let offset = offset.unwrap_or_else(|| {
        let width = max_x.saturating_sub(min_x).saturating_add(1);
        let height = max_y.saturating_sub(min_y).saturating_add(1);
        pos!((side - width).max(0) / 2, (side - height).max(0) / 2)
    });

    cells
        .iter()
        .map(|&cell| {
            // saturates so a huge offset lands out of bounds instead of wrapping
            let col = cell.x.saturating_sub(origin.x).saturating_add(offset.x);
            let row = cell.y.saturating_sub(origin.y).saturating_add(offset.y);
            if col < 0 || row < 0 || col >= side || row >= side {
                return Err(PatternError::OutOfBounds {
                    col,
                    row,
                    spots: side,
                });
            }
            Ok(grid.center(col, row))
        })
        .collect()
}
