use crate::{pos, Pos};

/// Fixed geometry of the arena: a square of `size` pixels cut into cells of
/// `cell_size` pixels, each cell addressed by its center point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    size: i32,
    spots: i32,
    cell_size: i32,
}

impl Grid {
    /// expects a validated geometry, see [`crate::Config::grid`].
    pub fn new(size: i32, spots: i32) -> Self {
        let cell_size = size / spots;
        Self {
            size,
            spots,
            cell_size,
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn spots(&self) -> i32 {
        self.spots
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    /// number of cell columns (and rows) whose left edge lies inside the arena.
    pub fn cells_per_side(&self) -> i32 {
        (self.size + self.cell_size - 1) / self.cell_size
    }

    pub fn center(&self, col: i32, row: i32) -> Pos {
        let half = self.cell_size / 2;
        pos!(col * self.cell_size + half, row * self.cell_size + half)
    }

    /// column and row of the cell whose center is `pos`.
    pub fn cell_of(&self, pos: Pos) -> Option<(i32, i32)> {
        let col = pos.x.div_euclid(self.cell_size);
        let row = pos.y.div_euclid(self.cell_size);
        let side = self.cells_per_side();
        let on_grid = (0..side).contains(&col) && (0..side).contains(&row);
        (on_grid && self.center(col, row) == pos).then_some((col, row))
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cell_of(pos).is_some()
    }

    /// every cell center, column by column.
    pub fn lattice(&self) -> impl Iterator<Item = Pos> + '_ {
        let side = self.cells_per_side();
        (0..side).flat_map(move |col| (0..side).map(move |row| self.center(col, row)))
    }
}
