//! Mapping between world-space coordinates and the terrain vertex grid.
//!
//! The grid is centered at the origin and spans `extent` world units.
//! Grid columns run along world X, rows along world Z (the `y` of the
//! 2D world coordinate).

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest number of vertices along either grid axis.
pub const MIN_GRID_VERTICES: u32 = 2;

/// Number of grid vertices along each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    pub width: u32,
    pub height: u32,
}

impl GridDimensions {
    /// Create dimensions, clamping each axis to at least two vertices.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }.clamped()
    }

    /// Copy with both axes clamped to [`MIN_GRID_VERTICES`].
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.max(MIN_GRID_VERTICES),
            height: self.height.max(MIN_GRID_VERTICES),
        }
    }

    /// Total number of cells (vertices) in the grid.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of quads between grid vertices.
    pub fn quad_count(&self) -> usize {
        (self.width.saturating_sub(1) as usize) * (self.height.saturating_sub(1) as usize)
    }
}

impl Default for GridDimensions {
    fn default() -> Self {
        Self { width: 100, height: 100 }
    }
}

/// Physical size of the terrain in world units, centered at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldExtent {
    pub size_x: f32,
    pub size_y: f32,
}

impl WorldExtent {
    pub fn new(size_x: f32, size_y: f32) -> Self {
        Self { size_x, size_y }
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.size_x, self.size_y)
    }
}

impl From<Vec2> for WorldExtent {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl Default for WorldExtent {
    fn default() -> Self {
        Self::new(500.0, 500.0)
    }
}

/// Bidirectional world/grid coordinate mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    dims: GridDimensions,
    extent: WorldExtent,
}

impl Grid {
    pub fn new(dims: GridDimensions, extent: WorldExtent) -> Self {
        Self {
            dims: dims.clamped(),
            extent,
        }
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    pub fn extent(&self) -> WorldExtent {
        self.extent
    }

    pub fn width(&self) -> u32 {
        self.dims.width
    }

    pub fn height(&self) -> u32 {
        self.dims.height
    }

    pub fn cell_count(&self) -> usize {
        self.dims.cell_count()
    }

    /// Nearest grid cell for a world position. May be out of bounds.
    ///
    /// Scales by the vertex count rather than the quad count, so this is
    /// only an approximate inverse of [`Grid::grid_to_world`].
    pub fn world_to_grid(&self, world: Vec2) -> IVec2 {
        let col = (world.x + self.extent.size_x / 2.0) / self.extent.size_x * self.dims.width as f32;
        let row = (world.y + self.extent.size_y / 2.0) / self.extent.size_y * self.dims.height as f32;
        IVec2::new(col.round_ties_even() as i32, row.round_ties_even() as i32)
    }

    /// World position of a grid vertex.
    pub fn grid_to_world(&self, col: i32, row: i32) -> Vec2 {
        let x = self.extent.size_x * col as f32 / (self.dims.width as f32 - 1.0) - self.extent.size_x / 2.0;
        let y = self.extent.size_y * row as f32 / (self.dims.height as f32 - 1.0) - self.extent.size_y / 2.0;
        Vec2::new(x, y)
    }

    /// Row-major flat index. Caller guarantees the cell is in bounds.
    #[inline]
    pub fn flat_index(&self, col: u32, row: u32) -> usize {
        row as usize * self.dims.width as usize + col as usize
    }

    /// Column and row of a flat index.
    #[inline]
    pub fn coords_of(&self, index: usize) -> (u32, u32) {
        let w = self.dims.width as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    pub fn contains(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as u32) < self.dims.width && (row as u32) < self.dims.height
    }

    /// Flat index of `(col, row)`, or `None` outside the grid.
    pub fn checked_index(&self, col: i32, row: i32) -> Option<usize> {
        self.contains(col, row)
            .then(|| self.flat_index(col as u32, row as u32))
    }

    /// Flat index of the cell nearest to a world position, if any.
    pub fn index_at_world(&self, world: Vec2) -> Option<usize> {
        let cell = self.world_to_grid(world);
        self.checked_index(cell.x, cell.y)
    }

    /// Nominal world spacing used by the brush scan.
    pub fn vertex_distance(&self) -> Vec2 {
        Vec2::new(
            self.extent.size_x / self.dims.width as f32,
            self.extent.size_y / self.dims.height as f32,
        )
    }

    /// Texture coordinate of a grid vertex.
    pub fn uv(&self, col: u32, row: u32) -> Vec2 {
        Vec2::new(
            col as f32 / self.dims.width as f32,
            row as f32 / self.dims.height as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn grid(w: u32, h: u32, sx: f32, sy: f32) -> Grid {
        Grid::new(GridDimensions::new(w, h), WorldExtent::new(sx, sy))
    }

    #[test]
    fn test_dimensions_clamped() {
        let dims = GridDimensions::new(0, 1);
        assert_eq!(dims, GridDimensions { width: 2, height: 2 });
        let grid = Grid::new(GridDimensions { width: 1, height: 7 }, WorldExtent::default());
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 7);
    }

    #[test]
    fn test_flat_index_is_bijective() {
        let grid = grid(7, 5, 10.0, 10.0);
        let mut seen = HashSet::new();
        for row in 0..5 {
            for col in 0..7 {
                let idx = grid.flat_index(col, row);
                assert!(idx < grid.cell_count());
                assert!(seen.insert(idx), "index {} produced twice", idx);
                assert_eq!(grid.coords_of(idx), (col, row));
            }
        }
        assert_eq!(seen.len(), 35);
    }

    #[test]
    fn test_grid_to_world_corners() {
        let grid = grid(5, 3, 4.0, 2.0);
        assert_eq!(grid.grid_to_world(0, 0), Vec2::new(-2.0, -1.0));
        assert_eq!(grid.grid_to_world(4, 2), Vec2::new(2.0, 1.0));
        assert_eq!(grid.grid_to_world(2, 1), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_world_to_grid_rounds() {
        let grid = grid(4, 4, 4.0, 4.0);
        assert_eq!(grid.world_to_grid(Vec2::new(-2.0, -2.0)), IVec2::new(0, 0));
        assert_eq!(grid.world_to_grid(Vec2::new(-0.9, -1.2)), IVec2::new(1, 1));
        assert_eq!(grid.world_to_grid(Vec2::new(2.0, 2.0)), IVec2::new(4, 4));
    }

    #[test]
    fn test_round_trip_is_approximate() {
        let grid = grid(100, 80, 500.0, 320.0);
        for row in 0..80 {
            for col in 0..100 {
                let world = grid.grid_to_world(col, row);
                let back = grid.world_to_grid(world);
                assert!((back.x - col).abs() <= 1, "col {} -> {}", col, back.x);
                assert!((back.y - row).abs() <= 1, "row {} -> {}", row, back.y);
            }
        }
        // Exact in the lower half, where the width/(width-1) drift stays below half a cell
        for col in 1..49 {
            let back = grid.world_to_grid(grid.grid_to_world(col, 10));
            assert_eq!(back.x, col);
        }
    }

    #[test]
    fn test_checked_index_out_of_bounds() {
        let grid = grid(4, 4, 4.0, 4.0);
        assert_eq!(grid.checked_index(-1, 0), None);
        assert_eq!(grid.checked_index(0, 4), None);
        assert_eq!(grid.checked_index(4, 0), None);
        assert_eq!(grid.checked_index(3, 3), Some(15));
        assert_eq!(grid.index_at_world(Vec2::new(100.0, 0.0)), None);
    }

    #[test]
    fn test_vertex_distance_and_uv() {
        let grid = grid(10, 20, 50.0, 40.0);
        assert_eq!(grid.vertex_distance(), Vec2::new(5.0, 2.0));
        assert_eq!(grid.uv(5, 10), Vec2::new(0.5, 0.5));
    }
}
