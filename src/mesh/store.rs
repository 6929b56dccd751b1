//! Per-cell terrain state and its flat-shaded vertex fan-out.
//!
//! Flat shading duplicates every grid vertex once per triangle corner, so a
//! single height edit has to be pushed into up to six vertex slots. The
//! store owns the height map, color map and the flattened vertex buffer and
//! keeps every duplicate slot in sync on each write. Everything else refers
//! to cells, slots and chunks by index only.

use glam::{Vec2, Vec3};

use crate::core::{Error, Result, Rgba};

/// Back-references from one grid cell into the flattened mesh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexCell {
    index: usize,
    duplicates: Vec<u32>,
    chunks: Vec<u32>,
}

impl VertexCell {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            duplicates: Vec::new(),
            chunks: Vec::new(),
        }
    }

    /// Flat grid index of this cell
    pub fn index(&self) -> usize {
        self.index
    }

    /// Vertex buffer slots mirroring this cell
    pub fn duplicate_vertex_indices(&self) -> &[u32] {
        &self.duplicates
    }

    /// Chunks containing at least one of this cell's duplicates
    pub fn chunk_memberships(&self) -> &[u32] {
        &self.chunks
    }
}

/// Owner of height, color and flattened vertex data.
#[derive(Clone, Debug, Default)]
pub struct VertexStore {
    heights: Vec<f32>,
    colors: Vec<Rgba>,
    cells: Vec<VertexCell>,
    vertices: Vec<Vec3>,
}

impl VertexStore {
    /// Create a store over parallel height and color maps.
    pub fn new(heights: Vec<f32>, colors: Vec<Rgba>) -> Result<Self> {
        if heights.len() != colors.len() {
            return Err(Error::LengthMismatch {
                expected: heights.len(),
                actual: colors.len(),
            });
        }
        let cells = (0..heights.len()).map(VertexCell::new).collect();
        Ok(Self {
            heights,
            colors,
            cells,
            vertices: Vec::new(),
        })
    }

    /// Reserve room for the flattened vertex buffer
    pub fn reserve_vertices(&mut self, count: usize) {
        self.vertices.reserve_exact(count);
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, index: usize) -> Option<&VertexCell> {
        self.cells.get(index)
    }

    pub fn cells(&self) -> &[VertexCell] {
        &self.cells
    }

    pub fn height(&self, index: usize) -> Option<f32> {
        self.heights.get(index).copied()
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn color(&self, index: usize) -> Option<Rgba> {
        self.colors.get(index).copied()
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// Flattened (one entry per triangle corner) vertex buffer
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Set a cell's height and mirror it into every duplicate vertex.
    pub fn set_height(&mut self, index: usize, value: f32) -> bool {
        let Some(height) = self.heights.get_mut(index) else {
            return false;
        };
        *height = value;
        self.sync_height(index);
        true
    }

    /// Add to a cell's height. Returns the new height.
    pub fn add_height(&mut self, index: usize, delta: f32) -> Option<f32> {
        let height = self.heights.get_mut(index)?;
        *height += delta;
        let value = *height;
        self.sync_height(index);
        Some(value)
    }

    fn sync_height(&mut self, index: usize) {
        let height = self.heights[index];
        for &slot in &self.cells[index].duplicates {
            if let Some(v) = self.vertices.get_mut(slot as usize) {
                v.y = height;
            }
        }
    }

    /// Set a cell's color. Colors are sampled from a texture, so there is
    /// no vertex fan-out.
    pub fn set_color(&mut self, index: usize, color: Rgba) -> bool {
        match self.colors.get_mut(index) {
            Some(c) => {
                *c = color;
                true
            }
            None => false,
        }
    }

    /// Move a cell in the horizontal plane (world x, world z).
    pub fn set_position(&mut self, index: usize, position: Vec2) -> bool {
        let Some(cell) = self.cells.get(index) else {
            return false;
        };
        for &slot in &cell.duplicates {
            if let Some(v) = self.vertices.get_mut(slot as usize) {
                v.x = position.x;
                v.z = position.y;
            }
        }
        true
    }

    /// Record that vertex buffer slot `slot` mirrors cell `index`.
    pub fn register_duplicate(&mut self, index: usize, slot: u32) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) => {
                cell.duplicates.push(slot);
                true
            }
            None => false,
        }
    }

    /// Record that cell `index` appears in `chunk`. Idempotent.
    pub fn register_chunk_membership(&mut self, index: usize, chunk: u32) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) => {
                if !cell.chunks.contains(&chunk) {
                    cell.chunks.push(chunk);
                }
                true
            }
            None => false,
        }
    }

    /// Append a flattened vertex for cell `index` at `position` (world x/z)
    /// and register it as a duplicate. Returns the new slot.
    pub fn append_duplicate(&mut self, index: usize, position: Vec2) -> Option<u32> {
        let height = self.height(index)?;
        let slot = self.vertices.len() as u32;
        self.vertices.push(Vec3::new(position.x, height, position.y));
        self.register_duplicate(index, slot);
        Some(slot)
    }
}
