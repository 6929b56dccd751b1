//! Triangulation, flat shading and chunk partitioning.
//!
//! The grid is split into two triangles per quad. Every triangle corner is
//! then expanded into its own vertex (flat shading), and the expanded
//! buffer is cut into contiguous chunks of at most `chunk_size` vertices.
//! While expanding, each grid cell learns which vertex slots and chunks it
//! feeds, so an edit can later refresh exactly the chunks it touched.

use std::ops::Range;

use glam::Vec2;

use super::chunk::MeshChunk;
use super::store::VertexStore;
use crate::core::{Error, Result, Rgba};
use crate::terrain::grid::{Grid, GridDimensions};

/// Smallest chunk able to hold one triangle.
pub const MIN_CHUNK_SIZE: u32 = 3;

/// Builds a [`ChunkedMesh`] and the matching [`VertexStore`].
#[derive(Clone, Copy, Debug)]
pub struct MeshBuilder {
    chunk_size: u32,
}

impl MeshBuilder {
    /// Create a builder. The chunk size is rounded down to a whole number of
    /// triangles so no triangle straddles two chunks.
    pub fn new(chunk_size: u32) -> Self {
        let effective = (chunk_size - chunk_size % 3).max(MIN_CHUNK_SIZE);
        if effective != chunk_size {
            log::warn!("Chunk size {} adjusted to {}", chunk_size, effective);
        }
        Self {
            chunk_size: effective,
        }
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Global triangle list over grid cell indices, two triangles per quad
    /// with a consistent diagonal.
    pub fn triangulate(dims: GridDimensions) -> Vec<u32> {
        let w = dims.width;
        let mut triangles = Vec::with_capacity(dims.quad_count() * 6);
        for y in 0..dims.height.saturating_sub(1) {
            for x in 0..w.saturating_sub(1) {
                let a = y * w + x;
                let b = (y + 1) * w + x;
                let c = y * w + x + 1;
                let d = (y + 1) * w + x + 1;
                triangles.extend_from_slice(&[a, d, c, d, a, b]);
            }
        }
        triangles
    }

    /// Flat-shade and chunk the grid described by `grid`, `heights` and
    /// `colors`. Both maps must have one entry per grid cell.
    pub fn build(
        &self,
        grid: &Grid,
        heights: Vec<f32>,
        colors: Vec<Rgba>,
    ) -> Result<(VertexStore, ChunkedMesh)> {
        let expected = grid.cell_count();
        for actual in [heights.len(), colors.len()] {
            if actual != expected {
                return Err(Error::LengthMismatch { expected, actual });
            }
        }

        let mut store = VertexStore::new(heights, colors)?;
        let grid_triangles = Self::triangulate(grid.dimensions());
        store.reserve_vertices(grid_triangles.len());

        let mut uvs = Vec::with_capacity(grid_triangles.len());
        for (slot, &cell) in grid_triangles.iter().enumerate() {
            let cell = cell as usize;
            let (col, row) = grid.coords_of(cell);
            store.append_duplicate(cell, grid.grid_to_world(col as i32, row as i32));
            store.register_chunk_membership(cell, slot as u32 / self.chunk_size);
            uvs.push(grid.uv(col, row));
        }

        let mut mesh = ChunkedMesh {
            chunk_size: self.chunk_size,
            uvs,
            chunks: Vec::new(),
        };
        mesh.chunks = (0..mesh.chunk_count_for(grid_triangles.len()))
            .map(|id| mesh.slice_chunk(id as u32, &store))
            .collect();

        log::info!(
            "Built {}x{} terrain mesh: {} vertices in {} chunks",
            grid.width(),
            grid.height(),
            store.vertices().len(),
            mesh.chunks.len()
        );
        Ok((store, mesh))
    }
}

/// The flattened terrain mesh, partitioned into chunks.
#[derive(Clone, Debug, Default)]
pub struct ChunkedMesh {
    chunk_size: u32,
    uvs: Vec<Vec2>,
    chunks: Vec<MeshChunk>,
}

impl ChunkedMesh {
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> &[MeshChunk] {
        &self.chunks
    }

    pub fn chunk(&self, id: u32) -> Option<&MeshChunk> {
        self.chunks.get(id as usize)
    }

    pub fn vertex_count(&self) -> usize {
        self.uvs.len()
    }

    fn chunk_count_for(&self, vertex_count: usize) -> usize {
        vertex_count.div_ceil(self.chunk_size as usize)
    }

    /// Range of the flattened buffer covered by chunk `id`.
    pub fn chunk_range(&self, id: u32) -> Range<usize> {
        let size = self.chunk_size as usize;
        let start = (id as usize * size).min(self.uvs.len());
        let end = (start + size).min(self.uvs.len());
        start..end
    }

    fn slice_chunk(&self, id: u32, store: &VertexStore) -> MeshChunk {
        let range = self.chunk_range(id);
        let triangles = range
            .clone()
            .map(|global| global as u32 % self.chunk_size)
            .collect();
        MeshChunk::new(
            id,
            store.vertices()[range.clone()].to_vec(),
            triangles,
            self.uvs[range].to_vec(),
        )
    }

    /// Re-slice chunk `id` from the store's vertex buffer and recompute its
    /// normals.
    pub fn rebuild_chunk(&mut self, id: u32, store: &VertexStore) -> Result<()> {
        let range = self.chunk_range(id);
        let chunk = self
            .chunks
            .get_mut(id as usize)
            .ok_or(Error::InvalidChunk(id))?;
        chunk.set_vertices(&store.vertices()[range]);
        Ok(())
    }

    /// Refresh every chunk.
    pub fn rebuild_all(&mut self, store: &VertexStore) {
        for id in 0..self.chunks.len() as u32 {
            let range = self.chunk_range(id);
            self.chunks[id as usize].set_vertices(&store.vertices()[range]);
        }
    }
}
