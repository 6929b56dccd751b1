//! Terrain mutation engine.
//!
//! [`TerrainSystem`] owns the height map, color map, vertex store, chunked
//! mesh and color texture. Brush edits touch only the cells under the brush
//! and rebuild each affected chunk once at the end of the call. Structural
//! changes (resolution) tear everything down and rebuild from scratch.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use super::invalidator::ChunkInvalidator;
use super::texture::ColorTexture;
use super::tool::{BrushInput, BrushSettings, EditState, ToolKind};
use crate::core::time::clamp_delta;
use crate::core::{Error, Lerp, Result, Rgba};
use crate::mesh::{ChunkedMesh, MeshBuilder, VertexCell, VertexStore};
use crate::terrain::biotope::BiotopeSet;
use crate::terrain::config::{FilterMode, TerrainConfig};
use crate::terrain::generator::HeightMapGenerator;
use crate::terrain::grid::{Grid, GridDimensions, WorldExtent};

/// Work done by a single brush application.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditReport {
    pub cells_modified: usize,
    /// Chunk ids rebuilt, ascending
    pub chunks_rebuilt: Vec<u32>,
}

impl EditReport {
    pub fn is_empty(&self) -> bool {
        self.cells_modified == 0
    }
}

/// Grid cells under a circular brush with their linear falloff weight.
///
/// Scans the bounding square of the brush in grid space and keeps the cells
/// whose world position lies within `radius` of `center`. The weight is 1
/// at the center and 0 at the rim; with a zero radius only a cell exactly at
/// the center is kept, with weight 1.
pub fn brush_footprint(grid: &Grid, center: Vec2, radius: f32) -> Vec<(usize, f32)> {
    let radius = if radius.is_nan() { 0.0 } else { radius.max(0.0) };
    let extent = grid.extent().as_vec2();
    if !(extent.x > 0.0 && extent.y > 0.0) || !center.is_finite() || !radius.is_finite() {
        return Vec::new();
    }

    // inverse of grid_to_world, so the range is exact rather than rounded
    let quads = Vec2::new(grid.width() as f32 - 1.0, grid.height() as f32 - 1.0);
    let to_grid = |world: Vec2| (world + extent / 2.0) * quads / extent;
    let lo = to_grid(center - Vec2::splat(radius)).floor().max(Vec2::ZERO);
    let hi = to_grid(center + Vec2::splat(radius)).ceil().min(quads);
    if lo.x > hi.x || lo.y > hi.y {
        return Vec::new();
    }

    let radius_sq = radius * radius;
    let mut cells = Vec::new();
    for row in lo.y as i32..=hi.y as i32 {
        for col in lo.x as i32..=hi.x as i32 {
            let Some(index) = grid.checked_index(col, row) else {
                continue;
            };
            let dist_sq = grid.grid_to_world(col, row).distance_squared(center);
            if dist_sq > radius_sq {
                continue;
            }
            let weight = if radius > 0.0 {
                (radius - dist_sq.sqrt()) / radius
            } else {
                1.0
            };
            cells.push((index, weight));
        }
    }
    cells
}

/// Live terrain state, present between `initialize` and `teardown`.
struct TerrainState {
    grid: Grid,
    store: VertexStore,
    mesh: ChunkedMesh,
    texture: ColorTexture,
}

/// Owns the terrain and applies generation and brush edits to it.
pub struct TerrainSystem {
    config: TerrainConfig,
    biotopes: BiotopeSet,
    builder: MeshBuilder,
    terrain: Option<TerrainState>,
    invalidator: ChunkInvalidator,
    rng: Pcg64Mcg,
    state: EditState,
}

impl TerrainSystem {
    /// Build a flat, grey terrain from `config`.
    pub fn initialize(config: TerrainConfig) -> Result<Self> {
        let config = config.sanitized();
        let mut system = Self {
            biotopes: BiotopeSet::new(config.biotopes.clone(), config.interpolation),
            builder: MeshBuilder::new(config.chunk_size),
            rng: Pcg64Mcg::seed_from_u64(config.generator.seed as i64 as u64),
            terrain: None,
            invalidator: ChunkInvalidator::new(),
            state: EditState::Idle,
            config,
        };
        system.rebuild_flat()?;
        Ok(system)
    }

    /// Drop all terrain data. Edits become no-ops until `reinitialize`.
    pub fn teardown(&mut self) {
        if self.terrain.take().is_some() {
            log::info!("Terrain torn down");
        }
        self.invalidator.clear();
        self.state = EditState::Idle;
    }

    /// Rebuild flat and grey at the current size and resolution.
    pub fn reinitialize(&mut self) -> Result<()> {
        self.rebuild_flat()
    }

    fn rebuild_flat(&mut self) -> Result<()> {
        let grid = Grid::new(self.config.resolution, WorldExtent::from(self.config.world_size));
        let n = grid.cell_count();
        let (store, mesh) = self
            .builder
            .build(&grid, vec![0.0; n], vec![Rgba::GREY; n])?;

        let mut texture = ColorTexture::new(grid.width(), grid.height(), self.config.filter_mode);
        texture.sync(store.colors())?;

        self.invalidator.clear();
        self.state = EditState::Idle;
        self.terrain = Some(TerrainState {
            grid,
            store,
            mesh,
            texture,
        });
        log::info!(
            "Terrain initialized: {}x{} cells over {}x{} world units",
            grid.width(),
            grid.height(),
            self.config.world_size.x,
            self.config.world_size.y
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.terrain.is_some()
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn biotopes(&self) -> &BiotopeSet {
        &self.biotopes
    }

    pub fn invalidator(&self) -> &ChunkInvalidator {
        &self.invalidator
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.terrain.as_ref().map(|t| &t.grid)
    }

    pub fn store(&self) -> Option<&VertexStore> {
        self.terrain.as_ref().map(|t| &t.store)
    }

    pub fn mesh(&self) -> Option<&ChunkedMesh> {
        self.terrain.as_ref().map(|t| &t.mesh)
    }

    pub fn texture(&self) -> Option<&ColorTexture> {
        self.terrain.as_ref().map(|t| &t.texture)
    }

    /// Mutable texture access for the display shell (`take_dirty`).
    pub fn texture_mut(&mut self) -> Option<&mut ColorTexture> {
        self.terrain.as_mut().map(|t| &mut t.texture)
    }

    /// Cell at `(col, row)`, `None` outside the grid.
    pub fn vertex(&self, col: i32, row: i32) -> Option<&VertexCell> {
        let terrain = self.terrain.as_ref()?;
        let index = terrain.grid.checked_index(col, row)?;
        terrain.store.cell(index)
    }

    /// Cell nearest to a world position, `None` outside the grid.
    pub fn vertex_at_world(&self, world: Vec2) -> Option<&VertexCell> {
        let terrain = self.terrain.as_ref()?;
        let index = terrain.grid.index_at_world(world)?;
        terrain.store.cell(index)
    }

    // Structural changes

    /// Change the world size. Cell positions are recomputed and pushed to
    /// every duplicate vertex without re-triangulating. Non-finite sizes are
    /// ignored. Returns whether the size changed.
    pub fn set_size(&mut self, size: Vec2) -> bool {
        if !size.is_finite() {
            log::warn!("Ignoring non-finite terrain size {:?}", size);
            return false;
        }
        if size == self.config.world_size {
            return false;
        }
        self.config.world_size = size;
        let Some(terrain) = self.terrain.as_mut() else {
            return true;
        };

        terrain.grid = Grid::new(terrain.grid.dimensions(), WorldExtent::from(size));
        for index in 0..terrain.store.cell_count() {
            let (col, row) = terrain.grid.coords_of(index);
            terrain
                .store
                .set_position(index, terrain.grid.grid_to_world(col as i32, row as i32));
        }
        terrain.mesh.rebuild_all(&terrain.store);
        log::info!("Terrain resized to {}x{}", size.x, size.y);
        true
    }

    /// Change the grid resolution (clamped to at least 2x2). A new
    /// resolution rebuilds the terrain flat and grey. Returns whether the
    /// resolution changed.
    pub fn set_resolution(&mut self, resolution: GridDimensions) -> Result<bool> {
        let clamped = resolution.clamped();
        if clamped != resolution {
            log::warn!(
                "Resolution {}x{} clamped to {}x{}",
                resolution.width,
                resolution.height,
                clamped.width,
                clamped.height
            );
        }
        if clamped == self.config.resolution {
            return Ok(false);
        }
        self.config.resolution = clamped;
        self.rebuild_flat()?;
        Ok(true)
    }

    pub fn set_filter_mode(&mut self, filter_mode: FilterMode) {
        self.config.filter_mode = filter_mode;
        if let Some(terrain) = self.terrain.as_mut() {
            terrain.texture.set_filter_mode(filter_mode);
        }
    }

    // Generation

    /// Height map for the current configuration. Deterministic for a given
    /// generator config.
    pub fn create_height_map(&self) -> Vec<f32> {
        HeightMapGenerator::new(self.config.generator.clone())
            .generate(self.config.resolution, &self.config.height_curve)
    }

    /// Classify each height, normalized by the height multiplier.
    pub fn classify_heights(&self, heights: &[f32]) -> Vec<Rgba> {
        let multiplier = self.config.generator.height_multiplier;
        heights
            .iter()
            .map(|&h| {
                let normalized = if multiplier != 0.0 { h / multiplier } else { 0.0 };
                self.biotopes.classify(normalized)
            })
            .collect()
    }

    /// Color map for the current heights.
    pub fn create_color_map(&self) -> Vec<Rgba> {
        match self.terrain.as_ref() {
            Some(terrain) => self.classify_heights(terrain.store.heights()),
            None => Vec::new(),
        }
    }

    fn check_map_len(&self, actual: usize) -> Result<()> {
        let expected = self.config.resolution.cell_count();
        if actual != expected {
            return Err(Error::LengthMismatch { expected, actual });
        }
        Ok(())
    }

    /// Replace every height and rebuild every chunk.
    pub fn set_height_map(&mut self, heights: &[f32]) -> Result<()> {
        self.check_map_len(heights.len())?;
        let Some(terrain) = self.terrain.as_mut() else {
            return Ok(());
        };
        for (index, &height) in heights.iter().enumerate() {
            terrain.store.set_height(index, height);
        }
        terrain.mesh.rebuild_all(&terrain.store);
        log::debug!("Height map applied, {} chunks rebuilt", terrain.mesh.chunk_count());
        Ok(())
    }

    /// Replace every color and refresh the texture.
    pub fn set_color_map(&mut self, colors: &[Rgba]) -> Result<()> {
        self.check_map_len(colors.len())?;
        let filter_mode = self.config.filter_mode;
        let Some(terrain) = self.terrain.as_mut() else {
            return Ok(());
        };
        for (index, &color) in colors.iter().enumerate() {
            terrain.store.set_color(index, color);
        }
        terrain.texture.set_filter_mode(filter_mode);
        terrain.texture.sync(terrain.store.colors())?;
        Ok(())
    }

    /// Generate heights from noise, then colors from the biotopes.
    pub fn generate(&mut self) -> Result<()> {
        let heights = self.create_height_map();
        self.set_height_map(&heights)?;
        let colors = self.create_color_map();
        self.set_color_map(&colors)?;
        log::info!(
            "Generated terrain (seed {}, {} biotopes)",
            self.config.generator.seed,
            self.biotopes.len()
        );
        Ok(())
    }

    // Biotopes

    fn sync_biotope_config(&mut self) {
        self.config.biotopes = self.biotopes.biotopes().to_vec();
    }

    pub fn set_interpolation(&mut self, interpolation: f32) {
        self.biotopes.set_interpolation(interpolation);
        self.config.interpolation = self.biotopes.interpolation();
    }

    pub fn set_biotope_start_height(&mut self, index: usize, value: f32) -> bool {
        let changed = self.biotopes.set_start_height(index, value);
        self.sync_biotope_config();
        changed
    }

    pub fn set_biotope_end_height(&mut self, index: usize, value: f32) -> bool {
        let changed = self.biotopes.set_end_height(index, value);
        self.sync_biotope_config();
        changed
    }

    pub fn set_biotope_color(&mut self, index: usize, color: Rgba) -> bool {
        let changed = self.biotopes.set_color(index, color);
        self.sync_biotope_config();
        changed
    }

    pub fn push_biotope(&mut self) -> usize {
        let index = self.biotopes.push();
        self.sync_biotope_config();
        index
    }

    pub fn pop_biotope(&mut self) -> bool {
        let removed = self.biotopes.pop().is_some();
        self.sync_biotope_config();
        removed
    }

    // Brush

    /// Sculpt heights under a circular brush and rebuild the touched chunks.
    pub fn apply_height_tool(
        &mut self,
        center: Vec2,
        radius: f32,
        strength: f32,
        tool: ToolKind,
    ) -> EditReport {
        if !tool.edits_height() || !strength.is_finite() {
            return EditReport::default();
        }
        let Some(terrain) = self.terrain.as_mut() else {
            return EditReport::default();
        };

        let footprint = brush_footprint(&terrain.grid, center, radius);
        for &(index, weight) in &footprint {
            match tool {
                ToolKind::Normal => {
                    terrain.store.add_height(index, weight * strength);
                }
                ToolKind::Noise => {
                    // unit sample, scaled after drawing
                    let delta = strength * (weight * self.rng.gen_range(0.0f32..=1.0));
                    terrain.store.add_height(index, delta);
                }
                ToolKind::Bumps => {
                    let delta = strength * (weight * self.rng.gen_range(-1.0f32..=1.0));
                    terrain.store.add_height(index, delta);
                }
                ToolKind::Smooth => {
                    let average = neighborhood_average(&terrain.grid, &terrain.store, index);
                    let current = terrain.store.height(index).unwrap_or(0.0);
                    terrain.store.set_height(index, Lerp::lerp(&current, &average, weight));
                }
                ToolKind::Paint => {}
            }
            if let Some(cell) = terrain.store.cell(index) {
                self.invalidator.mark_cell_dirty(cell.chunk_memberships());
            }
        }

        let chunks = self.invalidator.take_dirty_chunks();
        for &id in &chunks {
            if let Err(e) = terrain.mesh.rebuild_chunk(id, &terrain.store) {
                log::warn!("Skipping chunk rebuild: {}", e);
            }
        }
        log::debug!(
            "{:?} brush touched {} cells, rebuilt {} chunks",
            tool,
            footprint.len(),
            chunks.len()
        );

        EditReport {
            cells_modified: footprint.len(),
            chunks_rebuilt: chunks,
        }
    }

    /// Blend colors under a circular brush towards `color`.
    ///
    /// The blend factor is the distance falloff alone; `_strength` is
    /// already folded into the stroke by the caller's frame timing.
    pub fn apply_color_tool(
        &mut self,
        center: Vec2,
        radius: f32,
        _strength: f32,
        color: Rgba,
    ) -> EditReport {
        let Some(terrain) = self.terrain.as_mut() else {
            return EditReport::default();
        };

        let footprint = brush_footprint(&terrain.grid, center, radius);
        for &(index, weight) in &footprint {
            let Some(current) = terrain.store.color(index) else {
                continue;
            };
            let blended = current.lerp_clamped(&color, weight);
            terrain.store.set_color(index, blended);
            terrain.texture.set_texel(index, blended);
        }
        if !footprint.is_empty() {
            terrain.texture.mark_dirty();
        }

        EditReport {
            cells_modified: footprint.len(),
            chunks_rebuilt: Vec::new(),
        }
    }

    /// Advance the brush by one host frame.
    ///
    /// While the pointer is pressed the selected tool is applied with its
    /// strength scaled by the clamped frame delta.
    pub fn tick(&mut self, input: &BrushInput, brush: &BrushSettings, delta_secs: f32) -> EditReport {
        if !input.pressed {
            if self.state == EditState::Editing {
                log::debug!("Brush released");
            }
            self.state = EditState::Idle;
            return EditReport::default();
        }
        if self.state == EditState::Idle {
            log::debug!("Brush pressed with {:?}", brush.tool);
        }
        self.state = EditState::Editing;

        let strength = brush.strength * clamp_delta(delta_secs);
        match brush.tool {
            ToolKind::Paint => {
                self.apply_color_tool(input.world_position, brush.size, strength, brush.color)
            }
            tool => self.apply_height_tool(input.world_position, brush.size, strength, tool),
        }
    }
}

/// Mean height of the existing cells in the 3x3 block around `index`.
fn neighborhood_average(grid: &Grid, store: &VertexStore, index: usize) -> f32 {
    let (col, row) = grid.coords_of(index);
    let (mut sum, mut count) = (0.0f32, 0u32);
    for dr in -1..=1 {
        for dc in -1..=1 {
            let neighbor = grid
                .checked_index(col as i32 + dc, row as i32 + dr)
                .and_then(|i| store.height(i));
            if let Some(h) = neighbor {
                sum += h;
                count += 1;
            }
        }
    }
    if count == 0 { 0.0 } else { sum / count as f32 }
}
