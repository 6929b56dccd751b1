//! Terrain configuration surface.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::biotope::Biotope;
use super::curve::KeyframeCurve;
use super::generator::HeightMapParams;
use super::grid::GridDimensions;
use crate::core::Result;
use crate::edit::tool::BrushSettings;

/// Texture sampling mode handed to the display surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    Point,
    Bilinear,
    #[default]
    Trilinear,
}

/// Everything needed to build and edit a terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World units spanned by the terrain, centered at the origin
    pub world_size: Vec2,
    /// Grid vertices per axis (at least 2)
    pub resolution: GridDimensions,
    /// Maximum vertices per mesh chunk
    pub chunk_size: u32,
    /// Biotope cross-fade amount in [0, 1]
    pub interpolation: f32,
    pub filter_mode: FilterMode,
    pub biotopes: Vec<Biotope>,
    pub generator: HeightMapParams,
    pub height_curve: KeyframeCurve,
    pub brush: BrushSettings,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            world_size: Vec2::new(500.0, 500.0),
            resolution: GridDimensions::default(),
            chunk_size: 6000,
            interpolation: 0.5,
            filter_mode: FilterMode::default(),
            biotopes: Vec::new(),
            generator: HeightMapParams::default(),
            height_curve: KeyframeCurve::default(),
            brush: BrushSettings::default(),
        }
    }
}

impl TerrainConfig {
    /// Load a JSON config. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: TerrainConfig = serde_json::from_str(&text)?;
        Ok(config.sanitized())
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), text)?;
        Ok(())
    }

    /// Copy with structural values clamped to their legal ranges.
    pub fn sanitized(mut self) -> Self {
        let resolution = self.resolution.clamped();
        if resolution != self.resolution {
            log::warn!(
                "Resolution {}x{} clamped to {}x{}",
                self.resolution.width, self.resolution.height, resolution.width, resolution.height
            );
            self.resolution = resolution;
        }
        self.interpolation = if self.interpolation.is_nan() {
            0.0
        } else {
            self.interpolation.clamp(0.0, 1.0)
        };
        if let Some(first) = self.biotopes.first_mut() {
            first.start_height = 0.0;
        }
        if let Some(last) = self.biotopes.last_mut() {
            last.end_height = 1.0;
        }
        self
    }
}
