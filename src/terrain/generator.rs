//! Noise-based heightmap generation
//!
//! Heights are built from seeded multi-octave Perlin noise, normalized over
//! the whole grid, attenuated by a square radial falloff mask and finally
//! remapped through a [`ResponseCurve`].

use glam::Vec2;
use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use super::curve::ResponseCurve;
use super::grid::GridDimensions;

/// Range of the per-octave random sample offset.
const OCTAVE_OFFSET_RANGE: f32 = 100.0;

/// Parameters controlling heightmap generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightMapParams {
    pub seed: i32,
    pub scale: f32,        // Horizontal noise scale
    pub octaves: u32,      // Noise layers (at least one is always sampled)
    pub persistence: f32,  // Amplitude multiplier per octave
    pub lacunarity: f32,   // Frequency multiplier per octave
    pub falloff_strength: f32,
    pub falloff_ramp: f32,
    pub falloff_range: f32,
    pub offset: Vec2,      // Sample offset in grid cells
    pub height_multiplier: f32,
}

impl Default for HeightMapParams {
    fn default() -> Self {
        Self {
            seed: 1,
            scale: 25.0,
            octaves: 10,
            persistence: 0.25,
            lacunarity: 3.0,
            falloff_strength: 1.0,
            falloff_ramp: 3.0,
            falloff_range: 2.0,
            offset: Vec2::ZERO,
            height_multiplier: 25.0,
        }
    }
}

/// Fractal noise heightmap generator
pub struct HeightMapGenerator {
    params: HeightMapParams,
    noise: Perlin,
    octave_offsets: Vec<Vec2>,
}

impl HeightMapGenerator {
    /// Create a generator. Octave offsets are drawn from a generator seeded
    /// with `params.seed`, so identical params give identical output.
    pub fn new(params: HeightMapParams) -> Self {
        let mut rng = Pcg64Mcg::seed_from_u64(params.seed as i64 as u64);
        let octave_offsets = (0..params.octaves.max(1))
            .map(|_| {
                let x = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
                let y = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
                Vec2::new(x, y)
            })
            .collect();

        Self {
            noise: Perlin::new(params.seed as u32),
            params,
            octave_offsets,
        }
    }

    pub fn params(&self) -> &HeightMapParams {
        &self.params
    }

    pub fn octave_offsets(&self) -> &[Vec2] {
        &self.octave_offsets
    }

    /// Raw fractal noise at a grid cell, before normalization.
    pub fn raw_noise_at(&self, col: u32, row: u32, dims: GridDimensions) -> f32 {
        let w = dims.width as f32;
        let h = dims.height as f32;
        let x_pos = ((col as f32 + self.params.offset.x) - w / 2.0) / w;
        let y_pos = ((row as f32 + self.params.offset.y) - h / 2.0) / h;

        let mut amplitude = 1.0f32;
        let mut frequency = 1.0f32;
        let mut value = 0.0f32;
        for offset in &self.octave_offsets {
            let sample_x = frequency * self.params.scale * x_pos + offset.x;
            let sample_y = frequency * self.params.scale * y_pos + offset.y;
            let n = self.noise.get([sample_x as f64, sample_y as f64]) as f32;
            value += n * amplitude;

            amplitude *= self.params.persistence;
            frequency *= self.params.lacunarity;
        }
        value
    }

    /// Falloff multiplier at a grid cell, 1 at the center shrinking towards
    /// the edges.
    pub fn falloff_at(&self, col: u32, row: u32, dims: GridDimensions) -> f32 {
        falloff(
            col,
            row,
            dims,
            self.params.falloff_strength,
            self.params.falloff_ramp,
            self.params.falloff_range,
        )
    }

    /// Generate a row-major height map for `dims`.
    pub fn generate(&self, dims: GridDimensions, curve: &impl ResponseCurve) -> Vec<f32> {
        let dims = dims.clamped();
        let mut heights = Vec::with_capacity(dims.cell_count());

        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for row in 0..dims.height {
            for col in 0..dims.width {
                let value = self.raw_noise_at(col, row, dims);
                min = min.min(value);
                max = max.max(value);
                heights.push(value);
            }
        }

        for row in 0..dims.height {
            for col in 0..dims.width {
                let idx = row as usize * dims.width as usize + col as usize;
                let normalized = normalize(heights[idx], min, max);
                let masked = self.falloff_at(col, row, dims) * normalized;
                heights[idx] = self.params.height_multiplier * curve.evaluate(masked);
            }
        }

        log::debug!(
            "Generated {}x{} heightmap (seed {}, raw noise range {:.3}..{:.3})",
            dims.width, dims.height, self.params.seed, min, max
        );
        heights
    }
}

/// Map `value` from `[min, max]` into `[0, 1]`. A flat range maps to zero.
pub fn normalize(value: f32, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range != 0.0 && range.is_finite() {
        (value - min) / range
    } else {
        0.0
    }
}

/// Square radial falloff mask.
///
/// `value` is the Chebyshev distance from the grid center in [0, 1].
/// Returns `1 - strength * a / (a + b)` with `a = value^ramp` and
/// `b = (range - range * value)^ramp`, or 1 when `a + b` is zero.
pub fn falloff(col: u32, row: u32, dims: GridDimensions, strength: f32, ramp: f32, range: f32) -> f32 {
    let dx = (col as f32 / dims.width as f32 * 2.0 - 1.0).abs();
    let dy = (row as f32 / dims.height as f32 * 2.0 - 1.0).abs();
    let value = dx.max(dy);

    let a = value.powf(ramp);
    let b = (range - range * value).powf(ramp);
    let sum = a + b;
    if sum != 0.0 && sum.is_finite() {
        1.0 - strength * a / sum
    } else {
        1.0
    }
}
