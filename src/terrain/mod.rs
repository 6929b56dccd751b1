//! Heightmap generation, biotope coloring and grid addressing

pub mod grid;
pub use grid::{Grid, GridDimensions, WorldExtent};

pub mod curve;
pub use curve::{KeyframeCurve, LinearCurve, ResponseCurve};

pub mod generator;
pub use generator::{HeightMapGenerator, HeightMapParams};

pub mod biotope;
pub use biotope::{Biotope, BiotopeSet};

pub mod config;
pub use config::{FilterMode, TerrainConfig};
