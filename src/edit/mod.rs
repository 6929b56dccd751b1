//! Interactive terrain editing.
//!
//! Brush strokes mutate the vertex store in place and rebuild only the mesh
//! chunks the touched cells belong to.

pub mod tool;
pub mod invalidator;
pub mod texture;
pub mod system;

pub use tool::{BrushInput, BrushSettings, EditState, ToolKind};
pub use invalidator::ChunkInvalidator;
pub use texture::ColorTexture;
pub use system::{EditReport, TerrainSystem, brush_footprint};
