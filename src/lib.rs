//! Terrasculpt - heightmap terrain generation and low-poly sculpting

pub mod core;
pub mod terrain;
pub mod mesh;
pub mod edit;
