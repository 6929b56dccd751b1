//! Flat-shaded, chunked terrain mesh

pub mod store;
pub use store::{VertexCell, VertexStore};

pub mod chunk;
pub use chunk::{ChunkVertex, MeshChunk};

pub mod builder;
pub use builder::{ChunkedMesh, MeshBuilder};
