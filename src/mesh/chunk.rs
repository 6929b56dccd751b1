//! Bounded-size mesh partitions handed to the display surface.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Interleaved vertex layout for upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ChunkVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// One slice of the flattened terrain mesh.
///
/// Every vertex is unique to its triangle, so `triangles[i] == i` and the
/// normals are per face.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshChunk {
    pub id: u32,
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub triangles: Vec<u32>,
    pub uvs: Vec<Vec2>,
}

impl MeshChunk {
    pub fn new(id: u32, vertices: Vec<Vec3>, triangles: Vec<u32>, uvs: Vec<Vec2>) -> Self {
        let mut chunk = Self {
            id,
            vertices,
            normals: Vec::new(),
            triangles,
            uvs,
        };
        chunk.recalculate_normals();
        chunk
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Replace the vertex positions and refresh normals.
    pub fn set_vertices(&mut self, vertices: &[Vec3]) {
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
        self.recalculate_normals();
    }

    /// Recompute per-face normals for every triangle in the chunk.
    pub fn recalculate_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.vertices.len(), Vec3::ZERO);
        for tri in self.triangles.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let (Some(&va), Some(&vb), Some(&vc)) =
                (self.vertices.get(a), self.vertices.get(b), self.vertices.get(c))
            else {
                continue;
            };
            let normal = face_normal(va, vb, vc);
            self.normals[a] = normal;
            self.normals[b] = normal;
            self.normals[c] = normal;
        }
    }

    /// Positions, normals and uvs interleaved for upload.
    pub fn interleaved(&self) -> Vec<ChunkVertex> {
        self.vertices
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| ChunkVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: uv.to_array(),
            })
            .collect()
    }
}

/// Unit normal of triangle `(a, b, c)`; zero for degenerate triangles.
///
/// Winding follows the terrain triangulation so that flat ground faces +Y.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_quad() -> MeshChunk {
        // a=(0,0) b=(0,1) c=(1,0) d=(1,1) as (x,z), triangles a-d-c and d-a-b
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 0.0, 1.0);
        let c = Vec3::new(1.0, 0.0, 0.0);
        let d = Vec3::new(1.0, 0.0, 1.0);
        MeshChunk::new(0, vec![a, d, c, d, a, b], (0..6).collect(), vec![Vec2::ZERO; 6])
    }

    #[test]
    fn test_flat_ground_faces_up() {
        let chunk = flat_quad();
        assert_eq!(chunk.triangle_count(), 2);
        for n in &chunk.normals {
            assert_eq!(*n, Vec3::Y);
        }
    }

    #[test]
    fn test_faces_get_independent_normals() {
        let mut chunk = flat_quad();
        let mut vertices = chunk.vertices.clone();
        // raise corner b, which only belongs to the second triangle
        vertices[5].y = 1.0;
        chunk.set_vertices(&vertices);
        assert_eq!(chunk.normals[0], Vec3::Y);
        assert_ne!(chunk.normals[3], Vec3::Y);
        assert_eq!(chunk.normals[3], chunk.normals[5]);
        assert!((chunk.normals[3].length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_triangle_has_zero_normal() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(face_normal(p, p, p), Vec3::ZERO);
    }

    #[test]
    fn test_interleaved_is_pod() {
        let chunk = flat_quad();
        let interleaved = chunk.interleaved();
        assert_eq!(interleaved.len(), 6);
        assert_eq!(interleaved[1].position, [1.0, 0.0, 1.0]);
        assert_eq!(interleaved[1].normal, [0.0, 1.0, 0.0]);
        let bytes: &[u8] = bytemuck::cast_slice(&interleaved);
        assert_eq!(bytes.len(), 6 * std::mem::size_of::<ChunkVertex>());
        assert_eq!(std::mem::size_of::<ChunkVertex>(), 32);
    }
}
