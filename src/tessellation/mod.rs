//! Export of shells as indexed triangle meshes.

mod tessellate_shell;

pub use tessellate_shell::TessellateShell;

use crate::geometry::Aabb;
use crate::math::{Point3, Vector3};

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Bounds of all vertices, or `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Signed enclosed volume; positive for outward-wound closed meshes.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.indices
            .iter()
            .map(|&[a, b, c]| {
                let (v0, v1, v2) = (
                    self.vertices[a as usize].coords,
                    self.vertices[b as usize].coords,
                    self.vertices[c as usize].coords,
                );
                v0.dot(&v1.cross(&v2)) / 6.0
            })
            .sum()
    }
}
