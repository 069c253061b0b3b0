use std::collections::HashMap;

use crate::error::{Result, TessellationError};
use crate::math::polygon_3d::newell_normal;
use crate::math::Vector3;
use crate::topology::{ShellId, TopologyStore, VertexId};

use super::TriangleMesh;

/// Flattens a shell into a shared-vertex triangle mesh.
///
/// Each topological vertex becomes one mesh vertex, so the mesh keeps the
/// shell's connectivity. Faces with more than three vertices are fanned.
/// Vertex normals are the area-weighted average of the adjacent face normals.
pub struct TessellateShell {
    shell: ShellId,
}

impl TessellateShell {
    /// Creates a new `TessellateShell` operation.
    #[must_use]
    pub fn new(shell: ShellId) -> Self {
        Self { shell }
    }

    /// Executes the tessellation.
    ///
    /// # Errors
    ///
    /// Returns an error if a face references a vertex without geometry or
    /// the mesh would exceed `u32` indexing.
    pub fn execute(&self, store: &TopologyStore) -> Result<TriangleMesh> {
        let mut mesh = TriangleMesh::default();
        let mut index_of: HashMap<VertexId, u32> = HashMap::new();

        for &face in &store.shell(self.shell)?.faces {
            let loop_ids = store.face(face)?.vertices.clone();
            let mut indices = Vec::with_capacity(loop_ids.len());
            for v in loop_ids {
                let idx = if let Some(&existing) = index_of.get(&v) {
                    existing
                } else {
                    let new_idx = u32::try_from(mesh.vertices.len()).map_err(|_| {
                        TessellationError::Failed("mesh exceeds u32 vertex indices".into())
                    })?;
                    mesh.vertices.push(store.vertex_point(v)?);
                    mesh.normals.push(Vector3::zeros());
                    index_of.insert(v, new_idx);
                    new_idx
                };
                indices.push(idx);
            }

            let points: Vec<_> = indices.iter().map(|&i| mesh.vertices[i as usize]).collect();
            let weighted = newell_normal(&points);
            for &i in &indices {
                mesh.normals[i as usize] += weighted;
            }
            for k in 1..indices.len().saturating_sub(1) {
                mesh.indices.push([indices[0], indices[k], indices[k + 1]]);
            }
        }

        for n in &mut mesh.normals {
            if let Some(unit) = n.try_normalize(f64::EPSILON) {
                *n = unit;
            }
        }
        Ok(mesh)
    }
}
