use tracing::debug;

use crate::error::Result;
use crate::geometry::{Aabb, Plane};
use crate::math::Point3;
use crate::topology::{ShellId, TopologyStore, VertexId};

/// Moves a vertex and keeps everything that depends on it consistent.
///
/// Each face using the vertex gets its plane refitted and its bounds
/// recomputed; the owning shells and regions have their bounds grown to
/// include the new face bounds. A face whose refit fails keeps its
/// previous plane.
pub struct MoveVertex {
    vertex: VertexId,
    to: Point3,
    min_area: f64,
}

impl MoveVertex {
    /// Creates a new `MoveVertex` operation.
    #[must_use]
    pub fn new(vertex: VertexId, to: Point3, min_area: f64) -> Self {
        Self {
            vertex,
            to,
            min_area,
        }
    }

    /// Executes the move, returning the vertex's previous position.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex does not exist or a dependent face
    /// references a vertex without geometry.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<Option<Point3>> {
        let vertex = store.vertex_mut(self.vertex)?;
        let previous = vertex.point.replace(self.to);
        let faces = vertex.faces.clone();

        let mut shells: Vec<ShellId> = Vec::new();
        for face in faces {
            let points = store.face_points(face)?;
            let refit = Plane::fit(&points, self.min_area);
            let data = store.face_mut(face)?;
            match refit {
                Ok(plane) => data.plane = Some(plane),
                Err(err) => debug!(?face, %err, "keeping previous plane"),
            }
            data.bounds = Aabb::from_points(&points);
            let (shell, bounds) = (data.shell, data.bounds);

            let shell_data = store.shell_mut(shell)?;
            shell_data.bounds = Aabb::union(shell_data.bounds, bounds);
            if !shells.contains(&shell) {
                shells.push(shell);
            }
        }

        for shell in shells {
            let shell_data = store.shell(shell)?;
            let (region, bounds) = (shell_data.region, shell_data.bounds);
            let region_data = store.region_mut(region)?;
            region_data.bounds = Aabb::union(region_data.bounds, bounds);
        }
        Ok(previous)
    }
}
