use crate::geometry::{Aabb, Plane};

use super::shell::ShellId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
}

/// Data associated with a topological face.
///
/// A face is a single planar loop of vertices, wound counter-clockwise
/// when seen from outside the shell.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The shell this face belongs to.
    pub shell: ShellId,
    /// The boundary loop.
    pub vertices: Vec<VertexId>,
    /// Fitted supporting plane; `None` until geometry has been computed.
    pub plane: Option<Plane>,
    /// Bounds of the loop's vertices.
    pub bounds: Option<Aabb>,
}

impl FaceData {
    /// Consecutive vertex pairs of the loop, closing back to the first vertex.
    pub fn loop_edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}
