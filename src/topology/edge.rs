use super::face::FaceId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the topology store.
    pub struct EdgeId;
}

/// Data associated with a topological edge.
///
/// Edges are undirected: `start` and `end` are stored in canonical
/// (ascending key) order, and every face whose loop traverses the pair in
/// either direction is recorded as a use.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Start vertex of the edge.
    pub start: VertexId,
    /// End vertex of the edge.
    pub end: VertexId,
    /// Faces using this edge. A closed 2-manifold has exactly two per edge.
    pub faces: Vec<FaceId>,
}

impl EdgeData {
    /// Canonical key for the unordered vertex pair `(a, b)`.
    #[must_use]
    pub fn key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Returns the endpoint opposite `v`, or `None` if `v` is not an endpoint.
    #[must_use]
    pub fn other(&self, v: VertexId) -> Option<VertexId> {
        if v == self.start {
            Some(self.end)
        } else if v == self.end {
            Some(self.start)
        } else {
            None
        }
    }
}
