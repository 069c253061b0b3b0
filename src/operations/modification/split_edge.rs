use crate::error::{Result, TopologyError};
use crate::math::Point3;
use crate::topology::{TopologyStore, VertexData, VertexId};

/// Splits the edge between two vertices by inserting a new vertex.
///
/// Every face using the edge gets the new vertex spliced into its loop, so
/// neighboring faces stay connected. Face planes are left untouched; the
/// point is expected to lie on the edge.
pub struct SplitEdge {
    start: VertexId,
    end: VertexId,
    point: Point3,
}

impl SplitEdge {
    /// Creates a new `SplitEdge` operation.
    #[must_use]
    pub fn new(start: VertexId, end: VertexId, point: Point3) -> Self {
        Self { start, end, point }
    }

    /// Executes the split, returning the new vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if no edge joins the two vertices.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<VertexId> {
        let edge = store
            .find_edge(self.start, self.end)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))?;
        let mut faces = store.edge(edge)?.faces.clone();
        faces.dedup();

        let vertex = store.add_vertex(VertexData::new(self.point));
        for face in faces {
            let old = store.face(face)?.vertices.clone();
            let n = old.len();
            let mut spliced = Vec::with_capacity(n + 1);
            for i in 0..n {
                let (a, b) = (old[i], old[(i + 1) % n]);
                spliced.push(a);
                if (a == self.start && b == self.end) || (a == self.end && b == self.start) {
                    spliced.push(vertex);
                }
            }
            store.set_face_loop(face, spliced)?;
            if let Some(bounds) = store.face_mut(face)?.bounds.as_mut() {
                bounds.expand_point(&self.point);
            }
        }
        Ok(vertex)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::{MakeFace, MakeRegion};
    use crate::topology::EndPoint;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn split_updates_both_faces() {
        let mut store = TopologyStore::new();
        let (_, shell) = MakeRegion::new().execute(&mut store);
        let first = MakeFace::new(
            shell,
            vec![
                EndPoint::new(p(0.0, 0.0, 0.0)),
                EndPoint::new(p(2.0, 0.0, 0.0)),
                EndPoint::new(p(2.0, 2.0, 0.0)),
            ],
            1e-6,
        )
        .execute(&mut store)
        .unwrap();
        let second = MakeFace::new(
            shell,
            vec![first.corners[0], first.corners[2], EndPoint::new(p(0.0, 2.0, 0.0))],
            1e-6,
        )
        .execute(&mut store)
        .unwrap();

        let a = first.corners[0].vertex.unwrap();
        let c = first.corners[2].vertex.unwrap();
        let mid = SplitEdge::new(a, c, p(1.0, 1.0, 0.0))
            .execute(&mut store)
            .unwrap();

        assert!(store.find_edge(a, c).is_none());
        assert_eq!(store.edge(store.find_edge(a, mid).unwrap()).unwrap().faces.len(), 2);
        assert_eq!(store.edge(store.find_edge(mid, c).unwrap()).unwrap().faces.len(), 2);
        for face in [first.face.unwrap(), second.face.unwrap()] {
            assert_eq!(store.face(face).unwrap().vertices.len(), 4);
        }
        assert_eq!(store.vertex(mid).unwrap().faces.len(), 2);
    }

    #[test]
    fn missing_edge_is_error() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(VertexData::new(p(0.0, 0.0, 0.0)));
        let b = store.add_vertex(VertexData::new(p(1.0, 0.0, 0.0)));
        assert!(SplitEdge::new(a, b, p(0.5, 0.0, 0.0)).execute(&mut store).is_err());
    }
}
