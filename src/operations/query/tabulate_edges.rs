use std::collections::HashSet;

use crate::error::{Result, TopologyError};
use crate::topology::{EdgeId, ShellId, TopologyStore};

/// Lists the distinct edges of a shell.
///
/// Edges are returned in the order they are first met walking the shell's
/// faces and their loops, so the result is reproducible for a given shell.
pub struct TabulateEdges {
    shell: ShellId,
}

impl TabulateEdges {
    /// Creates a new `TabulateEdges` query.
    #[must_use]
    pub fn new(shell: ShellId) -> Self {
        Self { shell }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell is missing or a face loop step has no
    /// edge.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<EdgeId>> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for &face in &store.shell(self.shell)?.faces {
            for (a, b) in store.face(face)?.loop_edges() {
                if a == b {
                    continue;
                }
                let edge = store
                    .find_edge(a, b)
                    .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))?;
                if seen.insert(edge) {
                    edges.push(edge);
                }
            }
        }
        Ok(edges)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::{MakeFace, MakeRegion};
    use crate::topology::EndPoint;

    #[test]
    fn two_triangles_have_five_edges() {
        let mut store = TopologyStore::new();
        let (_, shell) = MakeRegion::new().execute(&mut store);
        let first = MakeFace::new(
            shell,
            vec![
                EndPoint::new(Point3::new(0.0, 0.0, 0.0)),
                EndPoint::new(Point3::new(1.0, 0.0, 0.0)),
                EndPoint::new(Point3::new(1.0, 1.0, 0.0)),
            ],
            1e-6,
        )
        .execute(&mut store)
        .unwrap();
        MakeFace::new(
            shell,
            vec![
                first.corners[0],
                first.corners[2],
                EndPoint::new(Point3::new(0.0, 1.0, 0.0)),
            ],
            1e-6,
        )
        .execute(&mut store)
        .unwrap();

        let edges = TabulateEdges::new(shell).execute(&store).unwrap();
        assert_eq!(edges.len(), 5);
        assert_eq!(edges, TabulateEdges::new(shell).execute(&store).unwrap());
    }
}
