use std::fmt;

use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::Aabb;
use crate::topology::{ShellId, TopologyStore, VertexId};

/// Topology summary of a shell.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellReport {
    /// Number of distinct vertices used by the shell's faces.
    pub vertex_count: usize,
    /// Number of faces in the shell.
    pub face_count: usize,
    /// Number of distinct edges.
    pub edge_count: usize,
    /// Edges used by exactly one face.
    pub boundary_edge_count: usize,
    /// Edges used by more than two faces.
    pub non_manifold_edge_count: usize,
    /// Two-use edges traversed in the same direction by both faces.
    pub misoriented_edge_count: usize,
    /// Bounds of the shell.
    pub bounds: Option<Aabb>,
}

impl ShellReport {
    /// `true` if no edge is a boundary edge.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.boundary_edge_count == 0
    }

    /// `true` if every edge has at most two uses.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// `true` for a non-empty, watertight, manifold and consistently
    /// oriented shell.
    #[must_use]
    pub fn is_closed_manifold(&self) -> bool {
        self.face_count > 0
            && self.is_watertight()
            && self.is_manifold()
            && self.misoriented_edge_count == 0
    }
}

impl fmt::Display for ShellReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shell Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        if let Some(b) = &self.bounds {
            writeln!(
                f,
                "  Bounds: [{:.3}, {:.3}, {:.3}] to [{:.3}, {:.3}, {:.3}]",
                b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
            )?;
        }
        writeln!(
            f,
            "  Watertight: {} (boundary edges: {})",
            if self.is_watertight() { "yes" } else { "NO" },
            self.boundary_edge_count
        )?;
        writeln!(
            f,
            "  Manifold: {} (non-manifold edges: {}, misoriented: {})",
            if self.is_manifold() { "yes" } else { "NO" },
            self.non_manifold_edge_count,
            self.misoriented_edge_count
        )
    }
}

/// Checks the edge-use structure of a shell.
pub struct ValidateShell {
    shell: ShellId,
}

impl ValidateShell {
    /// Creates a new `ValidateShell` query.
    #[must_use]
    pub fn new(shell: ShellId) -> Self {
        Self { shell }
    }

    /// Executes the validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell or one of its faces is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<ShellReport> {
        let shell = store.shell(self.shell)?;
        let edges = super::TabulateEdges::new(self.shell).execute(store)?;

        let mut vertices: Vec<VertexId> = Vec::new();
        for &face in &shell.faces {
            vertices.extend(&store.face(face)?.vertices);
        }
        vertices.sort_unstable();
        vertices.dedup();

        let mut boundary = 0;
        let mut non_manifold = 0;
        let mut misoriented = 0;
        for &edge in &edges {
            let data = store.edge(edge)?;
            match data.faces.len() {
                1 => boundary += 1,
                2 => {
                    let forward = |face| -> Result<bool> {
                        Ok(store
                            .face(face)?
                            .loop_edges()
                            .any(|(a, b)| a == data.start && b == data.end))
                    };
                    if forward(data.faces[0])? == forward(data.faces[1])? {
                        misoriented += 1;
                    }
                }
                _ => non_manifold += 1,
            }
        }

        let report = ShellReport {
            vertex_count: vertices.len(),
            face_count: shell.faces.len(),
            edge_count: edges.len(),
            boundary_edge_count: boundary,
            non_manifold_edge_count: non_manifold,
            misoriented_edge_count: misoriented,
            bounds: shell.bounds,
        };

        if !report.is_watertight() {
            warn!(boundary_edges = boundary, "shell is not watertight");
        }
        if !report.is_manifold() {
            warn!(non_manifold_edges = non_manifold, "shell is not manifold");
        }
        debug!("{report}");
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::{MakeFace, MakeRegion};
    use crate::topology::EndPoint;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Closed tetrahedron with outward winding.
    fn tetra(store: &mut TopologyStore) -> ShellId {
        let (_, shell) = MakeRegion::new().execute(store);
        let mut corners = vec![
            EndPoint::new(p(0.0, 0.0, 0.0)),
            EndPoint::new(p(1.0, 0.0, 0.0)),
            EndPoint::new(p(0.0, 1.0, 0.0)),
            EndPoint::new(p(0.0, 0.0, 1.0)),
        ];
        for [a, b, c] in [[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]] {
            let built = MakeFace::new(shell, vec![corners[a], corners[b], corners[c]], 1e-9)
                .execute(store)
                .unwrap();
            corners[a] = built.corners[0];
            corners[b] = built.corners[1];
            corners[c] = built.corners[2];
        }
        shell
    }

    #[test]
    fn tetrahedron_is_closed() {
        let mut store = TopologyStore::new();
        let shell = tetra(&mut store);
        let report = ValidateShell::new(shell).execute(&store).unwrap();
        assert_eq!(report.vertex_count, 4);
        assert_eq!(report.edge_count, 6);
        assert_eq!(report.face_count, 4);
        assert!(report.is_closed_manifold(), "{report}");
    }

    #[test]
    fn open_shell_reports_boundary() {
        let mut store = TopologyStore::new();
        let shell = tetra(&mut store);
        let last = *store.shell(shell).unwrap().faces.last().unwrap();
        store.detach_face(last).unwrap();
        let report = ValidateShell::new(shell).execute(&store).unwrap();
        assert_eq!(report.boundary_edge_count, 3);
        assert!(!report.is_watertight());
        assert!(report.to_string().contains("Watertight: NO"));
    }
}
