use tracing::{debug, warn};

use crate::error::Result;
use crate::math::{strictly_between, Tolerance};
use crate::operations::modification::{SplitEdge, TriangulateFace};
use crate::operations::query::TabulateEdges;
use crate::topology::{ShellId, TopologyStore, VertexId};

use super::grid::SamplingGrid;

/// Vertices eligible for shrink-wrap correction, in insertion order.
///
/// Each vertex leaves the set once a refinement ray has matched it, so no
/// vertex is examined twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexSet {
    vertices: Vec<VertexId>,
}

impl VertexSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, vertex: VertexId) {
        if !self.vertices.contains(&vertex) {
            self.vertices.push(vertex);
        }
    }

    /// Removes `vertex`, returning whether it was present.
    pub fn remove(&mut self, vertex: VertexId) -> bool {
        match self.vertices.iter().position(|&v| v == vertex) {
            Some(pos) => {
                self.vertices.remove(pos);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.iter().copied()
    }
}

/// Result of [`subdivide_edges`].
#[derive(Debug, Clone, Default)]
pub struct Subdivision {
    /// The inserted vertices.
    pub vertices: VertexSet,
    /// Faces that could not be triangulated and were left as polygons.
    pub failed_triangulations: usize,
}

/// Splits every edge running along the primary axis at each primary grid
/// level strictly between its ends, then triangulates the shell.
///
/// # Errors
///
/// Returns an error if the store is inconsistent.
pub fn subdivide_edges(
    store: &mut TopologyStore,
    shell: ShellId,
    grid: &SamplingGrid,
    tolerance: &Tolerance,
) -> Result<Subdivision> {
    let primary = grid.primary();
    let a_idx = primary.index();
    let (u, v) = grid.grid_axes();
    let mut out = Subdivision::default();

    for edge in TabulateEdges::new(shell).execute(store)? {
        let Ok(data) = store.edge(edge) else { continue };
        let (start, end) = (data.start, data.end);
        let (pa, pb) = (store.vertex_point(start)?, store.vertex_point(end)?);
        if !tolerance.near_zero(pa[u.index()] - pb[u.index()])
            || !tolerance.near_zero(pa[v.index()] - pb[v.index()])
        {
            continue;
        }

        let mut levels: Vec<f64> = grid
            .levels(primary)
            .filter(|&y| strictly_between(y, pa[a_idx], pb[a_idx], tolerance.dist))
            .collect();
        if pa[a_idx] > pb[a_idx] {
            levels.reverse();
        }

        let mut from = start;
        for level in levels {
            let mut point = pa;
            point[a_idx] = level;
            match SplitEdge::new(from, end, point).execute(store) {
                Ok(inserted) => {
                    out.vertices.insert(inserted);
                    from = inserted;
                }
                Err(err) => {
                    warn!(?edge, %err, "could not split edge");
                    break;
                }
            }
        }
    }
    debug!(inserted = out.vertices.len(), "edges subdivided");

    let faces = store.shell(shell)?.faces.clone();
    for face in faces {
        if let Err(err) = TriangulateFace::new(face, tolerance.dist_sq).execute(store) {
            warn!(?face, %err, "leaving face untriangulated");
            out.failed_triangulations += 1;
        }
    }

    Ok(out)
}
