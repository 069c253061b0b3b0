use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};
use tracing::warn;

use crate::error::{Result, TessellationError};
use crate::geometry::{Aabb, Plane};
use crate::math::polygon_3d::{newell_normal, AxisProjection};
use crate::topology::{FaceId, TopologyStore, VertexId};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Replaces a polygonal face by triangles over the same vertices.
///
/// The loop is projected onto the coordinate plane facing its normal and
/// triangulated with a constrained Delaunay triangulation, so loops with
/// collinear runs (split edges) and concave outlines are handled. The
/// original face ID is kept for the first triangle; the rest are new faces
/// in the same shell, all wound like the original loop. Triangles too thin
/// to fit a plane inherit the original plane.
pub struct TriangulateFace {
    face: FaceId,
    min_area: f64,
}

impl TriangulateFace {
    /// Creates a new `TriangulateFace` operation.
    #[must_use]
    pub fn new(face: FaceId, min_area: f64) -> Self {
        Self { face, min_area }
    }

    /// Executes the triangulation, returning all resulting faces.
    ///
    /// # Errors
    ///
    /// Returns an error if a loop vertex has no geometry, two loop vertices
    /// project onto the same point, or the loop crosses itself.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<Vec<FaceId>> {
        let face = store.face(self.face)?;
        if face.vertices.len() == 3 {
            return Ok(vec![self.face]);
        }
        let loop_ids = face.vertices.clone();
        let (shell, parent_plane) = (face.shell, face.plane.clone());
        let points = store.face_points(self.face)?;

        let projection = AxisProjection::for_normal(&newell_normal(&points));
        let projected: Vec<_> = points
            .iter()
            .map(|q| {
                let (u, v) = projection.project(q);
                SpadePoint2::new(u, v)
            })
            .collect();

        let mut cdt = Cdt::new();
        let handles = insert_constraint_loop(&mut cdt, &projected)?;
        let by_handle: HashMap<usize, VertexId> = handles
            .iter()
            .zip(&loop_ids)
            .map(|(h, &v)| (h.index(), v))
            .collect();
        if by_handle.len() != loop_ids.len() {
            return Err(TessellationError::Failed(
                "loop vertices coincide in projection".into(),
            )
            .into());
        }

        let interior = classify_interior_faces(&cdt);
        let mut triangles: Vec<Vec<VertexId>> = Vec::new();
        for face_handle in cdt.inner_faces() {
            if !interior.contains(&face_handle.fix().index()) {
                continue;
            }
            let tri: Option<Vec<VertexId>> = face_handle
                .vertices()
                .iter()
                .map(|vh| by_handle.get(&vh.fix().index()).copied())
                .collect();
            if let Some(tri) = tri {
                triangles.push(tri);
            }
        }
        if triangles.is_empty() {
            return Err(TessellationError::Failed("no interior triangles".into()).into());
        }
        if triangles.len() != loop_ids.len() - 2 {
            warn!(
                face = ?self.face,
                triangles = triangles.len(),
                vertices = loop_ids.len(),
                "unexpected triangle count"
            );
        }

        let mut result = Vec::with_capacity(triangles.len());
        for (i, tri) in triangles.into_iter().enumerate() {
            let id = if i == 0 {
                store.set_face_loop(self.face, tri)?;
                self.face
            } else {
                store.attach_face(shell, tri)?
            };
            let tri_points = store.face_points(id)?;
            let data = store.face_mut(id)?;
            data.plane = Plane::fit(&tri_points, self.min_area)
                .ok()
                .or_else(|| parent_plane.clone());
            data.bounds = Aabb::from_points(&tri_points);
            result.push(id);
        }
        Ok(result)
    }
}

/// Inserts a closed polygon as constraint edges into the CDT, returning the
/// vertex handles in loop order.
fn insert_constraint_loop(
    cdt: &mut Cdt,
    points: &[SpadePoint2<f64>],
) -> Result<Vec<FixedVertexHandle>> {
    let mut handles = Vec::with_capacity(points.len());
    for &pt in points {
        let h = cdt
            .insert(pt)
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(TessellationError::Failed("face loop crosses itself".into()).into());
        }
        cdt.add_constraint(from, to);
    }

    Ok(handles)
}

/// Flood-fills from the outer face, counting constraint crossings; faces at
/// odd depth are inside the loop.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let n_idx = neighbor.fix().index();
            if depth_map.contains_key(&n_idx) {
                continue;
            }
            let new_depth = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(n_idx, new_depth);
            if new_depth % 2 == 1 {
                interior.insert(n_idx);
            }
            queue.push_back((neighbor.fix(), new_depth));
        }
    }

    interior
}
