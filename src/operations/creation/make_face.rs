use tracing::debug;

use crate::error::{OperationError, Result};
use crate::geometry::{Aabb, Plane};
use crate::topology::{EndPoint, FaceId, ShellId, TopologyStore, VertexData, VertexId};

/// Outcome of [`MakeFace`].
#[derive(Debug, Clone)]
pub struct FaceBuild {
    /// The new face, or `None` if it was degenerate and discarded.
    pub face: Option<FaceId>,
    /// The input corners with their vertex bindings updated. Callers store
    /// these back so later faces reuse the same vertices.
    pub corners: Vec<EndPoint>,
}

/// Creates a triangle or quad face in a shell from sampled end points.
///
/// Corners without a bound vertex get a new one; vertices without geometry
/// take the corner's position. The face then gets a fitted plane. If fitting
/// fails the face is removed again, vertices created for it are deleted and
/// geometry assigned only for it is unset, leaving the store as it was.
pub struct MakeFace {
    shell: ShellId,
    corners: Vec<EndPoint>,
    min_area: f64,
}

impl MakeFace {
    /// Creates a new `MakeFace` operation. Faces with area below `min_area`
    /// are treated as degenerate.
    #[must_use]
    pub fn new(shell: ShellId, corners: Vec<EndPoint>, min_area: f64) -> Self {
        Self {
            shell,
            corners,
            min_area,
        }
    }

    /// Executes the operation.
    ///
    /// A degenerate face is not an error: it is reported through
    /// [`FaceBuild::face`] being `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the corner count is not 3 or 4, or the shell or a
    /// bound vertex is missing.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<FaceBuild> {
        if !(3..=4).contains(&self.corners.len()) {
            return Err(OperationError::InvalidInput(format!(
                "a face needs 3 or 4 corners, got {}",
                self.corners.len()
            ))
            .into());
        }
        store.shell(self.shell)?;

        let mut corners = self.corners.clone();
        let mut created: Vec<VertexId> = Vec::new();
        let mut placed: Vec<VertexId> = Vec::new();
        let mut loop_ids = Vec::with_capacity(corners.len());

        for corner in &mut corners {
            let id = match corner.vertex {
                Some(id) => id,
                None => {
                    let id = store.add_vertex(VertexData::unplaced());
                    corner.vertex = Some(id);
                    created.push(id);
                    id
                }
            };
            let vertex = store.vertex_mut(id)?;
            if vertex.point.is_none() {
                vertex.point = Some(corner.position);
                placed.push(id);
            }
            loop_ids.push(id);
        }

        let face = store.attach_face(self.shell, loop_ids)?;
        let points = store.face_points(face)?;

        match Plane::fit(&points, self.min_area) {
            Ok(plane) => {
                let data = store.face_mut(face)?;
                data.plane = Some(plane);
                data.bounds = Aabb::from_points(&points);
                Ok(FaceBuild {
                    face: Some(face),
                    corners,
                })
            }
            Err(err) => {
                debug!(?points, %err, "discarding degenerate face");
                store.detach_face(face)?;
                for id in created {
                    if store.vertex(id)?.faces.is_empty() {
                        store.remove_vertex(id)?;
                        for corner in &mut corners {
                            if corner.vertex == Some(id) {
                                corner.vertex = None;
                            }
                        }
                    }
                }
                for id in placed {
                    if let Ok(vertex) = store.vertex_mut(id) {
                        if vertex.faces.is_empty() {
                            vertex.point = None;
                        }
                    }
                }
                Ok(FaceBuild {
                    face: None,
                    corners,
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::MakeRegion;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn ends(points: &[Point3]) -> Vec<EndPoint> {
        points.iter().map(|&q| EndPoint::new(q)).collect()
    }

    #[test]
    fn creates_vertices_and_plane() {
        let mut store = TopologyStore::new();
        let (_, shell) = MakeRegion::new().execute(&mut store);
        let corners = ends(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]);
        let built = MakeFace::new(shell, corners, 1e-6)
            .execute(&mut store)
            .unwrap();
        let face = built.face.unwrap();
        assert!(built.corners.iter().all(|c| c.vertex.is_some()));
        assert_eq!(store.vertex_count(), 3);
        let plane = store.face(face).unwrap().plane.clone().unwrap();
        assert!((plane.normal().z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn shared_corners_reuse_vertices() {
        let mut store = TopologyStore::new();
        let (_, shell) = MakeRegion::new().execute(&mut store);
        let first = MakeFace::new(
            shell,
            ends(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)]),
            1e-6,
        )
        .execute(&mut store)
        .unwrap();
        let shared = vec![first.corners[0], first.corners[2], EndPoint::new(p(0.0, 1.0, 0.0))];
        MakeFace::new(shell, shared, 1e-6)
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.vertex_count(), 4);
        assert_eq!(store.edge_count(), 5);
    }

    #[test]
    fn degenerate_face_is_rolled_back() {
        let mut store = TopologyStore::new();
        let (_, shell) = MakeRegion::new().execute(&mut store);
        let existing = MakeFace::new(
            shell,
            ends(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)]),
            1e-6,
        )
        .execute(&mut store)
        .unwrap();
        let colinear = vec![
            existing.corners[0],
            EndPoint::new(p(2.0, 0.0, 0.0)),
            EndPoint::new(p(3.0, 0.0, 0.0)),
        ];
        let built = MakeFace::new(shell, colinear, 1e-6)
            .execute(&mut store)
            .unwrap();
        assert!(built.face.is_none());
        assert_eq!(built.corners[0].vertex, existing.corners[0].vertex);
        assert!(built.corners[1].vertex.is_none());
        assert!(built.corners[2].vertex.is_none());
        assert_eq!(store.vertex_count(), 3);
        assert_eq!(store.face_count(), 1);
        assert_eq!(store.edge_count(), 3);
        assert!(store.vertex_point(existing.corners[0].vertex.unwrap()).is_ok());
    }

    #[test]
    fn unplaced_vertex_geometry_is_unset_on_rollback() {
        let mut store = TopologyStore::new();
        let (_, shell) = MakeRegion::new().execute(&mut store);
        let loose = store.add_vertex(VertexData::unplaced());
        let mut corners = ends(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]);
        corners[0].vertex = Some(loose);
        let built = MakeFace::new(shell, corners, 1e-6)
            .execute(&mut store)
            .unwrap();
        assert!(built.face.is_none());
        assert!(store.vertex(loose).unwrap().point.is_none());
    }

    #[test]
    fn wrong_corner_count_is_error() {
        let mut store = TopologyStore::new();
        let (_, shell) = MakeRegion::new().execute(&mut store);
        let corners = ends(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]);
        assert!(MakeFace::new(shell, corners, 1e-6).execute(&mut store).is_err());
    }
}
