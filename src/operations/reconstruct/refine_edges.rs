use std::f64::consts::SQRT_2;

use tracing::debug;

use crate::error::{Result, SamplingError};
use crate::geometry::{Aabb, GridRay};
use crate::math::{Point3, TOLERANCE};
use crate::operations::modification::{MoveVertex, SplitEdge};
use crate::operations::query::TabulateEdges;
use crate::oracle::RayOracle;
use crate::topology::{EdgeId, FaceId, ShellId, TopologyStore, VertexId};

use super::EdgeRefinement;

/// Number of passes over newly created edges.
const MAX_PASSES: usize = 6;

/// Breaks triangle edges whose midpoint is far from the true surface.
///
/// For each edge between two triangles a ray is fired at the edge midpoint
/// along the inward bisector of the face normals. When the surface lies
/// farther than the applicable tolerance, but within `√2` cells, the edge is
/// split at the midpoint, both triangles are cut in two and the new vertex
/// moves onto the surface. Edges around new vertices are examined again in
/// the next pass. Returns the number of edges broken.
///
/// # Errors
///
/// Fails if the oracle cannot answer or the store is inconsistent.
pub fn refine_edges<O: RayOracle + ?Sized>(
    store: &mut TopologyStore,
    shell: ShellId,
    oracle: &O,
    cell_size: f64,
    settings: &EdgeRefinement,
    min_area: f64,
) -> Result<usize> {
    let mut pending = TabulateEdges::new(shell).execute(store)?;
    let mut broken = 0;

    for pass in 0..MAX_PASSES {
        let mut next: Vec<EdgeId> = Vec::new();
        let mut broken_this_pass = 0;

        for edge in pending {
            let Some((start, end, faces)) = triangle_pair(store, edge)? else {
                continue;
            };
            let Some(bisector) = bisector(store, faces)? else {
                continue;
            };
            let (a, b) = (store.vertex_point(start)?, store.vertex_point(end)?);
            let mid = Point3::from((a.coords + b.coords) * 0.5);

            let ray = GridRay::new(mid + bisector * (2.0 * cell_size), -bisector);
            let parts = oracle
                .shoot(&ray)
                .map_err(|e| SamplingError::OracleUnavailable(e.to_string()))?;
            let Some(first) = parts.first() else { continue };
            let hit = ray.at(first.entry_dist);

            let dist = (hit - mid).norm();
            if dist <= settings.tolerance_at(&hit) || dist > SQRT_2 * cell_size {
                continue;
            }

            let m = SplitEdge::new(start, end, mid).execute(store)?;
            for face in faces {
                cut_triangle(store, shell, face, m)?;
            }
            MoveVertex::new(m, hit, min_area).execute(store)?;
            broken_this_pass += 1;

            for &face in &store.vertex(m)?.faces {
                for (u, v) in store.face(face)?.loop_edges() {
                    if u != m && v != m {
                        continue;
                    }
                    if let Some(e) = store.find_edge(u, v) {
                        if !next.contains(&e) {
                            next.push(e);
                        }
                    }
                }
            }
        }

        debug!(pass, broken = broken_this_pass, "edge refinement pass");
        broken += broken_this_pass;
        if broken_this_pass == 0 {
            break;
        }
        pending = next;
    }
    Ok(broken)
}

/// The edge's ends and its two faces, if it joins exactly two triangles.
fn triangle_pair(
    store: &TopologyStore,
    edge: EdgeId,
) -> Result<Option<(VertexId, VertexId, [FaceId; 2])>> {
    let Ok(data) = store.edge(edge) else {
        return Ok(None);
    };
    let [f1, f2] = data.faces[..] else {
        return Ok(None);
    };
    if f1 == f2 {
        return Ok(None);
    }
    for f in [f1, f2] {
        if store.face(f)?.vertices.len() != 3 {
            return Ok(None);
        }
    }
    Ok(Some((data.start, data.end, [f1, f2])))
}

/// Unit bisector of the two faces' normals, or `None` if they cancel out.
fn bisector(store: &TopologyStore, faces: [FaceId; 2]) -> Result<Option<crate::math::Vector3>> {
    let mut sum = crate::math::Vector3::zeros();
    for f in faces {
        match &store.face(f)?.plane {
            Some(plane) => sum += plane.normal(),
            None => return Ok(None),
        }
    }
    let len = sum.norm();
    Ok((len > TOLERANCE).then(|| sum / len))
}

/// Cuts a quad (a triangle with `m` spliced in) into two triangles meeting
/// at `m`.
fn cut_triangle(store: &mut TopologyStore, shell: ShellId, face: FaceId, m: VertexId) -> Result<()> {
    let data = store.face(face)?;
    let (lp, plane) = (data.vertices.clone(), data.plane.clone());
    let Some(i) = lp.iter().position(|&v| v == m) else {
        return Ok(());
    };
    if lp.len() != 4 {
        return Ok(());
    }
    let (prev, next, opp) = (lp[(i + 3) % 4], lp[(i + 1) % 4], lp[(i + 2) % 4]);

    store.set_face_loop(face, vec![prev, m, opp])?;
    let added = store.attach_face(shell, vec![m, next, opp])?;
    for f in [face, added] {
        let points = store.face_points(f)?;
        let data = store.face_mut(f)?;
        data.plane.clone_from(&plane);
        data.bounds = Aabb::from_points(&points);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Tolerance;
    use crate::operations::creation::{MakeFace, MakeRegion};
    use crate::operations::query::ValidateShell;
    use crate::operations::reconstruct::RefineRegion;
    use crate::oracle::SphereSolid;
    use crate::topology::EndPoint;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Octahedron inscribed in a sphere of radius `r`, wound outward.
    fn octahedron(store: &mut TopologyStore, r: f64) -> ShellId {
        let (_, shell) = MakeRegion::new().execute(store);
        let pts = [
            p(r, 0.0, 0.0),
            p(-r, 0.0, 0.0),
            p(0.0, r, 0.0),
            p(0.0, -r, 0.0),
            p(0.0, 0.0, r),
            p(0.0, 0.0, -r),
        ];
        let mut ends: Vec<EndPoint> = pts.iter().map(|&q| EndPoint::new(q)).collect();
        let tris = [
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];
        for t in tris {
            let corners = t.iter().map(|&k| ends[k]).collect();
            let built = MakeFace::new(shell, corners, 1e-6).execute(store).unwrap();
            for (&k, e) in t.iter().zip(built.corners) {
                ends[k] = e;
            }
        }
        shell
    }

    #[test]
    fn octahedron_edges_break_toward_sphere() {
        let mut store = TopologyStore::new();
        let shell = octahedron(&mut store, 10.0);
        assert!(ValidateShell::new(shell).execute(&store).unwrap().is_closed_manifold());

        let sphere = SphereSolid::new(p(0.0, 0.0, 0.0), 10.0);
        let settings = EdgeRefinement::new(0.1);
        let broken = refine_edges(&mut store, shell, &sphere, 10.0, &settings, 1e-6).unwrap();

        // First pass breaks all 12 edges.
        assert!(broken >= 12);
        let report = ValidateShell::new(shell).execute(&store).unwrap();
        assert!(report.is_closed_manifold(), "{report}");
        for (_, v) in store.vertices() {
            let q = v.point.unwrap();
            assert!(sphere.surface_distance(&q) < 1e-6);
        }
    }

    #[test]
    fn coarse_tolerance_leaves_shell_alone() {
        let mut store = TopologyStore::new();
        let shell = octahedron(&mut store, 10.0);
        let sphere = SphereSolid::new(p(0.0, 0.0, 0.0), 10.0);
        let faces = store.face_count();

        // Midpoints sit about 2.93 below the surface.
        let settings = EdgeRefinement::new(3.0);
        let broken = refine_edges(&mut store, shell, &sphere, 10.0, &settings, 1e-6).unwrap();
        assert_eq!(broken, 0);
        assert_eq!(store.face_count(), faces);

        // A finer region around +X re-enables the four edges meeting there.
        let settings = EdgeRefinement::new(3.0).with_region(RefineRegion::new(
            p(5.0, -10.0, -10.0),
            p(10.0, 10.0, 10.0),
            0.5,
        ));
        let tol = Tolerance::default();
        let broken =
            refine_edges(&mut store, shell, &sphere, 10.0, &settings, tol.dist_sq).unwrap();
        assert!(broken >= 4);
    }
}
