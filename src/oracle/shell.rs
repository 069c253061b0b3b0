use crate::error::Result;
use crate::geometry::{Aabb, GridRay};
use crate::math::intersect_3d::line_triangle_intersect;
use crate::math::{Point3, Tolerance};
use crate::topology::{ShellId, TopologyStore};

use super::{Partition, RayOracle};

/// Barycentric slack so rays through shared edges and vertices still hit.
const EDGE_EPS: f64 = 1e-9;

/// Ray oracle over a shell of the topology store.
///
/// Every face is fanned into triangles and intersected with the ray's line.
/// Hits closer together than the distance tolerance (a ray crossing a shared
/// edge hits both neighbors) collapse to one, and consecutive hits pair up
/// into partitions.
#[derive(Debug, Clone, Copy)]
pub struct ShellOracle<'a> {
    store: &'a TopologyStore,
    shell: ShellId,
    tolerance: Tolerance,
}

impl<'a> ShellOracle<'a> {
    /// Creates an oracle over `shell`.
    #[must_use]
    pub fn new(store: &'a TopologyStore, shell: ShellId, tolerance: Tolerance) -> Self {
        Self {
            store,
            shell,
            tolerance,
        }
    }

    /// Distances along `ray` at which it crosses the shell, ascending and
    /// deduplicated. Hits behind the origin are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell or one of its faces is inconsistent.
    pub fn hits(&self, ray: &GridRay) -> Result<Vec<f64>> {
        let mut hits = Vec::new();
        for &face in &self.store.shell(self.shell)?.faces {
            let points = self.store.face_points(face)?;
            if points.len() < 3 {
                continue;
            }
            for i in 1..points.len() - 1 {
                let tri = [&points[0], &points[i], &points[i + 1]];
                if let Some(t) = line_triangle_intersect(ray.origin(), ray.direction(), tri, EDGE_EPS)
                {
                    if t >= -self.tolerance.dist {
                        hits.push(t);
                    }
                }
            }
        }
        hits.sort_by(f64::total_cmp);
        hits.dedup_by(|later, kept| *later - *kept < self.tolerance.dist);
        Ok(hits)
    }

    /// First and last crossing of `ray` with the shell, as points.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell or one of its faces is inconsistent.
    pub fn extremes(&self, ray: &GridRay) -> Result<Option<(Point3, Point3)>> {
        let hits = self.hits(ray)?;
        Ok(match (hits.first(), hits.last()) {
            (Some(&first), Some(&last)) => Some((ray.at(first), ray.at(last))),
            _ => None,
        })
    }
}

impl RayOracle for ShellOracle<'_> {
    fn bounds(&self) -> Aabb {
        self.store
            .shell(self.shell)
            .ok()
            .and_then(|s| s.bounds)
            .unwrap_or_else(|| Aabb::new(Point3::origin(), Point3::origin()))
    }

    fn shoot(&self, ray: &GridRay) -> Result<Vec<Partition>> {
        let hits = self.hits(ray)?;
        // An odd count leaves a zero-length partition at the last hit.
        Ok(hits
            .chunks(2)
            .filter_map(|pair| Some(Partition::new(*pair.first()?, *pair.last()?)))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use crate::topology::{RegionData, ShellData, VertexData};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Axis-aligned cube `[0, s]^3` made of six outward-wound quads.
    fn cube(store: &mut TopologyStore, s: f64) -> ShellId {
        let region = store.add_region(RegionData::default());
        let shell = store.add_shell(ShellData {
            region,
            faces: Vec::new(),
            bounds: None,
        });
        let v: Vec<_> = [
            p(0.0, 0.0, 0.0),
            p(s, 0.0, 0.0),
            p(s, s, 0.0),
            p(0.0, s, 0.0),
            p(0.0, 0.0, s),
            p(s, 0.0, s),
            p(s, s, s),
            p(0.0, s, s),
        ]
        .into_iter()
        .map(|q| store.add_vertex(VertexData::new(q)))
        .collect();
        for quad in [
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [1, 2, 6, 5],
            [0, 4, 7, 3],
        ] {
            store
                .attach_face(shell, quad.iter().map(|&i| v[i]).collect())
                .unwrap();
        }
        shell
    }

    #[test]
    fn ray_through_cube_gives_one_partition() {
        let mut store = TopologyStore::new();
        let shell = cube(&mut store, 10.0);
        let oracle = ShellOracle::new(&store, shell, Tolerance::default());
        let ray = GridRay::new(p(3.0, -5.0, 4.0), Vector3::y());
        let parts = oracle.shoot(&ray).unwrap();
        assert_eq!(parts.len(), 1);
        assert_relative_eq!(parts[0].entry_dist, 5.0, epsilon = 1e-9);
        assert_relative_eq!(parts[0].exit_dist, 15.0, epsilon = 1e-9);
    }

    #[test]
    fn ray_along_shared_edge_is_deduplicated() {
        let mut store = TopologyStore::new();
        let shell = cube(&mut store, 10.0);
        let oracle = ShellOracle::new(&store, shell, Tolerance::default());
        // Crosses the diagonal of the fanned bottom and top quads.
        let ray = GridRay::new(p(5.0, 5.0, -5.0), Vector3::z());
        let hits = oracle.hits(&ray).unwrap();
        assert_eq!(hits.len(), 2);
        let (first, last) = oracle.extremes(&ray).unwrap().unwrap();
        assert_relative_eq!(first.z, 0.0, epsilon = 1e-9);
        assert_relative_eq!(last.z, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn miss_gives_nothing() {
        let mut store = TopologyStore::new();
        let shell = cube(&mut store, 10.0);
        let oracle = ShellOracle::new(&store, shell, Tolerance::default());
        let ray = GridRay::new(p(20.0, -5.0, 4.0), Vector3::y());
        assert!(oracle.shoot(&ray).unwrap().is_empty());
        assert!(oracle.extremes(&ray).unwrap().is_none());
    }
}
