use super::{Axis, Point3, Vector3};

/// Newell normal of a closed polygon.
///
/// The result is not normalized: its length is twice the polygon's area, and
/// its direction follows the right-hand rule over the vertex order. Works for
/// non-convex loops and tolerates collinear vertices.
#[must_use]
pub fn newell_normal(polygon: &[Point3]) -> Vector3 {
    let n = polygon.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Arithmetic mean of the polygon vertices.
#[must_use]
pub fn polygon_centroid(points: &[Point3]) -> Point3 {
    let n = points.len();
    if n == 0 {
        return Point3::origin();
    }
    #[allow(clippy::cast_precision_loss)]
    let inv_n = 1.0 / n as f64;
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum * inv_n)
}

/// Axis along which `normal` has its largest absolute component.
#[must_use]
pub fn dominant_axis(normal: &Vector3) -> Axis {
    let ax = normal.x.abs();
    let ay = normal.y.abs();
    let az = normal.z.abs();
    if ax >= ay && ax >= az {
        Axis::X
    } else if ay >= az {
        Axis::Y
    } else {
        Axis::Z
    }
}

/// Projection of 3D points onto the coordinate plane perpendicular to the
/// dominant axis of a face normal.
///
/// Dropping a coordinate keeps points that share a coordinate exactly
/// collinear after projection, which the sampled shells rely on (their split
/// edges are axis-aligned). The two kept coordinates are ordered so that a
/// loop wound counter-clockwise around `normal` stays counter-clockwise in 2D.
#[derive(Debug, Clone, Copy)]
pub struct AxisProjection {
    u: usize,
    v: usize,
}

impl AxisProjection {
    /// Chooses the projection for a face with the given normal.
    #[must_use]
    pub fn for_normal(normal: &Vector3) -> Self {
        let drop = dominant_axis(normal);
        let (u, v) = (drop.next().index(), drop.prev().index());
        if normal[drop.index()] >= 0.0 {
            Self { u, v }
        } else {
            Self { u: v, v: u }
        }
    }

    /// Projects a point to `(u, v)`.
    #[must_use]
    pub fn project(&self, p: &Point3) -> (f64, f64) {
        (p[self.u], p[self.v])
    }
}
