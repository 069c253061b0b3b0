use super::{Point3, Vector3, TOLERANCE};

/// Intersects the line `origin + t * dir` with triangle `(a, b, c)`.
///
/// Möller–Trumbore with an inclusive boundary: hits within `edge_eps` (in
/// barycentric units) outside an edge still count, so a ray passing exactly
/// through a shared edge or vertex reports a hit on every incident triangle.
/// Lines parallel to the triangle's plane never hit. Returns the line parameter.
#[must_use]
pub fn line_triangle_intersect(
    origin: &Point3,
    dir: &Vector3,
    tri: [&Point3; 3],
    edge_eps: f64,
) -> Option<f64> {
    let [a, b, c] = tri;
    let e1 = b - a;
    let e2 = c - a;
    let pvec = dir.cross(&e2);
    let det = e1.dot(&pvec);

    // Scale-aware parallel test.
    let scale = e1.norm() * e2.norm() * dir.norm();
    if scale < TOLERANCE || det.abs() < TOLERANCE * scale {
        return None;
    }

    let inv_det = 1.0 / det;
    let tvec = origin - a;
    let u = tvec.dot(&pvec) * inv_det;
    if u < -edge_eps || u > 1.0 + edge_eps {
        return None;
    }

    let qvec = tvec.cross(&e1);
    let v = dir.dot(&qvec) * inv_det;
    if v < -edge_eps || u + v > 1.0 + edge_eps {
        return None;
    }

    Some(e2.dot(&qvec) * inv_det)
}
