use crate::error::{GeometryError, Result};
use crate::math::polygon_3d::{newell_normal, polygon_centroid};
use crate::math::{Point3, Vector3, TOLERANCE};

/// An infinite plane in 3D space.
///
/// Defined by an origin point and a unit normal. Two orthogonal in-plane
/// directions (`u_dir`, `v_dir`) are derived so that `u_dir × v_dir = normal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Creates a plane from an origin and a normal vector.
    ///
    /// The U and V directions are computed automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        // Choose a reference vector not parallel to the normal
        let reference = if normal.x.abs() < 0.9 {
            Vector3::new(1.0, 0.0, 0.0)
        } else {
            Vector3::new(0.0, 1.0, 0.0)
        };

        let u_dir = normal.cross(&reference).normalize();
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Fits a supporting plane to a closed polygon.
    ///
    /// The normal follows the loop's winding (right-hand rule). Fails when
    /// the loop's area is below `min_area`, i.e. for near-zero-area or
    /// colinear point sets.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for fewer than three points or a
    /// loop enclosing no measurable area.
    pub fn fit(polygon: &[Point3], min_area: f64) -> Result<Self> {
        if polygon.len() < 3 {
            return Err(GeometryError::Degenerate(format!(
                "cannot fit a plane to {} points",
                polygon.len()
            ))
            .into());
        }
        let normal = newell_normal(polygon);
        let area = normal.norm() * 0.5;
        if area < min_area.max(TOLERANCE) {
            return Err(GeometryError::Degenerate(format!("face area {area:e} too small")).into());
        }
        Self::from_normal(polygon_centroid(polygon), normal)
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the unit normal of the plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Signed distance from `point` to the plane, positive on the normal side.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&(point - self.origin))
    }
}
