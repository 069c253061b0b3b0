use crate::math::{Point3, Vector3};

/// A sampling ray: origin plus unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRay {
    origin: Point3,
    direction: Vector3,
}

impl GridRay {
    /// Creates a ray; `direction` is normalized.
    #[must_use]
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Returns the origin of the ray.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the unit direction of the ray.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }

    /// Evaluates the ray at distance `t`: `origin + t * direction`.
    #[inline]
    #[must_use]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray of the projection of `p` onto the ray's line.
    #[inline]
    #[must_use]
    pub fn param_of(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(&self.direction)
    }
}
