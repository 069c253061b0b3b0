use crate::math::{Axis, Point3, Vector3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a box from two corners, ordering components as needed.
    #[must_use]
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest box containing all `points`, or `None` if there are none.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for p in iter {
            aabb.expand_point(p);
        }
        Some(aabb)
    }

    /// Grows the box to contain `p`.
    pub fn expand_point(&mut self, p: &Point3) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    /// Grows the box to contain `other`.
    pub fn expand(&mut self, other: &Aabb) {
        self.expand_point(&other.min);
        self.expand_point(&other.max);
    }

    /// Returns the union of two optional boxes.
    #[must_use]
    pub fn union(a: Option<Aabb>, b: Option<Aabb>) -> Option<Aabb> {
        match (a, b) {
            (Some(mut a), Some(b)) => {
                a.expand(&b);
                Some(a)
            }
            (a, None) => a,
            (None, b) => b,
        }
    }

    /// Edge lengths along X, Y and Z.
    #[must_use]
    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }

    /// Length of the box along one axis.
    #[must_use]
    pub fn extent(&self, axis: Axis) -> f64 {
        self.max[axis.index()] - self.min[axis.index()]
    }

    /// Returns `true` if `p` lies inside or on the box.
    #[must_use]
    pub fn contains(&self, p: &Point3) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn from_points_covers_all() {
        let pts = [p(1.0, 5.0, -2.0), p(-3.0, 2.0, 4.0), p(0.0, 0.0, 0.0)];
        let aabb = Aabb::from_points(&pts).unwrap();
        assert_eq!(aabb.min, p(-3.0, 0.0, -2.0));
        assert_eq!(aabb.max, p(1.0, 5.0, 4.0));
        assert!(pts.iter().all(|q| aabb.contains(q)));
    }

    #[test]
    fn from_no_points_is_none() {
        let none: Vec<Point3> = Vec::new();
        assert!(Aabb::from_points(&none).is_none());
    }

    #[test]
    fn union_with_none() {
        let a = Aabb::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        assert_eq!(Aabb::union(Some(a), None), Some(a));
        let b = Aabb::new(p(2.0, -1.0, 0.0), p(3.0, 0.0, 0.5));
        let u = Aabb::union(Some(a), Some(b)).unwrap();
        assert_eq!(u.min, p(0.0, -1.0, 0.0));
        assert_eq!(u.max, p(3.0, 1.0, 1.0));
    }
}
