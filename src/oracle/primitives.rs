//! Analytic solids for driving reconstruction without an external raytracer.

use crate::error::Result;
use crate::geometry::{Aabb, GridRay};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{merge_partitions, Partition, RayOracle};

/// An axis-aligned box. Its boundary counts as solid, so rays grazing a
/// face report a partition.
#[derive(Debug, Clone, Copy)]
pub struct BoxSolid {
    bounds: Aabb,
}

impl BoxSolid {
    /// Creates a box spanning the two corners.
    #[must_use]
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            bounds: Aabb::new(a, b),
        }
    }
}

impl RayOracle for BoxSolid {
    fn bounds(&self) -> Aabb {
        self.bounds
    }

    fn shoot(&self, ray: &GridRay) -> Result<Vec<Partition>> {
        let origin = ray.origin();
        let dir = ray.direction();
        let mut t_near = f64::NEG_INFINITY;
        let mut t_far = f64::INFINITY;

        for i in 0..3 {
            let (lo, hi) = (self.bounds.min[i], self.bounds.max[i]);
            if dir[i].abs() < TOLERANCE {
                if origin[i] < lo || origin[i] > hi {
                    return Ok(Vec::new());
                }
                continue;
            }
            let inv = 1.0 / dir[i];
            let (a, b) = ((lo - origin[i]) * inv, (hi - origin[i]) * inv);
            t_near = t_near.max(a.min(b));
            t_far = t_far.min(a.max(b));
        }

        if t_far < t_near || t_far < 0.0 {
            return Ok(Vec::new());
        }
        Ok(vec![Partition::new(t_near.max(0.0), t_far)])
    }
}

/// A solid sphere.
#[derive(Debug, Clone, Copy)]
pub struct SphereSolid {
    center: Point3,
    radius: f64,
}

impl SphereSolid {
    /// Creates a sphere. The radius is taken by absolute value.
    #[must_use]
    pub fn new(center: Point3, radius: f64) -> Self {
        Self {
            center,
            radius: radius.abs(),
        }
    }

    /// Center of the sphere.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Radius of the sphere.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Unsigned distance from `p` to the sphere's surface.
    #[must_use]
    pub fn surface_distance(&self, p: &Point3) -> f64 {
        ((p - self.center).norm() - self.radius).abs()
    }
}

impl RayOracle for SphereSolid {
    fn bounds(&self) -> Aabb {
        let r = Vector3::repeat(self.radius);
        Aabb::new(self.center - r, self.center + r)
    }

    fn shoot(&self, ray: &GridRay) -> Result<Vec<Partition>> {
        // |oc + t*d|^2 = r^2 with |d| = 1
        let oc = ray.origin() - self.center;
        let d = ray.direction();
        let b = oc.dot(d);
        let c = oc.dot(&oc) - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return Ok(Vec::new());
        }
        let sqrt_disc = discriminant.sqrt();
        let (t1, t2) = (-b - sqrt_disc, -b + sqrt_disc);
        if t2 < 0.0 {
            return Ok(Vec::new());
        }
        Ok(vec![Partition::new(t1.max(0.0), t2)])
    }
}

/// Union of several solids. Overlapping partitions are merged.
#[derive(Default)]
pub struct UnionSolid {
    parts: Vec<Box<dyn RayOracle>>,
}

impl UnionSolid {
    /// Creates an empty union.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member solid.
    #[must_use]
    pub fn with(mut self, part: impl RayOracle + 'static) -> Self {
        self.parts.push(Box::new(part));
        self
    }
}

impl std::fmt::Debug for UnionSolid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnionSolid")
            .field("parts", &self.parts.len())
            .finish()
    }
}

impl RayOracle for UnionSolid {
    fn bounds(&self) -> Aabb {
        self.parts
            .iter()
            .map(|part| part.bounds())
            .reduce(|mut acc, b| {
                acc.expand(&b);
                acc
            })
            .unwrap_or_else(|| Aabb::new(Point3::origin(), Point3::origin()))
    }

    fn shoot(&self, ray: &GridRay) -> Result<Vec<Partition>> {
        let mut all = Vec::new();
        for part in &self.parts {
            all.extend(part.shoot(ray)?);
        }
        Ok(merge_partitions(all))
    }
}
