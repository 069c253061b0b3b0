//! Ray/solid intersection oracles.
//!
//! Reconstruction only ever sees a solid through [`RayOracle`]: fire a ray,
//! get back the solid intervals along it, sorted by distance.

pub mod primitives;
pub mod shell;

pub use primitives::{BoxSolid, SphereSolid, UnionSolid};
pub use shell::ShellOracle;

use crate::error::Result;
use crate::geometry::{Aabb, GridRay};

/// One solid interval along a ray, as distances from the ray origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partition {
    /// Distance at which the ray enters the solid.
    pub entry_dist: f64,
    /// Distance at which the ray leaves the solid.
    pub exit_dist: f64,
}

impl Partition {
    /// Creates a partition, ordering the two distances.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            entry_dist: a.min(b),
            exit_dist: a.max(b),
        }
    }

    /// Length of the interval.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.exit_dist - self.entry_dist
    }
}

/// A solid that can be probed with rays.
pub trait RayOracle {
    /// Bounding box of the solid.
    fn bounds(&self) -> Aabb;

    /// Fires `ray` and returns the solid partitions along it, sorted by
    /// entry distance. An empty list means the ray missed.
    ///
    /// # Errors
    ///
    /// Returns an error if the oracle cannot answer; callers treat this as
    /// fatal.
    fn shoot(&self, ray: &GridRay) -> Result<Vec<Partition>>;
}

impl<T: RayOracle + ?Sized> RayOracle for &T {
    fn bounds(&self) -> Aabb {
        (**self).bounds()
    }

    fn shoot(&self, ray: &GridRay) -> Result<Vec<Partition>> {
        (**self).shoot(ray)
    }
}

impl<T: RayOracle + ?Sized> RayOracle for Box<T> {
    fn bounds(&self) -> Aabb {
        (**self).bounds()
    }

    fn shoot(&self, ray: &GridRay) -> Result<Vec<Partition>> {
        (**self).shoot(ray)
    }
}

/// Sorts partitions by entry and merges those that overlap or touch.
#[must_use]
pub fn merge_partitions(mut parts: Vec<Partition>) -> Vec<Partition> {
    parts.sort_by(|a, b| a.entry_dist.total_cmp(&b.entry_dist));
    let mut merged: Vec<Partition> = Vec::with_capacity(parts.len());
    for part in parts {
        match merged.last_mut() {
            Some(last) if part.entry_dist <= last.exit_dist => {
                last.exit_dist = last.exit_dist.max(part.exit_dist);
            }
            _ => merged.push(part),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overlapping_and_disjoint() {
        let parts = vec![
            Partition::new(8.0, 9.0),
            Partition::new(0.0, 2.0),
            Partition::new(1.5, 3.0),
        ];
        let merged = merge_partitions(parts);
        assert_eq!(merged, vec![Partition::new(0.0, 3.0), Partition::new(8.0, 9.0)]);
    }

    #[test]
    fn partition_orders_distances() {
        let part = Partition::new(5.0, 2.0);
        assert!((part.entry_dist - 2.0).abs() < 1e-12);
        assert!((part.length() - 3.0).abs() < 1e-12);
    }
}
