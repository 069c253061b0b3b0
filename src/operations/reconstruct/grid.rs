use crate::error::{Result, SamplingError};
use crate::geometry::{Aabb, GridRay};
use crate::math::{Axis, Point3};

/// Upper bound on the number of rays in any one ray family.
const MAX_RAYS_PER_FAMILY: usize = 1 << 24;

/// A uniform sampling lattice over a bounding box.
///
/// Along every axis the lattice has `ceil(extent / cell_size) + 3` levels,
/// centered on the box so that at least one level lies outside it on each
/// side. Primary rays run along the primary axis `A`, one per `(U, V)`
/// lattice point, where `U × V = −A`. The two refinement families run along
/// `A.next()` (forward, from below its minimum) and `A.prev()` (backward,
/// from beyond its maximum).
#[derive(Debug, Clone)]
pub struct SamplingGrid {
    bounds: Aabb,
    cell_size: f64,
    cells: [usize; 3],
    start: Point3,
    primary: Axis,
}

impl SamplingGrid {
    /// Lays out the lattice.
    ///
    /// # Errors
    ///
    /// Fails on a non-positive cell size, a bounding box with a zero,
    /// negative or non-finite extent, or a lattice too large to sample.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn new(bounds: Aabb, cell_size: f64, primary: Axis) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(SamplingError::InvalidCellSize(cell_size).into());
        }
        let ext = bounds.extents();
        if ext.iter().any(|e| !e.is_finite() || *e <= 0.0) {
            return Err(SamplingError::EmptyBounds {
                dx: ext.x,
                dy: ext.y,
                dz: ext.z,
            }
            .into());
        }

        let mut cells = [0usize; 3];
        let mut start = bounds.min;
        for axis in Axis::ALL {
            let i = axis.index();
            let n = (ext[i] / cell_size).ceil() as usize + 3;
            cells[i] = n;
            start[i] = bounds.min[i] - ((n - 1) as f64 * cell_size - ext[i]) / 2.0;
        }

        for axis in Axis::ALL {
            let (a, b) = (axis.next().index(), axis.prev().index());
            let family = cells[a].checked_mul(cells[b]).unwrap_or(usize::MAX);
            if family > MAX_RAYS_PER_FAMILY {
                return Err(SamplingError::GridTooLarge { cells: family }.into());
            }
        }

        Ok(Self {
            bounds,
            cell_size,
            cells,
            start,
            primary,
        })
    }

    /// The sampled bounding box.
    #[must_use]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Lattice spacing.
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Primary ray direction.
    #[must_use]
    pub fn primary(&self) -> Axis {
        self.primary
    }

    /// The `(U, V)` axes indexing primary columns.
    #[must_use]
    pub fn grid_axes(&self) -> (Axis, Axis) {
        (self.primary.prev(), self.primary.next())
    }

    /// Number of lattice levels along `axis`.
    #[must_use]
    pub fn cells(&self, axis: Axis) -> usize {
        self.cells[axis.index()]
    }

    /// Coordinate of level `k` along `axis`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn coord(&self, axis: Axis, k: usize) -> f64 {
        self.start[axis.index()] + k as f64 * self.cell_size
    }

    /// All level coordinates along `axis`, ascending.
    pub fn levels(&self, axis: Axis) -> impl Iterator<Item = f64> + '_ {
        (0..self.cells(axis)).map(move |k| self.coord(axis, k))
    }

    /// Number of primary columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        let (u, v) = self.grid_axes();
        self.cells(u) * self.cells(v)
    }

    /// Flat index of primary column `(i, j)`.
    #[must_use]
    pub fn column_index(&self, i: usize, j: usize) -> usize {
        i * self.cells(self.grid_axes().1) + j
    }

    /// Primary ray of column `(i, j)`: starts one cell below the box and
    /// runs along `+A`.
    #[must_use]
    pub fn primary_ray(&self, i: usize, j: usize) -> GridRay {
        let (u, v) = self.grid_axes();
        let a = self.primary;
        let mut origin = Point3::origin();
        origin[u.index()] = self.coord(u, i);
        origin[v.index()] = self.coord(v, j);
        origin[a.index()] = self.bounds.min[a.index()] - self.cell_size;
        GridRay::new(origin, a.unit())
    }

    /// The two refinement directions: `(axis, forward)`, in firing order.
    #[must_use]
    pub fn refinement_axes(&self) -> [(Axis, bool); 2] {
        [(self.primary.next(), true), (self.primary.prev(), false)]
    }

    /// Rays along `axis` through every lattice point of the other two axes.
    ///
    /// Forward rays start one cell below the box and run along `+axis`;
    /// backward rays start one cell beyond it and run along `-axis`.
    #[must_use]
    pub fn refinement_rays(&self, axis: Axis, forward: bool) -> Vec<GridRay> {
        let (p, q) = (axis.next(), axis.prev());
        let r = axis.index();
        let (level, direction) = if forward {
            (self.bounds.min[r] - self.cell_size, axis.unit())
        } else {
            (self.bounds.max[r] + self.cell_size, -axis.unit())
        };
        let mut rays = Vec::with_capacity(self.cells(p) * self.cells(q));
        for i in 0..self.cells(p) {
            for j in 0..self.cells(q) {
                let mut origin = Point3::origin();
                origin[p.index()] = self.coord(p, i);
                origin[q.index()] = self.coord(q, j);
                origin[r] = level;
                rays.push(GridRay::new(origin, direction));
            }
        }
        rays
    }
}
