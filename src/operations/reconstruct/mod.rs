//! Shell reconstruction from ray samples.
//!
//! A solid seen only through a [`RayOracle`] is sampled on a uniform grid of
//! parallel rays, the boundary between solid and empty columns is built as a
//! closed shell, and the shell is then shrink-wrapped onto the true surface
//! with rays fired along the other two axes.

mod classify;
mod engine;
mod grid;
mod refine_edges;
mod sample;
mod shrink_wrap;
mod subdivide;

use std::fmt;

pub use classify::{build_shell, faces_for_mask, is_ambiguous, BuildStats, Corner, Side};
pub use engine::reconstruct_execute;
pub use grid::SamplingGrid;
pub use refine_edges::refine_edges;
pub use sample::{sample_columns, ColumnGrid, Span, SpanState};
pub use shrink_wrap::{shrink_wrap, Correction, ShrinkWrap};
pub use subdivide::{subdivide_edges, Subdivision, VertexSet};

use crate::error::{OperationError, Result, SamplingError};
use crate::geometry::Aabb;
use crate::math::{Axis, Point3, Tolerance};
use crate::oracle::RayOracle;
use crate::topology::{RegionId, ShellId, TopologyStore};

/// Direction of the primary sampling rays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAxis {
    Fixed(Axis),
    /// The axis whose perpendicular bounding-box face has the largest area.
    Auto,
}

impl PrimaryAxis {
    /// Resolves to a concrete axis for `bounds`. Ties prefer X, then Y.
    #[must_use]
    pub fn resolve(self, bounds: &Aabb) -> Axis {
        match self {
            PrimaryAxis::Fixed(axis) => axis,
            PrimaryAxis::Auto => {
                let area = |a: Axis| bounds.extent(a.next()) * bounds.extent(a.prev());
                let mut best = Axis::X;
                for axis in [Axis::Y, Axis::Z] {
                    if area(axis) > area(best) {
                        best = axis;
                    }
                }
                best
            }
        }
    }
}

/// A box inside which edge refinement uses its own tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefineRegion {
    pub bounds: Aabb,
    pub tolerance: f64,
}

impl RefineRegion {
    #[must_use]
    pub fn new(min: Point3, max: Point3, tolerance: f64) -> Self {
        Self {
            bounds: Aabb::new(min, max),
            tolerance,
        }
    }
}

/// Settings of the edge-midpoint refinement pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeRefinement {
    /// An edge is broken when its midpoint is farther than this from the
    /// surface.
    pub tolerance: f64,
    pub regions: Vec<RefineRegion>,
}

impl EdgeRefinement {
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            regions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: RefineRegion) -> Self {
        self.regions.push(region);
        self
    }

    /// The smallest tolerance of the base setting and every region
    /// containing `point`.
    #[must_use]
    pub fn tolerance_at(&self, point: &Point3) -> f64 {
        self.regions
            .iter()
            .filter(|r| r.bounds.contains(point))
            .fold(self.tolerance, |tol, r| tol.min(r.tolerance))
    }
}

/// Parameters of a reconstruction run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructParams {
    /// Grid spacing, in model units.
    pub cell_size: f64,
    /// Subdivide and shrink-wrap the sampled shell.
    pub refine: bool,
    pub primary_axis: PrimaryAxis,
    pub tolerance: Tolerance,
    pub edge_refinement: Option<EdgeRefinement>,
}

impl Default for ReconstructParams {
    fn default() -> Self {
        Self {
            cell_size: 50.0,
            refine: true,
            primary_axis: PrimaryAxis::Fixed(Axis::Y),
            tolerance: Tolerance::default(),
            edge_refinement: None,
        }
    }
}

impl ReconstructParams {
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    #[must_use]
    pub fn with_refine(mut self, refine: bool) -> Self {
        self.refine = refine;
        self
    }

    #[must_use]
    pub fn with_primary_axis(mut self, primary_axis: PrimaryAxis) -> Self {
        self.primary_axis = primary_axis;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_edge_refinement(mut self, edge_refinement: EdgeRefinement) -> Self {
        self.edge_refinement = Some(edge_refinement);
        self
    }

    /// Checks the parameters for values no run could use.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::InvalidCellSize`] for a non-positive cell
    /// size and [`OperationError::InvalidInput`] for a bad tolerance.
    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(SamplingError::InvalidCellSize(self.cell_size).into());
        }
        if !(self.tolerance.dist.is_finite() && self.tolerance.dist > 0.0) {
            return Err(OperationError::InvalidInput(format!(
                "distance tolerance must be positive, got {}",
                self.tolerance.dist
            ))
            .into());
        }
        if let Some(edges) = &self.edge_refinement {
            let bad = std::iter::once(edges.tolerance)
                .chain(edges.regions.iter().map(|r| r.tolerance))
                .find(|t| !(t.is_finite() && *t >= 0.0));
            if let Some(t) = bad {
                return Err(OperationError::InvalidInput(format!(
                    "edge refinement tolerance must be non-negative, got {t}"
                ))
                .into());
            }
        }
        Ok(())
    }
}

/// Counters and diagnostics of a reconstruction run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconstructionReport {
    pub primary_axis: Option<Axis>,
    pub primary_rays: usize,
    /// Columns whose primary ray missed the solid.
    pub empty_columns: usize,
    pub solid_columns: usize,
    pub faces_built: usize,
    /// Faces discarded for having no measurable area.
    pub degenerate_faces: usize,
    /// Blocks whose occupancy produced no geometry.
    pub ambiguous_cells: usize,
    pub subdivision_vertices: usize,
    pub failed_triangulations: usize,
    pub corrections: usize,
    pub rejections: usize,
    /// Refinement rays with candidates that missed the solid.
    pub refinement_misses: usize,
    pub edges_broken: usize,
    pub vertex_count: usize,
    pub face_count: usize,
    pub bounds: Option<Aabb>,
}

impl fmt::Display for ReconstructionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reconstruction Report:")?;
        if let Some(axis) = self.primary_axis {
            writeln!(f, "  Primary axis: {}", axis.letter())?;
        }
        writeln!(
            f,
            "  Primary rays: {} ({} solid, {} empty)",
            self.primary_rays, self.solid_columns, self.empty_columns
        )?;
        writeln!(
            f,
            "  Faces built: {} (degenerate: {}, ambiguous cells: {})",
            self.faces_built, self.degenerate_faces, self.ambiguous_cells
        )?;
        writeln!(
            f,
            "  Refinement: {} candidates, {} corrected, {} rejected, {} missed",
            self.subdivision_vertices, self.corrections, self.rejections, self.refinement_misses
        )?;
        if self.edges_broken > 0 {
            writeln!(f, "  Edges broken: {}", self.edges_broken)?;
        }
        if let Some(b) = &self.bounds {
            writeln!(
                f,
                "  Bounds: [{:.3}, {:.3}, {:.3}] to [{:.3}, {:.3}, {:.3}]",
                b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
            )?;
        }
        writeln!(f, "  Result: {} vertices, {} faces", self.vertex_count, self.face_count)
    }
}

/// Output of [`Reconstruct`]: a store holding one region with one shell.
#[derive(Debug)]
pub struct Reconstruction {
    pub store: TopologyStore,
    pub region: RegionId,
    pub shell: ShellId,
    pub report: ReconstructionReport,
    /// Every shrink-wrap correction, in the order applied.
    pub corrections: Vec<Correction>,
}

/// Reconstructs the boundary shell of a solid from ray samples.
pub struct Reconstruct<O> {
    oracle: O,
    params: ReconstructParams,
}

impl<O: RayOracle> Reconstruct<O> {
    /// Creates a new `Reconstruct` operation.
    #[must_use]
    pub fn new(oracle: O, params: ReconstructParams) -> Self {
        Self { oracle, params }
    }

    /// Executes the reconstruction.
    ///
    /// # Errors
    ///
    /// Fails on invalid parameters, a degenerate bounding box, or an oracle
    /// error. No partial shell is returned.
    pub fn execute(&self) -> Result<Reconstruction> {
        reconstruct_execute(&self.oracle, &self.params)
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
    fn auto_axis_faces_the_largest_side() {
        let flat = Aabb::new(p(0.0, 0.0, 0.0), p(100.0, 100.0, 5.0));
        assert_eq!(PrimaryAxis::Auto.resolve(&flat), Axis::Z);
        let cube = Aabb::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        assert_eq!(PrimaryAxis::Auto.resolve(&cube), Axis::X);
        // X and Z faces tie ahead of Y.
        let slab = Aabb::new(p(0.0, 0.0, 0.0), p(2.0, 2.0, 1.0));
        assert_eq!(PrimaryAxis::Auto.resolve(&slab), Axis::Z);
        let tall = Aabb::new(p(0.0, 0.0, 0.0), p(1.0, 2.0, 1.0));
        assert_eq!(PrimaryAxis::Auto.resolve(&tall), Axis::X);
        assert_eq!(PrimaryAxis::Fixed(Axis::X).resolve(&flat), Axis::X);
    }

    #[test]
    fn region_tolerance_takes_the_minimum() {
        let settings = EdgeRefinement::new(1.0)
            .with_region(RefineRegion::new(p(0.0, 0.0, 0.0), p(10.0, 10.0, 10.0), 0.5))
            .with_region(RefineRegion::new(p(5.0, 5.0, 5.0), p(6.0, 6.0, 6.0), 0.1));
        assert!((settings.tolerance_at(&p(1.0, 1.0, 1.0)) - 0.5).abs() < 1e-12);
        assert!((settings.tolerance_at(&p(5.5, 5.5, 5.5)) - 0.1).abs() < 1e-12);
        assert!((settings.tolerance_at(&p(-1.0, 0.0, 0.0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn params_validation() {
        assert!(ReconstructParams::default().validate().is_ok());
        assert!(ReconstructParams::default().with_cell_size(0.0).validate().is_err());
        assert!(ReconstructParams::default()
            .with_tolerance(Tolerance::new(0.0, 1e-5))
            .validate()
            .is_err());
        assert!(ReconstructParams::default()
            .with_edge_refinement(EdgeRefinement::new(-1.0))
            .validate()
            .is_err());
    }

    #[test]
    fn report_display_mentions_counts() {
        let report = ReconstructionReport {
            primary_axis: Some(Axis::Y),
            primary_rays: 12,
            faces_built: 7,
            ..ReconstructionReport::default()
        };
        let text = report.to_string();
        assert!(text.contains("Primary axis: Y"));
        assert!(text.contains("Primary rays: 12"));
        assert!(text.contains("Faces built: 7"));
    }
}
