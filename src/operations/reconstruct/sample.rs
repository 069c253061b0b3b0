use tracing::debug;

use crate::error::{Result, SamplingError};
use crate::math::Tolerance;
use crate::oracle::RayOracle;
use crate::topology::EndPoint;

use super::grid::SamplingGrid;

/// Occupancy of a column's span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanState {
    /// The ray passed through material between entry and exit.
    Solid,
    /// The ray touched the solid but the interval has no measurable length.
    Void,
    /// The primary ray missed. Such columns are stored without a span and
    /// report this state through [`ColumnGrid::state`].
    Unknown,
}

/// The outer interval of one primary column, from the first entry to the
/// last exit. Interior cavities along the ray are not represented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub state: SpanState,
    pub entry: EndPoint,
    pub exit: EndPoint,
}

impl Span {
    /// Returns `true` if the span contributes to the occupancy mask.
    #[must_use]
    pub fn is_solid(&self) -> bool {
        self.state == SpanState::Solid
    }
}

/// Spans of all primary columns, indexed by `(i, j)` along `(U, V)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnGrid {
    cells_u: usize,
    cells_v: usize,
    spans: Vec<Option<Span>>,
}

impl ColumnGrid {
    /// Creates a grid of empty columns.
    #[must_use]
    pub fn new(cells_u: usize, cells_v: usize) -> Self {
        Self {
            cells_u,
            cells_v,
            spans: vec![None; cells_u * cells_v],
        }
    }

    /// Number of columns along `U` and `V`.
    #[must_use]
    pub fn dims(&self) -> (usize, usize) {
        (self.cells_u, self.cells_v)
    }

    fn index(&self, i: usize, j: usize) -> Option<usize> {
        (i < self.cells_u && j < self.cells_v).then_some(i * self.cells_v + j)
    }

    /// The span of column `(i, j)`, if it was hit.
    #[must_use]
    pub fn span(&self, i: usize, j: usize) -> Option<&Span> {
        self.index(i, j).and_then(|k| self.spans[k].as_ref())
    }

    /// Occupancy of column `(i, j)`. Missed and out-of-range columns are
    /// [`SpanState::Unknown`].
    #[must_use]
    pub fn state(&self, i: usize, j: usize) -> SpanState {
        self.span(i, j).map_or(SpanState::Unknown, |s| s.state)
    }

    pub fn span_mut(&mut self, i: usize, j: usize) -> Option<&mut Span> {
        self.index(i, j).and_then(|k| self.spans[k].as_mut())
    }

    /// Records the span of column `(i, j)`. Out-of-range indices are ignored.
    pub fn set(&mut self, i: usize, j: usize, span: Option<Span>) {
        if let Some(k) = self.index(i, j) {
            self.spans[k] = span;
        }
    }

    /// Iterates over all hit columns as `((i, j), span)`.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Span)> + '_ {
        self.spans
            .iter()
            .enumerate()
            .filter_map(move |(k, s)| s.as_ref().map(|s| ((k / self.cells_v, k % self.cells_v), s)))
    }

    /// Number of columns with a solid span.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.iter().filter(|(_, s)| s.is_solid()).count()
    }

    /// Number of columns the primary ray missed.
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.spans.iter().filter(|s| s.is_none()).count()
    }
}

/// Fires one primary ray per column and reduces each hit list to its outer
/// span.
///
/// # Errors
///
/// Any oracle failure is fatal and reported as
/// [`SamplingError::OracleUnavailable`].
pub fn sample_columns<O: RayOracle + ?Sized>(
    oracle: &O,
    grid: &SamplingGrid,
    tolerance: &Tolerance,
) -> Result<ColumnGrid> {
    let (u, v) = grid.grid_axes();
    let mut columns = ColumnGrid::new(grid.cells(u), grid.cells(v));

    for i in 0..grid.cells(u) {
        for j in 0..grid.cells(v) {
            let ray = grid.primary_ray(i, j);
            let parts = oracle
                .shoot(&ray)
                .map_err(|e| SamplingError::OracleUnavailable(e.to_string()))?;
            let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
                continue;
            };

            let state = if last.exit_dist - first.entry_dist < tolerance.dist {
                debug!(i, j, "zero-length span");
                SpanState::Void
            } else {
                SpanState::Solid
            };
            columns.set(
                i,
                j,
                Some(Span {
                    state,
                    entry: EndPoint::new(ray.at(first.entry_dist)),
                    exit: EndPoint::new(ray.at(last.exit_dist)),
                }),
            );
        }
    }

    Ok(columns)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Aabb, GridRay};
    use crate::math::{Axis, Point3};
    use crate::oracle::{BoxSolid, Partition, UnionSolid};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    struct Broken;

    impl RayOracle for Broken {
        fn bounds(&self) -> Aabb {
            Aabb::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
        }

        fn shoot(&self, _ray: &GridRay) -> Result<Vec<Partition>> {
            Err(crate::error::OperationError::Failed("offline".into()).into())
        }
    }

    #[test]
    fn box_columns() {
        let solid = BoxSolid::new(p(0.0, 0.0, 0.0), p(40.0, 20.0, 20.0));
        let grid = SamplingGrid::new(solid.bounds(), 10.0, Axis::Y).unwrap();
        let cols = sample_columns(&solid, &grid, &Tolerance::default()).unwrap();

        assert_eq!(cols.dims(), (7, 5));
        // X levels -10..=50, Z levels -10..=30; the box covers 5 x 3 of them.
        assert_eq!(cols.solid_count(), 15);
        assert_eq!(cols.empty_count(), 35 - 15);

        let span = cols.span(1, 1).unwrap();
        assert_eq!(span.state, SpanState::Solid);
        assert_relative_eq!(span.entry.position, p(0.0, 0.0, 0.0));
        assert_relative_eq!(span.exit.position, p(0.0, 20.0, 0.0));
        assert!(span.entry.vertex.is_none());
        assert!(cols.span(0, 0).is_none());
        assert_eq!(cols.state(0, 0), SpanState::Unknown);
        assert_eq!(cols.state(1, 1), SpanState::Solid);
    }

    #[test]
    fn column_keeps_only_outer_span() {
        let solid = UnionSolid::new()
            .with(BoxSolid::new(p(0.0, 0.0, 0.0), p(20.0, 10.0, 20.0)))
            .with(BoxSolid::new(p(0.0, 30.0, 0.0), p(20.0, 40.0, 20.0)));
        let grid = SamplingGrid::new(solid.bounds(), 10.0, Axis::Y).unwrap();
        let cols = sample_columns(&solid, &grid, &Tolerance::default()).unwrap();

        let span = cols.span(2, 2).unwrap();
        assert_relative_eq!(span.entry.position.y, 0.0);
        assert_relative_eq!(span.exit.position.y, 40.0);
    }

    #[test]
    fn oracle_failure_is_fatal() {
        let grid = SamplingGrid::new(Broken.bounds(), 0.5, Axis::Y).unwrap();
        let err = sample_columns(&Broken, &grid, &Tolerance::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::RayshellError::Sampling(SamplingError::OracleUnavailable(_))
        ));
    }

    #[test]
    fn out_of_range_access_is_none() {
        let mut cols = ColumnGrid::new(2, 2);
        cols.set(5, 0, None);
        assert!(cols.span(2, 0).is_none());
        assert!(cols.span_mut(0, 9).is_none());
        assert_eq!(cols.state(9, 9), SpanState::Unknown);
        assert_eq!(cols.empty_count(), 4);
    }
}
