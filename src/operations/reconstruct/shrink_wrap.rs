use tracing::debug;

use crate::error::{Result, SamplingError};
use crate::geometry::GridRay;
use crate::math::{Axis, Point3, Tolerance};
use crate::operations::modification::MoveVertex;
use crate::oracle::{RayOracle, ShellOracle};
use crate::topology::{ShellId, TopologyStore, VertexId};

use super::grid::SamplingGrid;
use super::subdivide::VertexSet;

/// A vertex snapped onto the true surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub vertex: VertexId,
    /// Direction of the refinement ray that matched the vertex.
    pub axis: Axis,
    pub from: Point3,
    pub to: Point3,
}

/// Outcome of [`shrink_wrap`].
#[derive(Debug, Clone, Default)]
pub struct ShrinkWrap {
    pub corrections: Vec<Correction>,
    /// Candidates matched by a ray but not moved.
    pub rejections: usize,
    /// Rays with candidates that missed the true solid.
    pub misses: usize,
}

/// A matched candidate and the true-surface point it would move to.
struct Pick {
    vertex: VertexId,
    at: Point3,
    target: Point3,
    visible: bool,
}

/// Fires the refinement ray families and snaps the outermost candidate
/// vertices on each ray onto the true solid.
///
/// Corrections are applied as soon as they are found, so later rays see
/// the updated shell. Every matched candidate, corrected or rejected,
/// leaves `set`.
///
/// # Errors
///
/// Fails if the oracle cannot answer or the store is inconsistent.
pub fn shrink_wrap<O: RayOracle + ?Sized>(
    store: &mut TopologyStore,
    shell: ShellId,
    oracle: &O,
    grid: &SamplingGrid,
    set: &mut VertexSet,
    tolerance: &Tolerance,
) -> Result<ShrinkWrap> {
    let mut out = ShrinkWrap::default();

    for (axis, forward) in grid.refinement_axes() {
        for ray in grid.refinement_rays(axis, forward) {
            if set.is_empty() {
                return Ok(out);
            }
            refine_ray(store, shell, oracle, grid, set, tolerance, axis, &ray, &mut out)?;
        }
    }
    Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn refine_ray<O: RayOracle + ?Sized>(
    store: &mut TopologyStore,
    shell: ShellId,
    oracle: &O,
    grid: &SamplingGrid,
    set: &mut VertexSet,
    tolerance: &Tolerance,
    axis: Axis,
    ray: &GridRay,
    out: &mut ShrinkWrap,
) -> Result<()> {
    let Some(((hit1, p1), (hit2, p2))) = candidates(store, set, ray, axis, tolerance)? else {
        return Ok(());
    };

    let parts = oracle
        .shoot(ray)
        .map_err(|e| SamplingError::OracleUnavailable(e.to_string()))?;
    let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
        debug!(axis = %axis.letter(), origin = ?ray.origin(), "refinement ray missed the solid");
        out.misses += 1;
        return Ok(());
    };
    let (mhit1, mhit2) = (ray.at(first.entry_dist), ray.at(last.exit_dist));

    let extremes = ShellOracle::new(store, shell, *tolerance).extremes(ray)?;
    let on_shell = |at: &Point3, extreme: Option<Point3>| {
        extreme.is_some_and(|e| (at - e).norm_squared() < tolerance.dist_sq)
    };
    let visible1 = on_shell(&p1, extremes.map(|(e, _)| e));
    let visible2 = on_shell(&p2, extremes.map(|(_, e)| e));

    let mut picks = vec![Pick {
        vertex: hit1,
        at: p1,
        target: mhit1,
        visible: visible1,
    }];
    let r = axis.index();
    if hit1 != hit2 {
        picks.push(Pick {
            vertex: hit2,
            at: p2,
            target: mhit2,
            visible: visible2,
        });
    } else if (p1[r] - mhit2[r]).abs() < (p1[r] - mhit1[r]).abs() {
        picks[0].target = mhit2;
        picks[0].visible = visible2;
    }

    let cell_sq = grid.cell_size() * grid.cell_size();
    for pick in picks {
        set.remove(pick.vertex);
        if !pick.visible {
            debug!(vertex = ?pick.vertex, "candidate hidden by the shell");
            out.rejections += 1;
            continue;
        }
        let motion = pick.target - pick.at;
        if motion.norm_squared() > cell_sq && moves_outward(store, pick.vertex, &motion)? {
            debug!(vertex = ?pick.vertex, distance = motion.norm(), "correction beyond one cell");
            out.rejections += 1;
            continue;
        }

        MoveVertex::new(pick.vertex, pick.target, tolerance.dist_sq).execute(store)?;
        debug!(vertex = ?pick.vertex, from = ?pick.at, to = ?pick.target, "vertex moved");
        out.corrections.push(Correction {
            vertex: pick.vertex,
            axis,
            from: pick.at,
            to: pick.target,
        });
    }
    Ok(())
}

type Candidate = (VertexId, Point3);

/// The set members on the ray's line with the smallest and largest ray
/// parameter.
fn candidates(
    store: &TopologyStore,
    set: &VertexSet,
    ray: &GridRay,
    axis: Axis,
    tolerance: &Tolerance,
) -> Result<Option<(Candidate, Candidate)>> {
    let (p, q) = (axis.next().index(), axis.prev().index());
    let origin = ray.origin();
    let mut lowest: Option<(f64, Candidate)> = None;
    let mut highest: Option<(f64, Candidate)> = None;

    for vertex in set.iter() {
        let at = store.vertex_point(vertex)?;
        if !tolerance.near_zero(at[p] - origin[p]) || !tolerance.near_zero(at[q] - origin[q]) {
            continue;
        }
        let t = ray.param_of(&at);
        if lowest.is_none_or(|(lt, _)| t < lt) {
            lowest = Some((t, (vertex, at)));
        }
        if highest.is_none_or(|(ht, _)| t > ht) {
            highest = Some((t, (vertex, at)));
        }
    }
    Ok(lowest.zip(highest).map(|((_, lo), (_, hi))| (lo, hi)))
}

/// Returns `true` if `motion` points out of any face using `vertex`.
fn moves_outward(
    store: &TopologyStore,
    vertex: VertexId,
    motion: &crate::math::Vector3,
) -> Result<bool> {
    for &face in &store.vertex(vertex)?.faces {
        if let Some(plane) = &store.face(face)?.plane {
            if plane.normal().dot(motion) > 0.0 {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
