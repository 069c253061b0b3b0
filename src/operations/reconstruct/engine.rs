use tracing::{debug, info};

use crate::error::Result;
use crate::operations::creation::MakeRegion;
use crate::operations::query::Rebound;
use crate::oracle::RayOracle;
use crate::topology::TopologyStore;

use super::classify::build_shell;
use super::grid::SamplingGrid;
use super::refine_edges::refine_edges;
use super::sample::sample_columns;
use super::shrink_wrap::shrink_wrap;
use super::subdivide::subdivide_edges;
use super::{ReconstructParams, Reconstruction, ReconstructionReport};

/// Runs a full reconstruction against `oracle`.
///
/// Orchestrates the pipeline: grid layout, primary sampling, shell
/// building, and, when refinement is on, edge subdivision, shrink-wrap and
/// optional edge-midpoint refinement.
///
/// # Errors
///
/// Fails on invalid parameters, a degenerate bounding box, an oracle error
/// or an inconsistent store. No partial result is returned.
pub fn reconstruct_execute<O: RayOracle + ?Sized>(
    oracle: &O,
    params: &ReconstructParams,
) -> Result<Reconstruction> {
    // Step 1: Lay out the sampling grid
    params.validate()?;
    let bounds = oracle.bounds();
    let axis = params.primary_axis.resolve(&bounds);
    let grid = SamplingGrid::new(bounds, params.cell_size, axis)?;
    let (u, v) = grid.grid_axes();
    info!(
        axis = %axis.letter(),
        cells_u = grid.cells(u),
        cells_v = grid.cells(v),
        cells_a = grid.cells(axis),
        cell_size = params.cell_size,
        "sampling grid laid out"
    );

    let mut report = ReconstructionReport {
        primary_axis: Some(axis),
        primary_rays: grid.column_count(),
        ..ReconstructionReport::default()
    };

    // Step 2: Fire the primary rays
    let tol = params.tolerance;
    let mut columns = sample_columns(oracle, &grid, &tol)?;
    report.solid_columns = columns.solid_count();
    report.empty_columns = columns.empty_count();
    info!(
        rays = report.primary_rays,
        solid = report.solid_columns,
        empty = report.empty_columns,
        "primary sampling done"
    );

    // Step 3: Build the shell from the column occupancy
    let mut store = TopologyStore::new();
    let (region, shell) = MakeRegion::new().execute(&mut store);
    let stats = build_shell(&mut store, shell, &grid, &mut columns, tol.dist_sq)?;
    report.faces_built = stats.faces_built;
    report.degenerate_faces = stats.degenerate_faces;
    report.ambiguous_cells = stats.ambiguous_cells;
    info!(
        faces = stats.faces_built,
        degenerate = stats.degenerate_faces,
        ambiguous = stats.ambiguous_cells,
        "shell built"
    );

    let mut corrections = Vec::new();
    if params.refine {
        // Step 4: Subdivide edges along the primary axis
        let sub = subdivide_edges(&mut store, shell, &grid, &tol)?;
        report.subdivision_vertices = sub.vertices.len();
        report.failed_triangulations = sub.failed_triangulations;
        let mut candidates = sub.vertices;

        // Step 5: Shrink-wrap onto the true surface
        let wrap = shrink_wrap(&mut store, shell, oracle, &grid, &mut candidates, &tol)?;
        report.corrections = wrap.corrections.len();
        report.rejections = wrap.rejections;
        report.refinement_misses = wrap.misses;
        debug!(unmatched = candidates.len(), "candidates never matched");
        info!(
            candidates = report.subdivision_vertices,
            corrected = report.corrections,
            rejected = report.rejections,
            missed = report.refinement_misses,
            "shrink-wrap done"
        );
        corrections = wrap.corrections;
    }

    // Step 6: Break edges far from the surface
    if let Some(settings) = &params.edge_refinement {
        report.edges_broken =
            refine_edges(&mut store, shell, oracle, params.cell_size, settings, tol.dist_sq)?;
        info!(broken = report.edges_broken, "edge refinement done");
    }

    // Step 7: Final bounds and summary
    Rebound::new().execute(&mut store)?;
    let shell_data = store.shell(shell)?;
    report.face_count = shell_data.faces.len();
    report.bounds = shell_data.bounds;
    report.vertex_count = store.vertex_count();
    if let Some(b) = &report.bounds {
        info!(
            faces = report.face_count,
            vertices = report.vertex_count,
            min = ?b.min,
            max = ?b.max,
            "reconstruction complete"
        );
    }

    Ok(Reconstruction {
        store,
        region,
        shell,
        report,
        corrections,
    })
}
