#![allow(clippy::unwrap_used)]

mod common;

use common::{init_tracing, p};
use rayshell::error::{OperationError, SamplingError};
use rayshell::geometry::{Aabb, GridRay};
use rayshell::math::{Axis, Point3, Tolerance};
use rayshell::operations::creation::MakeRegion;
use rayshell::operations::query::ValidateShell;
use rayshell::operations::reconstruct::{build_shell, sample_columns, SamplingGrid};
use rayshell::oracle::{BoxSolid, SphereSolid, UnionSolid};
use rayshell::topology::TopologyStore;
use rayshell::{Partition, RayOracle, Reconstruct, ReconstructParams, RayshellError};

/// Positions of every face loop, in store order.
fn face_loops(store: &TopologyStore) -> Vec<Vec<Point3>> {
    store
        .faces()
        .map(|(id, _)| store.face_points(id).unwrap())
        .collect()
}

#[test]
fn identical_runs_are_bit_identical() {
    init_tracing();
    let sphere = SphereSolid::new(p(1.0, 2.0, 3.0), 20.0);
    let params = ReconstructParams::default().with_cell_size(4.0);
    let a = Reconstruct::new(sphere, params.clone()).execute().unwrap();
    let b = Reconstruct::new(sphere, params).execute().unwrap();

    assert_eq!(a.report, b.report);
    assert_eq!(face_loops(&a.store), face_loops(&b.store));
    let pa: Vec<_> = a.store.vertices().map(|(_, v)| v.point).collect();
    let pb: Vec<_> = b.store.vertices().map(|(_, v)| v.point).collect();
    assert_eq!(pa, pb);
}

#[test]
fn sampled_shell_has_no_duplicate_vertices() {
    let sphere = SphereSolid::new(p(0.0, 0.0, 0.0), 20.0);
    let params = ReconstructParams::default()
        .with_cell_size(4.0)
        .with_refine(false);
    let out = Reconstruct::new(sphere, params).execute().unwrap();

    let mut points: Vec<Point3> = out.store.vertices().map(|(_, v)| v.point.unwrap()).collect();
    points.sort_by(|a, b| {
        a.x.total_cmp(&b.x)
            .then(a.y.total_cmp(&b.y))
            .then(a.z.total_cmp(&b.z))
    });
    for pair in points.windows(2) {
        assert!((pair[0] - pair[1]).norm() > 1e-9, "duplicate at {:?}", pair[0]);
    }
    for (_, v) in out.store.vertices() {
        assert!(!v.faces.is_empty());
    }

    let report = ValidateShell::new(out.shell).execute(&out.store).unwrap();
    assert_eq!(report.non_manifold_edge_count, 0, "{report}");
    assert_eq!(report.misoriented_edge_count, 0, "{report}");
}

#[test]
fn every_solid_column_touches_a_face() {
    // An L-shaped solid: two boxes sharing a 40 x 20 x 20 footprint.
    let solid = UnionSolid::new()
        .with(BoxSolid::new(p(0.0, 0.0, 0.0), p(40.0, 20.0, 20.0)))
        .with(BoxSolid::new(p(0.0, 0.0, 20.0), p(20.0, 20.0, 40.0)));
    let tol = Tolerance::default();
    let grid = SamplingGrid::new(solid.bounds(), 10.0, Axis::Y).unwrap();
    let mut columns = sample_columns(&solid, &grid, &tol).unwrap();
    let mut store = TopologyStore::new();
    let (_, shell) = MakeRegion::new().execute(&mut store);
    let stats = build_shell(&mut store, shell, &grid, &mut columns, tol.dist_sq).unwrap();

    assert!(stats.faces_built > 0);
    for ((i, j), span) in columns.iter().filter(|(_, s)| s.is_solid()) {
        let vertex = span.entry.vertex.unwrap_or_else(|| panic!("column ({i}, {j}) unbound"));
        assert!(!store.vertex(vertex).unwrap().faces.is_empty());
    }
}

#[test]
fn rebuilding_sampled_state_gives_the_same_counts() {
    let sphere = SphereSolid::new(p(0.0, 0.0, 0.0), 15.0);
    let tol = Tolerance::default();
    let grid = SamplingGrid::new(sphere.bounds(), 3.0, Axis::Y).unwrap();
    let columns = sample_columns(&sphere, &grid, &tol).unwrap();

    let mut counts = Vec::new();
    for _ in 0..2 {
        let mut cols = columns.clone();
        let mut store = TopologyStore::new();
        let (_, shell) = MakeRegion::new().execute(&mut store);
        build_shell(&mut store, shell, &grid, &mut cols, tol.dist_sq).unwrap();
        counts.push((store.vertex_count(), store.face_count()));
    }
    assert_eq!(counts[0], counts[1]);
}

struct Offline;

impl RayOracle for Offline {
    fn bounds(&self) -> Aabb {
        Aabb::new(p(0.0, 0.0, 0.0), p(10.0, 10.0, 10.0))
    }

    fn shoot(&self, _ray: &GridRay) -> rayshell::Result<Vec<Partition>> {
        Err(OperationError::Failed("raytracer offline".into()).into())
    }
}

#[test]
fn oracle_failure_aborts_the_run() {
    let err = Reconstruct::new(Offline, ReconstructParams::default().with_cell_size(1.0))
        .execute()
        .unwrap_err();
    assert!(matches!(
        err,
        RayshellError::Sampling(SamplingError::OracleUnavailable(_))
    ));
}

#[test]
fn invalid_cell_size_is_rejected() {
    let solid = BoxSolid::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
    let err = Reconstruct::new(solid, ReconstructParams::default().with_cell_size(-1.0))
        .execute()
        .unwrap_err();
    assert!(matches!(
        err,
        RayshellError::Sampling(SamplingError::InvalidCellSize(_))
    ));
}
