use tracing::debug;

use crate::error::Result;
use crate::operations::creation::MakeFace;
use crate::operations::query::Rebound;
use crate::topology::{EndPoint, ShellId, TopologyStore};

use super::grid::SamplingGrid;
use super::sample::{ColumnGrid, Span, SpanState};

/// Which end of a column span a face corner takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The entry point, on the low side of the primary axis.
    In,
    /// The exit point, on the high side.
    Out,
}

/// One face corner: block corner index (0..4) and span end.
pub type Corner = (usize, Side);

/// Counters produced while building the shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub faces_built: usize,
    pub degenerate_faces: usize,
    pub ambiguous_cells: usize,
}

/// Offsets of the four block corners, counter-clockwise in `(U, V)`.
const CORNER_OFFSETS: [(usize, usize); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

/// Ruled quad between consecutive corners `a` and `b`, wound outward when
/// the solid lies on the `a`-`b` side of the block.
fn quad(a: usize, b: usize) -> Vec<Corner> {
    vec![(b, Side::In), (b, Side::Out), (a, Side::Out), (a, Side::In)]
}

fn reversed(face: &[usize]) -> Vec<usize> {
    face.iter().rev().copied().collect()
}

fn on_side(face: &[usize], side: Side) -> Vec<Corner> {
    face.iter().map(|&c| (c, side)).collect()
}

/// Faces implied by an occupancy mask.
///
/// `entry_02` and `exit_02` select the split of a fully solid block on the
/// entry and exit side: `true` cuts along corners 0-2, `false` along 1-3.
/// Both are ignored for other masks. Returns `None` for masks that produce
/// no geometry.
#[must_use]
pub fn faces_for_mask(mask: u8, entry_02: bool, exit_02: bool) -> Option<Vec<Vec<Corner>>> {
    let faces = match mask {
        3 => vec![quad(0, 1)],
        6 => vec![quad(1, 2)],
        12 => vec![quad(2, 3)],
        9 => vec![quad(3, 0)],
        7 | 11 | 13 | 14 => {
            let void = (0..4).find(|c| mask & (1 << c) == 0)?;
            let solid: Vec<usize> = (0..4).filter(|&c| c != void).collect();
            vec![
                on_side(&solid, Side::In),
                on_side(&reversed(&solid), Side::Out),
                quad((void + 1) % 4, (void + 3) % 4),
            ]
        }
        15 => {
            let mut faces = if entry_02 {
                vec![on_side(&[0, 1, 2], Side::In), on_side(&[0, 2, 3], Side::In)]
            } else {
                vec![on_side(&[0, 1, 3], Side::In), on_side(&[3, 1, 2], Side::In)]
            };
            if exit_02 {
                faces.push(on_side(&[2, 1, 0], Side::Out));
                faces.push(on_side(&[2, 0, 3], Side::Out));
            } else {
                faces.push(on_side(&[3, 1, 0], Side::Out));
                faces.push(on_side(&[2, 1, 3], Side::Out));
            }
            faces
        }
        _ => return None,
    };
    Some(faces)
}

/// Returns `true` for masks that leave a boundary block without geometry.
#[must_use]
pub fn is_ambiguous(mask: u8) -> bool {
    matches!(mask, 1 | 2 | 4 | 5 | 8 | 10)
}

/// Builds the boundary faces of every 2x2 block of columns into `shell`.
///
/// Each corner's entry and exit point is bound to a vertex the first time a
/// face uses it; the binding is written back into `columns` so adjacent
/// blocks share vertices. Degenerate faces are dropped. Shell and region
/// bounds are recomputed at the end.
///
/// # Errors
///
/// Returns an error if the store is inconsistent.
pub fn build_shell(
    store: &mut TopologyStore,
    shell: ShellId,
    grid: &SamplingGrid,
    columns: &mut ColumnGrid,
    min_area: f64,
) -> Result<BuildStats> {
    let mut stats = BuildStats::default();
    let (cells_u, cells_v) = columns.dims();
    let primary = grid.primary().index();

    for i in 0..cells_u.saturating_sub(1) {
        for j in 0..cells_v.saturating_sub(1) {
            let mut mask = 0u8;
            for (c, (di, dj)) in CORNER_OFFSETS.iter().enumerate() {
                if columns.state(i + di, j + dj) == SpanState::Solid {
                    mask |= 1 << c;
                }
            }
            if is_ambiguous(mask) {
                stats.ambiguous_cells += 1;
                continue;
            }

            let spans = CORNER_OFFSETS.map(|(di, dj)| columns.span(i + di, j + dj).copied());
            let entry_02 = fully_solid_diagonal(&spans, Side::In, primary);
            let exit_02 = fully_solid_diagonal(&spans, Side::Out, primary);
            let Some(faces) = faces_for_mask(mask, entry_02, exit_02) else {
                continue;
            };

            for face in faces {
                // Re-read the corners so bindings made by earlier faces of
                // this block are reused.
                let corners: Option<Vec<EndPoint>> = face
                    .iter()
                    .map(|&(c, side)| {
                        let (di, dj) = CORNER_OFFSETS[c];
                        columns.span(i + di, j + dj).map(|span| match side {
                            Side::In => span.entry,
                            Side::Out => span.exit,
                        })
                    })
                    .collect();
                let Some(corners) = corners else { continue };
                let built = MakeFace::new(shell, corners, min_area).execute(store)?;
                if built.face.is_some() {
                    stats.faces_built += 1;
                } else {
                    stats.degenerate_faces += 1;
                }
                for (&(c, side), end) in face.iter().zip(built.corners) {
                    let (di, dj) = CORNER_OFFSETS[c];
                    if let Some(span) = columns.span_mut(i + di, j + dj) {
                        span_end(span, side).vertex = end.vertex;
                    }
                }
            }
        }
    }

    Rebound::new().execute(store)?;
    debug!(
        faces = stats.faces_built,
        degenerate = stats.degenerate_faces,
        ambiguous = stats.ambiguous_cells,
        "shell built"
    );
    Ok(stats)
}

fn span_end(span: &mut Span, side: Side) -> &mut EndPoint {
    match side {
        Side::In => &mut span.entry,
        Side::Out => &mut span.exit,
    }
}

/// Picks the diagonal of one side of a fully solid block: the one through
/// the corner whose end point deviates most from the side's mean. Ties keep
/// the lowest corner.
fn fully_solid_diagonal(spans: &[Option<Span>; 4], side: Side, primary: usize) -> bool {
    let heights: Vec<f64> = spans
        .iter()
        .filter_map(|s| {
            s.map(|s| match side {
                Side::In => s.entry.position[primary],
                Side::Out => s.exit.position[primary],
            })
        })
        .collect();
    if heights.len() != 4 {
        return true;
    }
    let mean = heights.iter().sum::<f64>() / 4.0;
    let mut max_corner = 0;
    let mut max_diff = (heights[0] - mean).abs();
    for (c, h) in heights.iter().enumerate().skip(1) {
        let diff = (h - mean).abs();
        if diff > max_diff {
            max_diff = diff;
            max_corner = c;
        }
    }
    max_corner == 1 || max_corner == 3
}
