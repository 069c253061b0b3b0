use crate::error::Result;
use crate::geometry::Aabb;
use crate::topology::{RegionId, TopologyStore};

/// Recomputes the bounds of every face, shell and region from scratch.
///
/// Incremental updates only ever grow bounds; this pass also shrinks them
/// after vertices have moved inward.
#[derive(Debug, Default)]
pub struct Rebound;

impl Rebound {
    /// Creates a new `Rebound` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the pass over all regions of the store.
    ///
    /// # Errors
    ///
    /// Returns an error if a face references a vertex without geometry.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<()> {
        let faces: Vec<_> = store.faces().map(|(id, _)| id).collect();
        for face in faces {
            let points = store.face_points(face)?;
            store.face_mut(face)?.bounds = Aabb::from_points(&points);
        }

        let regions: Vec<RegionId> = store.regions().map(|(id, _)| id).collect();
        for region in regions {
            let shells = store.region(region)?.shells.clone();
            let mut region_bounds = None;
            for shell in shells {
                let mut shell_bounds = None;
                for &face in &store.shell(shell)?.faces {
                    shell_bounds = Aabb::union(shell_bounds, store.face(face)?.bounds);
                }
                store.shell_mut(shell)?.bounds = shell_bounds;
                region_bounds = Aabb::union(region_bounds, shell_bounds);
            }
            store.region_mut(region)?.bounds = region_bounds;
        }
        Ok(())
    }
}
