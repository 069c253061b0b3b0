use crate::geometry::Aabb;

use super::face::FaceId;
use super::region::RegionId;

slotmap::new_key_type! {
    /// Unique identifier for a shell in the topology store.
    pub struct ShellId;
}

/// Data associated with a topological shell.
///
/// A shell is a connected set of faces forming a surface boundary.
#[derive(Debug, Clone)]
pub struct ShellData {
    /// The region owning this shell.
    pub region: RegionId,
    /// The faces that make up this shell.
    pub faces: Vec<FaceId>,
    /// Bounding volume of the shell's faces.
    pub bounds: Option<Aabb>,
}
