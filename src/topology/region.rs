use crate::geometry::Aabb;

use super::shell::ShellId;

slotmap::new_key_type! {
    /// Unique identifier for a region in the topology store.
    pub struct RegionId;
}

/// Data associated with a region: a volume bounded by one or more shells.
///
/// Reconstruction produces a region with a single external shell.
#[derive(Debug, Clone, Default)]
pub struct RegionData {
    /// Shells bounding the region; the first is the external shell.
    pub shells: Vec<ShellId>,
    /// Bounding volume of all shells.
    pub bounds: Option<Aabb>,
}
