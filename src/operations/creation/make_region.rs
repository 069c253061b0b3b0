use crate::topology::{RegionData, RegionId, ShellData, ShellId, TopologyStore};

/// Creates an empty region holding one empty shell.
#[derive(Debug, Default)]
pub struct MakeRegion;

impl MakeRegion {
    /// Creates a new `MakeRegion` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the operation, returning the region and its external shell.
    pub fn execute(&self, store: &mut TopologyStore) -> (RegionId, ShellId) {
        let region = store.add_region(RegionData::default());
        let shell = store.add_shell(ShellData {
            region,
            faces: Vec::new(),
            bounds: None,
        });
        if let Ok(data) = store.region_mut(region) {
            data.shells.push(shell);
        }
        (region, shell)
    }
}
