pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod oracle;
pub mod tessellation;
pub mod topology;

pub use error::{RayshellError, Result};
pub use operations::reconstruct::{
    PrimaryAxis, Reconstruct, ReconstructParams, Reconstruction, ReconstructionReport,
};
pub use oracle::{Partition, RayOracle};
