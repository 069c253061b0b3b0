use thiserror::Error;

/// Top-level error type for the rayshell reconstruction kernel.
#[derive(Debug, Error)]
pub enum RayshellError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to topological operations.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("vertex has no geometry assigned")]
    MissingGeometry,

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Fatal failures of the ray sampling stages.
///
/// Any of these aborts a reconstruction; no partial shell is returned.
#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("bounding box is empty or degenerate: extents ({dx}, {dy}, {dz})")]
    EmptyBounds { dx: f64, dy: f64, dz: f64 },

    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),

    #[error("sampling grid of {cells} columns exceeds the supported size")]
    GridTooLarge { cells: usize },

    #[error("ray oracle unavailable: {0}")]
    OracleUnavailable(String),
}

/// Errors related to kernel operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors related to triangulation and export.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`RayshellError`].
pub type Result<T> = std::result::Result<T, RayshellError>;
