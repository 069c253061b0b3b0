mod bounding_box;
mod is_valid;
mod tabulate_edges;

pub use bounding_box::Rebound;
pub use is_valid::{ShellReport, ValidateShell};
pub use tabulate_edges::TabulateEdges;
