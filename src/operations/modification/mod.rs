mod move_vertex;
mod split_edge;
mod triangulate;

pub use move_vertex::MoveVertex;
pub use split_edge::SplitEdge;
pub use triangulate::TriangulateFace;
