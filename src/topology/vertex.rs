use crate::math::Point3;

use super::face::FaceId;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the topology store.
    pub struct VertexId;
}

/// Data associated with a topological vertex.
///
/// A vertex may exist before its geometry is assigned: faces are connected
/// first and positions are attached afterwards, so `point` is optional.
#[derive(Debug, Clone, Default)]
pub struct VertexData {
    /// The 3D position of the vertex, once assigned.
    pub point: Option<Point3>,
    /// Faces whose loops use this vertex, one entry per face.
    pub faces: Vec<FaceId>,
}

impl VertexData {
    /// Creates a new vertex at the given point.
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self {
            point: Some(point),
            faces: Vec::new(),
        }
    }

    /// Creates a vertex without geometry.
    #[must_use]
    pub fn unplaced() -> Self {
        Self::default()
    }
}

/// A sampled point together with the vertex it is bound to, if any.
///
/// The binding is made lazily by the first face that uses the point and is
/// reused by every later face, so faces meeting at the same sample share one
/// vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndPoint {
    /// Sampled position.
    pub position: Point3,
    /// Bound vertex, `None` until a face first uses this point.
    pub vertex: Option<VertexId>,
}

impl EndPoint {
    /// Creates an unbound end point.
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            vertex: None,
        }
    }
}
