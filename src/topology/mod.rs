pub mod edge;
pub mod face;
pub mod region;
pub mod shell;
pub mod vertex;

pub use edge::{EdgeData, EdgeId};
pub use face::{FaceData, FaceId};
pub use region::{RegionData, RegionId};
pub use shell::{ShellData, ShellId};
pub use vertex::{EndPoint, VertexData, VertexId};

use std::collections::HashMap;

use crate::error::TopologyError;
use crate::math::Point3;
use slotmap::SlotMap;

/// Central arena that owns all topological entities.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures and enabling safe mutation.
///
/// Edges are derived data: they are created and destroyed as face loops are
/// attached, detached or rewritten, so every edge always has at least one
/// face use.
#[derive(Debug, Default)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    faces: SlotMap<FaceId, FaceData>,
    shells: SlotMap<ShellId, ShellData>,
    regions: SlotMap<RegionId, RegionData>,
    edge_index: HashMap<(VertexId, VertexId), EdgeId>,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its ID.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        self.vertices.insert(data)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Returns a mutable reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Returns the position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex does not exist or has no geometry.
    pub fn vertex_point(&self, id: VertexId) -> Result<Point3, TopologyError> {
        self.vertex(id)?.point.ok_or(TopologyError::MissingGeometry)
    }

    /// Removes a vertex that no face uses any more.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex does not exist or is still in use.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<VertexData, TopologyError> {
        if !self.vertex(id)?.faces.is_empty() {
            return Err(TopologyError::InvalidTopology(
                "cannot remove a vertex that is still used by a face".into(),
            ));
        }
        self.vertices
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Iterates over all vertices in insertion-stable arena order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexData)> {
        self.vertices.iter()
    }

    /// Number of live vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    // --- Edge operations ---

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    /// Looks up the edge joining `a` and `b`, in either direction.
    #[must_use]
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_index.get(&EdgeData::key(a, b)).copied()
    }

    /// Iterates over all edges.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> {
        self.edges.iter()
    }

    /// Number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // --- Face operations ---

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Returns a mutable reference to the face data, or an error if not found.
    ///
    /// The loop itself must be changed through [`Self::set_face_loop`] so
    /// that edge and vertex uses stay consistent.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face_mut(&mut self, id: FaceId) -> Result<&mut FaceData, TopologyError> {
        self.faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    /// Iterates over all faces.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &FaceData)> {
        self.faces.iter()
    }

    /// Number of live faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns the positions of a face's loop vertices, in loop order.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is missing or a loop vertex has no geometry.
    pub fn face_points(&self, id: FaceId) -> Result<Vec<Point3>, TopologyError> {
        self.face(id)?
            .vertices
            .iter()
            .map(|&v| self.vertex_point(v))
            .collect()
    }

    /// Creates a face in `shell` bounded by `vertices` and registers its
    /// edge and vertex uses.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell or any vertex does not exist, or the
    /// loop has fewer than three vertices.
    pub fn attach_face(
        &mut self,
        shell: ShellId,
        vertices: Vec<VertexId>,
    ) -> Result<FaceId, TopologyError> {
        self.check_loop(&vertices)?;
        self.shell(shell)?;
        let face = self.faces.insert(FaceData {
            shell,
            vertices,
            plane: None,
            bounds: None,
        });
        self.register_uses(face)?;
        self.shell_mut(shell)?.faces.push(face);
        Ok(face)
    }

    /// Removes a face, dropping edges it was the last user of.
    ///
    /// Vertices are kept even when they become unused; callers decide
    /// whether to remove them.
    ///
    /// # Errors
    ///
    /// Returns an error if the face does not exist.
    pub fn detach_face(&mut self, id: FaceId) -> Result<FaceData, TopologyError> {
        self.unregister_uses(id)?;
        let data = self
            .faces
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))?;
        if let Some(shell) = self.shells.get_mut(data.shell) {
            shell.faces.retain(|&f| f != id);
        }
        Ok(data)
    }

    /// Replaces a face's loop, keeping its ID, plane and shell membership.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or a vertex does not exist, or the new
    /// loop has fewer than three vertices.
    pub fn set_face_loop(
        &mut self,
        id: FaceId,
        vertices: Vec<VertexId>,
    ) -> Result<(), TopologyError> {
        self.check_loop(&vertices)?;
        self.unregister_uses(id)?;
        self.face_mut(id)?.vertices = vertices;
        self.register_uses(id)
    }

    fn check_loop(&self, vertices: &[VertexId]) -> Result<(), TopologyError> {
        if vertices.len() < 3 {
            return Err(TopologyError::InvalidTopology(format!(
                "face loop needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        for &v in vertices {
            self.vertex(v)?;
        }
        Ok(())
    }

    fn register_uses(&mut self, id: FaceId) -> Result<(), TopologyError> {
        let pairs: Vec<_> = self.face(id)?.loop_edges().collect();
        for &(a, _) in &pairs {
            let vertex = self.vertex_mut(a)?;
            if !vertex.faces.contains(&id) {
                vertex.faces.push(id);
            }
        }
        for (a, b) in pairs {
            if a == b {
                continue;
            }
            let key = EdgeData::key(a, b);
            if let Some(&edge) = self.edge_index.get(&key) {
                if let Some(data) = self.edges.get_mut(edge) {
                    data.faces.push(id);
                }
            } else {
                let edge = self.edges.insert(EdgeData {
                    start: key.0,
                    end: key.1,
                    faces: vec![id],
                });
                self.edge_index.insert(key, edge);
            }
        }
        Ok(())
    }

    fn unregister_uses(&mut self, id: FaceId) -> Result<(), TopologyError> {
        let pairs: Vec<_> = self.face(id)?.loop_edges().collect();
        for &(a, _) in &pairs {
            if let Some(vertex) = self.vertices.get_mut(a) {
                vertex.faces.retain(|&f| f != id);
            }
        }
        for (a, b) in pairs {
            let key = EdgeData::key(a, b);
            let Some(&edge) = self.edge_index.get(&key) else {
                continue;
            };
            let now_unused = match self.edges.get_mut(edge) {
                Some(data) => {
                    if let Some(pos) = data.faces.iter().position(|&f| f == id) {
                        data.faces.remove(pos);
                    }
                    data.faces.is_empty()
                }
                None => false,
            };
            if now_unused {
                self.edges.remove(edge);
                self.edge_index.remove(&key);
            }
        }
        Ok(())
    }

    // --- Shell operations ---

    /// Inserts a shell and returns its ID.
    pub fn add_shell(&mut self, data: ShellData) -> ShellId {
        self.shells.insert(data)
    }

    /// Returns a reference to the shell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn shell(&self, id: ShellId) -> Result<&ShellData, TopologyError> {
        self.shells
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("shell".into()))
    }

    /// Returns a mutable reference to the shell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn shell_mut(&mut self, id: ShellId) -> Result<&mut ShellData, TopologyError> {
        self.shells
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("shell".into()))
    }

    // --- Region operations ---

    /// Inserts a region and returns its ID.
    pub fn add_region(&mut self, data: RegionData) -> RegionId {
        self.regions.insert(data)
    }

    /// Returns a reference to the region data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn region(&self, id: RegionId) -> Result<&RegionData, TopologyError> {
        self.regions
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("region".into()))
    }

    /// Returns a mutable reference to the region data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn region_mut(&mut self, id: RegionId) -> Result<&mut RegionData, TopologyError> {
        self.regions
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("region".into()))
    }

    /// Iterates over all regions.
    pub fn regions(&self) -> impl Iterator<Item = (RegionId, &RegionData)> {
        self.regions.iter()
    }
}
