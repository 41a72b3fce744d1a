use slotmap::SlotMap;

use crate::error::TopologyError;
use crate::math::{Plane, Point3};

slotmap::new_key_type! {
    /// Unique identifier for a working face in the face store.
    pub struct FaceId;
}

/// A triangle of the working polyhedron.
///
/// Vertices are indices into the input point slice, counter-clockwise seen
/// from outside. Edge `k` runs from `vertices[k]` to `vertices[(k + 1) % 3]`
/// and `neighbors[k]` is the face on the other side of it.
#[derive(Debug, Clone)]
pub struct WorkingFace {
    pub vertices: [usize; 3],
    pub plane: Plane,
    pub neighbors: [FaceId; 3],
    /// Input points strictly outside this face and owned by it.
    pub conflicts: Vec<usize>,
    /// Conflict point with the largest distance, and that distance.
    pub furthest: Option<(usize, f64)>,
}

impl WorkingFace {
    /// Creates an unlinked face with an empty conflict list.
    #[must_use]
    pub fn new(vertices: [usize; 3], plane: Plane) -> Self {
        Self {
            vertices,
            plane,
            neighbors: [FaceId::default(); 3],
            conflicts: Vec::new(),
            furthest: None,
        }
    }

    /// Start and end vertex of edge `k`.
    #[must_use]
    pub fn edge(&self, k: usize) -> (usize, usize) {
        (self.vertices[k], self.vertices[(k + 1) % 3])
    }

    /// Index of the edge running from `from` to `to`, if this face has it.
    #[must_use]
    pub fn edge_index(&self, from: usize, to: usize) -> Option<usize> {
        (0..3).find(|&k| self.edge(k) == (from, to))
    }

    /// Adds `point` to the conflict list, updating the furthest point.
    ///
    /// Ties keep the lower point index.
    pub fn add_conflict(&mut self, point: usize, distance: f64) {
        self.conflicts.push(point);
        let better = self.furthest.is_none_or(|(best, best_dist)| {
            distance.total_cmp(&best_dist).then(best.cmp(&point)).is_gt()
        });
        if better {
            self.furthest = Some((point, distance));
        }
    }

    /// Signed distance of an input point from this face's plane.
    #[inline]
    #[must_use]
    pub fn distance(&self, points: &[Point3], point: usize) -> f64 {
        self.plane.signed_distance(&points[point])
    }
}

/// Arena that owns all faces of the working polyhedron.
///
/// Faces reference each other via generational [`FaceId`]s, so removed
/// faces can never be reached through a stale neighbour link by accident.
#[derive(Debug, Default)]
pub struct FaceStore {
    faces: SlotMap<FaceId, WorkingFace>,
}

impl FaceStore {
    /// Creates a new, empty face store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a face and returns its ID.
    pub fn insert(&mut self, face: WorkingFace) -> FaceId {
        self.faces.insert(face)
    }

    /// Removes a face, returning its data.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not in the store.
    pub fn remove(&mut self, id: FaceId) -> Result<WorkingFace, TopologyError> {
        self.faces.remove(id).ok_or(TopologyError::MissingFace)
    }

    /// Returns a reference to the face, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not in the store.
    pub fn get(&self, id: FaceId) -> Result<&WorkingFace, TopologyError> {
        self.faces.get(id).ok_or(TopologyError::MissingFace)
    }

    /// Returns a mutable reference to the face, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not in the store.
    pub fn get_mut(&mut self, id: FaceId) -> Result<&mut WorkingFace, TopologyError> {
        self.faces.get_mut(id).ok_or(TopologyError::MissingFace)
    }

    /// Returns `true` if the face is still part of the polyhedron.
    #[must_use]
    pub fn contains(&self, id: FaceId) -> bool {
        self.faces.contains_key(id)
    }

    /// Number of live faces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Returns `true` if there are no faces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Iterates over live faces in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (FaceId, &WorkingFace)> {
        self.faces.iter()
    }

    /// Points the neighbour link of `face` across edge `from -> to` at `neighbor`.
    ///
    /// # Errors
    ///
    /// Returns an error if `face` is missing or has no such edge.
    pub fn relink(
        &mut self,
        face: FaceId,
        from: usize,
        to: usize,
        neighbor: FaceId,
    ) -> Result<(), TopologyError> {
        let data = self.get_mut(face)?;
        let k = data
            .edge_index(from, to)
            .ok_or(TopologyError::BrokenLoop)?;
        data.neighbors[k] = neighbor;
        Ok(())
    }
}
