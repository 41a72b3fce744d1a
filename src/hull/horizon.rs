use std::collections::HashSet;

use crate::error::TopologyError;
use crate::math::{Plane, Point3};

use super::store::{FaceId, FaceStore};

/// One edge of the horizon, oriented as in the visible face it borders.
#[derive(Debug, Clone, Copy)]
pub struct HorizonEdge {
    pub from: usize,
    pub to: usize,
    /// The non-visible face on the far side of the edge.
    pub outer: FaceId,
    /// Plane of the visible face the edge was taken from.
    pub inner_plane: Plane,
}

/// The region of faces visible from an apex and its boundary cycle.
#[derive(Debug, Clone, Default)]
pub struct Horizon {
    /// Visible faces, starting with the face that owned the apex.
    pub visible: Vec<FaceId>,
    /// Boundary edges in counter-clockwise order seen from the apex.
    pub edges: Vec<HorizonEdge>,
}

/// Floods outward from `start` across every face that `apex` sees beyond
/// `eps` and collects the boundary of that region as a single edge cycle.
///
/// The flood is a depth-first walk that always leaves a face through the
/// edge after the one it entered by, which emits the horizon edges already
/// chained head to tail.
///
/// # Errors
///
/// Returns an error if the boundary is empty or is not one simple cycle.
pub fn compute(
    store: &FaceStore,
    points: &[Point3],
    start: FaceId,
    apex: usize,
    eps: f64,
) -> Result<Horizon, TopologyError> {
    let mut horizon = Horizon::default();
    let mut seen: HashSet<FaceId> = HashSet::new();
    seen.insert(start);
    horizon.visible.push(start);

    // (face, edge it was entered by, edges already examined)
    let mut stack: Vec<(FaceId, usize, usize)> = vec![(start, 0, 0)];
    while let Some(top) = stack.last_mut() {
        if top.2 == 3 {
            stack.pop();
            continue;
        }
        let (face_id, k) = (top.0, (top.1 + top.2) % 3);
        top.2 += 1;

        let face = store.get(face_id)?;
        let neighbor_id = face.neighbors[k];
        if seen.contains(&neighbor_id) {
            continue;
        }
        let neighbor = store.get(neighbor_id)?;
        let (from, to) = face.edge(k);

        if neighbor.distance(points, apex) > eps {
            let entry = neighbor
                .edge_index(to, from)
                .ok_or(TopologyError::HorizonNotSimple { apex })?;
            seen.insert(neighbor_id);
            horizon.visible.push(neighbor_id);
            stack.push((neighbor_id, entry, 1));
        } else {
            horizon.edges.push(HorizonEdge {
                from,
                to,
                outer: neighbor_id,
                inner_plane: face.plane,
            });
        }
    }

    check_cycle(&horizon.edges, apex)?;
    Ok(horizon)
}

/// Verifies the edges chain head to tail into one loop with no repeated vertex.
fn check_cycle(edges: &[HorizonEdge], apex: usize) -> Result<(), TopologyError> {
    if edges.len() < 3 {
        return Err(TopologyError::OpenBoundary { apex });
    }
    let mut starts = HashSet::with_capacity(edges.len());
    for (i, edge) in edges.iter().enumerate() {
        let next = &edges[(i + 1) % edges.len()];
        if edge.to != next.from || !starts.insert(edge.from) {
            return Err(TopologyError::HorizonNotSimple { apex });
        }
    }
    Ok(())
}
