use tracing::trace;

use crate::error::{HullError, Result};
use crate::math::{Plane, Point3};

use super::conflict;
use super::horizon::{self, HorizonEdge};
use super::store::{FaceId, FaceStore, WorkingFace};

/// Grows the hull until no face has outside points left.
///
/// Each iteration takes the globally furthest conflict point as apex,
/// removes every face it sees, closes the hole with a fan of triangles from
/// the apex to the horizon, and hands the orphaned points to the new faces.
/// Returns the number of iterations performed.
///
/// # Errors
///
/// Returns [`HullError::ConvergenceFailure`] if more than `max_iterations`
/// apexes would be needed, or a topology error if the working polyhedron
/// stops being a closed manifold.
pub fn run(
    store: &mut FaceStore,
    points: &[Point3],
    eps: f64,
    max_iterations: usize,
) -> Result<usize> {
    let mut iterations = 0;

    while let Some((face, apex)) = next_apex(store) {
        if iterations >= max_iterations {
            return Err(HullError::ConvergenceFailure { iterations });
        }
        iterations += 1;

        let horizon = horizon::compute(store, points, face, apex, eps)?;
        trace!(
            apex,
            visible = horizon.visible.len(),
            horizon = horizon.edges.len(),
            "expanding hull"
        );

        let mut orphans = Vec::new();
        for &id in &horizon.visible {
            let removed = store.remove(id)?;
            orphans.extend(removed.conflicts.into_iter().filter(|&p| p != apex));
        }

        let fan = attach_fan(store, points, apex, &horizon.edges)?;
        conflict::partition(store, &fan, orphans, points, eps)?;
    }

    Ok(iterations)
}

/// Finds the conflict point furthest from its owning face.
///
/// Ties go to the lowest point index, so the result does not depend on
/// arena slot order.
fn next_apex(store: &FaceStore) -> Option<(FaceId, usize)> {
    let mut best: Option<(FaceId, usize, f64)> = None;
    for (id, face) in store.iter() {
        let Some((point, distance)) = face.furthest else {
            continue;
        };
        let better = best.is_none_or(|(_, best_point, best_dist)| {
            distance
                .total_cmp(&best_dist)
                .then(best_point.cmp(&point))
                .is_gt()
        });
        if better {
            best = Some((id, point, distance));
        }
    }
    best.map(|(id, point, _)| (id, point))
}

/// Creates one triangle per horizon edge, all sharing `apex`, and stitches
/// them to each other and to the faces beyond the horizon.
fn attach_fan(
    store: &mut FaceStore,
    points: &[Point3],
    apex: usize,
    edges: &[HorizonEdge],
) -> Result<Vec<FaceId>> {
    let n = edges.len();
    let mut fan = Vec::with_capacity(n);
    for edge in edges {
        // A sliver with no computable normal inherits the face it replaces.
        let plane = Plane::through(&points[edge.from], &points[edge.to], &points[apex])
            .unwrap_or(edge.inner_plane);
        fan.push(store.insert(WorkingFace::new([edge.from, edge.to, apex], plane)));
    }

    for (i, edge) in edges.iter().enumerate() {
        let id = fan[i];
        let face = store.get_mut(id)?;
        face.neighbors = [edge.outer, fan[(i + 1) % n], fan[(i + n - 1) % n]];
        store.relink(edge.outer, edge.to, edge.from, id)?;
    }

    Ok(fan)
}
