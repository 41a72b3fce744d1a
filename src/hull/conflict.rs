use crate::error::TopologyError;
use crate::math::Point3;

use super::store::{FaceId, FaceStore};

/// Assigns each candidate point to the face it lies furthest outside of.
///
/// Only the faces in `faces` are considered. A point lying within `eps` of
/// every plane (or behind all of them) is inside the hull and is dropped for
/// good. Returns the number of points that found an owner.
///
/// # Errors
///
/// Returns an error if a face ID is not in the store.
pub fn partition(
    store: &mut FaceStore,
    faces: &[FaceId],
    candidates: impl IntoIterator<Item = usize>,
    points: &[Point3],
    eps: f64,
) -> Result<usize, TopologyError> {
    let mut assigned = 0;
    for point in candidates {
        let mut owner: Option<(FaceId, f64)> = None;
        for &id in faces {
            let distance = store.get(id)?.distance(points, point);
            if distance > eps && owner.is_none_or(|(_, best)| distance > best) {
                owner = Some((id, distance));
            }
        }
        if let Some((id, distance)) = owner {
            store.get_mut(id)?.add_conflict(point, distance);
            assigned += 1;
        }
    }
    Ok(assigned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::hull::simplex;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn tetra_with_extras(extras: &[Point3]) -> Vec<Point3> {
        let mut pts = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
        ];
        pts.extend_from_slice(extras);
        pts
    }

    #[test]
    fn inside_and_on_plane_points_are_dropped() {
        let pts = tetra_with_extras(&[p(0.1, 0.1, 0.1), p(0.5, 0.5, 0.0), p(0.0, 0.0, 0.0)]);
        let (mut store, _) = simplex::build(&pts, 1e-10).unwrap();
        let ids: Vec<FaceId> = store.iter().map(|(id, _)| id).collect();
        let assigned = partition(&mut store, &ids, 4..pts.len(), &pts, 1e-10).unwrap();
        assert_eq!(assigned, 0);
        assert!(store.iter().all(|(_, f)| f.conflicts.is_empty()));
    }

    #[test]
    fn outside_point_owned_by_exactly_one_face() {
        let pts = tetra_with_extras(&[p(1.0, 1.0, 1.0), p(-1.0, 0.1, 0.1)]);
        let (mut store, _) = simplex::build(&pts, 1e-10).unwrap();
        let ids: Vec<FaceId> = store.iter().map(|(id, _)| id).collect();
        let assigned = partition(&mut store, &ids, 4..pts.len(), &pts, 1e-10).unwrap();
        assert_eq!(assigned, 2);

        for point in [4, 5] {
            let owners = store
                .iter()
                .filter(|(_, f)| f.conflicts.contains(&point))
                .count();
            assert_eq!(owners, 1);
        }
    }

    #[test]
    fn owner_is_the_face_seen_most_directly() {
        // Far out along -x: the x = 0 face is the one it is furthest outside of.
        let pts = tetra_with_extras(&[p(-3.0, 0.2, 0.2)]);
        let (mut store, _) = simplex::build(&pts, 1e-10).unwrap();
        let ids: Vec<FaceId> = store.iter().map(|(id, _)| id).collect();
        partition(&mut store, &ids, [4], &pts, 1e-10).unwrap();

        let (_, owner) = store.iter().find(|(_, f)| !f.conflicts.is_empty()).unwrap();
        assert!(owner.plane.normal().x < -0.99);
        assert_eq!(owner.furthest.map(|(i, _)| i), Some(4));
    }
}
