use std::collections::HashMap;

use crate::error::{DegenerateInput, Result, TopologyError};
use crate::math::{distance_to_line, Plane, Point3};

use super::store::{FaceId, FaceStore, WorkingFace};

/// Picks four well-spread points forming a tetrahedron of non-zero volume.
///
/// Starts from the two furthest-apart axis extremes, then adds the point
/// furthest from their line and finally the point furthest from the plane
/// through all three. Ties go to the lowest input index.
///
/// # Errors
///
/// Returns the kind of degeneracy if any step finds nothing beyond `eps`.
pub fn select(points: &[Point3], eps: f64) -> std::result::Result<[usize; 4], DegenerateInput> {
    let extremes = axis_extremes(points);

    let mut best = (extremes[0], extremes[0]);
    let mut best_dist = -1.0;
    for (i, &a) in extremes.iter().enumerate() {
        for &b in &extremes[i + 1..] {
            let d = (points[a] - points[b]).norm();
            if d > best_dist {
                best_dist = d;
                best = (a, b);
            }
        }
    }
    if best_dist <= eps {
        return Err(DegenerateInput::Coincident);
    }
    let (i0, i1) = best;

    let (i2, line_dist) = argmax(points, |p| distance_to_line(p, &points[i0], &points[i1]));
    if line_dist <= eps {
        return Err(DegenerateInput::Collinear);
    }

    let base = Plane::through(&points[i0], &points[i1], &points[i2])
        .ok_or(DegenerateInput::Collinear)?;
    let (i3, plane_dist) = argmax(points, |p| base.signed_distance(p).abs());
    if plane_dist <= eps {
        return Err(DegenerateInput::Coplanar);
    }

    Ok([i0, i1, i2, i3])
}

/// Builds the four outward-facing, fully linked faces of the initial simplex.
///
/// # Errors
///
/// Returns an error if the points are degenerate.
pub fn build(points: &[Point3], eps: f64) -> Result<(FaceStore, [usize; 4])> {
    let [a, mut b, mut c, d] = select(points, eps)?;

    // The base must face away from the apex.
    let base = Plane::through(&points[a], &points[b], &points[c])
        .ok_or(DegenerateInput::Collinear)?;
    if base.signed_distance(&points[d]) > 0.0 {
        std::mem::swap(&mut b, &mut c);
    }

    let triangles = [[a, b, c], [a, d, b], [b, d, c], [c, d, a]];
    let mut store = FaceStore::new();
    let mut ids = Vec::with_capacity(triangles.len());
    for tri in triangles {
        let plane = Plane::through(&points[tri[0]], &points[tri[1]], &points[tri[2]])
            .ok_or(DegenerateInput::Coplanar)?;
        ids.push(store.insert(WorkingFace::new(tri, plane)));
    }
    link_faces(&mut store, &ids)?;

    Ok((store, [a, b, c, d]))
}

/// Connects the neighbour links of a closed set of faces by matching each
/// directed edge with its reverse.
fn link_faces(store: &mut FaceStore, ids: &[FaceId]) -> Result<()> {
    let mut edge_owner: HashMap<(usize, usize), FaceId> = HashMap::new();
    for &id in ids {
        let face = store.get(id)?;
        for k in 0..3 {
            edge_owner.insert(face.edge(k), id);
        }
    }

    for &id in ids {
        let face = store.get_mut(id)?;
        for k in 0..3 {
            let (from, to) = face.edge(k);
            let twin = edge_owner
                .get(&(to, from))
                .ok_or(TopologyError::NonManifoldEdge { a: from, b: to, faces: 1 })?;
            face.neighbors[k] = *twin;
        }
    }
    Ok(())
}

/// Indices of the min and max point along each axis.
fn axis_extremes(points: &[Point3]) -> [usize; 6] {
    let mut out = [0usize; 6];
    for axis in 0..3 {
        let (mut lo, mut hi) = (0, 0);
        for (i, p) in points.iter().enumerate() {
            if p[axis] < points[lo][axis] {
                lo = i;
            }
            if p[axis] > points[hi][axis] {
                hi = i;
            }
        }
        out[axis * 2] = lo;
        out[axis * 2 + 1] = hi;
    }
    out
}

/// First index maximizing `score`, with its score.
fn argmax(points: &[Point3], score: impl Fn(&Point3) -> f64) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, p) in points.iter().enumerate() {
        let s = score(p);
        if s > best.1 {
            best = (i, s);
        }
    }
    best
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::HullError;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    const EPS: f64 = 1e-10;

    #[test]
    fn picks_spread_out_points() {
        let pts = vec![
            p(0.1, 0.1, 0.1),
            p(-5.0, 0.0, 0.0),
            p(5.0, 0.0, 0.0),
            p(0.0, 3.0, 0.0),
            p(0.0, 0.0, 2.0),
            p(0.2, 0.0, 0.1),
        ];
        let simplex = select(&pts, EPS).unwrap();
        assert_eq!(simplex, [1, 2, 3, 4]);
    }

    #[test]
    fn coincident_points_rejected() {
        let pts = vec![p(1.0, 2.0, 3.0); 6];
        assert_eq!(select(&pts, EPS), Err(DegenerateInput::Coincident));
    }

    #[test]
    fn collinear_points_rejected() {
        let pts: Vec<Point3> = (0..6).map(|i| p(f64::from(i), 2.0 * f64::from(i), 0.0)).collect();
        assert_eq!(select(&pts, EPS), Err(DegenerateInput::Collinear));
    }

    #[test]
    fn coplanar_points_rejected() {
        let pts = vec![
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 1.0),
            p(1.0, 1.0, 1.0),
            p(0.0, 1.0, 1.0),
            p(0.5, 0.5, 1.0),
        ];
        assert_eq!(select(&pts, EPS), Err(DegenerateInput::Coplanar));
    }

    #[test]
    fn built_faces_point_outward() {
        let pts = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
        ];
        let (store, simplex) = build(&pts, EPS).unwrap();
        assert_eq!(store.len(), 4);

        let centroid = simplex
            .iter()
            .fold(Point3::origin(), |acc, &i| acc + pts[i].coords / 4.0);
        for (_, face) in store.iter() {
            assert!(face.plane.signed_distance(&centroid) < 0.0);
        }
    }

    #[test]
    fn built_faces_are_mutually_linked() {
        let pts = vec![
            p(0.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(0.0, 2.0, 0.0),
            p(0.0, 0.0, -2.0),
        ];
        let (store, _) = build(&pts, EPS).unwrap();
        for (id, face) in store.iter() {
            for k in 0..3 {
                let (from, to) = face.edge(k);
                let twin = store.get(face.neighbors[k]).unwrap();
                let back = twin.edge_index(to, from).unwrap();
                assert_eq!(twin.neighbors[back], id);
            }
        }
    }

    #[test]
    fn build_reports_degeneracy_as_hull_error() {
        let pts = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(3.0, 0.0, 0.0)];
        let err = build(&pts, EPS).unwrap_err();
        assert_eq!(err, HullError::DegenerateInput(DegenerateInput::Collinear));
    }
}
