use super::{Point3, Vector3};

/// Sum of the edge cross products of a polygon loop (Newell's method).
///
/// Twice the vector area: its direction is the loop's normal under the
/// right-hand rule and its length is twice the enclosed area.
#[must_use]
pub fn newell_vector(points: &[Point3]) -> Vector3 {
    let n = points.len();
    if n < 3 {
        return Vector3::zeros();
    }
    let mut cross_sum = Vector3::zeros();
    let o = &points[0];
    for i in 1..n {
        let a = points[i] - o;
        let b = points[(i + 1) % n] - o;
        cross_sum += a.cross(&b);
    }
    cross_sum
}

/// Compute the area of a 3D polygon (coplanar points).
#[must_use]
pub fn polygon_area_3d(points: &[Point3]) -> f64 {
    0.5 * newell_vector(points).norm()
}

/// Checks if `b` lies on the segment line through `a` and `c` within `tol`.
///
/// `tol` is an absolute distance.
#[must_use]
pub fn is_collinear(a: &Point3, b: &Point3, c: &Point3, tol: f64) -> bool {
    let ac = c - a;
    let len = ac.norm();
    if len <= tol {
        return true;
    }
    (b - a).cross(&ac).norm() / len <= tol
}

/// Interior angle of the polygon corner at `b`, in radians.
#[must_use]
pub fn corner_angle(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    let u = a - b;
    let v = c - b;
    u.cross(&v).norm().atan2(u.dot(&v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn unit_square() -> Vec<Point3> {
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn unit_square_area() {
        assert!((polygon_area_3d(&unit_square()) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn triangle_area() {
        let tri = vec![p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(0.0, 3.0, 0.0)];
        assert!((polygon_area_3d(&tri) - 6.0).abs() < TOLERANCE);
    }

    #[test]
    fn newell_follows_winding() {
        let ccw = newell_vector(&unit_square());
        assert_relative_eq!(ccw.normalize(), Vector3::new(0.0, 0.0, 1.0));

        let mut cw = unit_square();
        cw.reverse();
        assert_relative_eq!(newell_vector(&cw).normalize(), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn degenerate_loop_has_zero_vector() {
        assert_eq!(newell_vector(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]), Vector3::zeros());
    }

    #[test]
    fn collinear_detection() {
        assert!(is_collinear(&p(0.0, 0.0, 0.0), &p(2.0, 0.0, 0.0), &p(4.0, 0.0, 0.0), 1e-9));
        assert!(!is_collinear(&p(0.0, 0.0, 0.0), &p(2.0, 0.1, 0.0), &p(4.0, 0.0, 0.0), 1e-9));
    }

    #[test]
    fn square_corner_is_right_angle() {
        let sq = unit_square();
        assert_relative_eq!(corner_angle(&sq[3], &sq[0], &sq[1]), FRAC_PI_2);
    }
}
