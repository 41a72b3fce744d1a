pub mod plane;
pub mod polygon_3d;

pub use plane::Plane;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Returns a characteristic length of a point set.
///
/// Sum of the largest absolute coordinate along each axis, never below 1.0.
/// Relative tolerances are multiplied by this to get absolute ones.
#[must_use]
pub fn extent(points: &[Point3]) -> f64 {
    let mut max = Vector3::zeros();
    for p in points {
        max.x = max.x.max(p.x.abs());
        max.y = max.y.max(p.y.abs());
        max.z = max.z.max(p.z.abs());
    }
    (max.x + max.y + max.z).max(1.0)
}

/// Distance from `point` to the infinite line through `a` and `b`.
#[must_use]
pub fn distance_to_line(point: &Point3, a: &Point3, b: &Point3) -> f64 {
    let dir = b - a;
    let len = dir.norm();
    if len < TOLERANCE {
        return (point - a).norm();
    }
    (point - a).cross(&dir).norm() / len
}
