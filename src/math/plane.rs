use super::{Point3, Vector3};

/// An oriented plane `normal · x = offset` with a unit normal.
///
/// Points with a positive [`signed_distance`](Plane::signed_distance) lie on
/// the side the normal points to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3,
    offset: f64,
}

impl Plane {
    /// Creates a plane from a normal and a point on the plane.
    ///
    /// Returns `None` if the normal is zero-length or not finite.
    /// Callers decide what counts as "too small" for their own scale.
    #[must_use]
    pub fn from_normal(normal: Vector3, point: &Point3) -> Option<Self> {
        let len = normal.norm();
        if !len.is_finite() || len <= f64::MIN_POSITIVE {
            return None;
        }
        let normal = normal / len;
        Some(Self {
            offset: normal.dot(&point.coords),
            normal,
        })
    }

    /// Creates the plane through `a`, `b`, `c`, facing the side from which
    /// the triangle appears counter-clockwise.
    ///
    /// Returns `None` if the three points are collinear.
    #[must_use]
    pub fn through(a: &Point3, b: &Point3, c: &Point3) -> Option<Self> {
        Self::from_normal((b - a).cross(&(c - a)), a)
    }

    /// Returns the unit normal.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the plane offset along the normal.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Signed distance from the plane to `point`.
    #[inline]
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Returns the same plane facing the other way.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }
}
