//! Convex collision shape backed by an external physics engine.
//!
//! The shape keeps the raw point list and hands it to the backend untouched;
//! the backend is expected to build its own hull from it. The hull built
//! here only feeds the debug wireframe.

use tracing::warn;

use crate::hull::{build_hull_with, HullConfig};
use crate::math::Point3;

/// Opaque identifier of a shape registered with a [`ShapeBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeHandle(pub u64);

/// Shape types a backend can be asked to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ShapeKind {
    /// Convex hull of a point cloud.
    ConvexPolygon,
}

/// The physics engine side of a shape.
///
/// Passed explicitly to every call that talks to the engine.
pub trait ShapeBackend {
    /// Registers a new, empty shape.
    fn create_shape(&mut self, kind: ShapeKind) -> ShapeHandle;

    /// Replaces the shape's defining data.
    fn set_shape_data(&mut self, shape: ShapeHandle, points: &[Point3]);

    /// Releases the shape.
    fn free_shape(&mut self, shape: ShapeHandle);
}

/// A convex collision shape defined by a point cloud.
#[derive(Debug, Clone)]
pub struct ConvexPolygonShape {
    handle: ShapeHandle,
    points: Vec<Point3>,
    hull_config: HullConfig,
}

impl ConvexPolygonShape {
    /// Creates an empty shape registered with `backend`.
    pub fn new(backend: &mut impl ShapeBackend) -> Self {
        Self {
            handle: backend.create_shape(ShapeKind::ConvexPolygon),
            points: Vec::new(),
            hull_config: HullConfig::default(),
        }
    }

    /// Sets the tolerances used for the debug hull.
    #[must_use]
    pub fn with_hull_config(mut self, config: HullConfig) -> Self {
        self.hull_config = config;
        self
    }

    /// Returns the backend handle.
    #[must_use]
    pub fn handle(&self) -> ShapeHandle {
        self.handle
    }

    /// Returns the defining points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Replaces the defining points and pushes them to the backend.
    pub fn set_points(&mut self, backend: &mut impl ShapeBackend, points: Vec<Point3>) {
        self.points = points;
        backend.set_shape_data(self.handle, &self.points);
    }

    /// Endpoint pairs of every hull edge, for wireframe display.
    ///
    /// Empty when the points do not enclose a volume.
    #[must_use]
    pub fn debug_mesh_lines(&self) -> Vec<Point3> {
        if self.points.len() < 4 {
            return Vec::new();
        }
        match build_hull_with(&self.points, &self.hull_config) {
            Ok(mesh) => mesh
                .line_segments()
                .into_iter()
                .flat_map(|(a, b)| [a, b])
                .collect(),
            Err(err) => {
                if !err.is_degenerate() {
                    warn!(shape = ?self.handle, %err, "no debug hull for convex shape");
                }
                Vec::new()
            }
        }
    }

    /// Radius of the smallest origin-centred sphere containing the shape.
    #[must_use]
    pub fn enclosing_radius(&self) -> f64 {
        enclosing_radius(&self.points)
    }

    /// Unregisters the shape from `backend`.
    pub fn release(self, backend: &mut impl ShapeBackend) {
        backend.free_shape(self.handle);
    }
}

/// Largest distance from the origin to any of `points`; `0.0` when empty.
#[must_use]
pub fn enclosing_radius(points: &[Point3]) -> f64 {
    points
        .iter()
        .map(|p| p.coords.norm_squared())
        .fold(0.0, f64::max)
        .sqrt()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use approx::assert_relative_eq;

    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[derive(Default)]
    struct RecordingBackend {
        next: u64,
        shapes: HashMap<ShapeHandle, (ShapeKind, Vec<Point3>)>,
        uploads: usize,
    }

    impl ShapeBackend for RecordingBackend {
        fn create_shape(&mut self, kind: ShapeKind) -> ShapeHandle {
            self.next += 1;
            let handle = ShapeHandle(self.next);
            self.shapes.insert(handle, (kind, Vec::new()));
            handle
        }

        fn set_shape_data(&mut self, shape: ShapeHandle, points: &[Point3]) {
            self.uploads += 1;
            if let Some(entry) = self.shapes.get_mut(&shape) {
                entry.1 = points.to_vec();
            }
        }

        fn free_shape(&mut self, shape: ShapeHandle) {
            self.shapes.remove(&shape);
        }
    }

    fn cube_with_center() -> Vec<Point3> {
        let mut pts = vec![p(0.0, 0.0, 0.0)];
        for x in [-1.0, 1.0] {
            for y in [-1.0, 1.0] {
                for z in [-1.0, 1.0] {
                    pts.push(p(x, y, z));
                }
            }
        }
        pts
    }

    #[test]
    fn new_shape_is_registered() {
        let mut backend = RecordingBackend::default();
        let shape = ConvexPolygonShape::new(&mut backend);
        let (kind, data) = &backend.shapes[&shape.handle()];
        assert_eq!(*kind, ShapeKind::ConvexPolygon);
        assert!(data.is_empty());
        assert!(shape.points().is_empty());
    }

    #[test]
    fn raw_points_are_forwarded() {
        let mut backend = RecordingBackend::default();
        let mut shape = ConvexPolygonShape::new(&mut backend);
        let pts = cube_with_center();
        shape.set_points(&mut backend, pts.clone());

        assert_eq!(shape.points(), pts.as_slice());
        // The interior point is not dropped: the backend gets the input as-is.
        assert_eq!(backend.shapes[&shape.handle()].1, pts);
        assert_eq!(backend.uploads, 1);
    }

    #[test]
    fn debug_lines_trace_hull_edges() {
        let mut backend = RecordingBackend::default();
        let mut shape = ConvexPolygonShape::new(&mut backend);
        shape.set_points(&mut backend, cube_with_center());

        let lines = shape.debug_mesh_lines();
        assert_eq!(lines.len(), 24);
        for pair in lines.chunks(2) {
            assert_relative_eq!((pair[1] - pair[0]).norm(), 2.0);
        }
    }

    #[test]
    fn debug_lines_empty_for_degenerate_points() {
        let mut backend = RecordingBackend::default();
        let mut shape = ConvexPolygonShape::new(&mut backend);
        assert!(shape.debug_mesh_lines().is_empty());

        shape.set_points(&mut backend, vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]);
        assert!(shape.debug_mesh_lines().is_empty());

        shape.set_points(
            &mut backend,
            vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(0.0, 1.0, 0.0),
            ],
        );
        assert!(shape.debug_mesh_lines().is_empty());
    }

    #[test]
    fn debug_lines_empty_when_hull_fails() {
        let mut backend = RecordingBackend::default();
        let mut shape = ConvexPolygonShape::new(&mut backend)
            .with_hull_config(HullConfig::default().with_max_iterations(0));
        shape.set_points(&mut backend, cube_with_center());
        assert!(shape.debug_mesh_lines().is_empty());
    }

    #[test]
    fn radius_is_furthest_point_from_origin() {
        assert_relative_eq!(enclosing_radius(&[]), 0.0);
        let pts = [p(1.0, 0.0, 0.0), p(0.0, -3.0, 4.0), p(2.0, 2.0, 0.0)];
        assert_relative_eq!(enclosing_radius(&pts), 5.0);

        let mut backend = RecordingBackend::default();
        let mut shape = ConvexPolygonShape::new(&mut backend);
        shape.set_points(&mut backend, cube_with_center());
        assert_relative_eq!(shape.enclosing_radius(), 3.0_f64.sqrt());
    }

    #[test]
    fn release_frees_backend_shape() {
        let mut backend = RecordingBackend::default();
        let shape = ConvexPolygonShape::new(&mut backend);
        let handle = shape.handle();
        shape.release(&mut backend);
        assert!(!backend.shapes.contains_key(&handle));
    }
}
