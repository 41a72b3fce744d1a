//! Quickhull construction of 3D convex hulls.
//!
//! The builder runs four phases over a locally owned working set:
//! seed a tetrahedron from extreme points, assign every other point to a face
//! it lies outside of, repeatedly push the hull out to the furthest such
//! point, then merge coplanar triangles and emit vertices, faces and edges.

mod conflict;
mod expand;
mod finalize;
mod horizon;
mod mesh;
mod simplex;
mod store;

pub use mesh::{derive_edges, HullEdge, HullFace, HullMesh};

use tracing::debug;

use crate::error::{DegenerateInput, Result};
use crate::math::{extent, Point3};

use store::FaceId;

/// Tolerances and limits for hull construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullConfig {
    /// Plane-distance epsilon relative to the input extent.
    ///
    /// Points closer than this to a face plane count as on it, and on-plane
    /// points are inside.
    pub distance_tolerance: f64,
    /// Merge tolerance for adjacent faces.
    ///
    /// A face joins a merged polygon when `1 - n_a · n_b` against the
    /// polygon's first triangle is at most this, and each of its vertices
    /// lies within this times the input extent of that triangle's plane.
    pub coplanar_tolerance: f64,
    /// Merge coplanar triangles into polygons.
    pub merge_coplanar: bool,
    /// Maximum number of expansion steps. `None` uses the input size.
    pub max_iterations: Option<usize>,
}

impl Default for HullConfig {
    fn default() -> Self {
        Self {
            distance_tolerance: 1e-10,
            coplanar_tolerance: 1e-6,
            merge_coplanar: true,
            max_iterations: None,
        }
    }
}

impl HullConfig {
    /// Sets the relative plane-distance epsilon.
    #[must_use]
    pub fn with_distance_tolerance(mut self, tolerance: f64) -> Self {
        self.distance_tolerance = tolerance;
        self
    }

    /// Sets how far adjacent faces may deviate and still merge.
    #[must_use]
    pub fn with_coplanar_tolerance(mut self, tolerance: f64) -> Self {
        self.coplanar_tolerance = tolerance;
        self
    }

    /// Enables or disables merging coplanar triangles.
    #[must_use]
    pub fn with_merge_coplanar(mut self, merge: bool) -> Self {
        self.merge_coplanar = merge;
        self
    }

    /// Caps the number of expansion steps.
    #[must_use]
    pub fn with_max_iterations(mut self, limit: usize) -> Self {
        self.max_iterations = Some(limit);
        self
    }
}

/// Computes the convex hull of a point cloud.
pub struct BuildHull<'a> {
    points: &'a [Point3],
    config: HullConfig,
}

impl<'a> BuildHull<'a> {
    /// Creates a new `BuildHull` operation with the default configuration.
    #[must_use]
    pub fn new(points: &'a [Point3]) -> Self {
        Self {
            points,
            config: HullConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: HullConfig) -> Self {
        self.config = config;
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns [`HullError::DegenerateInput`](crate::HullError::DegenerateInput)
    /// for fewer than four points, non-finite coordinates, or points without
    /// volume; [`HullError::ConvergenceFailure`](crate::HullError::ConvergenceFailure)
    /// if the iteration cap is hit; a topology error on an internal bug.
    pub fn execute(&self) -> Result<HullMesh> {
        let points = self.points;
        if points.len() < 4 {
            return Err(DegenerateInput::TooFewPoints {
                count: points.len(),
            }
            .into());
        }
        if let Some(index) = points
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(DegenerateInput::NonFinite { index }.into());
        }

        let eps = self.config.distance_tolerance * extent(points);
        let (mut store, seed) = simplex::build(points, eps)?;
        debug!(points = points.len(), ?seed, eps, "seeded hull");

        let seed_faces: Vec<FaceId> = store.iter().map(|(id, _)| id).collect();
        let outside = conflict::partition(
            &mut store,
            &seed_faces,
            (0..points.len()).filter(|i| !seed.contains(i)),
            points,
            eps,
        )?;

        let limit = self.config.max_iterations.unwrap_or(points.len());
        let iterations = expand::run(&mut store, points, eps, limit)?;
        let mesh = finalize::finalize(&store, points, eps, &self.config)?;

        debug!(
            outside,
            iterations,
            vertices = mesh.vertices.len(),
            edges = mesh.edges.len(),
            faces = mesh.faces.len(),
            "built hull"
        );
        Ok(mesh)
    }
}

/// Computes the convex hull of `points` with the default configuration.
///
/// # Errors
///
/// See [`BuildHull::execute`].
pub fn build_hull(points: &[Point3]) -> Result<HullMesh> {
    BuildHull::new(points).execute()
}

/// Computes the convex hull of `points` with the given configuration.
///
/// # Errors
///
/// See [`BuildHull::execute`].
pub fn build_hull_with(points: &[Point3], config: &HullConfig) -> Result<HullMesh> {
    BuildHull::new(points).with_config(*config).execute()
}
