//! Robust 3D convex hulls for convex collision shapes.
//!
//! ```
//! use hullkit::{build_hull, Point3};
//!
//! let mut points = Vec::new();
//! for x in [0.0, 1.0] {
//!     for y in [0.0, 1.0] {
//!         for z in [0.0, 1.0] {
//!             points.push(Point3::new(x, y, z));
//!         }
//!     }
//! }
//!
//! let hull = build_hull(&points).unwrap();
//! assert_eq!(hull.faces.len(), 6);
//! assert_eq!(hull.edges.len(), 12);
//! ```

pub mod error;
pub mod hull;
pub mod math;
pub mod shape;

pub use error::{DegenerateInput, HullError, Result, TopologyError};
pub use hull::{build_hull, build_hull_with, BuildHull, HullConfig, HullEdge, HullFace, HullMesh};
pub use math::{Point3, Vector3};
pub use shape::{enclosing_radius, ConvexPolygonShape, ShapeBackend, ShapeHandle, ShapeKind};
