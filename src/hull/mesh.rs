use std::collections::HashMap;

use crate::error::TopologyError;
use crate::math::polygon_3d::polygon_area_3d;
use crate::math::{Point3, Vector3};

/// A planar face of the hull.
#[derive(Debug, Clone, PartialEq)]
pub struct HullFace {
    /// Vertex indices, counter-clockwise seen from outside.
    pub vertices: Vec<usize>,
    /// Outward unit normal.
    pub normal: Vector3,
}

/// An undirected hull edge with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HullEdge {
    pub a: usize,
    pub b: usize,
}

impl HullEdge {
    /// Creates an edge, normalizing the vertex order.
    #[must_use]
    pub fn new(a: usize, b: usize) -> Self {
        if a < b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }
}

/// A closed convex polyhedron.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HullMesh {
    /// Hull vertex positions.
    pub vertices: Vec<Point3>,
    /// Faces as vertex loops with outward normals.
    pub faces: Vec<HullFace>,
    /// Every undirected edge exactly once.
    pub edges: Vec<HullEdge>,
    /// Index into the builder's input of each vertex.
    pub source_indices: Vec<usize>,
}

impl HullMesh {
    /// Largest signed distance from `point` to any face plane.
    ///
    /// Non-positive for points inside or on the hull.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        self.faces
            .iter()
            .filter_map(|face| {
                let anchor = self.vertices.get(*face.vertices.first()?)?;
                Some(face.normal.dot(&(point - anchor)))
            })
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Returns `true` if `point` is inside the hull or within `eps` of it.
    #[must_use]
    pub fn contains_point(&self, point: &Point3, eps: f64) -> bool {
        self.signed_distance(point) <= eps
    }

    /// Enclosed volume.
    ///
    /// Triangles referencing a missing vertex are skipped.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let mut six_volume = 0.0;
        for [a, b, c] in self.triangles() {
            let (Some(a), Some(b), Some(c)) =
                (self.vertices.get(a), self.vertices.get(b), self.vertices.get(c))
            else {
                continue;
            };
            six_volume += a.coords.dot(&b.coords.cross(&c.coords));
        }
        six_volume / 6.0
    }

    /// Total area of all faces.
    ///
    /// Out-of-range vertex indices are ignored.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.faces
            .iter()
            .map(|face| {
                let loop_points: Vec<Point3> = face
                    .vertices
                    .iter()
                    .filter_map(|&i| self.vertices.get(i).copied())
                    .collect();
                polygon_area_3d(&loop_points)
            })
            .sum()
    }

    /// Fan triangulation of every face, keeping the outward winding.
    #[must_use]
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        let mut out = Vec::new();
        for face in &self.faces {
            if let Some((&first, rest)) = face.vertices.split_first() {
                for pair in rest.windows(2) {
                    out.push([first, pair[0], pair[1]]);
                }
            }
        }
        out
    }

    /// Endpoints of every edge, for wireframe display.
    #[must_use]
    pub fn line_segments(&self) -> Vec<(Point3, Point3)> {
        self.edges
            .iter()
            .filter_map(|edge| Some((*self.vertices.get(edge.a)?, *self.vertices.get(edge.b)?)))
            .collect()
    }

    /// Checks the mesh is a closed, consistently wound 2-manifold of genus 0
    /// whose edge list matches its faces.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), TopologyError> {
        let edges = derive_edges(&self.faces)?;
        if edges.len() != self.edges.len() {
            return Err(TopologyError::EdgeListMismatch {
                expected: edges.len(),
                found: self.edges.len(),
            });
        }
        let (vertices, edges, faces) = (self.vertices.len(), edges.len(), self.faces.len());
        if vertices + faces != edges + 2 {
            return Err(TopologyError::NotClosed {
                vertices,
                edges,
                faces,
            });
        }
        Ok(())
    }
}

/// Collects each undirected edge of the face loops once, in first-seen order.
///
/// Every directed edge must occur exactly once and be matched by its reverse,
/// i.e. every edge borders exactly two faces with opposite orientation.
///
/// # Errors
///
/// Returns [`TopologyError::NonManifoldEdge`] for the first edge that breaks this.
pub fn derive_edges(faces: &[HullFace]) -> Result<Vec<HullEdge>, TopologyError> {
    let mut directed: HashMap<(usize, usize), usize> = HashMap::new();
    let mut order: Vec<HullEdge> = Vec::new();
    let mut count: HashMap<HullEdge, usize> = HashMap::new();

    for face in faces {
        let n = face.vertices.len();
        for i in 0..n {
            let (from, to) = (face.vertices[i], face.vertices[(i + 1) % n]);
            *directed.entry((from, to)).or_insert(0) += 1;
            let key = HullEdge::new(from, to);
            let seen = count.entry(key).or_insert(0);
            if *seen == 0 {
                order.push(key);
            }
            *seen += 1;
        }
    }

    for edge in &order {
        let faces = count.get(edge).copied().unwrap_or(0);
        let forward = directed.get(&(edge.a, edge.b)).copied().unwrap_or(0);
        let backward = directed.get(&(edge.b, edge.a)).copied().unwrap_or(0);
        if faces != 2 || forward != 1 || backward != 1 {
            return Err(TopologyError::NonManifoldEdge {
                a: edge.a,
                b: edge.b,
                faces,
            });
        }
    }
    Ok(order)
}
