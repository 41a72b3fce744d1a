use std::collections::{HashMap, HashSet, VecDeque};

use slotmap::SecondaryMap;

use crate::error::{Result, TopologyError};
use crate::math::polygon_3d::{is_collinear, newell_vector};
use crate::math::{extent, Plane, Point3, Vector3};

use super::mesh::{derive_edges, HullFace, HullMesh};
use super::store::{FaceId, FaceStore};
use super::HullConfig;

/// A finished triangle with neighbours as dense indices.
struct Triangle {
    vertices: [usize; 3],
    plane: Plane,
    neighbors: [usize; 3],
}

/// A face loop over input point indices.
#[derive(Debug, Clone)]
struct Polygon {
    vertices: Vec<usize>,
    normal: Vector3,
}

/// Turns the converged working polyhedron into the output mesh.
///
/// Merges coplanar neighbours into polygons, strips vertices that sit
/// straight on a polygon edge, welds coincident vertices, compacts the
/// vertex array and derives the edge list, checking every edge is shared
/// by exactly two faces.
///
/// # Errors
///
/// Returns a topology error if the faces do not close up.
pub fn finalize(
    store: &FaceStore,
    points: &[Point3],
    eps: f64,
    config: &HullConfig,
) -> Result<HullMesh> {
    let triangles = collect_triangles(store)?;

    let mut polygons = if config.merge_coplanar {
        let max_offset = (config.coplanar_tolerance * extent(points)).max(eps);
        let mut merged =
            merge_coplanar(&triangles, points, max_offset, config.coplanar_tolerance);
        drop_collinear(&mut merged, points, eps);
        merged
    } else {
        triangles
            .iter()
            .map(|tri| Polygon {
                vertices: tri.vertices.to_vec(),
                normal: *tri.plane.normal(),
            })
            .collect()
    };

    weld(&mut polygons, points, eps);
    compact(polygons, points)
}

/// Flattens the arena into a dense triangle list.
fn collect_triangles(store: &FaceStore) -> Result<Vec<Triangle>> {
    let mut dense: SecondaryMap<FaceId, usize> = SecondaryMap::with_capacity(store.len());
    for (i, (id, _)) in store.iter().enumerate() {
        dense.insert(id, i);
    }

    let mut triangles = Vec::with_capacity(store.len());
    for (_, face) in store.iter() {
        let mut neighbors = [0; 3];
        for (slot, id) in neighbors.iter_mut().zip(face.neighbors) {
            *slot = *dense.get(id).ok_or(TopologyError::MissingFace)?;
        }
        triangles.push(Triangle {
            vertices: face.vertices,
            plane: face.plane,
            neighbors,
        });
    }
    Ok(triangles)
}

/// Groups edge-connected triangles lying in their seed's plane and replaces
/// each group by its boundary polygon.
///
/// Candidates are always compared with the group's seed, never with the
/// triangle they were reached from, so a slowly curving surface cannot
/// drift into one group. The polygon normal is recomputed from the whole
/// boundary loop.
fn merge_coplanar(
    triangles: &[Triangle],
    points: &[Point3],
    max_offset: f64,
    coplanar_tolerance: f64,
) -> Vec<Polygon> {
    let n = triangles.len();
    let mut visited = vec![false; n];
    let mut polygons = Vec::with_capacity(n);

    for seed in 0..n {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut group = vec![seed];
        let mut queue = VecDeque::from([seed]);

        while let Some(curr) = queue.pop_front() {
            for &neighbor in &triangles[curr].neighbors {
                if !visited[neighbor]
                    && are_coplanar(
                        &triangles[seed],
                        &triangles[neighbor],
                        points,
                        max_offset,
                        coplanar_tolerance,
                    )
                {
                    visited[neighbor] = true;
                    group.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }

        let boundary = if group.len() > 1 {
            chain_boundary(&group, triangles)
        } else {
            None
        };
        match boundary {
            Some(vertices) => {
                let loop_points: Vec<Point3> = vertices.iter().map(|&v| points[v]).collect();
                let normal = newell_vector(&loop_points)
                    .try_normalize(0.0)
                    .unwrap_or(*triangles[seed].plane.normal());
                polygons.push(Polygon { vertices, normal });
            }
            None => {
                polygons.extend(group.iter().map(|&t| Polygon {
                    vertices: triangles[t].vertices.to_vec(),
                    normal: *triangles[t].plane.normal(),
                }));
            }
        }
    }

    polygons
}

/// Checks `other` lies in `seed`'s plane: normals within tolerance and
/// every vertex within `max_offset` of the seed plane.
fn are_coplanar(
    seed: &Triangle,
    other: &Triangle,
    points: &[Point3],
    max_offset: f64,
    coplanar_tolerance: f64,
) -> bool {
    let dot = seed.plane.normal().dot(other.plane.normal());
    if 1.0 - dot > coplanar_tolerance {
        return false;
    }
    other
        .vertices
        .iter()
        .all(|&v| seed.plane.signed_distance(&points[v]).abs() <= max_offset)
}

/// Walks the edges of a triangle group that border triangles outside it.
///
/// Returns `None` unless they form exactly one simple loop.
fn chain_boundary(group: &[usize], triangles: &[Triangle]) -> Option<Vec<usize>> {
    let members: HashSet<usize> = group.iter().copied().collect();
    let mut next_of: HashMap<usize, usize> = HashMap::new();
    let mut first = None;

    for &t in group {
        let tri = &triangles[t];
        for k in 0..3 {
            if members.contains(&tri.neighbors[k]) {
                continue;
            }
            let (from, to) = (tri.vertices[k], tri.vertices[(k + 1) % 3]);
            if next_of.insert(from, to).is_some() {
                return None;
            }
            first.get_or_insert(from);
        }
    }

    let start = first?;
    let mut chain = vec![start];
    let mut current = *next_of.get(&start)?;
    while current != start {
        if chain.len() >= next_of.len() {
            return None;
        }
        chain.push(current);
        current = *next_of.get(&current)?;
    }

    (chain.len() == next_of.len() && chain.len() >= 3).then_some(chain)
}

/// Removes vertices that lie straight on an edge of every polygon using them.
///
/// Such a vertex joins exactly two merged faces along one straight edge, so
/// dropping it from both loops keeps the edges matched.
fn drop_collinear(polygons: &mut [Polygon], points: &[Point3], eps: f64) {
    loop {
        // vertex -> (uses, straight uses)
        let mut uses: HashMap<usize, (usize, usize)> = HashMap::new();
        for poly in polygons.iter() {
            let n = poly.vertices.len();
            for i in 0..n {
                let prev = poly.vertices[(i + n - 1) % n];
                let curr = poly.vertices[i];
                let next = poly.vertices[(i + 1) % n];
                let entry = uses.entry(curr).or_insert((0, 0));
                entry.0 += 1;
                if is_collinear(&points[prev], &points[curr], &points[next], eps) {
                    entry.1 += 1;
                }
            }
        }

        let mut removable: HashSet<usize> = uses
            .into_iter()
            .filter(|&(_, (total, straight))| total == straight)
            .map(|(v, _)| v)
            .collect();
        for poly in polygons.iter() {
            let keep = poly.vertices.iter().filter(|v| !removable.contains(v)).count();
            if keep < 3 {
                for v in &poly.vertices {
                    removable.remove(v);
                }
            }
        }
        if removable.is_empty() {
            return;
        }

        for poly in polygons.iter_mut() {
            poly.vertices.retain(|v| !removable.contains(v));
        }
    }
}

/// Collapses vertices closer than `eps` onto one representative and drops
/// the repeated corners and faces this creates.
fn weld(polygons: &mut Vec<Polygon>, points: &[Point3], eps: f64) {
    let mut by_x: Vec<usize> = polygons
        .iter()
        .flat_map(|poly| poly.vertices.iter().copied())
        .collect();
    by_x.sort_unstable();
    by_x.dedup();
    by_x.sort_by(|&a, &b| points[a].x.total_cmp(&points[b].x).then(a.cmp(&b)));

    let mut canonical: HashMap<usize, usize> = HashMap::with_capacity(by_x.len());
    for (pos, &i) in by_x.iter().enumerate() {
        let mut target = i;
        for &j in by_x[..pos].iter().rev() {
            if points[i].x - points[j].x > eps {
                break;
            }
            if (points[i] - points[j]).norm() <= eps {
                target = canonical.get(&j).copied().unwrap_or(j);
                break;
            }
        }
        canonical.insert(i, target);
    }

    if canonical.iter().all(|(k, v)| k == v) {
        return;
    }

    for poly in polygons.iter_mut() {
        let mut welded: Vec<usize> = Vec::with_capacity(poly.vertices.len());
        for v in &poly.vertices {
            let c = canonical.get(v).copied().unwrap_or(*v);
            if welded.last() != Some(&c) {
                welded.push(c);
            }
        }
        while welded.len() > 1 && welded.first() == welded.last() {
            welded.pop();
        }
        poly.vertices = welded;
    }
    polygons.retain(|poly| poly.vertices.len() >= 3);
}

/// Renumbers the surviving vertices densely, in input order.
fn compact(polygons: Vec<Polygon>, points: &[Point3]) -> Result<HullMesh> {
    let mut source_indices: Vec<usize> = polygons
        .iter()
        .flat_map(|poly| poly.vertices.iter().copied())
        .collect();
    source_indices.sort_unstable();
    source_indices.dedup();

    let dense: HashMap<usize, usize> = source_indices
        .iter()
        .enumerate()
        .map(|(i, &src)| (src, i))
        .collect();

    let faces: Vec<HullFace> = polygons
        .into_iter()
        .map(|poly| HullFace {
            vertices: poly.vertices.iter().map(|v| dense[v]).collect(),
            normal: poly.normal,
        })
        .collect();
    let edges = derive_edges(&faces)?;

    Ok(HullMesh {
        vertices: source_indices.iter().map(|&i| points[i]).collect(),
        faces,
        edges,
        source_indices,
    })
}
