//! Mesh generators for analytical test geometries
//!
//! Closed spheres for validating the potential against closed-form results
//! and flat plates for orientation and batching checks.

use std::collections::HashMap;

use super::element::{TriangleMesh, jacobian, normal_and_integration_element};
use crate::core::types::{Point3, Real, cast, dot, sub};

/// Generate an icosphere mesh (subdivided icosahedron)
///
/// More uniform element sizes than a UV-sphere. Faces are wound so that the
/// geometric normal points away from the centre.
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `subdivisions` - Number of subdivision iterations (0 = 20 faces, each level ×4)
pub fn generate_icosphere_mesh(radius: f64, subdivisions: usize) -> TriangleMesh<f64> {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;

    let mut vertices: Vec<[f64; 3]> = vec![
        [-1.0, phi, 0.0],
        [1.0, phi, 0.0],
        [-1.0, -phi, 0.0],
        [1.0, -phi, 0.0],
        [0.0, -1.0, phi],
        [0.0, 1.0, phi],
        [0.0, -1.0, -phi],
        [0.0, 1.0, -phi],
        [phi, 0.0, -1.0],
        [phi, 0.0, 1.0],
        [-phi, 0.0, -1.0],
        [-phi, 0.0, 1.0],
    ];

    for v in &mut vertices {
        let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        v.iter_mut().for_each(|c| *c /= len);
    }

    let mut faces: Vec<[usize; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut new_faces = Vec::with_capacity(4 * faces.len());
        let mut edge_midpoints: HashMap<(usize, usize), usize> = HashMap::new();

        for &[v0, v1, v2] in &faces {
            let m01 = midpoint(&mut vertices, &mut edge_midpoints, v0, v1);
            let m12 = midpoint(&mut vertices, &mut edge_midpoints, v1, v2);
            let m20 = midpoint(&mut vertices, &mut edge_midpoints, v2, v0);

            new_faces.push([v0, m01, m20]);
            new_faces.push([v1, m12, m01]);
            new_faces.push([v2, m20, m12]);
            new_faces.push([m01, m12, m20]);
        }

        faces = new_faces;
    }

    let nodes: Vec<[f64; 3]> = vertices
        .iter()
        .map(|v| [v[0] * radius, v[1] * radius, v[2] * radius])
        .collect();

    TriangleMesh::from_points(&nodes, faces).expect("icosphere connectivity is in range")
}

/// Get or create the midpoint of an edge, projected to the unit sphere
fn midpoint(
    vertices: &mut Vec<[f64; 3]>,
    cache: &mut HashMap<(usize, usize), usize>,
    v0: usize,
    v1: usize,
) -> usize {
    let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };

    if let Some(&idx) = cache.get(&key) {
        return idx;
    }

    let mid = [
        (vertices[v0][0] + vertices[v1][0]) / 2.0,
        (vertices[v0][1] + vertices[v1][1]) / 2.0,
        (vertices[v0][2] + vertices[v1][2]) / 2.0,
    ];
    let len = (mid[0] * mid[0] + mid[1] * mid[1] + mid[2] * mid[2]).sqrt();

    let idx = vertices.len();
    vertices.push([mid[0] / len, mid[1] / len, mid[2] / len]);
    cache.insert(key, idx);

    idx
}

/// Generate a flat rectangular plate in the z = 0 plane
///
/// The plate spans `[0, width] × [0, height]` and is split into `nx × ny`
/// cells of two triangles each, all with normal `+z`.
pub fn generate_plate_mesh(width: f64, height: f64, nx: usize, ny: usize) -> TriangleMesh<f64> {
    let nx = nx.max(1);
    let ny = ny.max(1);

    let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        let y = height * j as f64 / ny as f64;
        for i in 0..=nx {
            let x = width * i as f64 / nx as f64;
            nodes.push([x, y, 0.0]);
        }
    }

    let row = nx + 1;
    let mut elements = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let n0 = j * row + i;
            let n1 = n0 + 1;
            let n2 = n0 + row;
            let n3 = n2 + 1;
            elements.push([n0, n1, n3]);
            elements.push([n0, n3, n2]);
        }
    }

    TriangleMesh::from_points(&nodes, elements).expect("plate connectivity is in range")
}

/// Orientation signs making every normal point away from `center`
///
/// Suitable for closed star-shaped surfaces around `center`.
pub fn outward_normal_signs<T: Real>(mesh: &TriangleMesh<T>, center: &Point3<T>) -> Vec<i32> {
    let third: T = cast(1.0 / 3.0);
    (0..mesh.num_elements())
        .map(|e| {
            let corners = mesh.corners(e);
            let (normal, _) = normal_and_integration_element(&jacobian(&corners));
            let centroid: [T; 3] =
                std::array::from_fn(|d| (corners[0][d] + corners[1][d] + corners[2][d]) * third);
            if dot(&normal, &sub(&centroid, center)) < T::zero() {
                -1
            } else {
                1
            }
        })
        .collect()
}
