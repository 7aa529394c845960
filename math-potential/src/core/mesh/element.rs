//! Triangle mesh storage and per-element geometry
//!
//! An element is a flat triangle `(c0, c1, c2)`. Its reference map is the
//! affine map
//!
//! ```text
//! x(ξ, η) = c0 + ξ (c1 - c0) + η (c2 - c0)
//! ```
//!
//! from the reference triangle (0,0), (1,0), (0,1). The two edge vectors form
//! the Jacobian; the length of their cross product is the integration element,
//! i.e. twice the physical area.

use ndarray::Array2;

use crate::core::constants::NDIM;
use crate::core::error::{PotentialError, Result};
use crate::core::types::{Point3, Real, RefPoint, Vector3, cast, cross, norm};

/// Triangulated boundary mesh
///
/// Immutable once built; shared read-only by every lane of a launch.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh<T> {
    /// Vertex coordinates (num_vertices × 3)
    nodes: Array2<T>,
    /// Vertex indices of each triangle
    elements: Vec<[usize; 3]>,
}

impl<T: Real> TriangleMesh<T> {
    /// Build a mesh from a vertex table and triangle connectivity
    pub fn new(nodes: Array2<T>, elements: Vec<[usize; 3]>) -> Result<Self> {
        if nodes.ncols() != NDIM {
            return Err(PotentialError::LengthMismatch {
                name: "vertex row",
                expected: NDIM,
                got: nodes.ncols(),
            });
        }

        let num_vertices = nodes.nrows();
        for (element, tri) in elements.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&v| v >= num_vertices) {
                return Err(PotentialError::VertexOutOfRange {
                    element,
                    index,
                    num_vertices,
                });
            }
        }

        Ok(Self { nodes, elements })
    }

    /// Build a mesh from a flat `[x0, y0, z0, x1, ...]` coordinate array
    pub fn from_flat(vertices: Vec<T>, elements: Vec<[usize; 3]>) -> Result<Self> {
        let len = vertices.len();
        let nodes = Array2::from_shape_vec((len / NDIM, NDIM), vertices).map_err(|_| {
            PotentialError::LengthMismatch {
                name: "vertices",
                expected: NDIM * (len / NDIM),
                got: len,
            }
        })?;
        Self::new(nodes, elements)
    }

    /// Build a mesh from a list of vertex positions
    pub fn from_points(points: &[Point3<T>], elements: Vec<[usize; 3]>) -> Result<Self> {
        let flat = points.iter().flat_map(|p| p.iter().copied()).collect();
        Self::from_flat(flat, elements)
    }

    /// Number of vertices
    pub fn num_vertices(&self) -> usize {
        self.nodes.nrows()
    }

    /// Number of triangles
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Vertex coordinate table
    pub fn nodes(&self) -> &Array2<T> {
        &self.nodes
    }

    /// Triangle connectivity
    pub fn elements(&self) -> &[[usize; 3]] {
        &self.elements
    }

    /// Position of one vertex
    #[inline]
    pub fn vertex(&self, index: usize) -> Point3<T> {
        [
            self.nodes[[index, 0]],
            self.nodes[[index, 1]],
            self.nodes[[index, 2]],
        ]
    }

    /// The three corner positions of an element
    ///
    /// `element_id` must be below [`num_elements`](Self::num_elements).
    #[inline]
    pub fn corners(&self, element_id: usize) -> [Point3<T>; 3] {
        let [a, b, c] = self.elements[element_id];
        [self.vertex(a), self.vertex(b), self.vertex(c)]
    }

    /// Physical area of one element
    pub fn element_area(&self, element_id: usize) -> T {
        let (_, scale) = normal_and_integration_element(&jacobian(&self.corners(element_id)));
        scale * cast(0.5)
    }

    /// Total surface area
    pub fn total_area(&self) -> T {
        (0..self.num_elements())
            .map(|e| self.element_area(e))
            .fold(T::zero(), |acc, a| acc + a)
    }

    /// Copy of the mesh in another precision
    pub fn to_precision<U: Real>(&self) -> TriangleMesh<U> {
        TriangleMesh {
            nodes: self
                .nodes
                .mapv(|v| U::from_f64(v.to_f64().unwrap_or(f64::NAN)).unwrap_or_else(U::nan)),
            elements: self.elements.clone(),
        }
    }
}

/// Edge vectors `c1 - c0` and `c2 - c0` spanning the element's tangent plane
#[inline]
pub fn jacobian<T: Real>(corners: &[Point3<T>; 3]) -> [Vector3<T>; 2] {
    let [c0, c1, c2] = corners;
    [
        [c1[0] - c0[0], c1[1] - c0[1], c1[2] - c0[2]],
        [c2[0] - c0[0], c2[1] - c0[1], c2[2] - c0[2]],
    ]
}

/// Normal and integration element of a flat triangle
///
/// The normal follows the corner ordering (right-hand rule on the two edge
/// vectors) and is returned with unit length; the integration element is the
/// length of the raw cross product. A degenerate element yields a zero normal
/// and a zero integration element.
#[inline]
pub fn normal_and_integration_element<T: Real>(jacobian: &[Vector3<T>; 2]) -> (Vector3<T>, T) {
    let n = cross(&jacobian[0], &jacobian[1]);
    let scale = norm(&n);
    if scale > T::zero() {
        ([n[0] / scale, n[1] / scale, n[2] / scale], scale)
    } else {
        ([T::zero(); 3], T::zero())
    }
}

/// Flip `normal` in place by the stored orientation sign of `element_id`
#[inline]
pub fn update_normal<T: Real>(element_id: usize, signs: &[i32], normal: &mut Vector3<T>) {
    let sign: T = cast(f64::from(signs[element_id]));
    for component in normal.iter_mut() {
        *component *= sign;
    }
}

/// Map a reference-triangle point to the physical triangle
#[inline]
pub fn global_point<T: Real>(corners: &[Point3<T>; 3], ref_point: &RefPoint<T>) -> Point3<T> {
    map_reference(&corners[0], &jacobian(corners), ref_point)
}

#[inline]
fn map_reference<T: Real>(
    origin: &Point3<T>,
    jacobian: &[Vector3<T>; 2],
    ref_point: &RefPoint<T>,
) -> Point3<T> {
    let [xi, eta] = *ref_point;
    [
        origin[0] + xi * jacobian[0][0] + eta * jacobian[1][0],
        origin[1] + xi * jacobian[0][1] + eta * jacobian[1][1],
        origin[2] + xi * jacobian[0][2] + eta * jacobian[1][2],
    ]
}

/// Geometry of one element, reconstructed once per lane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementGeometry<T> {
    /// Corner positions
    pub corners: [Point3<T>; 3],
    /// Edge vectors from the first corner
    pub jacobian: [Vector3<T>; 2],
    /// Unit normal, already multiplied by the element's orientation sign
    pub normal: Vector3<T>,
    /// Ratio of physical to reference area (twice the element area)
    pub integration_element: T,
}

impl<T: Real> ElementGeometry<T> {
    /// Reconstruct the oriented geometry of `element_id`
    pub fn new(mesh: &TriangleMesh<T>, element_id: usize, normal_signs: &[i32]) -> Self {
        let corners = mesh.corners(element_id);
        let jacobian = jacobian(&corners);
        let (mut normal, integration_element) = normal_and_integration_element(&jacobian);
        update_normal(element_id, normal_signs, &mut normal);

        Self {
            corners,
            jacobian,
            normal,
            integration_element,
        }
    }

    /// Map a reference-triangle point onto this element
    #[inline]
    pub fn global_point(&self, ref_point: &RefPoint<T>) -> Point3<T> {
        map_reference(&self.corners[0], &self.jacobian, ref_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn right_triangle() -> TriangleMesh<f64> {
        TriangleMesh::from_points(
            &[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 3.0, 0.0]],
            vec![[0, 1, 2]],
        )
        .unwrap()
    }

    #[test]
    fn test_corners_follow_connectivity() {
        let mesh = TriangleMesh::from_points(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[2, 0, 1]],
        )
        .unwrap();
        let c = mesh.corners(0);
        assert_eq!(c[0], [0.0, 1.0, 0.0]);
        assert_eq!(c[1], [0.0, 0.0, 0.0]);
        assert_eq!(c[2], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_jacobian_and_integration_element() {
        let mesh = right_triangle();
        let jac = jacobian(&mesh.corners(0));
        assert_eq!(jac[0], [2.0, 0.0, 0.0]);
        assert_eq!(jac[1], [0.0, 3.0, 0.0]);

        let (normal, scale) = normal_and_integration_element(&jac);
        assert_eq!(normal, [0.0, 0.0, 1.0]);
        assert_relative_eq!(scale, 6.0);
        // Integration element is twice the physical area
        assert_relative_eq!(mesh.element_area(0), 3.0);
    }

    #[test]
    fn test_degenerate_element() {
        let jac = [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let (normal, scale) = normal_and_integration_element(&jac);
        assert_eq!(normal, [0.0; 3]);
        assert_eq!(scale, 0.0);
    }

    #[test]
    fn test_update_normal_flips_sign() {
        let mut n = [0.0, 0.0, 1.0];
        update_normal(1, &[1, -1], &mut n);
        assert_eq!(n, [0.0, 0.0, -1.0]);
        update_normal(0, &[1, -1], &mut n);
        assert_eq!(n, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_global_point_maps_reference_vertices() {
        let mesh = right_triangle();
        let corners = mesh.corners(0);
        assert_eq!(global_point(&corners, &[0.0, 0.0]), corners[0]);
        assert_eq!(global_point(&corners, &[1.0, 0.0]), corners[1]);
        assert_eq!(global_point(&corners, &[0.0, 1.0]), corners[2]);

        let centroid = global_point(&corners, &[1.0 / 3.0, 1.0 / 3.0]);
        assert_relative_eq!(centroid[0], 2.0 / 3.0);
        assert_relative_eq!(centroid[1], 1.0);
    }

    #[test]
    fn test_element_geometry_applies_sign() {
        let mesh = right_triangle();
        let geom = ElementGeometry::new(&mesh, 0, &[-1]);
        assert_eq!(geom.normal, [0.0, 0.0, -1.0]);
        assert_relative_eq!(geom.integration_element, 6.0);
        assert_eq!(
            geom.global_point(&[0.5, 0.5]),
            global_point(&geom.corners, &[0.5, 0.5])
        );
    }

    #[test]
    fn test_invalid_vertex_index() {
        let err = TriangleMesh::from_points(&[[0.0f64; 3]; 3], vec![[0, 1, 3]]).unwrap_err();
        assert!(matches!(
            err,
            PotentialError::VertexOutOfRange {
                element: 0,
                index: 3,
                num_vertices: 3
            }
        ));
    }

    #[test]
    fn test_flat_length_must_be_multiple_of_three() {
        let err = TriangleMesh::<f64>::from_flat(vec![0.0; 7], vec![]).unwrap_err();
        assert!(err.is_length_error());
    }

    #[test]
    fn test_to_precision() {
        let mesh = right_triangle();
        let single: TriangleMesh<f32> = mesh.to_precision();
        assert_eq!(single.num_elements(), 1);
        assert_eq!(single.vertex(2), [0.0f32, 3.0, 0.0]);
    }
}
