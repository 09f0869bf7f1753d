//! Geometric factors at element and face quadrature points.
//!
//! For every element `e` and interior quadrature point `k` the cache holds
//!
//! ```text
//! adj(J)·w_k   (dim × dim, row-major)    det(J)·w_k
//! ```
//!
//! where `J = ∂x/∂ξ`. Since `J^{-T} det(J) = adj(J)^T`, the weak-form volume
//! term `∫ ∇φ_j · F dx` becomes `Σ_k ∇̂φ_j · (adj(J) w_k F)` without any
//! division by the determinant.
//!
//! Face normals follow Nanson's formula: with the reference outward normal
//! `n̂`, the vector `v = adj(J)^T n̂` is parallel to the physical outward
//! normal and `|v|` is the ratio of physical to reference face measure.

use faer::Mat;

use crate::basis::ReferenceElement;
use crate::error::{DgError, Result};
use crate::mesh::{ElementRef, FaceConnection, MeshGeometry};
use crate::types::ElementIndex;

/// Relative tolerance for geometric coincidence and orientation checks.
pub(crate) const GEOMETRY_TOL: f64 = 1e-8;

/// Precomputed geometry of every element and face of a mesh.
#[derive(Clone, Debug)]
pub struct GeometryCache {
    dim: usize,
    n_elements: usize,
    n_faces: usize,
    n_qp: usize,
    n_face_qp: usize,
    /// adj(J)·w per (e, k), dim² values each
    adj_weighted: Vec<f64>,
    /// det(J)·w per (e, k)
    det_weighted: Vec<f64>,
    /// Outward unit normal per (e, i, k), dim values each
    normals: Vec<f64>,
    /// Face measure weight per (e, i, k)
    face_weights: Vec<f64>,
    /// Physical coordinates of element quadrature points, dim per (e, k)
    qp_coords: Vec<f64>,
    /// Physical coordinates of face quadrature points, dim per (e, i, k)
    face_qp_coords: Vec<f64>,
    n_dofs: usize,
    /// Physical coordinates of dof nodes, dim per (e, j)
    dof_coords: Vec<f64>,
}

impl GeometryCache {
    /// Compute and validate geometry for all local elements of `mesh`.
    ///
    /// Fails on inverted elements, degenerate faces and faces whose normal
    /// does not point out of the element. Interior faces must see opposite
    /// normals at coincident points from both sides.
    pub fn compute<M, R>(mesh: &M, element: &R) -> Result<Self>
    where
        M: MeshGeometry + ?Sized,
        R: ReferenceElement + ?Sized,
    {
        let dim = element.dim();
        if mesh.dim() != dim {
            return Err(DgError::DimensionMismatch {
                what: "mesh",
                expected: dim,
                actual: mesh.dim(),
            });
        }
        if !(1..=3).contains(&dim) {
            return Err(DgError::UnsupportedDimension(dim));
        }

        let rule = element.element_rule();
        let face_rule = element.face_rule();
        let n_elements = mesh.n_elements();
        let n_faces = element.n_faces();
        let n_qp = rule.len();
        let n_face_qp = face_rule.len();

        let mut adj_weighted = Vec::with_capacity(n_elements * n_qp * dim * dim);
        let mut det_weighted = Vec::with_capacity(n_elements * n_qp);
        let mut qp_coords = Vec::with_capacity(n_elements * n_qp * dim);
        let mut normals = Vec::with_capacity(n_elements * n_faces * n_face_qp * dim);
        let mut face_weights = Vec::with_capacity(n_elements * n_faces * n_face_qp);
        let mut face_qp_coords = Vec::with_capacity(n_elements * n_faces * n_face_qp * dim);
        let n_dofs = element.n_dofs();
        let mut dof_coords = Vec::with_capacity(n_elements * n_dofs * dim);

        for e in ElementIndex::iter(n_elements) {
            for k in 0..rule.len() {
                let xi = rule.point_at(k);
                let jac = mesh.jacobian(e, xi);
                let det = determinant(&jac);
                if !(det > 0.0) {
                    return Err(DgError::InvertedElement {
                        element: e,
                        point: k,
                        det,
                    });
                }
                let adj = adjugate(&jac);
                let w = rule.weight(k);
                for r in 0..dim {
                    for c in 0..dim {
                        adj_weighted.push(adj[(r, c)] * w);
                    }
                }
                det_weighted.push(det * w);
                qp_coords.extend(mesh.map_to_physical(ElementRef::Local(e), xi));
            }

            for i in 0..n_faces {
                let n_ref = element.face_normal(i);
                for k in 0..face_rule.len() {
                    let xi = element.face_point(i, face_rule.point_at(k));
                    let adj = adjugate(&mesh.jacobian(e, &xi));
                    // v = adj(J)^T n̂
                    let v: Vec<f64> = (0..dim)
                        .map(|c| (0..dim).map(|r| adj[(r, c)] * n_ref[r]).sum())
                        .collect();
                    let len = v.iter().map(|x| x * x).sum::<f64>().sqrt();
                    if !(len > f64::EPSILON) {
                        return Err(DgError::DegenerateFace {
                            element: e,
                            face: i,
                            point: k,
                        });
                    }
                    normals.extend(v.iter().map(|x| x / len));
                    face_weights.push(len * face_rule.weight(k));
                    face_qp_coords.extend(mesh.map_to_physical(ElementRef::Local(e), &xi));
                }
            }

            for j in 0..n_dofs {
                dof_coords.extend(mesh.map_to_physical(ElementRef::Local(e), element.dof_node(j)));
            }
        }

        let cache = Self {
            dim,
            n_elements,
            n_faces,
            n_qp,
            n_face_qp,
            adj_weighted,
            det_weighted,
            normals,
            face_weights,
            qp_coords,
            face_qp_coords,
            n_dofs,
            dof_coords,
        };
        cache.validate_orientation(mesh, element)?;
        Ok(cache)
    }

    /// Every normal must point away from the element centroid, and the two
    /// sides of an interior face must agree up to sign.
    fn validate_orientation<M, R>(&self, mesh: &M, element: &R) -> Result<()>
    where
        M: MeshGeometry + ?Sized,
        R: ReferenceElement + ?Sized,
    {
        let centroid = element.centroid();
        let face_points = |e: ElementIndex, i: usize| -> Vec<Vec<f64>> {
            (0..self.n_face_qp)
                .map(|k| self.face_quadrature_point(e, i, k).to_vec())
                .collect()
        };

        for e in ElementIndex::iter(self.n_elements) {
            let xc = mesh.map_to_physical(ElementRef::Local(e), &centroid);
            for i in 0..self.n_faces {
                let points = face_points(e, i);
                let scale = points
                    .iter()
                    .map(|x| distance(x, &xc))
                    .fold(0.0, f64::max);

                for (k, x) in points.iter().enumerate() {
                    let outward: f64 = self
                        .normal(e, i, k)
                        .iter()
                        .zip(x.iter().zip(&xc))
                        .map(|(n, (a, b))| n * (a - b))
                        .sum();
                    if !(outward > GEOMETRY_TOL * scale) {
                        return Err(DgError::InwardNormal {
                            element: e,
                            face: i,
                        });
                    }
                }

                let FaceConnection::Interior(nbr) = mesh.face_connection(e, i) else {
                    continue;
                };
                let mine = relative_to_centroid(&points);
                let theirs = relative_to_centroid(&face_points(nbr.element, nbr.face));
                for (k, p) in mine.iter().enumerate() {
                    let kk = theirs
                        .iter()
                        .position(|q| distance(p, q) <= GEOMETRY_TOL * scale)
                        .ok_or_else(|| {
                            DgError::InvalidMesh(format!(
                                "face {} of element {} does not match face {} of element {}",
                                i, e, nbr.face, nbr.element
                            ))
                        })?;
                    let gap: f64 = self
                        .normal(e, i, k)
                        .iter()
                        .zip(self.normal(nbr.element, nbr.face, kk))
                        .map(|(a, b)| (a + b) * (a + b))
                        .sum::<f64>()
                        .sqrt();
                    if gap > GEOMETRY_TOL.sqrt() {
                        return Err(DgError::InwardNormal {
                            element: e,
                            face: i,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Spatial dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of elements covered.
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.n_elements
    }

    /// Interior quadrature points per element.
    #[inline]
    pub fn n_quadrature_points(&self) -> usize {
        self.n_qp
    }

    /// Quadrature points per face.
    #[inline]
    pub fn n_face_quadrature_points(&self) -> usize {
        self.n_face_qp
    }

    /// adj(J)·w at point `k` of element `e`, row-major `dim × dim`.
    #[inline]
    pub fn adjugate(&self, e: ElementIndex, k: usize) -> &[f64] {
        let d2 = self.dim * self.dim;
        let start = (e.as_usize() * self.n_qp + k) * d2;
        &self.adj_weighted[start..start + d2]
    }

    /// det(J)·w at point `k` of element `e`.
    #[inline]
    pub fn measure(&self, e: ElementIndex, k: usize) -> f64 {
        self.det_weighted[e.as_usize() * self.n_qp + k]
    }

    /// Outward unit normal at face point `k` of face `i` of element `e`.
    #[inline]
    pub fn normal(&self, e: ElementIndex, i: usize, k: usize) -> &[f64] {
        let start = self.face_slot(e, i, k) * self.dim;
        &self.normals[start..start + self.dim]
    }

    /// Face measure weight at face point `k` of face `i` of element `e`.
    #[inline]
    pub fn face_weight(&self, e: ElementIndex, i: usize, k: usize) -> f64 {
        self.face_weights[self.face_slot(e, i, k)]
    }

    /// Physical coordinates of quadrature point `k` of element `e`.
    #[inline]
    pub fn quadrature_point(&self, e: ElementIndex, k: usize) -> &[f64] {
        let start = (e.as_usize() * self.n_qp + k) * self.dim;
        &self.qp_coords[start..start + self.dim]
    }

    /// Physical coordinates of face point `k` of face `i` of element `e`.
    #[inline]
    pub fn face_quadrature_point(&self, e: ElementIndex, i: usize, k: usize) -> &[f64] {
        let start = self.face_slot(e, i, k) * self.dim;
        &self.face_qp_coords[start..start + self.dim]
    }

    /// Physical position of the node of dof `j` in element `e`.
    #[inline]
    pub fn dof_point(&self, e: ElementIndex, j: usize) -> &[f64] {
        let start = (e.as_usize() * self.n_dofs + j) * self.dim;
        &self.dof_coords[start..start + self.dim]
    }

    /// Physical volume of element `e`.
    pub fn volume(&self, e: ElementIndex) -> f64 {
        (0..self.n_qp).map(|k| self.measure(e, k)).sum()
    }

    #[inline]
    fn face_slot(&self, e: ElementIndex, i: usize, k: usize) -> usize {
        (e.as_usize() * self.n_faces + i) * self.n_face_qp + k
    }
}

/// Determinant of a 1×1, 2×2 or 3×3 matrix.
pub fn determinant(a: &Mat<f64>) -> f64 {
    match a.nrows() {
        1 => a[(0, 0)],
        2 => a[(0, 0)] * a[(1, 1)] - a[(0, 1)] * a[(1, 0)],
        3 => {
            a[(0, 0)] * (a[(1, 1)] * a[(2, 2)] - a[(1, 2)] * a[(2, 1)])
                - a[(0, 1)] * (a[(1, 0)] * a[(2, 2)] - a[(1, 2)] * a[(2, 0)])
                + a[(0, 2)] * (a[(1, 0)] * a[(2, 1)] - a[(1, 1)] * a[(2, 0)])
        }
        _ => f64::NAN,
    }
}

/// Adjugate (transposed cofactor matrix) of a 1×1, 2×2 or 3×3 matrix.
///
/// Satisfies `A · adj(A) = det(A) · I`.
pub fn adjugate(a: &Mat<f64>) -> Mat<f64> {
    let n = a.nrows();
    match n {
        1 => Mat::from_fn(1, 1, |_, _| 1.0),
        2 => {
            let mut adj = Mat::zeros(2, 2);
            adj[(0, 0)] = a[(1, 1)];
            adj[(0, 1)] = -a[(0, 1)];
            adj[(1, 0)] = -a[(1, 0)];
            adj[(1, 1)] = a[(0, 0)];
            adj
        }
        3 => Mat::from_fn(3, 3, |i, j| {
            // Cofactor C_ji, rows/cols taken cyclically so the sign is built in
            let (r0, r1) = ((j + 1) % 3, (j + 2) % 3);
            let (c0, c1) = ((i + 1) % 3, (i + 2) % 3);
            a[(r0, c0)] * a[(r1, c1)] - a[(r0, c1)] * a[(r1, c0)]
        }),
        _ => Mat::from_fn(n, n, |_, _| f64::NAN),
    }
}

pub(crate) fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

pub(crate) fn relative_to_centroid(points: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let dim = points.first().map_or(0, Vec::len);
    let count = points.len() as f64;
    let center: Vec<f64> = (0..dim)
        .map(|d| points.iter().map(|p| p[d]).sum::<f64>() / count)
        .collect();
    points
        .iter()
        .map(|p| p.iter().zip(&center).map(|(x, c)| x - c).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{BernsteinQuad, BernsteinSegment};
    use crate::mesh::{Mesh1D, QuadMesh};

    #[test]
    fn test_adjugate_identity() {
        for n in 1..=3 {
            let a = Mat::from_fn(n, n, |i, j| 1.0 / (1.0 + i as f64 + 2.0 * j as f64) + if i == j { 2.0 } else { 0.0 });
            let adj = adjugate(&a);
            let det = determinant(&a);
            let prod = &a * &adj;
            for i in 0..n {
                for j in 0..n {
                    let expected = if i == j { det } else { 0.0 };
                    assert!((prod[(i, j)] - expected).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_1d_normals_and_volume() {
        let mesh = Mesh1D::from_vertices(vec![0.0, 0.25, 1.0]).unwrap();
        let el = BernsteinSegment::new(2);
        let geo = GeometryCache::compute(&mesh, &el).unwrap();

        let e1 = ElementIndex::new(1);
        assert!((geo.volume(e1) - 0.75).abs() < 1e-14);
        assert_eq!(geo.normal(e1, 0, 0), &[-1.0]);
        assert_eq!(geo.normal(e1, 1, 0), &[1.0]);
        assert!((geo.face_weight(e1, 0, 0) - 1.0).abs() < 1e-14);
        // adj(J) is 1 in 1D, so the entry is the bare weight
        let w: f64 = (0..geo.n_quadrature_points()).map(|k| geo.adjugate(e1, k)[0]).sum();
        assert!((w - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_quad_face_weights_measure_edges() {
        let mesh = QuadMesh::uniform_rectangle(0.0, 2.0, 0.0, 1.0, 2, 2);
        let el = BernsteinQuad::new(1);
        let geo = GeometryCache::compute(&mesh, &el).unwrap();
        let e = ElementIndex::new(3);

        assert!((geo.volume(e) - 0.5).abs() < 1e-14);
        let bottom: f64 = (0..geo.n_face_quadrature_points())
            .map(|k| geo.face_weight(e, 0, k))
            .sum();
        let right: f64 = (0..geo.n_face_quadrature_points())
            .map(|k| geo.face_weight(e, 1, k))
            .sum();
        assert!((bottom - 1.0).abs() < 1e-14);
        assert!((right - 0.5).abs() < 1e-14);

        let n = geo.normal(e, 3, 0);
        assert!((n[0] + 1.0).abs() < 1e-14 && n[1].abs() < 1e-14);
    }

    #[test]
    fn test_trapezoid_normals_are_unit_and_outward() {
        let vertices = vec![[0.0, 0.0], [2.0, 0.0], [1.5, 1.0], [0.0, 1.0]];
        let mesh = QuadMesh::new(vertices, vec![[0, 1, 2, 3]]).unwrap();
        let el = BernsteinQuad::new(2);
        let geo = GeometryCache::compute(&mesh, &el).unwrap();
        let e = ElementIndex::new(0);

        // Slanted right edge from (2, 0) to (1.5, 1)
        let n = geo.normal(e, 1, 0);
        let expected = [1.0 / 1.25_f64.sqrt(), 0.5 / 1.25_f64.sqrt()];
        assert!((n[0] - expected[0]).abs() < 1e-12);
        assert!((n[1] - expected[1]).abs() < 1e-12);

        let length: f64 = (0..geo.n_face_quadrature_points())
            .map(|k| geo.face_weight(e, 1, k))
            .sum();
        assert!((length - 1.25_f64.sqrt()).abs() < 1e-12);
        // Trapezoid area
        assert!((geo.volume(e) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_clockwise_element_is_inverted() {
        let vertices = vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];
        let mesh = QuadMesh::new(vertices, vec![[0, 1, 2, 3]]).unwrap();
        let result = GeometryCache::compute(&mesh, &BernsteinQuad::new(1));
        assert!(matches!(result, Err(DgError::InvertedElement { .. })));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mesh = Mesh1D::uniform(0.0, 1.0, 2);
        let result = GeometryCache::compute(&mesh, &BernsteinQuad::new(1));
        assert!(matches!(result, Err(DgError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_periodic_faces_pass_validation() {
        let mesh = QuadMesh::uniform_periodic(0.0, 1.0, 0.0, 1.0, 3, 3);
        assert!(GeometryCache::compute(&mesh, &BernsteinQuad::new(2)).is_ok());
    }
}
