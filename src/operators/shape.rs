//! Basis function tables at quadrature points.
//!
//! Values and reference gradients of every basis function are tabulated at
//! the element quadrature points once, together with the values of the face
//! dofs at the face quadrature points of each face.

use crate::basis::ReferenceElement;

/// Tabulated basis values for one reference element.
#[derive(Clone, Debug)]
pub struct ShapeTables {
    dim: usize,
    n_dofs: usize,
    n_qp: usize,
    n_faces: usize,
    n_face_dofs: usize,
    n_face_qp: usize,
    /// φ_j(ξ_k) at index k * nd + j
    shape: Vec<f64>,
    /// ∇̂φ_j(ξ_k) at index (k * nd + j) * dim + r
    grad_shape: Vec<f64>,
    /// φ_{face_dof(i, j)} at face point k of face i, index (i * nfd + j) * nfq + k
    face_shape: Vec<f64>,
    /// Local dof of face-dof j on face i, index i * nfd + j
    face_dofs: Vec<usize>,
}

impl ShapeTables {
    /// Tabulate `element` at its own element and face quadrature rules.
    pub fn new<R: ReferenceElement + ?Sized>(element: &R) -> Self {
        let dim = element.dim();
        let nd = element.n_dofs();
        let rule = element.element_rule();
        let face_rule = element.face_rule();
        let n_faces = element.n_faces();
        let nfd = element.n_face_dofs();

        let mut shape = vec![0.0; rule.len() * nd];
        let mut grad_shape = vec![0.0; rule.len() * nd * dim];
        for k in 0..rule.len() {
            let xi = rule.point_at(k);
            element.shape(xi, &mut shape[k * nd..(k + 1) * nd]);
            element.grad_shape(xi, &mut grad_shape[k * nd * dim..(k + 1) * nd * dim]);
        }

        let face_dofs: Vec<usize> = (0..n_faces)
            .flat_map(|i| element.face_dofs(i).iter().copied())
            .collect();

        let mut face_shape = vec![0.0; n_faces * nfd * face_rule.len()];
        let mut values = vec![0.0; nd];
        for i in 0..n_faces {
            for k in 0..face_rule.len() {
                let xi = element.face_point(i, face_rule.point_at(k));
                element.shape(&xi, &mut values);
                for j in 0..nfd {
                    let dof = face_dofs[i * nfd + j];
                    face_shape[(i * nfd + j) * face_rule.len() + k] = values[dof];
                }
            }
        }

        Self {
            dim,
            n_dofs: nd,
            n_qp: rule.len(),
            n_faces,
            n_face_dofs: nfd,
            n_face_qp: face_rule.len(),
            shape,
            grad_shape,
            face_shape,
            face_dofs,
        }
    }

    /// Number of local dofs.
    #[inline]
    pub fn n_dofs(&self) -> usize {
        self.n_dofs
    }

    /// Number of element quadrature points.
    #[inline]
    pub fn n_quadrature_points(&self) -> usize {
        self.n_qp
    }

    /// Number of faces.
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.n_faces
    }

    /// Number of dofs per face.
    #[inline]
    pub fn n_face_dofs(&self) -> usize {
        self.n_face_dofs
    }

    /// Number of quadrature points per face.
    #[inline]
    pub fn n_face_quadrature_points(&self) -> usize {
        self.n_face_qp
    }

    /// All basis values at quadrature point `k`.
    #[inline]
    pub fn shape_at(&self, k: usize) -> &[f64] {
        &self.shape[k * self.n_dofs..(k + 1) * self.n_dofs]
    }

    /// Value of basis function `j` at quadrature point `k`.
    #[inline]
    pub fn shape(&self, j: usize, k: usize) -> f64 {
        self.shape[k * self.n_dofs + j]
    }

    /// Reference gradient of basis function `j` at quadrature point `k`.
    #[inline]
    pub fn grad_shape(&self, j: usize, k: usize) -> &[f64] {
        let start = (k * self.n_dofs + j) * self.dim;
        &self.grad_shape[start..start + self.dim]
    }

    /// Value of face-dof `j` of face `i` at face quadrature point `k`.
    #[inline]
    pub fn face_shape(&self, i: usize, j: usize, k: usize) -> f64 {
        self.face_shape[(i * self.n_face_dofs + j) * self.n_face_qp + k]
    }

    /// Local dof carried by face-dof `j` of face `i`.
    #[inline]
    pub fn face_dof(&self, i: usize, j: usize) -> usize {
        self.face_dofs[i * self.n_face_dofs + j]
    }

    /// All local dofs of face `i`.
    #[inline]
    pub fn face_dofs(&self, i: usize) -> &[usize] {
        &self.face_dofs[i * self.n_face_dofs..(i + 1) * self.n_face_dofs]
    }
}
