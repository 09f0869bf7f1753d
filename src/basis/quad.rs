//! Tensor-product Bernstein basis on the reference square [0, 1]².
//!
//! Dof `(i, j)` has local index `j * (p + 1) + i` and basis function
//! B_i^p(x) B_j^p(y). Face dofs are listed in the direction of the face
//! parametrization, so the two sides of a shared edge traverse it in
//! opposite orders.

use super::ReferenceElement;
use crate::polynomial::{QuadratureRule, bernstein, bernstein_with_derivative, greville_points};

const QUAD_NORMALS: [[f64; 2]; 4] = [[0.0, -1.0], [1.0, 0.0], [0.0, 1.0], [-1.0, 0.0]];

/// Degree-p tensor-product Bernstein element on [0, 1]².
#[derive(Clone, Debug)]
pub struct BernsteinQuad {
    order: usize,
    /// Flat dof node coordinates, two per dof
    nodes: Vec<f64>,
    face_dofs: [Vec<usize>; 4],
}

impl BernsteinQuad {
    /// Create a quadrilateral element of the given polynomial degree.
    pub fn new(order: usize) -> Self {
        let n1 = order + 1;
        let g = greville_points(order);

        let mut nodes = Vec::with_capacity(2 * n1 * n1);
        for j in 0..n1 {
            for i in 0..n1 {
                nodes.push(g[i]);
                nodes.push(g[j]);
            }
        }

        let p = order;
        let bottom = (0..n1).collect();
        let right = (0..n1).map(|j| j * n1 + p).collect();
        let top = (0..n1).map(|i| p * n1 + (p - i)).collect();
        let left = (0..n1).map(|j| (p - j) * n1).collect();

        Self {
            order,
            nodes,
            face_dofs: [bottom, right, top, left],
        }
    }
}

impl ReferenceElement for BernsteinQuad {
    fn dim(&self) -> usize {
        2
    }

    fn order(&self) -> usize {
        self.order
    }

    fn n_dofs(&self) -> usize {
        (self.order + 1) * (self.order + 1)
    }

    fn n_faces(&self) -> usize {
        4
    }

    fn n_face_dofs(&self) -> usize {
        self.order + 1
    }

    fn face_dofs(&self, face: usize) -> &[usize] {
        &self.face_dofs[face]
    }

    fn dof_node(&self, dof: usize) -> &[f64] {
        &self.nodes[2 * dof..2 * dof + 2]
    }

    fn shape(&self, xi: &[f64], out: &mut [f64]) {
        let n1 = self.order + 1;
        let bx = bernstein(self.order, xi[0]);
        let by = bernstein(self.order, xi[1]);
        for j in 0..n1 {
            for i in 0..n1 {
                out[j * n1 + i] = bx[i] * by[j];
            }
        }
    }

    fn grad_shape(&self, xi: &[f64], out: &mut [f64]) {
        let n1 = self.order + 1;
        let (bx, dbx) = bernstein_with_derivative(self.order, xi[0]);
        let (by, dby) = bernstein_with_derivative(self.order, xi[1]);
        for j in 0..n1 {
            for i in 0..n1 {
                let dof = j * n1 + i;
                out[2 * dof] = dbx[i] * by[j];
                out[2 * dof + 1] = bx[i] * dby[j];
            }
        }
    }

    fn face_point(&self, face: usize, s: &[f64]) -> Vec<f64> {
        let s = s[0];
        match face {
            0 => vec![s, 0.0],
            1 => vec![1.0, s],
            2 => vec![1.0 - s, 1.0],
            _ => vec![0.0, 1.0 - s],
        }
    }

    fn face_normal(&self, face: usize) -> &[f64] {
        &QUAD_NORMALS[face]
    }

    fn element_rule(&self) -> QuadratureRule {
        QuadratureRule::gauss_2d(self.order + 2)
    }

    fn face_rule(&self) -> QuadratureRule {
        QuadratureRule::gauss_1d(self.order + 2)
    }

    fn name(&self) -> &'static str {
        "bernstein_quad"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_dofs_corners() {
        let el = BernsteinQuad::new(2);
        // Bottom runs left to right, top runs right to left
        assert_eq!(el.face_dofs(0), &[0, 1, 2]);
        assert_eq!(el.face_dofs(1), &[2, 5, 8]);
        assert_eq!(el.face_dofs(2), &[8, 7, 6]);
        assert_eq!(el.face_dofs(3), &[6, 3, 0]);
    }

    #[test]
    fn test_face_dof_nodes_follow_parametrization() {
        let el = BernsteinQuad::new(3);
        for face in 0..4 {
            let dofs = el.face_dofs(face);
            for (j, &dof) in dofs.iter().enumerate() {
                let s = j as f64 / 3.0;
                let expected = el.face_point(face, &[s]);
                let node = el.dof_node(dof);
                assert!((node[0] - expected[0]).abs() < 1e-14);
                assert!((node[1] - expected[1]).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_non_face_dofs_vanish_on_face() {
        let el = BernsteinQuad::new(2);
        let mut shape = vec![0.0; el.n_dofs()];
        for face in 0..4 {
            el.shape(&el.face_point(face, &[0.37]), &mut shape);
            let on_face = el.face_dofs(face);
            let trace: f64 = on_face.iter().map(|&d| shape[d]).sum();
            assert!((trace - 1.0).abs() < 1e-14);
            for (dof, &v) in shape.iter().enumerate() {
                if !on_face.contains(&dof) {
                    assert!(v.abs() < 1e-14);
                }
            }
        }
    }

    #[test]
    fn test_gradients_sum_to_zero() {
        let el = BernsteinQuad::new(3);
        let mut g = vec![0.0; 2 * el.n_dofs()];
        el.grad_shape(&[0.2, 0.7], &mut g);
        let gx: f64 = g.iter().step_by(2).sum();
        let gy: f64 = g.iter().skip(1).step_by(2).sum();
        assert!(gx.abs() < 1e-12);
        assert!(gy.abs() < 1e-12);
    }
}
