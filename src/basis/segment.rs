//! Bernstein basis on the reference segment [0, 1].

use super::ReferenceElement;
use crate::polynomial::{QuadratureRule, bernstein, bernstein_with_derivative, greville_points};

/// Degree-p Bernstein element on [0, 1].
///
/// Dof `i` is the coefficient of B_i^p; its node is the Greville point i/p.
/// Face 0 (t = 0) carries dof 0, face 1 (t = 1) carries dof p.
#[derive(Clone, Debug)]
pub struct BernsteinSegment {
    order: usize,
    nodes: Vec<f64>,
    face_dofs: [Vec<usize>; 2],
}

const SEGMENT_NORMALS: [[f64; 1]; 2] = [[-1.0], [1.0]];

impl BernsteinSegment {
    /// Create a segment element of the given polynomial degree.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            nodes: greville_points(order),
            face_dofs: [vec![0], vec![order]],
        }
    }
}

impl ReferenceElement for BernsteinSegment {
    fn dim(&self) -> usize {
        1
    }

    fn order(&self) -> usize {
        self.order
    }

    fn n_dofs(&self) -> usize {
        self.order + 1
    }

    fn n_faces(&self) -> usize {
        2
    }

    fn n_face_dofs(&self) -> usize {
        1
    }

    fn face_dofs(&self, face: usize) -> &[usize] {
        &self.face_dofs[face]
    }

    fn dof_node(&self, dof: usize) -> &[f64] {
        std::slice::from_ref(&self.nodes[dof])
    }

    fn shape(&self, xi: &[f64], out: &mut [f64]) {
        out.copy_from_slice(&bernstein(self.order, xi[0]));
    }

    fn grad_shape(&self, xi: &[f64], out: &mut [f64]) {
        let (_, d) = bernstein_with_derivative(self.order, xi[0]);
        out.copy_from_slice(&d);
    }

    fn face_point(&self, face: usize, _s: &[f64]) -> Vec<f64> {
        vec![if face == 0 { 0.0 } else { 1.0 }]
    }

    fn face_normal(&self, face: usize) -> &[f64] {
        &SEGMENT_NORMALS[face]
    }

    fn element_rule(&self) -> QuadratureRule {
        QuadratureRule::gauss_1d(self.order + 2)
    }

    fn face_rule(&self) -> QuadratureRule {
        QuadratureRule::point()
    }

    fn name(&self) -> &'static str {
        "bernstein_segment"
    }
}
