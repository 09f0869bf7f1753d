//! Reference elements: basis functions, face layout and quadrature rules.
//!
//! The evolution operator only talks to the [`ReferenceElement`] trait. Two
//! Bernstein (positive basis) elements are provided:
//! - [`BernsteinSegment`]: degree-p polynomials on [0, 1]
//! - [`BernsteinQuad`]: tensor-product degree-p polynomials on [0, 1]²
//!
//! Reference coordinates are on [0, 1]^d. Faces are numbered
//! counter-clockwise and parametrized on [0, 1]^(d-1):
//!
//! ```text
//! Segment: face 0 at t = 0, face 1 at t = 1
//! Quad:    face 0 (bottom) (s, 0)      face 1 (right) (1, s)
//!          face 2 (top)    (1 - s, 1)  face 3 (left)  (0, 1 - s)
//! ```

mod quad;
mod segment;

pub use quad::BernsteinQuad;
pub use segment::BernsteinSegment;

use crate::polynomial::QuadratureRule;

/// Shape and topology of the single element type used across a mesh.
pub trait ReferenceElement: Send + Sync {
    /// Reference dimension.
    fn dim(&self) -> usize;

    /// Polynomial degree per direction.
    fn order(&self) -> usize;

    /// Number of local dofs per scalar field (`nd`).
    fn n_dofs(&self) -> usize;

    /// Number of local faces.
    fn n_faces(&self) -> usize;

    /// Number of dofs on each face.
    fn n_face_dofs(&self) -> usize;

    /// Local dofs lying on `face`, ordered along the face parametrization.
    fn face_dofs(&self, face: usize) -> &[usize];

    /// Reference position associated with a dof.
    fn dof_node(&self, dof: usize) -> &[f64];

    /// Evaluate all basis functions at `xi` into `out` (length `n_dofs`).
    fn shape(&self, xi: &[f64], out: &mut [f64]);

    /// Evaluate reference gradients at `xi` into `out`, row-major
    /// `n_dofs × dim`.
    fn grad_shape(&self, xi: &[f64], out: &mut [f64]);

    /// Map a face parameter to element reference coordinates.
    fn face_point(&self, face: usize, s: &[f64]) -> Vec<f64>;

    /// Outward unit normal of `face` in reference coordinates.
    fn face_normal(&self, face: usize) -> &[f64];

    /// Quadrature rule for element interiors.
    fn element_rule(&self) -> QuadratureRule;

    /// Quadrature rule on a face, in face parameters.
    fn face_rule(&self) -> QuadratureRule;

    /// Reference centroid.
    fn centroid(&self) -> Vec<f64> {
        vec![0.5; self.dim()]
    }

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}
