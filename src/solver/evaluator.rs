//! Pointwise reconstruction of the state at quadrature points.
//!
//! Both evaluations are pure reads of the dof vectors:
//!
//! ```text
//! element:  u_n(ξ_k)   = Σ_j u[n*nd + j] φ_j(ξ_k)
//! face:     u_n⁻(s_k)  = Σ_jf x[n, e, face_dof(i, jf)] φ_jf(s_k)
//!           u_n⁺(s_k)  = Σ_jf nbr_n(e, i, jf) φ_jf(s_k)
//! ```
//!
//! where `nbr_n` reads the paired dof from the local state, the halo buffer,
//! or, on boundary faces, the inflow buffer at the element's own face dof.

use crate::mesh::BoundaryTag;
use crate::operators::ShapeTables;
use crate::types::{DofLayout, DofRef, ElementIndex};

use super::NeighborMap;

/// Reads states at element and face quadrature points.
#[derive(Clone, Copy, Debug)]
pub struct StateEvaluator<'a> {
    shapes: &'a ShapeTables,
    neighbors: &'a NeighborMap,
    layout: DofLayout,
}

impl<'a> StateEvaluator<'a> {
    /// Evaluator for a system with `n_eq` equations.
    pub fn new(shapes: &'a ShapeTables, neighbors: &'a NeighborMap, n_eq: usize) -> Self {
        Self {
            shapes,
            neighbors,
            layout: neighbors.layout(n_eq),
        }
    }

    /// Layout of the state and halo vectors this evaluator reads.
    #[inline]
    pub fn layout(&self) -> DofLayout {
        self.layout
    }

    /// State at interior quadrature point `k` from one element block.
    ///
    /// `u_elem` is ordered `n * nd + j` (see [`super::DgState::element_block`]).
    pub fn element_eval(&self, u_elem: &[f64], k: usize, out: &mut [f64]) {
        let nd = self.layout.n_dofs;
        let phi = self.shapes.shape_at(k);
        for (n, o) in out.iter_mut().enumerate() {
            *o = u_elem[n * nd..(n + 1) * nd]
                .iter()
                .zip(phi)
                .map(|(u, p)| u * p)
                .sum();
        }
    }

    /// Interior and neighbor states at face quadrature point `k` of face `i`.
    ///
    /// Returns the boundary tag when face `i` lies on the domain boundary,
    /// in which case `out_nbr` holds the inflow placeholder that a boundary
    /// condition must still correct.
    #[allow(clippy::too_many_arguments)]
    pub fn face_eval(
        &self,
        x: &[f64],
        halo: &[f64],
        inflow: &[f64],
        e: ElementIndex,
        i: usize,
        k: usize,
        out_in: &mut [f64],
        out_nbr: &mut [f64],
    ) -> Option<BoundaryTag> {
        out_in.fill(0.0);
        out_nbr.fill(0.0);
        let mut tag = None;

        for jf in 0..self.shapes.n_face_dofs() {
            let phi = self.shapes.face_shape(i, jf, k);
            let j = self.shapes.face_dof(i, jf);
            let nbr = self.neighbors.resolve(e, i, jf);
            if let DofRef::Boundary(t) = nbr {
                tag = Some(t);
            }

            for n in 0..self.layout.n_eq {
                out_in[n] += phi * x[self.layout.state_index(n, e, j)];
                out_nbr[n] += phi
                    * match nbr {
                        DofRef::Local { element, dof } => x[self.layout.state_index(n, element, dof)],
                        DofRef::Remote { ghost, dof } => halo[self.layout.halo_index(n, ghost, dof)],
                        DofRef::Boundary(_) => inflow[self.layout.state_index(n, e, j)],
                    };
            }
        }
        tag
    }
}
