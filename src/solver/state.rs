//! Discrete state storage for systems of conservation laws.
//!
//! The state is one flat vector in equation-major layout:
//! `data[n * ne * nd + e * nd + j]` for equation n, element e, local dof j.
//! All equations of one element share the mass matrix, so each equation's
//! element block is contiguous.

use crate::error::{DgError, Result};
use crate::types::{DofLayout, ElementIndex};

/// Solution storage for a system of `n_eq` conservation laws.
#[derive(Clone, Debug, PartialEq)]
pub struct DgState {
    data: Vec<f64>,
    layout: DofLayout,
}

impl DgState {
    /// Create a new state initialized to zero.
    pub fn new(n_eq: usize, n_elements: usize, n_dofs: usize) -> Self {
        let layout = DofLayout::new(n_eq, n_elements, n_dofs, 0);
        Self {
            data: vec![0.0; layout.state_len()],
            layout,
        }
    }

    /// Create a new state initialized to zero (alias for `new`).
    pub fn zeros(n_eq: usize, n_elements: usize, n_dofs: usize) -> Self {
        Self::new(n_eq, n_elements, n_dofs)
    }

    /// Zero state with the same shape as `other`.
    pub fn zeros_like(other: &Self) -> Self {
        Self::new(other.n_eq(), other.n_elements(), other.n_dofs())
    }

    /// Wrap an existing equation-major vector.
    pub fn from_vec(n_eq: usize, n_elements: usize, n_dofs: usize, data: Vec<f64>) -> Result<Self> {
        let layout = DofLayout::new(n_eq, n_elements, n_dofs, 0);
        if data.len() != layout.state_len() {
            return Err(DgError::StateSizeMismatch {
                expected: layout.state_len(),
                actual: data.len(),
            });
        }
        Ok(Self { data, layout })
    }

    /// Fill every dof from `f(n, e, j)`.
    pub fn from_fn(
        n_eq: usize,
        n_elements: usize,
        n_dofs: usize,
        f: impl Fn(usize, ElementIndex, usize) -> f64,
    ) -> Self {
        let mut state = Self::new(n_eq, n_elements, n_dofs);
        for n in 0..n_eq {
            for e in ElementIndex::iter(n_elements) {
                for j in 0..n_dofs {
                    state.set(n, e, j, f(n, e, j));
                }
            }
        }
        state
    }

    /// Layout of this state (no ghosts).
    #[inline]
    pub fn layout(&self) -> DofLayout {
        self.layout
    }

    /// Number of equations.
    #[inline]
    pub fn n_eq(&self) -> usize {
        self.layout.n_eq
    }

    /// Number of elements.
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.layout.n_elements
    }

    /// Number of dofs per element and equation.
    #[inline]
    pub fn n_dofs(&self) -> usize {
        self.layout.n_dofs
    }

    /// Total number of values.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the state holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat values.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable flat values.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consume the state, returning the flat vector.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Get equation n at dof j of element e.
    #[inline]
    pub fn get(&self, n: usize, e: ElementIndex, j: usize) -> f64 {
        self.data[self.layout.state_index(n, e, j)]
    }

    /// Set equation n at dof j of element e.
    #[inline]
    pub fn set(&mut self, n: usize, e: ElementIndex, j: usize, value: f64) {
        let idx = self.layout.state_index(n, e, j);
        self.data[idx] = value;
    }

    /// All dofs of equation n.
    pub fn component(&self, n: usize) -> &[f64] {
        let size = self.layout.scalar_size();
        &self.data[n * size..(n + 1) * size]
    }

    /// Gather the dofs of element e into `out`, ordered `n * nd + j`.
    pub fn element_block(&self, e: ElementIndex, out: &mut [f64]) {
        let nd = self.n_dofs();
        for n in 0..self.n_eq() {
            let start = self.layout.state_index(n, e, 0);
            out[n * nd..(n + 1) * nd].copy_from_slice(&self.data[start..start + nd]);
        }
    }

    /// Scatter an `n * nd + j` ordered block into element e.
    pub fn set_element_block(&mut self, e: ElementIndex, block: &[f64]) {
        let nd = self.n_dofs();
        for n in 0..self.n_eq() {
            let start = self.layout.state_index(n, e, 0);
            self.data[start..start + nd].copy_from_slice(&block[n * nd..(n + 1) * nd]);
        }
    }

    /// Copy values from another state of the same shape.
    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(self.layout, other.layout);
        self.data.copy_from_slice(&other.data);
    }

    /// Scale all values by a constant.
    pub fn scale(&mut self, c: f64) {
        for v in &mut self.data {
            *v *= c;
        }
    }

    /// Add c * other to self (axpy operation).
    pub fn axpy(&mut self, c: f64, other: &Self) {
        assert_eq!(self.data.len(), other.data.len());
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += c * *b;
        }
    }

    /// Get maximum absolute value across all equations.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().map(|&x| x.abs()).fold(0.0, f64::max)
    }

    /// Euclidean norm of the flat vector.
    pub fn norm_l2(&self) -> f64 {
        self.data.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// Returns `true` if every value is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equation_major_layout() {
        let mut s = DgState::new(2, 3, 4);
        s.set(1, ElementIndex::new(2), 3, 7.0);
        assert_eq!(s.as_slice()[12 + 2 * 4 + 3], 7.0);
        assert_eq!(s.get(1, ElementIndex::new(2), 3), 7.0);
        assert_eq!(s.component(1).len(), 12);
    }

    #[test]
    fn test_element_block_round_trip() {
        let s = DgState::from_fn(2, 3, 2, |n, e, j| (100 * n + 10 * e.as_usize() + j) as f64);
        let mut block = vec![0.0; 4];
        s.element_block(ElementIndex::new(1), &mut block);
        assert_eq!(block, vec![10.0, 11.0, 110.0, 111.0]);

        let mut t = DgState::zeros_like(&s);
        t.set_element_block(ElementIndex::new(1), &block);
        assert_eq!(t.get(1, ElementIndex::new(1), 1), 111.0);
        assert_eq!(t.get(0, ElementIndex::new(0), 0), 0.0);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(DgState::from_vec(1, 2, 2, vec![0.0; 4]).is_ok());
        assert_eq!(
            DgState::from_vec(2, 2, 2, vec![0.0; 4]),
            Err(DgError::StateSizeMismatch {
                expected: 8,
                actual: 4
            })
        );
    }

    #[test]
    fn test_axpy_and_norms() {
        let mut a = DgState::from_fn(1, 2, 2, |_, _, _| 1.0);
        let b = DgState::from_fn(1, 2, 2, |_, e, j| (e.as_usize() * 2 + j) as f64);
        a.axpy(2.0, &b);
        assert_eq!(a.as_slice(), &[1.0, 3.0, 5.0, 7.0]);
        a.scale(0.5);
        assert!((a.max_abs() - 3.5).abs() < 1e-14);
        assert!((b.norm_l2() - 14.0_f64.sqrt()).abs() < 1e-14);
        assert!(a.is_finite());
    }
}
