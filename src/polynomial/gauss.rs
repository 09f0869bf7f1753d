//! Gauss-Legendre quadrature on the unit interval and tensor products.
//!
//! Reference elements live on [0, 1]^d, so the rules are mapped from the
//! classical [-1, 1] nodes: t = (1 + x) / 2, w_t = w_x / 2.
//! An n-point rule integrates polynomials of degree 2n - 1 exactly.

use super::legendre::legendre_and_derivative;
use std::f64::consts::PI;

/// Quadrature rule on a reference domain of dimension `dim`.
///
/// Points are stored flat: point `k` occupies `points[k*dim..(k+1)*dim]`.
/// A zero-dimensional rule (the face of a 1D element) has one point with
/// weight 1 and no coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadratureRule {
    /// Reference dimension
    pub dim: usize,
    /// Flat point coordinates
    pub points: Vec<f64>,
    /// Weights, one per point
    pub weights: Vec<f64>,
}

impl QuadratureRule {
    /// Rule of a point (dimension 0).
    pub fn point() -> Self {
        Self {
            dim: 0,
            points: Vec::new(),
            weights: vec![1.0],
        }
    }

    /// n-point Gauss-Legendre rule on [0, 1].
    pub fn gauss_1d(n: usize) -> Self {
        let (points, weights) = gauss_legendre(n);
        Self {
            dim: 1,
            points,
            weights,
        }
    }

    /// Tensor-product rule on [0, 1]^2 with n points per direction.
    ///
    /// Point `k = j * n + i` has coordinates `(x_i, x_j)`.
    pub fn gauss_2d(n: usize) -> Self {
        let (x, w) = gauss_legendre(n);
        let mut points = Vec::with_capacity(2 * n * n);
        let mut weights = Vec::with_capacity(n * n);
        for j in 0..n {
            for i in 0..n {
                points.push(x[i]);
                points.push(x[j]);
                weights.push(w[i] * w[j]);
            }
        }
        Self {
            dim: 2,
            points,
            weights,
        }
    }

    /// Number of quadrature points.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns `true` if the rule has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Coordinates of point `k`.
    #[inline]
    pub fn point_at(&self, k: usize) -> &[f64] {
        &self.points[k * self.dim..(k + 1) * self.dim]
    }

    /// Weight of point `k`.
    #[inline]
    pub fn weight(&self, k: usize) -> f64 {
        self.weights[k]
    }
}

/// Gauss-Legendre nodes and weights on [0, 1], nodes ascending.
///
/// Newton iteration on P_n starting from the Tricomi estimate.
pub fn gauss_legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    assert!(n > 0, "Gauss-Legendre rule needs at least one point");

    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];

    for i in 0..n {
        // Roots of P_n on [-1, 1], largest first
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..100 {
            let (p, dp) = legendre_and_derivative(n, x);
            let update = p / dp;
            x -= update;
            if update.abs() < 1e-15 {
                break;
            }
        }
        let (_, dp) = legendre_and_derivative(n, x);
        let w = 2.0 / ((1.0 - x * x) * dp * dp);

        // Largest root maps to the last node
        nodes[n - 1 - i] = 0.5 * (1.0 + x);
        weights[n - 1 - i] = 0.5 * w;
    }

    (nodes, weights)
}
