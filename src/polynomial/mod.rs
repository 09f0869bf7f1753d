//! Polynomial evaluation and quadrature.
//!
//! This module provides:
//! - 1D Legendre polynomials (for locating Gauss nodes)
//! - Gauss-Legendre rules on [0, 1] and their tensor products
//! - Bernstein polynomials, the positive basis of the reference elements

mod bernstein;
mod gauss;
mod legendre;

pub use bernstein::{bernstein, bernstein_with_derivative, greville_points};
pub use gauss::{QuadratureRule, gauss_legendre};
pub use legendre::{legendre, legendre_and_derivative};
