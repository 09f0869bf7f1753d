//! Precomputed DG operators.
//!
//! This module provides:
//! - Geometric factors at element and face quadrature points (`GeometryCache`)
//! - Basis function tables at those points (`ShapeTables`)
//! - Block-diagonal consistent and lumped mass operators (`MassOperators`)

mod geometric;
mod mass;
mod shape;

pub use geometric::{GeometryCache, adjugate, determinant};
pub(crate) use geometric::{GEOMETRY_TOL, distance, relative_to_centroid};
pub use mass::MassOperators;
pub use shape::ShapeTables;
