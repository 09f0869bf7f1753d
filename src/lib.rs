//! # dg-hypsys
//!
//! A Discontinuous Galerkin spatial discretization for systems of hyperbolic
//! conservation laws
//!
//! ∂u/∂t + ∇·F(u) = 0
//!
//! on unstructured and partitioned meshes.
//!
//! This crate provides the core building blocks:
//! - Bernstein (positive) bases and Gauss quadrature on [0, 1]^d
//! - Mesh representation (1D segments, 2D quadrilaterals) and partitioning
//! - Geometry, basis and mass caches built once per mesh
//! - Face-dof connectivity across elements, partitions and boundaries
//! - The Lax-Friedrichs numerical flux
//! - The evolution operator `y = M⁻¹ R(x)` and a convergence monitor
//! - Time integration (SSP-RK3) and a steady-state driver
//! - Conservation law abstractions (advection, shallow water, Euler)
//!
//! # Example
//!
//! ```
//! use dg_hypsys::{
//!     BernsteinSegment, BoundaryConditions, DgEvolution, EvolutionConfig, InflowFunction, Mesh1D,
//!     ShallowWater,
//! };
//!
//! let mesh = Mesh1D::uniform(0.0, 1.0, 4);
//! let system = ShallowWater::new(9.81, 1);
//! let bcs = BoundaryConditions::standard(&system);
//! let inflow = InflowFunction::constant(vec![1.0, 0.2]);
//! let mut op = DgEvolution::new(
//!     &mesh,
//!     &BernsteinSegment::new(2),
//!     system,
//!     bcs,
//!     inflow.clone(),
//!     EvolutionConfig::time_accurate(),
//! )
//! .unwrap();
//!
//! // A uniform state equal to the boundary data is stationary
//! let u = op.project(&inflow, 0.0).unwrap();
//! let mut du = vec![0.0; op.state_len()];
//! op.evaluate(u.as_slice(), &[], 0.0, &mut du).unwrap();
//! assert!(du.iter().all(|v| v.abs() < 1e-10));
//! ```

pub mod basis;
pub mod boundary;
pub mod equations;
pub mod error;
pub mod flux;
pub mod mesh;
pub mod operators;
pub mod polynomial;
pub mod solver;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use basis::{BernsteinQuad, BernsteinSegment, ReferenceElement};
pub use boundary::{
    BoundaryCondition, BoundaryConditions, BoundaryContext, Inflow, InflowFunction,
    InflowProjection, Outflow, Reflective,
};
pub use equations::{Advection, Euler, HyperbolicSystem, PointLocation, ShallowWater};
pub use error::{DgError, Result};
pub use flux::{LaxFriedrichsScratch, lax_friedrichs};
pub use mesh::{BoundaryTag, Mesh1D, MeshGeometry, MeshTopology, QuadMesh, Subdomain};
pub use operators::{GeometryCache, MassOperators, ShapeTables};
pub use solver::{ConvergenceMonitor, DgEvolution, DgState, EvolutionConfig, NeighborMap};
pub use time::{
    SteadyStateConfig, SteadyStateReport, forward_euler_step, run_steady_state, ssp_rk3_step,
};
pub use types::{DofLayout, DofRef, ElementIndex, FaceIndex};
