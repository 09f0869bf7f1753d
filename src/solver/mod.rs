//! DG solver components.
//!
//! # Submodules
//!
//! - [`state`]: Equation-major state storage (`DgState`)
//! - [`neighbor`]: Face-dof connectivity and neighbor codes (`NeighborMap`)
//! - [`evaluator`]: Pointwise states at element and face quadrature points
//! - [`evolution`]: The semi-discrete operator `y = M⁻¹ R(x)` (`DgEvolution`)
//! - [`convergence`]: Mass-weighted rate of change between steps
//!
//! The outer time integrator owns the loop: it exchanges halos (on
//! partitioned meshes), calls [`DgEvolution::evaluate`] once per stage and
//! [`ConvergenceMonitor::check`] once per accepted step.

pub mod convergence;
pub mod evaluator;
pub mod evolution;
pub mod neighbor;
pub mod state;

pub use convergence::ConvergenceMonitor;
pub use evaluator::StateEvaluator;
pub use evolution::{DgEvolution, EvolutionConfig};
pub use neighbor::{NeighborCounts, NeighborMap};
pub use state::DgState;
