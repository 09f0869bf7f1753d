//! Boundary conditions for exterior faces.
//!
//! Boundary conditions specify how to compute the "ghost" state outside
//! the domain for flux evaluation at boundary faces. The ghost state starts
//! out as the value of the prescribed boundary data (the inflow buffer) at
//! the face point; each condition then overwrites it as needed.
//!
//! # Available Boundary Conditions
//!
//! | BC Type | Description |
//! |---------|-------------|
//! | `Inflow` | Keeps the prescribed boundary data |
//! | `Outflow` | Copies the interior state (zero-gradient) |
//! | `Reflective` | Solid wall, normal momentum mirrored |
//! | `BoundaryConditions` | Dispatches on the face's `BoundaryTag` |

mod inflow;
mod multi_bc;
mod open;
mod reflective;

pub use inflow::{InflowFunction, InflowProjection};
pub use multi_bc::BoundaryConditions;
pub use open::{Inflow, Outflow};
pub use reflective::Reflective;

use crate::mesh::BoundaryTag;

/// Context for boundary condition evaluation.
///
/// Provides all information needed to compute the ghost state at a boundary
/// face point.
#[derive(Clone, Copy, Debug)]
pub struct BoundaryContext<'a> {
    /// Interior state at the face point
    pub interior: &'a [f64],
    /// Outward unit normal
    pub normal: &'a [f64],
    /// Tag of the boundary face
    pub tag: BoundaryTag,
    /// Evaluation time
    pub time: f64,
    /// Physical coordinates of the face point
    pub x: &'a [f64],
}

/// Boundary condition producing the exterior state of a boundary face.
pub trait BoundaryCondition: Send + Sync {
    /// Overwrite `exterior` with the ghost state.
    ///
    /// On entry `exterior` holds the prescribed boundary data at the face
    /// point; conditions that only need that data leave it untouched.
    fn ghost_state(&self, ctx: &BoundaryContext<'_>, exterior: &mut [f64]);

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}
