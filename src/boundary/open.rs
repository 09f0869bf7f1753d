//! Open boundaries: prescribed inflow and zero-gradient outflow.

use super::{BoundaryCondition, BoundaryContext};

/// Prescribed boundary state.
///
/// The ghost state is the prescribed boundary data itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct Inflow;

impl BoundaryCondition for Inflow {
    fn ghost_state(&self, _ctx: &BoundaryContext<'_>, _exterior: &mut [f64]) {}

    fn name(&self) -> &'static str {
        "inflow"
    }
}

/// Zero-gradient (extrapolation) boundary.
///
/// The ghost state equals the interior state, so the numerical flux reduces
/// to the physical flux of the interior state.
#[derive(Clone, Copy, Debug, Default)]
pub struct Outflow;

impl BoundaryCondition for Outflow {
    fn ghost_state(&self, ctx: &BoundaryContext<'_>, exterior: &mut [f64]) {
        exterior.copy_from_slice(ctx.interior);
    }

    fn name(&self) -> &'static str {
        "outflow"
    }
}
