//! Reflective (wall) boundary condition.
//!
//! A reflective boundary represents a solid wall where no mass can pass.
//! The normal momentum component is reversed while density, energy and the
//! tangential momentum are preserved:
//!
//! m_ghost = m - 2 (m·n) n
//!
//! In 1D this is simply m_ghost = -m.

use std::ops::Range;

use super::{BoundaryCondition, BoundaryContext};
use crate::equations::HyperbolicSystem;

/// Reflective (wall) boundary condition.
///
/// Creates a mirror state with reversed normal momentum, ensuring zero mass
/// flux through the boundary. Applies to any system whose momentum vector
/// occupies a contiguous range of components.
#[derive(Clone, Debug)]
pub struct Reflective {
    /// Components holding the momentum vector
    pub momentum: Range<usize>,
}

impl Reflective {
    /// Wall for a state whose momentum occupies `momentum`.
    pub fn new(momentum: Range<usize>) -> Self {
        Self { momentum }
    }

    /// Wall for the momentum components of `system`, if it has any.
    pub fn for_system<S: HyperbolicSystem + ?Sized>(system: &S) -> Option<Self> {
        system.momentum_components().map(Self::new)
    }
}

impl BoundaryCondition for Reflective {
    fn ghost_state(&self, ctx: &BoundaryContext<'_>, exterior: &mut [f64]) {
        exterior.copy_from_slice(ctx.interior);
        let m = &ctx.interior[self.momentum.clone()];
        let mn: f64 = m.iter().zip(ctx.normal).map(|(a, b)| a * b).sum();
        for (c, idx) in self.momentum.clone().enumerate() {
            exterior[idx] -= 2.0 * mn * ctx.normal[c];
        }
    }

    fn name(&self) -> &'static str {
        "reflective"
    }
}
