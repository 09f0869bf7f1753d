//! Boundary condition dispatcher.
//!
//! Applies different boundary conditions to different parts of the domain
//! boundary based on their `BoundaryTag`.
//!
//! # Example
//!
//! ```
//! use dg_hypsys::boundary::{BoundaryConditions, Inflow, Outflow, Reflective};
//! use dg_hypsys::mesh::BoundaryTag;
//!
//! // Outflow everywhere except for walls and one custom inlet
//! let bcs = BoundaryConditions::new(Outflow)
//!     .with(BoundaryTag::Wall, Reflective::new(1..3))
//!     .with(BoundaryTag::Custom(0), Inflow);
//! assert_eq!(bcs.condition_for(BoundaryTag::Wall).name(), "reflective");
//! assert_eq!(bcs.condition_for(BoundaryTag::Inflow).name(), "outflow");
//! ```

use std::collections::HashMap;

use super::{BoundaryCondition, BoundaryContext, Inflow, Outflow, Reflective};
use crate::equations::HyperbolicSystem;
use crate::mesh::BoundaryTag;

/// Tag-based boundary condition dispatcher.
///
/// Tags without a registered condition fall back to the default one.
pub struct BoundaryConditions {
    default_bc: Box<dyn BoundaryCondition>,
    by_tag: HashMap<BoundaryTag, Box<dyn BoundaryCondition>>,
}

impl BoundaryConditions {
    /// Create a dispatcher with the given default condition.
    pub fn new(default_bc: impl BoundaryCondition + 'static) -> Self {
        Self {
            default_bc: Box::new(default_bc),
            by_tag: HashMap::new(),
        }
    }

    /// Standard policy for `system`: inflow faces keep the prescribed data,
    /// outflow faces extrapolate, walls reflect (or extrapolate for systems
    /// without momentum).
    pub fn standard<S: HyperbolicSystem + ?Sized>(system: &S) -> Self {
        let bcs = Self::new(Inflow).with(BoundaryTag::Outflow, Outflow);
        match Reflective::for_system(system) {
            Some(wall) => bcs.with(BoundaryTag::Wall, wall),
            None => bcs.with(BoundaryTag::Wall, Outflow),
        }
    }

    /// Register the condition for one tag.
    pub fn with(mut self, tag: BoundaryTag, bc: impl BoundaryCondition + 'static) -> Self {
        self.by_tag.insert(tag, Box::new(bc));
        self
    }

    /// Condition applied to faces tagged `tag`.
    pub fn condition_for(&self, tag: BoundaryTag) -> &dyn BoundaryCondition {
        self.by_tag
            .get(&tag)
            .map_or(self.default_bc.as_ref(), |bc| bc.as_ref())
    }
}

impl std::fmt::Debug for BoundaryConditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = self
            .by_tag
            .iter()
            .map(|(tag, bc)| (tag.attribute(), bc.name()))
            .collect();
        tags.sort_unstable();
        f.debug_struct("BoundaryConditions")
            .field("default", &self.default_bc.name())
            .field("by_attribute", &tags)
            .finish()
    }
}

impl BoundaryCondition for BoundaryConditions {
    fn ghost_state(&self, ctx: &BoundaryContext<'_>, exterior: &mut [f64]) {
        self.condition_for(ctx.tag).ghost_state(ctx, exterior);
    }

    fn name(&self) -> &'static str {
        "multi"
    }
}
