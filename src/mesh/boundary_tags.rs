//! Boundary tags for exterior faces.
//!
//! Each exterior face carries a tag that selects the boundary condition
//! branch. Tags map one-to-one onto positive integer attributes; the negated
//! attribute is the neighbor code of a boundary face-dof.

/// First attribute value used for [`BoundaryTag::Custom`] tags.
pub const FIRST_CUSTOM_ATTRIBUTE: u32 = 4;

/// Tag identifying the type of a boundary face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BoundaryTag {
    /// Prescribed inflow state (attribute 1)
    #[default]
    Inflow,

    /// Outflow / extrapolation boundary (attribute 2)
    Outflow,

    /// Solid wall (attribute 3)
    Wall,

    /// User-defined tag, attribute `FIRST_CUSTOM_ATTRIBUTE + id`
    Custom(u32),
}

impl BoundaryTag {
    /// Positive integer attribute of this tag.
    pub fn attribute(&self) -> u32 {
        match self {
            BoundaryTag::Inflow => 1,
            BoundaryTag::Outflow => 2,
            BoundaryTag::Wall => 3,
            BoundaryTag::Custom(id) => FIRST_CUSTOM_ATTRIBUTE + id,
        }
    }

    /// Tag for a positive attribute; `None` for attribute 0.
    pub fn from_attribute(attribute: u32) -> Option<Self> {
        match attribute {
            0 => None,
            1 => Some(BoundaryTag::Inflow),
            2 => Some(BoundaryTag::Outflow),
            3 => Some(BoundaryTag::Wall),
            a => Some(BoundaryTag::Custom(a - FIRST_CUSTOM_ATTRIBUTE)),
        }
    }

    /// Check if this is a solid wall.
    pub fn is_wall(&self) -> bool {
        matches!(self, BoundaryTag::Wall)
    }
}
