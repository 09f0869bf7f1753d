//! Degree-of-freedom layout and the neighbor-code wire encoding.
//!
//! The flat state vector is equation-major: component `n` of local dof `j`
//! in element `e` lives at `n * ne * nd + e * nd + j`.
//!
//! Neighbor codes are signed integers shared with halo-exchange buffers:
//!
//! ```text
//! code < 0                 boundary, code = -(boundary attribute)
//! 0 <= code < ne * nd      local,    code = e * nd + j
//! ne * nd <= code          remote,   code - ne * nd = g * nd + j
//! ```
//!
//! A remote value for equation `n` is read from the halo buffer at
//! `g * nd * n_eq + n * nd + j`. This encoding is a fixed contract with the
//! halo layout and must not change.

use std::fmt;

use super::ElementIndex;
use crate::mesh::BoundaryTag;

/// Typed reference to the degree of freedom on the other side of a face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DofRef {
    /// Dof of an element owned by this partition.
    Local { element: ElementIndex, dof: usize },
    /// Dof of a ghost element owned by another partition.
    Remote { ghost: usize, dof: usize },
    /// No neighbor: the face lies on the domain boundary.
    Boundary(BoundaryTag),
}

impl DofRef {
    /// Returns `true` for boundary references.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        matches!(self, DofRef::Boundary(_))
    }

    /// Boundary tag, if this is a boundary reference.
    #[inline]
    pub fn boundary_tag(&self) -> Option<BoundaryTag> {
        match self {
            DofRef::Boundary(tag) => Some(*tag),
            _ => None,
        }
    }
}

impl fmt::Display for DofRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DofRef::Local { element, dof } => write!(f, "{}:{}", element, dof),
            DofRef::Remote { ghost, dof } => write!(f, "G{}:{}", ghost, dof),
            DofRef::Boundary(tag) => write!(f, "B{:?}", tag),
        }
    }
}

/// Sizes that fix the flat state layout and the halo layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DofLayout {
    /// Number of scalar equations
    pub n_eq: usize,
    /// Number of local elements
    pub n_elements: usize,
    /// Local dofs per element and equation
    pub n_dofs: usize,
    /// Number of ghost elements in the halo buffer
    pub n_ghosts: usize,
}

impl DofLayout {
    /// Create a layout description.
    pub fn new(n_eq: usize, n_elements: usize, n_dofs: usize, n_ghosts: usize) -> Self {
        Self {
            n_eq,
            n_elements,
            n_dofs,
            n_ghosts,
        }
    }

    /// Size of one scalar component (`ne * nd`), the local/remote threshold.
    #[inline]
    pub fn scalar_size(&self) -> usize {
        self.n_elements * self.n_dofs
    }

    /// Length of the full state vector.
    #[inline]
    pub fn state_len(&self) -> usize {
        self.n_eq * self.scalar_size()
    }

    /// Length of the halo buffer.
    #[inline]
    pub fn halo_len(&self) -> usize {
        self.n_ghosts * self.n_dofs * self.n_eq
    }

    /// Flat state index of component `n`, element `e`, local dof `j`.
    #[inline]
    pub fn state_index(&self, n: usize, e: ElementIndex, j: usize) -> usize {
        n * self.scalar_size() + e.as_usize() * self.n_dofs + j
    }

    /// Halo index of component `n`, ghost `g`, local dof `j`.
    #[inline]
    pub fn halo_index(&self, n: usize, ghost: usize, j: usize) -> usize {
        ghost * self.n_dofs * self.n_eq + n * self.n_dofs + j
    }

    /// Encode a dof reference into its signed wire code.
    pub fn encode(&self, dof_ref: DofRef) -> i64 {
        match dof_ref {
            DofRef::Local { element, dof } => (element.as_usize() * self.n_dofs + dof) as i64,
            DofRef::Remote { ghost, dof } => {
                (self.scalar_size() + ghost * self.n_dofs + dof) as i64
            }
            DofRef::Boundary(tag) => -(tag.attribute() as i64),
        }
    }

    /// Decode a signed wire code.
    ///
    /// Returns `None` for codes that address neither a local dof, a ghost
    /// dof inside the halo, nor a valid boundary attribute.
    pub fn decode(&self, code: i64) -> Option<DofRef> {
        if code < 0 {
            let attribute = u32::try_from(code.checked_neg()?).ok()?;
            return BoundaryTag::from_attribute(attribute).map(DofRef::Boundary);
        }
        let code = code as usize;
        let local = self.scalar_size();
        if code < local {
            return Some(DofRef::Local {
                element: ElementIndex::new(code / self.n_dofs),
                dof: code % self.n_dofs,
            });
        }
        let offset = code - local;
        let ghost = offset / self.n_dofs;
        if ghost >= self.n_ghosts {
            return None;
        }
        Some(DofRef::Remote {
            ghost,
            dof: offset % self.n_dofs,
        })
    }
}
