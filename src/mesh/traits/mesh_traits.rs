//! Abstract mesh traits for dimension-independent DG operators.
//!
//! This module provides a layered trait hierarchy for meshes:
//!
//! - [`MeshTopology`]: Element and face connectivity, including faces shared
//!   with ghost elements owned by another partition
//! - [`MeshGeometry`]: Reference-to-physical mappings and Jacobians
//!
//! # Example
//! ```
//! use dg_hypsys::mesh::{FaceConnection, Mesh1D, MeshTopology};
//! use dg_hypsys::types::ElementIndex;
//!
//! let mesh = Mesh1D::uniform(0.0, 1.0, 3);
//! for e in ElementIndex::iter(mesh.n_elements()) {
//!     for f in 0..mesh.n_faces_per_element() {
//!         match mesh.face_connection(e, f) {
//!             FaceConnection::Interior(n) => assert_ne!(n.element, e),
//!             FaceConnection::Remote(_) => unreachable!(),
//!             FaceConnection::Boundary(tag) => assert!(!tag.is_wall()),
//!         }
//!     }
//! }
//! ```

use faer::Mat;

use crate::mesh::BoundaryTag;
use crate::types::ElementIndex;

// =============================================================================
// Supporting Types
// =============================================================================

/// Information about a local neighbor element across a face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Neighbor {
    /// Index of the neighboring element.
    pub element: ElementIndex,
    /// Local face index on the neighboring element that shares this interface.
    pub face: usize,
}

/// Neighbor across a partition interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GhostNeighbor {
    /// Position of the ghost element in the halo buffer.
    pub ghost: usize,
    /// Local face index on the ghost element.
    pub face: usize,
}

/// Result of querying face connectivity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FaceConnection {
    /// Face shared with an element of this partition.
    Interior(Neighbor),
    /// Face shared with a ghost element of another partition.
    Remote(GhostNeighbor),
    /// Exterior face with an associated tag.
    Boundary(BoundaryTag),
}

impl FaceConnection {
    /// Returns `true` if this is a boundary face.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        matches!(self, FaceConnection::Boundary(_))
    }

    /// Returns the boundary tag if this is a boundary face.
    #[inline]
    pub fn boundary_tag(&self) -> Option<BoundaryTag> {
        match self {
            FaceConnection::Boundary(t) => Some(*t),
            _ => None,
        }
    }
}

/// Element on either side of a partition interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementRef {
    /// Element owned by this partition.
    Local(ElementIndex),
    /// Ghost element, by halo position.
    Ghost(usize),
}

// =============================================================================
// MeshTopology Trait
// =============================================================================

/// Element counts and face connectivity.
///
/// All elements share one reference element type, so the number of faces
/// per element is a mesh-wide constant.
pub trait MeshTopology: Send + Sync {
    /// Spatial dimension.
    fn dim(&self) -> usize;

    /// Number of elements owned by this mesh (partition).
    fn n_elements(&self) -> usize;

    /// Number of ghost elements referenced through remote faces.
    fn n_ghost_elements(&self) -> usize {
        0
    }

    /// Number of faces per element.
    fn n_faces_per_element(&self) -> usize;

    /// Query connectivity across local face `face` of `element`.
    fn face_connection(&self, element: ElementIndex, face: usize) -> FaceConnection;

    /// Number of boundary faces.
    fn n_boundary_faces(&self) -> usize {
        ElementIndex::iter(self.n_elements())
            .map(|e| {
                (0..self.n_faces_per_element())
                    .filter(|&f| self.face_connection(e, f).is_boundary())
                    .count()
            })
            .sum()
    }
}

// =============================================================================
// MeshGeometry Trait
// =============================================================================

/// Mapping from the reference element [0, 1]^d to physical space.
pub trait MeshGeometry: MeshTopology {
    /// Physical position of reference point `xi` in an element.
    ///
    /// Ghost elements must be mappable so that face dofs can be matched
    /// across partition interfaces.
    fn map_to_physical(&self, element: ElementRef, xi: &[f64]) -> Vec<f64>;

    /// Jacobian ∂x/∂ξ at reference point `xi`, as a `dim × dim` matrix.
    fn jacobian(&self, element: ElementIndex, xi: &[f64]) -> Mat<f64>;
}
