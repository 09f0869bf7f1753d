//! Mesh representation.
//!
//! Provides mesh data structures for DG discretizations:
//! - 1D mesh of an interval
//! - 2D mesh of bilinear quadrilaterals with edge-based connectivity
//! - Element-based partitions with ghost elements and halo packing

mod boundary_tags;
mod mesh1d;
mod mesh2d;
mod partition;
pub mod traits;

pub use boundary_tags::{BoundaryTag, FIRST_CUSTOM_ATTRIBUTE};
pub use mesh1d::Mesh1D;
pub use mesh2d::{Edge, ElementFace, QuadMesh};
pub use partition::Subdomain;
pub use traits::{ElementRef, FaceConnection, GhostNeighbor, MeshGeometry, MeshTopology, Neighbor};
