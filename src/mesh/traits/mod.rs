//! Abstract mesh traits for dimension-independent operations.
//!
//! This module provides:
//! - [`MeshTopology`]: Element and face connectivity
//! - [`MeshGeometry`]: Coordinate mappings and Jacobians

pub mod mesh_traits;

pub use mesh_traits::{
    ElementRef, FaceConnection, GhostNeighbor, MeshGeometry, MeshTopology, Neighbor,
};
