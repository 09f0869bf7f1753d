//! Error types for operator construction and evaluation.
//!
//! Every variant describes a configuration or invariant violation. None of
//! them is transient: callers are expected to abort the run and report the
//! cause rather than retry.

use thiserror::Error;

use crate::types::ElementIndex;

/// Errors raised while building or applying the DG evolution operator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DgError {
    /// Spatial dimensions of two collaborators disagree.
    #[error("Dimension mismatch: {what} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Spatial dimension outside the supported range.
    #[error("Unsupported spatial dimension: {0}")]
    UnsupportedDimension(usize),

    /// Number of equations of a collaborator does not match the system.
    #[error("Equation count mismatch: {what} has {actual} equations, expected {expected}")]
    EquationCountMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Element mapping with non-positive Jacobian determinant.
    #[error("Inverted element {element}: det(J) = {det:e} at quadrature point {point}")]
    InvertedElement {
        element: ElementIndex,
        point: usize,
        det: f64,
    },

    /// Face with vanishing measure.
    #[error("Degenerate face {face} of element {element} at quadrature point {point}")]
    DegenerateFace {
        element: ElementIndex,
        face: usize,
        point: usize,
    },

    /// Face whose computed normal does not point out of the element.
    #[error("Face {face} of element {element} has an inward pointing normal")]
    InwardNormal { element: ElementIndex, face: usize },

    /// A face-dof has no coincident partner on the neighboring side.
    #[error("Face dof {face_dof} on face {face} of element {element} has no matching neighbor dof")]
    UnmatchedFaceDof {
        element: ElementIndex,
        face: usize,
        face_dof: usize,
    },

    /// Neighbor code outside the local and remote ranges.
    #[error("Malformed neighbor code {code} at element {element}, face {face}, face dof {face_dof}")]
    MalformedNeighbor {
        element: ElementIndex,
        face: usize,
        face_dof: usize,
        code: i64,
    },

    /// Halo buffer length does not match the ghost layout.
    #[error("Halo buffer has {actual} values, expected {expected}")]
    HaloSizeMismatch { expected: usize, actual: usize },

    /// State vector length does not match the discretization.
    #[error("State vector has {actual} values, expected {expected}")]
    StateSizeMismatch { expected: usize, actual: usize },

    /// Element mass matrix could not be inverted.
    #[error("Singular mass matrix on element {0}")]
    SingularMassMatrix(ElementIndex),

    /// Non-positive or non-finite time step.
    #[error("Invalid time step: {0}")]
    InvalidTimeStep(f64),

    /// Mesh description is inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Partition description is inconsistent.
    #[error("Invalid partition: {0}")]
    InvalidPartition(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DgError>;
