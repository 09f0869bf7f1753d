//! 1D mesh representation.
//!
//! A 1D mesh is a partition of an interval [x_min, x_max] into elements.
//! Element `k` maps the reference segment [0, 1] onto
//! `[vertices[k], vertices[k + 1]]`; face 0 is its left end, face 1 its right.

use faer::Mat;

use super::boundary_tags::BoundaryTag;
use super::traits::{ElementRef, FaceConnection, MeshGeometry, MeshTopology, Neighbor};
use crate::error::{DgError, Result};
use crate::types::ElementIndex;

/// 1D mesh of an interval.
#[derive(Clone, Debug)]
pub struct Mesh1D {
    /// Element vertices: vertices[k] is left endpoint of element k.
    /// Has length n_elements + 1.
    pub vertices: Vec<f64>,
    /// Tag of the left end of the domain
    pub left_tag: BoundaryTag,
    /// Tag of the right end of the domain
    pub right_tag: BoundaryTag,
    /// Whether the two ends of the domain are connected
    pub is_periodic: bool,
}

impl Mesh1D {
    /// Create a uniform mesh of [x_min, x_max] with n_elements elements.
    ///
    /// The left end is an inflow boundary, the right end an outflow boundary.
    pub fn uniform(x_min: f64, x_max: f64, n_elements: usize) -> Self {
        assert!(n_elements > 0, "Need at least one element");
        assert!(x_max > x_min, "x_max must be greater than x_min");

        let h = (x_max - x_min) / n_elements as f64;
        let vertices = (0..=n_elements).map(|i| x_min + i as f64 * h).collect();

        Self {
            vertices,
            left_tag: BoundaryTag::Inflow,
            right_tag: BoundaryTag::Outflow,
            is_periodic: false,
        }
    }

    /// Create a uniform periodic mesh of [x_min, x_max] with n_elements elements.
    ///
    /// The left and right boundaries are connected, so there are no boundary faces.
    pub fn uniform_periodic(x_min: f64, x_max: f64, n_elements: usize) -> Self {
        Self {
            is_periodic: true,
            ..Self::uniform(x_min, x_max, n_elements)
        }
    }

    /// Create a mesh from strictly increasing vertex positions.
    pub fn from_vertices(vertices: Vec<f64>) -> Result<Self> {
        if vertices.len() < 2 {
            return Err(DgError::InvalidMesh(
                "a 1D mesh needs at least two vertices".into(),
            ));
        }
        if let Some(k) = vertices.windows(2).position(|w| w[1] <= w[0]) {
            return Err(DgError::InvalidMesh(format!(
                "vertices {} and {} are not increasing",
                k,
                k + 1
            )));
        }
        Ok(Self {
            vertices,
            left_tag: BoundaryTag::Inflow,
            right_tag: BoundaryTag::Outflow,
            is_periodic: false,
        })
    }

    /// Set the boundary tags at both ends.
    pub fn with_boundary_tags(mut self, left: BoundaryTag, right: BoundaryTag) -> Self {
        self.left_tag = left;
        self.right_tag = right;
        self
    }

    /// Size of element k.
    #[inline]
    pub fn element_size(&self, k: ElementIndex) -> f64 {
        self.vertices[k.as_usize() + 1] - self.vertices[k.as_usize()]
    }

    /// Total domain length.
    pub fn length(&self) -> f64 {
        self.vertices[self.vertices.len() - 1] - self.vertices[0]
    }

    /// Minimum element size.
    pub fn h_min(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(f64::INFINITY, f64::min)
    }
}

impl MeshTopology for Mesh1D {
    fn dim(&self) -> usize {
        1
    }

    fn n_elements(&self) -> usize {
        self.vertices.len() - 1
    }

    fn n_faces_per_element(&self) -> usize {
        2
    }

    fn face_connection(&self, element: ElementIndex, face: usize) -> FaceConnection {
        let k = element.as_usize();
        let last = self.n_elements() - 1;
        let across = match face {
            0 if k > 0 => Some(k - 1),
            0 if self.is_periodic => Some(last),
            0 => None,
            _ if k < last => Some(k + 1),
            _ if self.is_periodic => Some(0),
            _ => None,
        };
        match across {
            Some(n) => FaceConnection::Interior(Neighbor {
                element: ElementIndex::new(n),
                face: 1 - face,
            }),
            None if face == 0 => FaceConnection::Boundary(self.left_tag),
            None => FaceConnection::Boundary(self.right_tag),
        }
    }
}

impl MeshGeometry for Mesh1D {
    fn map_to_physical(&self, element: ElementRef, xi: &[f64]) -> Vec<f64> {
        let k = match element {
            ElementRef::Local(e) => e,
            ElementRef::Ghost(_) => unreachable!("a serial mesh has no ghost elements"),
        };
        vec![self.vertices[k.as_usize()] + xi[0] * self.element_size(k)]
    }

    fn jacobian(&self, element: ElementIndex, _xi: &[f64]) -> Mat<f64> {
        Mat::from_fn(1, 1, |_, _| self.element_size(element))
    }
}
