//! 2D mesh representation for quadrilateral elements.
//!
//! The mesh stores:
//! - Vertex coordinates
//! - Element-vertex connectivity (counter-clockwise ordering)
//! - Edge-based connectivity for inter-element fluxes
//! - Boundary edge identification and tags
//!
//! Face convention (counter-clockwise around element):
//! - Face 0 (bottom): from vertex 0 to vertex 1
//! - Face 1 (right):  from vertex 1 to vertex 2
//! - Face 2 (top):    from vertex 2 to vertex 3
//! - Face 3 (left):   from vertex 3 to vertex 0

use std::collections::HashMap;

use faer::Mat;

use super::boundary_tags::BoundaryTag;
use super::traits::{ElementRef, FaceConnection, MeshGeometry, MeshTopology, Neighbor};
use crate::error::{DgError, Result};
use crate::types::{ElementIndex, FaceIndex};

/// Reference to an element and one of its faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementFace {
    /// Element index
    pub element: ElementIndex,
    /// Face index (0-3)
    pub face: usize,
}

impl ElementFace {
    pub fn new(element: ElementIndex, face: usize) -> Self {
        Self { element, face }
    }
}

/// Information about an edge in the mesh.
#[derive(Clone, Debug)]
pub struct Edge {
    /// End vertices of the first element-face, smaller first
    pub vertices: (usize, usize),
    /// First element-face found on this edge
    pub left: ElementFace,
    /// Second element-face (None for boundary edges)
    pub right: Option<ElementFace>,
    /// Boundary tag (only for boundary edges)
    pub boundary_tag: Option<BoundaryTag>,
}

impl Edge {
    /// Check if this is a boundary edge.
    pub fn is_boundary(&self) -> bool {
        self.right.is_none()
    }
}

/// 2D mesh of bilinear quadrilateral elements.
#[derive(Clone, Debug)]
pub struct QuadMesh {
    /// Vertex coordinates
    pub vertices: Vec<[f64; 2]>,

    /// Element-vertex connectivity, counter-clockwise:
    /// - v0: reference (0, 0)
    /// - v1: reference (1, 0)
    /// - v2: reference (1, 1)
    /// - v3: reference (0, 1)
    pub elements: Vec<[usize; 4]>,

    /// Edge list with connectivity information
    pub edges: Vec<Edge>,

    /// Element-to-edge mapping: element_edges[k][f] = edge of face f of element k
    pub element_edges: Vec<[FaceIndex; 4]>,
}

impl QuadMesh {
    /// Build a mesh from vertices and counter-clockwise quadrilaterals.
    ///
    /// Edges shared by two elements become interior faces. All remaining
    /// edges are tagged as walls; use [`QuadMesh::with_boundary_tags`] to
    /// relabel them.
    pub fn new(vertices: Vec<[f64; 2]>, elements: Vec<[usize; 4]>) -> Result<Self> {
        Self::build(vertices, elements, |a, b| (a.min(b), a.max(b)))
    }

    /// Create a uniform rectangular mesh of [x0, x1] × [y0, y1] with wall
    /// boundaries.
    pub fn uniform_rectangle(x0: f64, x1: f64, y0: f64, y1: f64, nx: usize, ny: usize) -> Self {
        Self::uniform_rectangle_with_sides(x0, x1, y0, y1, nx, ny, [BoundaryTag::Wall; 4])
    }

    /// Create a uniform rectangular mesh with different boundary tags per side.
    ///
    /// `bc_tags`: [south, east, north, west]
    pub fn uniform_rectangle_with_sides(
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        nx: usize,
        ny: usize,
        bc_tags: [BoundaryTag; 4],
    ) -> Self {
        let (vertices, elements) = structured_grid(x0, x1, y0, y1, nx, ny);
        let dx = (x1 - x0) / nx as f64;
        let dy = (y1 - y0) / ny as f64;
        let tol = 1e-8 * dx.min(dy);

        match Self::build(vertices, elements, |a, b| (a.min(b), a.max(b))) {
            Ok(mesh) => mesh.with_boundary_tags(|[x, y]| {
                if (y - y0).abs() < tol {
                    bc_tags[0]
                } else if (x - x1).abs() < tol {
                    bc_tags[1]
                } else if (y - y1).abs() < tol {
                    bc_tags[2]
                } else {
                    bc_tags[3]
                }
            }),
            Err(_) => unreachable!("structured grids are always valid"),
        }
    }

    /// Create a uniform mesh of [x0, x1] × [y0, y1], periodic in both directions.
    pub fn uniform_periodic(x0: f64, x1: f64, y0: f64, y1: f64, nx: usize, ny: usize) -> Self {
        let (vertices, elements) = structured_grid(x0, x1, y0, y1, nx, ny);
        // Edges are keyed by their midpoint in half-cell units, wrapped
        // around the period, so opposite sides of the domain coincide
        let key = |a: usize, b: usize| {
            let (ia, ja) = (a % (nx + 1), a / (nx + 1));
            let (ib, jb) = (b % (nx + 1), b / (nx + 1));
            ((ia + ib) % (2 * nx), (ja + jb) % (2 * ny))
        };
        match Self::build(vertices, elements, key) {
            Ok(mesh) => mesh,
            Err(_) => unreachable!("structured grids are always valid"),
        }
    }

    /// Relabel every boundary edge with the tag chosen from its midpoint.
    pub fn with_boundary_tags(mut self, tag_at: impl Fn([f64; 2]) -> BoundaryTag) -> Self {
        for k in 0..self.edges.len() {
            if !self.edges[k].is_boundary() {
                continue;
            }
            let ElementFace { element, face } = self.edges[k].left;
            let [a, b] = self.face_endpoints(element, face);
            let mid = [0.5 * (a[0] + b[0]), 0.5 * (a[1] + b[1])];
            self.edges[k].boundary_tag = Some(tag_at(mid));
        }
        self
    }

    /// Get the four vertex coordinates of element k.
    pub fn element_vertices(&self, k: ElementIndex) -> [[f64; 2]; 4] {
        let [v0, v1, v2, v3] = self.elements[k];
        [
            self.vertices[v0],
            self.vertices[v1],
            self.vertices[v2],
            self.vertices[v3],
        ]
    }

    /// Number of edges.
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// Minimum edge length.
    pub fn h_min(&self) -> f64 {
        ElementIndex::iter(self.elements.len())
            .flat_map(|k| (0..4).map(move |f| (k, f)))
            .map(|(k, f)| {
                let [a, b] = self.face_endpoints(k, f);
                ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt()
            })
            .fold(f64::INFINITY, f64::min)
    }

    fn face_endpoints(&self, k: ElementIndex, face: usize) -> [[f64; 2]; 2] {
        let verts = self.element_vertices(k);
        [verts[face], verts[(face + 1) % 4]]
    }

    /// Build edge connectivity. Faces whose end vertices produce the same
    /// `edge_key` are glued together.
    fn build<K: std::hash::Hash + Eq + std::fmt::Debug>(
        vertices: Vec<[f64; 2]>,
        elements: Vec<[usize; 4]>,
        edge_key: impl Fn(usize, usize) -> K,
    ) -> Result<Self> {
        if let Some(k) = elements
            .iter()
            .position(|el| el.iter().any(|&v| v >= vertices.len()))
        {
            return Err(DgError::InvalidMesh(format!(
                "element {} references a vertex out of range",
                k
            )));
        }

        let mut edges: Vec<Edge> = Vec::new();
        let mut element_edges = vec![[FaceIndex::ZERO; 4]; elements.len()];
        let mut edge_lookup: HashMap<K, usize> = HashMap::new();

        for (k, el) in elements.iter().enumerate() {
            let elem = ElementIndex::new(k);
            for face in 0..4 {
                let a = el[face];
                let b = el[(face + 1) % 4];
                let ef = ElementFace::new(elem, face);

                match edge_lookup.get(&edge_key(a, b)) {
                    Some(&idx) => {
                        if edges[idx].right.is_some() {
                            return Err(DgError::InvalidMesh(format!(
                                "edge {:?} is shared by more than two elements",
                                edges[idx].vertices
                            )));
                        }
                        edges[idx].right = Some(ef);
                        edges[idx].boundary_tag = None;
                        element_edges[k][face] = FaceIndex::new(idx);
                    }
                    None => {
                        let idx = edges.len();
                        edge_lookup.insert(edge_key(a, b), idx);
                        edges.push(Edge {
                            vertices: (a.min(b), a.max(b)),
                            left: ef,
                            right: None,
                            boundary_tag: Some(BoundaryTag::Wall),
                        });
                        element_edges[k][face] = FaceIndex::new(idx);
                    }
                }
            }
        }

        Ok(Self {
            vertices,
            elements,
            edges,
            element_edges,
        })
    }
}

fn structured_grid(
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
    nx: usize,
    ny: usize,
) -> (Vec<[f64; 2]>, Vec<[usize; 4]>) {
    assert!(
        nx > 0 && ny > 0,
        "Need at least one element in each direction"
    );
    assert!(x1 > x0 && y1 > y0, "Invalid domain bounds");

    let dx = (x1 - x0) / nx as f64;
    let dy = (y1 - y0) / ny as f64;

    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            vertices.push([x0 + i as f64 * dx, y0 + j as f64 * dy]);
        }
    }

    let mut elements = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let v0 = j * (nx + 1) + i;
            let v1 = v0 + 1;
            let v2 = v1 + (nx + 1);
            let v3 = v0 + (nx + 1);
            elements.push([v0, v1, v2, v3]);
        }
    }

    (vertices, elements)
}

impl MeshTopology for QuadMesh {
    fn dim(&self) -> usize {
        2
    }

    fn n_elements(&self) -> usize {
        self.elements.len()
    }

    fn n_faces_per_element(&self) -> usize {
        4
    }

    fn face_connection(&self, element: ElementIndex, face: usize) -> FaceConnection {
        let edge = &self.edges[self.element_edges[element][face].as_usize()];
        let other = if edge.left == ElementFace::new(element, face) {
            edge.right
        } else {
            Some(edge.left)
        };
        match other {
            Some(ef) => FaceConnection::Interior(Neighbor {
                element: ef.element,
                face: ef.face,
            }),
            None => FaceConnection::Boundary(edge.boundary_tag.unwrap_or_default()),
        }
    }
}

impl MeshGeometry for QuadMesh {
    /// Bilinear map of [0, 1]²:
    /// ```text
    /// x(ξ, η) = (1-ξ)(1-η) x0 + ξ(1-η) x1 + ξη x2 + (1-ξ)η x3
    /// ```
    fn map_to_physical(&self, element: ElementRef, xi: &[f64]) -> Vec<f64> {
        let k = match element {
            ElementRef::Local(e) => e,
            ElementRef::Ghost(_) => unreachable!("a serial mesh has no ghost elements"),
        };
        let v = self.element_vertices(k);
        let (r, s) = (xi[0], xi[1]);
        let n = [(1.0 - r) * (1.0 - s), r * (1.0 - s), r * s, (1.0 - r) * s];
        (0..2)
            .map(|c| (0..4).map(|a| n[a] * v[a][c]).sum())
            .collect()
    }

    fn jacobian(&self, element: ElementIndex, xi: &[f64]) -> Mat<f64> {
        let v = self.element_vertices(element);
        let (r, s) = (xi[0], xi[1]);
        let dr = [-(1.0 - s), 1.0 - s, s, -s];
        let ds = [-(1.0 - r), -r, r, 1.0 - r];
        Mat::from_fn(2, 2, |row, col| {
            let d = if col == 0 { &dr } else { &ds };
            (0..4).map(|a| d[a] * v[a][row]).sum()
        })
    }
}
