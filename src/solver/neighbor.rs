//! Face-dof connectivity across element and partition interfaces.
//!
//! For every (element, local face, face dof) triple the map stores the
//! signed neighbor code described in [`crate::types::DofLayout`] together
//! with its decoded [`DofRef`]. Codes are the interchange format with halo
//! exchanges; the decoded references are what the evaluator reads.
//!
//! Face dofs are paired by the physical position of their nodes relative to
//! the face centroid. Both sides of a face therefore agree on the pairing
//! regardless of how each side parametrizes the face, and periodic faces,
//! whose two sides sit at different absolute positions, pair up as well.

use std::fmt;

use log::debug;

use crate::basis::ReferenceElement;
use crate::error::{DgError, Result};
use crate::mesh::{ElementRef, FaceConnection, MeshGeometry};
use crate::operators::{GEOMETRY_TOL, distance, relative_to_centroid};
use crate::types::{DofLayout, DofRef, ElementIndex};

/// Number of face dofs of each kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NeighborCounts {
    /// Face dofs paired with a dof of this partition
    pub local: usize,
    /// Face dofs paired with a ghost dof
    pub remote: usize,
    /// Face dofs on the domain boundary
    pub boundary: usize,
}

impl fmt::Display for NeighborCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} local, {} remote, {} boundary",
            self.local, self.remote, self.boundary
        )
    }
}

/// Resolved neighbor of every face dof.
#[derive(Clone, Debug)]
pub struct NeighborMap {
    /// Element, dof and ghost counts; `n_eq` is not used here
    layout: DofLayout,
    n_faces: usize,
    n_face_dofs: usize,
    /// Wire codes per (e, i, jf)
    codes: Vec<i64>,
    /// Decoded codes per (e, i, jf)
    refs: Vec<DofRef>,
}

impl NeighborMap {
    /// Pair the face dofs of all local elements of `mesh`.
    ///
    /// Interior and remote faces are matched through `map_to_physical`, so
    /// ghost elements must be mappable. Boundary faces get the code
    /// `-(boundary attribute)`.
    pub fn build<M, R>(mesh: &M, element: &R) -> Result<Self>
    where
        M: MeshGeometry + ?Sized,
        R: ReferenceElement + ?Sized,
    {
        let n_faces = element.n_faces();
        if mesh.n_faces_per_element() != n_faces {
            return Err(DgError::DimensionMismatch {
                what: "mesh faces per element",
                expected: n_faces,
                actual: mesh.n_faces_per_element(),
            });
        }

        let n_elements = mesh.n_elements();
        let n_face_dofs = element.n_face_dofs();
        let layout = DofLayout::new(1, n_elements, element.n_dofs(), mesh.n_ghost_elements());

        let face_nodes = |owner: ElementRef, face: usize| -> Vec<Vec<f64>> {
            element
                .face_dofs(face)
                .iter()
                .map(|&j| mesh.map_to_physical(owner, element.dof_node(j)))
                .collect()
        };

        let mut codes = Vec::with_capacity(n_elements * n_faces * n_face_dofs);
        for e in ElementIndex::iter(n_elements) {
            for i in 0..n_faces {
                let (other, other_face) = match mesh.face_connection(e, i) {
                    FaceConnection::Boundary(tag) => {
                        let code = layout.encode(DofRef::Boundary(tag));
                        codes.extend(std::iter::repeat_n(code, n_face_dofs));
                        continue;
                    }
                    FaceConnection::Interior(nbr) => (ElementRef::Local(nbr.element), nbr.face),
                    FaceConnection::Remote(g) => (ElementRef::Ghost(g.ghost), g.face),
                };

                let mine = relative_to_centroid(&face_nodes(ElementRef::Local(e), i));
                let theirs = relative_to_centroid(&face_nodes(other, other_face));
                let scale = mine
                    .iter()
                    .map(|p| p.iter().map(|x| x * x).sum::<f64>().sqrt())
                    .fold(0.0, f64::max);

                for (jf, p) in mine.iter().enumerate() {
                    let unmatched = DgError::UnmatchedFaceDof {
                        element: e,
                        face: i,
                        face_dof: jf,
                    };
                    let (m, gap) = theirs
                        .iter()
                        .map(|q| distance(p, q))
                        .enumerate()
                        .min_by(|a, b| a.1.total_cmp(&b.1))
                        .ok_or_else(|| unmatched.clone())?;
                    if gap > GEOMETRY_TOL * scale {
                        return Err(unmatched);
                    }

                    let dof = element.face_dofs(other_face)[m];
                    let dof_ref = match other {
                        ElementRef::Local(element) => DofRef::Local { element, dof },
                        ElementRef::Ghost(ghost) => DofRef::Remote { ghost, dof },
                    };
                    codes.push(layout.encode(dof_ref));
                }
            }
        }

        let map = Self::from_codes(layout, n_faces, n_face_dofs, codes)?;
        debug!("Neighbor map: {}", map.counts());
        Ok(map)
    }

    /// Adopt an externally supplied code table.
    ///
    /// `codes` holds `n_elements * n_faces * n_face_dofs` entries in
    /// (element, face, face dof) order. Every code must decode against
    /// `layout`; the layout's `n_eq` is ignored.
    pub fn from_codes(
        layout: DofLayout,
        n_faces: usize,
        n_face_dofs: usize,
        codes: Vec<i64>,
    ) -> Result<Self> {
        let expected = layout.n_elements * n_faces * n_face_dofs;
        if codes.len() != expected {
            return Err(DgError::InvalidMesh(format!(
                "neighbor table has {} codes, expected {}",
                codes.len(),
                expected
            )));
        }

        let refs = codes
            .iter()
            .enumerate()
            .map(|(slot, &code)| {
                layout.decode(code).ok_or_else(|| DgError::MalformedNeighbor {
                    element: ElementIndex::new(slot / (n_faces * n_face_dofs)),
                    face: (slot / n_face_dofs) % n_faces,
                    face_dof: slot % n_face_dofs,
                    code,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            layout: DofLayout { n_eq: 1, ..layout },
            n_faces,
            n_face_dofs,
            codes,
            refs,
        })
    }

    /// Layout of a state with `n_eq` equations on this map's elements and ghosts.
    #[inline]
    pub fn layout(&self, n_eq: usize) -> DofLayout {
        DofLayout { n_eq, ..self.layout }
    }

    /// Number of local elements.
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.layout.n_elements
    }

    /// Number of ghost elements.
    #[inline]
    pub fn n_ghosts(&self) -> usize {
        self.layout.n_ghosts
    }

    /// Number of faces per element.
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.n_faces
    }

    /// Number of dofs per face.
    #[inline]
    pub fn n_face_dofs(&self) -> usize {
        self.n_face_dofs
    }

    /// Neighbor of face dof `jf` on face `i` of element `e`.
    #[inline]
    pub fn resolve(&self, e: ElementIndex, i: usize, jf: usize) -> DofRef {
        self.refs[self.slot(e, i, jf)]
    }

    /// Wire code of face dof `jf` on face `i` of element `e`.
    #[inline]
    pub fn code(&self, e: ElementIndex, i: usize, jf: usize) -> i64 {
        self.codes[self.slot(e, i, jf)]
    }

    /// All wire codes in (element, face, face dof) order.
    pub fn codes(&self) -> &[i64] {
        &self.codes
    }

    /// Tally of local, remote and boundary face dofs.
    pub fn counts(&self) -> NeighborCounts {
        self.refs
            .iter()
            .fold(NeighborCounts::default(), |mut acc, r| {
                match r {
                    DofRef::Local { .. } => acc.local += 1,
                    DofRef::Remote { .. } => acc.remote += 1,
                    DofRef::Boundary(_) => acc.boundary += 1,
                }
                acc
            })
    }

    #[inline]
    fn slot(&self, e: ElementIndex, i: usize, jf: usize) -> usize {
        (e.as_usize() * self.n_faces + i) * self.n_face_dofs + jf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::{BernsteinQuad, BernsteinSegment};
    use crate::mesh::{BoundaryTag, Mesh1D, MeshTopology, QuadMesh};

    #[test]
    fn test_1d_codes() {
        let mesh = Mesh1D::uniform(0.0, 1.0, 3);
        let el = BernsteinSegment::new(2);
        let map = NeighborMap::build(&mesh, &el).unwrap();

        let e1 = ElementIndex::new(1);
        // Left neighbor's right dof, right neighbor's left dof
        assert_eq!(map.code(e1, 0, 0), 2);
        assert_eq!(map.code(e1, 1, 0), 6);
        assert_eq!(
            map.resolve(e1, 1, 0),
            DofRef::Local {
                element: ElementIndex::new(2),
                dof: 0
            }
        );
        assert_eq!(map.code(ElementIndex::new(0), 0, 0), -1);
        assert_eq!(map.code(ElementIndex::new(2), 1, 0), -2);
        assert_eq!(
            map.counts(),
            NeighborCounts {
                local: 4,
                remote: 0,
                boundary: 2
            }
        );
    }

    #[test]
    fn test_periodic_1d_wraps() {
        let mesh = Mesh1D::uniform_periodic(0.0, 1.0, 4);
        let el = BernsteinSegment::new(1);
        let map = NeighborMap::build(&mesh, &el).unwrap();
        assert_eq!(
            map.resolve(ElementIndex::new(0), 0, 0),
            DofRef::Local {
                element: ElementIndex::new(3),
                dof: 1
            }
        );
        assert_eq!(map.counts().boundary, 0);
    }

    #[test]
    fn test_quad_pairing_reverses_face_order() {
        let mesh = QuadMesh::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 2, 2);
        let el = BernsteinQuad::new(2);
        let map = NeighborMap::build(&mesh, &el).unwrap();

        // Right face of element 0 runs upward, left face of element 1 downward
        let e0 = ElementIndex::new(0);
        let e1 = ElementIndex::new(1);
        assert_eq!(map.resolve(e0, 1, 0), DofRef::Local { element: e1, dof: 0 });
        assert_eq!(map.resolve(e0, 1, 2), DofRef::Local { element: e1, dof: 6 });
        assert_eq!(
            map.resolve(e0, 0, 1),
            DofRef::Boundary(BoundaryTag::Wall)
        );
    }

    #[test]
    fn test_pairing_is_an_involution() {
        for mesh in [
            QuadMesh::uniform_rectangle(0.0, 2.0, 0.0, 1.0, 3, 2),
            QuadMesh::uniform_periodic(0.0, 1.0, 0.0, 1.0, 2, 3),
        ] {
            let el = BernsteinQuad::new(3);
            let map = NeighborMap::build(&mesh, &el).unwrap();
            for e in ElementIndex::iter(mesh.n_elements()) {
                for i in 0..4 {
                    let FaceConnection::Interior(nbr) = mesh.face_connection(e, i) else {
                        continue;
                    };
                    for jf in 0..map.n_face_dofs() {
                        let DofRef::Local { element, dof } = map.resolve(e, i, jf) else {
                            panic!("interior face resolved to a non-local dof");
                        };
                        assert_eq!(element, nbr.element);
                        let back = el.face_dofs(nbr.face).iter().position(|&d| d == dof).unwrap();
                        assert_eq!(
                            map.resolve(nbr.element, nbr.face, back),
                            DofRef::Local {
                                element: e,
                                dof: el.face_dofs(i)[jf]
                            }
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_from_codes_rejects_malformed() {
        let layout = DofLayout::new(1, 2, 2, 0);
        let ok = NeighborMap::from_codes(layout, 2, 1, vec![-1, 2, 1, -2]).unwrap();
        assert_eq!(ok.counts().local, 2);

        let err = NeighborMap::from_codes(layout, 2, 1, vec![-1, 2, 4, -2]).unwrap_err();
        assert_eq!(
            err,
            DgError::MalformedNeighbor {
                element: ElementIndex::new(1),
                face: 0,
                face_dof: 0,
                code: 4
            }
        );
        assert!(NeighborMap::from_codes(layout, 2, 1, vec![-1, 2]).is_err());

        let err = NeighborMap::from_codes(layout, 2, 1, vec![i64::MIN, 2, 1, -2]).unwrap_err();
        assert_eq!(
            err,
            DgError::MalformedNeighbor {
                element: ElementIndex::ZERO,
                face: 0,
                face_dof: 0,
                code: i64::MIN
            }
        );
    }
}
