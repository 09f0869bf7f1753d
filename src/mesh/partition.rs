//! Element-based partitioning of a global mesh.
//!
//! A [`Subdomain`] is the view of one partition (rank) onto a global mesh:
//! it owns the elements assigned to its rank and sees elements of other
//! ranks that share a face with them as ghost elements. Ghosts are ordered
//! by global element index.
//!
//! Halo buffers follow the layout read by the evolution operator: the value
//! of equation `n` at dof `j` of ghost `g` sits at `g * nd * n_eq + n * nd + j`.

use std::collections::HashMap;

use faer::Mat;

use super::traits::{ElementRef, FaceConnection, GhostNeighbor, MeshGeometry, MeshTopology, Neighbor};
use crate::error::{DgError, Result};
use crate::types::{DofLayout, ElementIndex};

/// One partition of a global mesh.
#[derive(Clone, Debug)]
pub struct Subdomain<'a, M> {
    global: &'a M,
    rank: usize,
    /// Global index of each local element
    local_to_global: Vec<ElementIndex>,
    /// Global index of each ghost element
    ghost_to_global: Vec<ElementIndex>,
    global_to_local: HashMap<ElementIndex, ElementIndex>,
    global_to_ghost: HashMap<ElementIndex, usize>,
}

impl<'a, M: MeshGeometry> Subdomain<'a, M> {
    /// Create the partition of `rank` given the owner rank of every global element.
    pub fn new(global: &'a M, owners: &[usize], rank: usize) -> Result<Self> {
        if owners.len() != global.n_elements() {
            return Err(DgError::InvalidPartition(format!(
                "{} owner entries for {} elements",
                owners.len(),
                global.n_elements()
            )));
        }

        let local_to_global: Vec<ElementIndex> = ElementIndex::iter(owners.len())
            .filter(|&e| owners[e] == rank)
            .collect();
        if local_to_global.is_empty() {
            return Err(DgError::InvalidPartition(format!(
                "rank {} owns no elements",
                rank
            )));
        }

        let mut ghost_to_global = Vec::new();
        for &e in &local_to_global {
            for f in 0..global.n_faces_per_element() {
                match global.face_connection(e, f) {
                    FaceConnection::Interior(n) if owners[n.element] != rank => {
                        ghost_to_global.push(n.element);
                    }
                    FaceConnection::Remote(_) => {
                        return Err(DgError::InvalidPartition(
                            "cannot partition a mesh that already has ghost elements".into(),
                        ));
                    }
                    _ => {}
                }
            }
        }
        ghost_to_global.sort_unstable();
        ghost_to_global.dedup();

        let global_to_local = local_to_global
            .iter()
            .enumerate()
            .map(|(l, &g)| (g, ElementIndex::new(l)))
            .collect();
        let global_to_ghost = ghost_to_global
            .iter()
            .enumerate()
            .map(|(l, &g)| (g, l))
            .collect();

        Ok(Self {
            global,
            rank,
            local_to_global,
            ghost_to_global,
            global_to_local,
            global_to_ghost,
        })
    }

    /// Split a global mesh into one subdomain per rank.
    pub fn split(global: &'a M, owners: &[usize]) -> Result<Vec<Self>> {
        let n_ranks = owners.iter().max().map_or(0, |&r| r + 1);
        (0..n_ranks).map(|rank| Self::new(global, owners, rank)).collect()
    }

    /// Rank owning this subdomain.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Global index of a local element.
    pub fn global_element(&self, local: ElementIndex) -> ElementIndex {
        self.local_to_global[local]
    }

    /// Global index of a ghost element.
    pub fn global_ghost(&self, ghost: usize) -> ElementIndex {
        self.ghost_to_global[ghost]
    }

    /// Extract the local part of a global state vector.
    ///
    /// Both vectors are equation-major with `n_dofs` dofs per element.
    pub fn restrict(&self, global_state: &[f64], n_eq: usize, n_dofs: usize) -> Result<Vec<f64>> {
        let global_layout = DofLayout::new(n_eq, self.global.n_elements(), n_dofs, 0);
        check_len(global_state, global_layout.state_len())?;
        let local_layout = DofLayout::new(n_eq, self.local_to_global.len(), n_dofs, 0);

        let mut local = vec![0.0; local_layout.state_len()];
        for (l, &g) in self.local_to_global.iter().enumerate() {
            let l = ElementIndex::new(l);
            for n in 0..n_eq {
                for j in 0..n_dofs {
                    local[local_layout.state_index(n, l, j)] =
                        global_state[global_layout.state_index(n, g, j)];
                }
            }
        }
        Ok(local)
    }

    /// Write a local state vector back into its slots of a global one.
    pub fn prolong(
        &self,
        local_state: &[f64],
        global_state: &mut [f64],
        n_eq: usize,
        n_dofs: usize,
    ) -> Result<()> {
        let global_layout = DofLayout::new(n_eq, self.global.n_elements(), n_dofs, 0);
        check_len(global_state, global_layout.state_len())?;
        let local_layout = DofLayout::new(n_eq, self.local_to_global.len(), n_dofs, 0);
        check_len(local_state, local_layout.state_len())?;

        for (l, &g) in self.local_to_global.iter().enumerate() {
            let l = ElementIndex::new(l);
            for n in 0..n_eq {
                for j in 0..n_dofs {
                    global_state[global_layout.state_index(n, g, j)] =
                        local_state[local_layout.state_index(n, l, j)];
                }
            }
        }
        Ok(())
    }

    /// Pack the ghost values of a global state vector into a halo buffer.
    ///
    /// Stands in for the exchange step of a distributed run: every rank
    /// reads its ghosts from the assembled global state.
    pub fn gather_halo(&self, global_state: &[f64], n_eq: usize, n_dofs: usize) -> Result<Vec<f64>> {
        let global_layout = DofLayout::new(n_eq, self.global.n_elements(), n_dofs, 0);
        check_len(global_state, global_layout.state_len())?;
        let halo_layout = DofLayout::new(
            n_eq,
            self.local_to_global.len(),
            n_dofs,
            self.ghost_to_global.len(),
        );

        let mut halo = vec![0.0; halo_layout.halo_len()];
        for (ghost, &g) in self.ghost_to_global.iter().enumerate() {
            for n in 0..n_eq {
                for j in 0..n_dofs {
                    halo[halo_layout.halo_index(n, ghost, j)] =
                        global_state[global_layout.state_index(n, g, j)];
                }
            }
        }
        Ok(halo)
    }
}

fn check_len(values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(DgError::StateSizeMismatch {
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

impl<M: MeshGeometry> MeshTopology for Subdomain<'_, M> {
    fn dim(&self) -> usize {
        self.global.dim()
    }

    fn n_elements(&self) -> usize {
        self.local_to_global.len()
    }

    fn n_ghost_elements(&self) -> usize {
        self.ghost_to_global.len()
    }

    fn n_faces_per_element(&self) -> usize {
        self.global.n_faces_per_element()
    }

    fn face_connection(&self, element: ElementIndex, face: usize) -> FaceConnection {
        match self.global.face_connection(self.local_to_global[element], face) {
            FaceConnection::Interior(n) => match self.global_to_local.get(&n.element) {
                Some(&local) => FaceConnection::Interior(Neighbor {
                    element: local,
                    face: n.face,
                }),
                None => FaceConnection::Remote(GhostNeighbor {
                    ghost: self.global_to_ghost[&n.element],
                    face: n.face,
                }),
            },
            other => other,
        }
    }
}

impl<M: MeshGeometry> MeshGeometry for Subdomain<'_, M> {
    fn map_to_physical(&self, element: ElementRef, xi: &[f64]) -> Vec<f64> {
        let global = match element {
            ElementRef::Local(e) => self.local_to_global[e],
            ElementRef::Ghost(g) => self.ghost_to_global[g],
        };
        self.global.map_to_physical(ElementRef::Local(global), xi)
    }

    fn jacobian(&self, element: ElementIndex, xi: &[f64]) -> Mat<f64> {
        self.global.jacobian(self.local_to_global[element], xi)
    }
}
