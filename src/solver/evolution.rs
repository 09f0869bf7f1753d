//! DG evolution operator for hyperbolic systems.
//!
//! For the system ∂u/∂t + ∇·F(u) = 0 the semi-discrete weak form on element
//! K with test function φ_j reads
//!
//! ```text
//! M du/dt = ∫_K ∇φ_j · F(u) dx - ∫_∂K φ_j F*(u⁻, u⁺, n) ds
//! ```
//!
//! The volume integral uses the cached `adj(J)·w` so that
//! `∇φ_j · F dx = ∇̂φ_j · (adj(J) w F)`; the face integral uses the
//! Lax-Friedrichs flux F* with the cached unit normals and face weights.
//! The resulting block is multiplied by the inverse consistent element mass
//! (time-accurate runs) or the inverse lumped mass (steady-state runs).
//!
//! # Example
//!
//! ```
//! use dg_hypsys::basis::BernsteinSegment;
//! use dg_hypsys::boundary::{BoundaryConditions, InflowFunction};
//! use dg_hypsys::equations::Advection;
//! use dg_hypsys::mesh::Mesh1D;
//! use dg_hypsys::solver::{DgEvolution, EvolutionConfig};
//!
//! let mesh = Mesh1D::uniform_periodic(0.0, 1.0, 8);
//! let system = Advection::new(vec![1.0]);
//! let bcs = BoundaryConditions::standard(&system);
//! let mut op = DgEvolution::new(
//!     &mesh,
//!     &BernsteinSegment::new(2),
//!     system,
//!     bcs,
//!     InflowFunction::constant(vec![0.0]),
//!     EvolutionConfig::time_accurate(),
//! )
//! .unwrap();
//!
//! let x = vec![1.0; op.state_len()];
//! let mut y = vec![0.0; op.state_len()];
//! op.evaluate(&x, &[], 0.0, &mut y).unwrap();
//! assert!(y.iter().all(|v| v.abs() < 1e-12));
//! ```

use faer::Mat;
use log::{debug, trace};

use super::{ConvergenceMonitor, DgState, NeighborMap, StateEvaluator};
use crate::basis::ReferenceElement;
use crate::boundary::{BoundaryCondition, BoundaryConditions, BoundaryContext, InflowFunction};
use crate::equations::{HyperbolicSystem, PointLocation};
use crate::error::{DgError, Result};
use crate::flux::{LaxFriedrichsScratch, lax_friedrichs};
use crate::mesh::MeshGeometry;
use crate::operators::{GeometryCache, MassOperators, ShapeTables};
use crate::types::{DofLayout, ElementIndex};

/// How the evolution operator weights its residual.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvolutionConfig {
    /// Use the lumped mass instead of the consistent mass.
    ///
    /// Only the converged state matters in a steady-state run, so the cheaper
    /// diagonal mass is used both for the residual and for the convergence
    /// measure.
    pub steady_state: bool,
}

impl EvolutionConfig {
    /// Time-accurate run with the consistent mass matrix.
    pub fn time_accurate() -> Self {
        Self {
            steady_state: false,
        }
    }

    /// Steady-state run with the lumped mass.
    pub fn steady_state() -> Self {
        Self { steady_state: true }
    }
}

/// Per-element work buffers.
#[derive(Clone, Debug)]
struct Scratch {
    /// Element dofs, `n * nd + j`
    u_elem: Vec<f64>,
    /// State at one quadrature point
    u_qp: Vec<f64>,
    /// Flux tensor at one quadrature point
    flux: Mat<f64>,
    /// adj(J) w F^T, `r * n_eq + n`
    mat1: Vec<f64>,
    u_in: Vec<f64>,
    u_nbr: Vec<f64>,
    f_star: Vec<f64>,
    lf: LaxFriedrichsScratch,
    /// Element residual before the mass inverse, `n * nd + j`
    r_elem: Vec<f64>,
    /// Element residual after the mass inverse, `n * nd + j`
    y_elem: Vec<f64>,
}

impl Scratch {
    fn new(n_eq: usize, nd: usize, dim: usize) -> Self {
        Self {
            u_elem: vec![0.0; n_eq * nd],
            u_qp: vec![0.0; n_eq],
            flux: Mat::zeros(n_eq, dim),
            mat1: vec![0.0; dim * n_eq],
            u_in: vec![0.0; n_eq],
            u_nbr: vec![0.0; n_eq],
            f_star: vec![0.0; n_eq],
            lf: LaxFriedrichsScratch::new(n_eq, dim),
            r_elem: vec![0.0; n_eq * nd],
            y_elem: vec![0.0; n_eq * nd],
        }
    }
}

/// Read-only view of everything an element residual needs.
struct Kernel<'a, S: ?Sized> {
    system: &'a S,
    bcs: &'a BoundaryConditions,
    geometry: &'a GeometryCache,
    shapes: &'a ShapeTables,
    mass: &'a MassOperators,
    eval: StateEvaluator<'a>,
    inflow: &'a [f64],
    steady_state: bool,
}

impl<S: HyperbolicSystem + ?Sized> Kernel<'_, S> {
    /// Residual block of element `e` into `s.r_elem`.
    fn element_residual(&self, e: ElementIndex, x: &[f64], halo: &[f64], t: f64, s: &mut Scratch) {
        let layout = self.eval.layout();
        let (n_eq, nd) = (layout.n_eq, layout.n_dofs);
        let dim = self.geometry.dim();

        for n in 0..n_eq {
            let start = layout.state_index(n, e, 0);
            s.u_elem[n * nd..(n + 1) * nd].copy_from_slice(&x[start..start + nd]);
        }
        s.r_elem.fill(0.0);

        // Volume term
        for k in 0..self.shapes.n_quadrature_points() {
            self.eval.element_eval(&s.u_elem, k, &mut s.u_qp);
            let at = PointLocation {
                element: e,
                face: None,
                point: k,
                x: self.geometry.quadrature_point(e, k),
            };
            self.system.evaluate_flux(&s.u_qp, &at, &mut s.flux);

            let adj = self.geometry.adjugate(e, k);
            for r in 0..dim {
                for n in 0..n_eq {
                    s.mat1[r * n_eq + n] = (0..dim).map(|c| adj[r * dim + c] * s.flux[(n, c)]).sum();
                }
            }
            for j in 0..nd {
                let grad = self.shapes.grad_shape(j, k);
                for n in 0..n_eq {
                    s.r_elem[n * nd + j] += (0..dim).map(|r| grad[r] * s.mat1[r * n_eq + n]).sum::<f64>();
                }
            }
        }

        // Face term
        for i in 0..self.shapes.n_faces() {
            for k in 0..self.shapes.n_face_quadrature_points() {
                let xk = self.geometry.face_quadrature_point(e, i, k);
                let normal = self.geometry.normal(e, i, k);

                let tag = self
                    .eval
                    .face_eval(x, halo, self.inflow, e, i, k, &mut s.u_in, &mut s.u_nbr);
                if let Some(tag) = tag {
                    let ctx = BoundaryContext {
                        interior: &s.u_in,
                        normal,
                        tag,
                        time: t,
                        x: xk,
                    };
                    self.bcs.ghost_state(&ctx, &mut s.u_nbr);
                }

                let at = PointLocation {
                    element: e,
                    face: Some(i),
                    point: k,
                    x: xk,
                };
                lax_friedrichs(self.system, &s.u_in, &s.u_nbr, normal, &at, &mut s.lf, &mut s.f_star);

                let w = self.geometry.face_weight(e, i, k);
                for jf in 0..self.shapes.n_face_dofs() {
                    let j = self.shapes.face_dof(i, jf);
                    let phi_w = self.shapes.face_shape(i, jf, k) * w;
                    for n in 0..n_eq {
                        s.r_elem[n * nd + j] -= phi_w * s.f_star[n];
                    }
                }
            }
        }
    }

    /// Apply the inverse (consistent or lumped) mass of element `e`.
    fn invert_mass(&self, e: ElementIndex, r: &[f64], out: &mut [f64]) {
        let nd = self.mass.n_dofs();
        for (r, out) in r.chunks_exact(nd).zip(out.chunks_exact_mut(nd)) {
            if self.steady_state {
                self.mass.apply_lumped_inverse(e, r, out);
            } else {
                self.mass.apply_inverse(e, r, out);
            }
        }
    }
}

/// Semi-discrete DG operator `y = M⁻¹ R(x)` for a hyperbolic system.
///
/// All geometric, basis and connectivity data is computed once in
/// [`DgEvolution::new`]; afterwards only the scratch buffers (and, for
/// time-dependent boundary data, the inflow buffer) change.
pub struct DgEvolution<S: HyperbolicSystem> {
    system: S,
    bcs: BoundaryConditions,
    inflow_fn: InflowFunction,
    config: EvolutionConfig,
    order: usize,
    geometry: GeometryCache,
    shapes: ShapeTables,
    mass: MassOperators,
    neighbors: NeighborMap,
    /// Projected boundary data, state layout
    inflow: Vec<f64>,
    /// Time at which `inflow` was projected
    inflow_time: f64,
    /// Elements with at least one boundary face
    boundary_elements: Vec<ElementIndex>,
    scratch: Scratch,
}

impl<S: HyperbolicSystem> DgEvolution<S> {
    /// Build the operator for `system` on the local elements of `mesh`.
    ///
    /// Fails on any inconsistent configuration: mismatched dimensions or
    /// equation counts, invalid element geometry, unmatched face dofs or a
    /// singular mass matrix.
    pub fn new<M, R>(
        mesh: &M,
        element: &R,
        system: S,
        bcs: BoundaryConditions,
        inflow_fn: InflowFunction,
        config: EvolutionConfig,
    ) -> Result<Self>
    where
        M: MeshGeometry + ?Sized,
        R: ReferenceElement + ?Sized,
    {
        if system.dim() != mesh.dim() {
            return Err(DgError::DimensionMismatch {
                what: "hyperbolic system",
                expected: mesh.dim(),
                actual: system.dim(),
            });
        }
        if inflow_fn.n_eq() != system.n_eq() {
            return Err(DgError::EquationCountMismatch {
                what: "inflow function",
                expected: system.n_eq(),
                actual: inflow_fn.n_eq(),
            });
        }

        let geometry = GeometryCache::compute(mesh, element)?;
        let shapes = ShapeTables::new(element);
        let mass = MassOperators::new(&geometry, &shapes)?;
        let neighbors = NeighborMap::build(mesh, element)?;

        let n_eq = system.n_eq();
        let layout = neighbors.layout(n_eq);
        let mut inflow = vec![0.0; layout.state_len()];
        inflow_fn.project(0.0, &geometry, &shapes, &mass, &mut inflow);
        let boundary_elements: Vec<_> = ElementIndex::iter(layout.n_elements)
            .filter(|&e| {
                (0..neighbors.n_faces()).any(|i| {
                    (0..neighbors.n_face_dofs())
                        .any(|jf| neighbors.resolve(e, i, jf).is_boundary())
                })
            })
            .collect();

        debug!(
            "DG evolution: {} on {} × {} ({} elements, {} ghosts, {} dofs, {} equations, {})",
            system.name(),
            element.name(),
            element.order(),
            layout.n_elements,
            layout.n_ghosts,
            layout.n_dofs,
            n_eq,
            if config.steady_state {
                "steady state"
            } else {
                "time accurate"
            },
        );
        debug!(
            "Geometry cache: {} element points, {} faces × {} face points per element",
            geometry.n_quadrature_points(),
            shapes.n_faces(),
            geometry.n_face_quadrature_points(),
        );
        debug!("Boundary conditions: {:?}", bcs);

        Ok(Self {
            scratch: Scratch::new(n_eq, layout.n_dofs, geometry.dim()),
            order: element.order(),
            system,
            bcs,
            inflow_fn,
            config,
            geometry,
            shapes,
            mass,
            neighbors,
            inflow,
            inflow_time: 0.0,
            boundary_elements,
        })
    }

    /// Evaluate `y = M⁻¹ R(x)` at time `t`.
    ///
    /// `halo` holds the ghost element dofs, exchanged by the caller before
    /// this call, in the layout of [`DofLayout::halo_index`]. It is empty on
    /// unpartitioned meshes.
    pub fn evaluate(&mut self, x: &[f64], halo: &[f64], t: f64, y: &mut [f64]) -> Result<()> {
        self.assemble(x, halo, t, y, true)
    }

    /// Evaluate the residual `R(x)` at time `t` without the mass inverse.
    pub fn residual(&mut self, x: &[f64], halo: &[f64], t: f64, y: &mut [f64]) -> Result<()> {
        self.assemble(x, halo, t, y, false)
    }

    /// [`DgEvolution::evaluate`] with elements distributed over the rayon pool.
    ///
    /// Every worker owns its own scratch.
    #[cfg(feature = "parallel")]
    pub fn evaluate_parallel(&mut self, x: &[f64], halo: &[f64], t: f64, y: &mut [f64]) -> Result<()> {
        use rayon::prelude::*;

        self.check_sizes(x, halo, y)?;
        self.refresh_inflow(t);
        trace!("Evaluating {} residual at t = {} in parallel", self.system.name(), t);

        let layout = self.layout();
        let (n_eq, nd) = (layout.n_eq, layout.n_dofs);
        let dim = self.geometry.dim();
        let (kernel, _) = self.split();

        // Element-major blocks, scattered afterwards
        let mut blocks = vec![0.0; layout.n_elements * n_eq * nd];
        blocks
            .par_chunks_mut(n_eq * nd)
            .enumerate()
            .for_each_init(
                || Scratch::new(n_eq, nd, dim),
                |s, (e, out)| {
                    let e = ElementIndex::new(e);
                    kernel.element_residual(e, x, halo, t, s);
                    kernel.invert_mass(e, &s.r_elem, out);
                },
            );

        for (e, block) in ElementIndex::iter(layout.n_elements).zip(blocks.chunks_exact(n_eq * nd)) {
            scatter(&layout, e, block, y);
        }
        Ok(())
    }

    fn assemble(&mut self, x: &[f64], halo: &[f64], t: f64, y: &mut [f64], apply_mass: bool) -> Result<()> {
        self.check_sizes(x, halo, y)?;
        self.refresh_inflow(t);
        trace!("Evaluating {} residual at t = {}", self.system.name(), t);

        let layout = self.layout();
        let (kernel, s) = self.split();
        for e in ElementIndex::iter(layout.n_elements) {
            kernel.element_residual(e, x, halo, t, s);
            if apply_mass {
                kernel.invert_mass(e, &s.r_elem, &mut s.y_elem);
                scatter(&layout, e, &s.y_elem, y);
            } else {
                scatter(&layout, e, &s.r_elem, y);
            }
        }
        Ok(())
    }

    fn split(&mut self) -> (Kernel<'_, S>, &mut Scratch) {
        let n_eq = self.system.n_eq();
        let Self {
            system,
            bcs,
            config,
            geometry,
            shapes,
            mass,
            neighbors,
            inflow,
            scratch,
            ..
        } = self;
        let kernel = Kernel {
            system: &*system,
            bcs: &*bcs,
            geometry: &*geometry,
            shapes: &*shapes,
            mass: &*mass,
            eval: StateEvaluator::new(shapes, neighbors, n_eq),
            inflow: inflow.as_slice(),
            steady_state: config.steady_state,
        };
        (kernel, scratch)
    }

    fn check_sizes(&self, x: &[f64], halo: &[f64], y: &[f64]) -> Result<()> {
        let layout = self.layout();
        for v in [x, y] {
            if v.len() != layout.state_len() {
                return Err(DgError::StateSizeMismatch {
                    expected: layout.state_len(),
                    actual: v.len(),
                });
            }
        }
        if halo.len() != layout.halo_len() {
            return Err(DgError::HaloSizeMismatch {
                expected: layout.halo_len(),
                actual: halo.len(),
            });
        }
        Ok(())
    }

    /// Re-project time-dependent boundary data at `t` on the elements that
    /// touch the boundary.
    fn refresh_inflow(&mut self, t: f64) {
        if self.inflow_fn.is_time_dependent() && t != self.inflow_time {
            trace!(
                "Re-projecting inflow at t = {} on {} boundary elements",
                t,
                self.boundary_elements.len()
            );
            self.inflow_fn.project_elements(
                t,
                self.boundary_elements.iter().copied(),
                &self.geometry,
                &self.shapes,
                &self.mass,
                &mut self.inflow,
            );
            self.inflow_time = t;
        }
    }

    /// Largest stable explicit time step for state `x`.
    ///
    /// `dt = cfl · min_K h_K / ((2p + 1) λ_K)` with `h_K = 2 d |K| / |∂K|`
    /// and `λ_K` the largest wave speed along the coordinate axes at the
    /// element quadrature points. Returns infinity for a state at rest.
    pub fn stable_time_step(&self, x: &[f64], cfl: f64) -> Result<f64> {
        let layout = self.layout();
        if x.len() != layout.state_len() {
            return Err(DgError::StateSizeMismatch {
                expected: layout.state_len(),
                actual: x.len(),
            });
        }

        let (n_eq, nd) = (layout.n_eq, layout.n_dofs);
        let dim = self.geometry.dim();
        let eval = StateEvaluator::new(&self.shapes, &self.neighbors, n_eq);
        let mut u_elem = vec![0.0; n_eq * nd];
        let mut u_qp = vec![0.0; n_eq];
        let mut axis = vec![0.0; dim];
        let order_factor = (2 * self.order + 1) as f64;

        let mut dt = f64::INFINITY;
        for e in ElementIndex::iter(layout.n_elements) {
            for n in 0..n_eq {
                let start = layout.state_index(n, e, 0);
                u_elem[n * nd..(n + 1) * nd].copy_from_slice(&x[start..start + nd]);
            }

            let mut lambda: f64 = 0.0;
            for k in 0..self.shapes.n_quadrature_points() {
                eval.element_eval(&u_elem, k, &mut u_qp);
                let at = PointLocation {
                    element: e,
                    face: None,
                    point: k,
                    x: self.geometry.quadrature_point(e, k),
                };
                for r in 0..dim {
                    axis.fill(0.0);
                    axis[r] = 1.0;
                    lambda = lambda.max(self.system.wave_speed(&u_qp, &axis, &at));
                }
            }

            let surface: f64 = (0..self.shapes.n_faces())
                .flat_map(|i| (0..self.geometry.n_face_quadrature_points()).map(move |k| (i, k)))
                .map(|(i, k)| self.geometry.face_weight(e, i, k))
                .sum();
            let h = 2.0 * dim as f64 * self.geometry.volume(e) / surface;
            if lambda > 0.0 {
                dt = dt.min(cfl * h / (order_factor * lambda));
            }
        }
        Ok(dt)
    }

    /// Project `f(·, t)` onto the DG space of this operator.
    pub fn project(&self, f: &InflowFunction, t: f64) -> Result<DgState> {
        if f.n_eq() != self.n_eq() {
            return Err(DgError::EquationCountMismatch {
                what: "projected function",
                expected: self.n_eq(),
                actual: f.n_eq(),
            });
        }
        let mut state = DgState::new(self.n_eq(), self.n_elements(), self.n_dofs());
        f.project(t, &self.geometry, &self.shapes, &self.mass, state.as_mut_slice());
        Ok(state)
    }

    /// Convergence monitor weighted like this operator, starting from `initial`.
    pub fn convergence_monitor(&self, initial: &[f64]) -> Result<ConvergenceMonitor> {
        ConvergenceMonitor::new(self.mass.clone(), self.n_eq(), self.config.steady_state, initial)
    }

    /// Layout of the state and halo vectors.
    #[inline]
    pub fn layout(&self) -> DofLayout {
        self.neighbors.layout(self.system.n_eq())
    }

    /// Number of equations.
    #[inline]
    pub fn n_eq(&self) -> usize {
        self.system.n_eq()
    }

    /// Number of local elements.
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.neighbors.n_elements()
    }

    /// Number of dofs per element and equation.
    #[inline]
    pub fn n_dofs(&self) -> usize {
        self.shapes.n_dofs()
    }

    /// Length of state vectors.
    #[inline]
    pub fn state_len(&self) -> usize {
        self.layout().state_len()
    }

    /// Length of the halo buffer.
    #[inline]
    pub fn halo_len(&self) -> usize {
        self.layout().halo_len()
    }

    /// The hyperbolic system.
    pub fn system(&self) -> &S {
        &self.system
    }

    /// Run configuration.
    pub fn config(&self) -> EvolutionConfig {
        self.config
    }

    /// Cached geometry.
    pub fn geometry(&self) -> &GeometryCache {
        &self.geometry
    }

    /// Cached basis tables.
    pub fn shapes(&self) -> &ShapeTables {
        &self.shapes
    }

    /// Element mass operators.
    pub fn mass(&self) -> &MassOperators {
        &self.mass
    }

    /// Face-dof connectivity.
    pub fn neighbors(&self) -> &NeighborMap {
        &self.neighbors
    }

    /// Boundary data currently in use, state layout.
    ///
    /// For time-dependent data only the elements with a boundary face follow
    /// the latest evaluation time; the rest keep the projection at `t = 0`.
    pub fn inflow(&self) -> &[f64] {
        &self.inflow
    }
}

/// Write an `n * nd + j` ordered element block into a state-layout vector.
fn scatter(layout: &DofLayout, e: ElementIndex, block: &[f64], y: &mut [f64]) {
    let nd = layout.n_dofs;
    for n in 0..layout.n_eq {
        let start = layout.state_index(n, e, 0);
        y[start..start + nd].copy_from_slice(&block[n * nd..(n + 1) * nd]);
    }
}
