//! Prescribed boundary data and its discrete representation.
//!
//! Boundary faces read their placeholder exterior state from an "inflow
//! buffer": the prescribed function g(x, t) projected onto the DG space and
//! stored with the same layout as the state vector. Steady data is projected
//! once; time-dependent data is projected again at every evaluation time.

use std::fmt;
use std::sync::Arc;

use crate::operators::{GeometryCache, MassOperators, ShapeTables};
use crate::types::{DofLayout, ElementIndex};

/// How prescribed boundary data is turned into dof values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InflowProjection {
    /// Local L2 projection with the consistent element mass matrix.
    #[default]
    L2,
    /// Sample the function at the dof nodes.
    ///
    /// Bernstein coefficients sampled at Greville points reproduce linear
    /// functions exactly.
    Interpolation,
}

type InflowFn = dyn Fn(&[f64], f64, &mut [f64]) + Send + Sync;

/// Prescribed boundary state g(x, t).
#[derive(Clone)]
pub struct InflowFunction {
    n_eq: usize,
    func: Arc<InflowFn>,
    time_dependent: bool,
    projection: InflowProjection,
}

impl InflowFunction {
    /// Time-independent boundary data with `n_eq` components.
    pub fn steady(n_eq: usize, f: impl Fn(&[f64], &mut [f64]) + Send + Sync + 'static) -> Self {
        Self {
            n_eq,
            func: Arc::new(move |x: &[f64], _t: f64, out: &mut [f64]| f(x, out)),
            time_dependent: false,
            projection: InflowProjection::default(),
        }
    }

    /// Boundary data that varies in time.
    pub fn time_dependent(
        n_eq: usize,
        f: impl Fn(&[f64], f64, &mut [f64]) + Send + Sync + 'static,
    ) -> Self {
        Self {
            n_eq,
            func: Arc::new(f),
            time_dependent: true,
            projection: InflowProjection::default(),
        }
    }

    /// Uniform boundary state.
    pub fn constant(state: Vec<f64>) -> Self {
        let n_eq = state.len();
        Self::steady(n_eq, move |_x, out| out.copy_from_slice(&state))
    }

    /// Choose how the data is projected onto the DG space.
    pub fn with_projection(mut self, projection: InflowProjection) -> Self {
        self.projection = projection;
        self
    }

    /// Number of components.
    #[inline]
    pub fn n_eq(&self) -> usize {
        self.n_eq
    }

    /// Whether the data must be re-projected at each evaluation time.
    #[inline]
    pub fn is_time_dependent(&self) -> bool {
        self.time_dependent
    }

    /// Projection type.
    #[inline]
    pub fn projection(&self) -> InflowProjection {
        self.projection
    }

    /// Evaluate g(x, t) into `out`.
    #[inline]
    pub fn evaluate(&self, x: &[f64], t: f64, out: &mut [f64]) {
        (self.func)(x, t, out);
    }

    /// Project g(·, t) onto the DG space, writing a state-layout vector.
    pub fn project(
        &self,
        t: f64,
        geometry: &GeometryCache,
        shapes: &ShapeTables,
        mass: &MassOperators,
        out: &mut [f64],
    ) {
        let all = ElementIndex::iter(geometry.n_elements());
        self.project_elements(t, all, geometry, shapes, mass, out);
    }

    /// Project g(·, t) on `elements` only. Entries of other elements in
    /// `out` are left untouched.
    pub fn project_elements(
        &self,
        t: f64,
        elements: impl IntoIterator<Item = ElementIndex>,
        geometry: &GeometryCache,
        shapes: &ShapeTables,
        mass: &MassOperators,
        out: &mut [f64],
    ) {
        let nd = shapes.n_dofs();
        let layout = DofLayout::new(self.n_eq, geometry.n_elements(), nd, 0);
        let mut g = vec![0.0; self.n_eq];

        match self.projection {
            InflowProjection::Interpolation => {
                for e in elements {
                    for j in 0..nd {
                        self.evaluate(geometry.dof_point(e, j), t, &mut g);
                        for n in 0..self.n_eq {
                            out[layout.state_index(n, e, j)] = g[n];
                        }
                    }
                }
            }
            InflowProjection::L2 => {
                let mut rhs = vec![0.0; self.n_eq * nd];
                let mut coeffs = vec![0.0; nd];
                for e in elements {
                    rhs.fill(0.0);
                    for k in 0..shapes.n_quadrature_points() {
                        self.evaluate(geometry.quadrature_point(e, k), t, &mut g);
                        let dx = geometry.measure(e, k);
                        let phi = shapes.shape_at(k);
                        for n in 0..self.n_eq {
                            for j in 0..nd {
                                rhs[n * nd + j] += phi[j] * g[n] * dx;
                            }
                        }
                    }
                    for n in 0..self.n_eq {
                        mass.apply_inverse(e, &rhs[n * nd..(n + 1) * nd], &mut coeffs);
                        for j in 0..nd {
                            out[layout.state_index(n, e, j)] = coeffs[j];
                        }
                    }
                }
            }
        }
    }
}

impl fmt::Debug for InflowFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InflowFunction")
            .field("n_eq", &self.n_eq)
            .field("time_dependent", &self.time_dependent)
            .field("projection", &self.projection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::BernsteinSegment;
    use crate::mesh::Mesh1D;

    fn setup(order: usize) -> (GeometryCache, ShapeTables, MassOperators) {
        let mesh = Mesh1D::uniform(0.0, 1.0, 3);
        let el = BernsteinSegment::new(order);
        let geo = GeometryCache::compute(&mesh, &el).unwrap();
        let shapes = ShapeTables::new(&el);
        let mass = MassOperators::new(&geo, &shapes).unwrap();
        (geo, shapes, mass)
    }

    #[test]
    fn test_constant_projects_exactly() {
        let (geo, shapes, mass) = setup(2);
        let inflow = InflowFunction::constant(vec![1.5, -0.5]);
        for projection in [InflowProjection::L2, InflowProjection::Interpolation] {
            let mut out = vec![0.0; 2 * 9];
            inflow
                .clone()
                .with_projection(projection)
                .project(0.0, &geo, &shapes, &mass, &mut out);
            assert!(out[..9].iter().all(|v| (v - 1.5).abs() < 1e-12));
            assert!(out[9..].iter().all(|v| (v + 0.5).abs() < 1e-12));
        }
    }

    #[test]
    fn test_linear_function_interpolation_matches_l2() {
        let (geo, shapes, mass) = setup(3);
        let f = |x: &[f64], out: &mut [f64]| out[0] = 2.0 * x[0] - 1.0;
        let mut l2 = vec![0.0; 12];
        let mut interp = vec![0.0; 12];
        InflowFunction::steady(1, f).project(0.0, &geo, &shapes, &mass, &mut l2);
        InflowFunction::steady(1, f)
            .with_projection(InflowProjection::Interpolation)
            .project(0.0, &geo, &shapes, &mass, &mut interp);
        for (a, b) in l2.iter().zip(&interp) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn test_project_elements_leaves_others_untouched() {
        let (geo, shapes, mass) = setup(1);
        let g = InflowFunction::time_dependent(1, |x, t, out| out[0] = x[0] + t);
        let mut out = vec![-7.0; 6];
        let ends = [ElementIndex::ZERO, ElementIndex::new(2)];
        g.project_elements(1.0, ends, &geo, &shapes, &mass, &mut out);

        assert!((out[0] - 1.0).abs() < 1e-12);
        assert!((out[5] - 2.0).abs() < 1e-12);
        assert_eq!(&out[2..4], &[-7.0, -7.0]);
    }

    #[test]
    fn test_time_dependent_flag() {
        let g = InflowFunction::time_dependent(1, |_x, t, out| out[0] = t);
        assert!(g.is_time_dependent());
        let mut out = [0.0];
        g.evaluate(&[0.0], 2.5, &mut out);
        assert_eq!(out[0], 2.5);
        assert!(!InflowFunction::constant(vec![1.0]).is_time_dependent());
    }
}
