//! Convergence and conservation tests for the DG evolution operator.
//!
//! Verifies that the operator achieves the expected order of accuracy (p+1)
//! for smooth solutions, where p is the polynomial degree, and that total
//! mass is conserved on periodic meshes.

use dg_hypsys::{
    Advection, BernsteinQuad, BernsteinSegment, BoundaryConditions, DgEvolution, DgState,
    ElementIndex, EvolutionConfig, HyperbolicSystem, InflowFunction, Mesh1D, QuadMesh,
    ShallowWater, ssp_rk3_step,
};
use std::f64::consts::PI;

/// L2 error of equation 0 against `exact`.
fn l2_error<S: HyperbolicSystem>(
    op: &DgEvolution<S>,
    u: &DgState,
    exact: impl Fn(&[f64]) -> f64,
) -> f64 {
    let geo = op.geometry();
    let shapes = op.shapes();
    let mut err = 0.0;
    for e in ElementIndex::iter(op.n_elements()) {
        for k in 0..shapes.n_quadrature_points() {
            let uh: f64 = (0..op.n_dofs()).map(|j| u.get(0, e, j) * shapes.shape(j, k)).sum();
            let diff = uh - exact(geo.quadrature_point(e, k));
            err += diff * diff * geo.measure(e, k);
        }
    }
    err.sqrt()
}

/// Integral of equation `n` over the domain.
fn total<S: HyperbolicSystem>(op: &DgEvolution<S>, u: &DgState, n: usize) -> f64 {
    let geo = op.geometry();
    let shapes = op.shapes();
    ElementIndex::iter(op.n_elements())
        .map(|e| {
            (0..shapes.n_quadrature_points())
                .map(|k| {
                    let uh: f64 = (0..op.n_dofs()).map(|j| u.get(n, e, j) * shapes.shape(j, k)).sum();
                    uh * geo.measure(e, k)
                })
                .sum::<f64>()
        })
        .sum()
}

/// Advance `u` to `t_final` with SSP-RK3 at the given CFL number.
fn advance<S: HyperbolicSystem>(op: &mut DgEvolution<S>, u: &mut DgState, t_final: f64, cfl: f64) {
    let dt = op.stable_time_step(u.as_slice(), cfl).unwrap();
    let n_steps = (t_final / dt).ceil() as usize;
    let dt = t_final / n_steps as f64;

    let mut t = 0.0;
    for _ in 0..n_steps {
        ssp_rk3_step(
            u,
            |x, time, out| op.evaluate(x.as_slice(), &[], time, out.as_mut_slice()),
            t,
            dt,
        )
        .unwrap();
        t += dt;
    }
}

/// Run a periodic advection simulation of sin(2πx) and return the L2 error.
fn run_advection(n_elements: usize, order: usize, t_final: f64) -> f64 {
    let a = 1.0;
    let mesh = Mesh1D::uniform_periodic(0.0, 1.0, n_elements);
    let system = Advection::new(vec![a]);
    let bcs = BoundaryConditions::standard(&system);
    let mut op = DgEvolution::new(
        &mesh,
        &BernsteinSegment::new(order),
        system,
        bcs,
        InflowFunction::constant(vec![0.0]),
        EvolutionConfig::time_accurate(),
    )
    .unwrap();

    let initial = InflowFunction::steady(1, |x, out| out[0] = (2.0 * PI * x[0]).sin());
    let mut u = op.project(&initial, 0.0).unwrap();
    advance(&mut op, &mut u, t_final, 0.2);

    l2_error(&op, &u, |x| (2.0 * PI * (x[0] - a * t_final)).sin())
}

#[test]
fn test_convergence_p1() {
    // P1 -> expect 2nd order convergence
    let e_coarse = run_advection(10, 1, 0.5);
    let e_fine = run_advection(20, 1, 0.5);
    let rate = (e_coarse / e_fine).log2();

    assert!(
        rate > 1.7,
        "P1 convergence rate {:.2} (errors {:.3e}, {:.3e})",
        rate,
        e_coarse,
        e_fine
    );
}

#[test]
fn test_convergence_p2() {
    // P2 -> expect 3rd order convergence
    let e_coarse = run_advection(8, 2, 0.5);
    let e_fine = run_advection(16, 2, 0.5);
    let rate = (e_coarse / e_fine).log2();

    assert!(
        rate > 2.6,
        "P2 convergence rate {:.2} (errors {:.3e}, {:.3e})",
        rate,
        e_coarse,
        e_fine
    );
}

#[test]
fn test_conservation_periodic_swe() {
    let mesh = Mesh1D::uniform_periodic(0.0, 1.0, 16);
    let system = ShallowWater::new(9.81, 1);
    let bcs = BoundaryConditions::standard(&system);
    let mut op = DgEvolution::new(
        &mesh,
        &BernsteinSegment::new(2),
        system,
        bcs,
        InflowFunction::constant(vec![1.0, 0.0]),
        EvolutionConfig::time_accurate(),
    )
    .unwrap();

    // Gaussian hump at rest
    let initial = InflowFunction::steady(2, |x, out| {
        out[0] = 1.0 + 0.1 * (-100.0 * (x[0] - 0.5).powi(2)).exp();
        out[1] = 0.0;
    });
    let mut u = op.project(&initial, 0.0).unwrap();
    let mass_before = total(&op, &u, 0);
    let momentum_before = total(&op, &u, 1);

    advance(&mut op, &mut u, 0.05, 0.2);

    assert!(u.is_finite());
    assert!((total(&op, &u, 0) - mass_before).abs() < 1e-12);
    // Symmetric hump: net momentum stays zero
    assert!((total(&op, &u, 1) - momentum_before).abs() < 1e-12);
}

#[test]
fn test_conservation_2d_periodic() {
    let mesh = QuadMesh::uniform_periodic(0.0, 1.0, 0.0, 1.0, 6, 6);
    let system = Advection::new(vec![1.0, 0.5]);
    let bcs = BoundaryConditions::standard(&system);
    let mut op = DgEvolution::new(
        &mesh,
        &BernsteinQuad::new(2),
        system,
        bcs,
        InflowFunction::constant(vec![0.0]),
        EvolutionConfig::time_accurate(),
    )
    .unwrap();

    let initial = InflowFunction::steady(1, |x, out| {
        out[0] = 1.0 + (2.0 * PI * x[0]).sin() * (2.0 * PI * x[1]).cos();
    });
    let mut u = op.project(&initial, 0.0).unwrap();
    let before = total(&op, &u, 0);

    advance(&mut op, &mut u, 0.1, 0.2);

    assert!((total(&op, &u, 0) - before).abs() < 1e-12);
}

#[test]
fn test_advection_2d_x_direction_only() {
    // Flow along x on a periodic square returns the profile after one period
    let mesh = QuadMesh::uniform_periodic(0.0, 1.0, 0.0, 1.0, 8, 2);
    let system = Advection::new(vec![1.0, 0.0]);
    let bcs = BoundaryConditions::standard(&system);
    let mut op = DgEvolution::new(
        &mesh,
        &BernsteinQuad::new(3),
        system,
        bcs,
        InflowFunction::constant(vec![0.0]),
        EvolutionConfig::time_accurate(),
    )
    .unwrap();

    let profile = |x: &[f64]| (2.0 * PI * x[0]).sin();
    let initial = InflowFunction::steady(1, move |x, out| out[0] = profile(x));
    let mut u = op.project(&initial, 0.0).unwrap();
    advance(&mut op, &mut u, 1.0, 0.2);

    let err = l2_error(&op, &u, profile);
    assert!(err < 1e-3, "L2 error after one period: {:.3e}", err);
}
