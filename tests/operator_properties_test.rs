//! Structural properties of the evolution operator.
//!
//! Conservation of the face flux exchange, free-stream preservation on
//! distorted meshes, boundary ghost states, mass matrix integrals and the
//! convergence monitor on real and manufactured sequences.

use dg_hypsys::{
    Advection, BernsteinQuad, BernsteinSegment, BoundaryConditions, BoundaryTag, ConvergenceMonitor,
    DgEvolution, DgState, ElementIndex, Euler, EvolutionConfig, HyperbolicSystem, Inflow,
    InflowFunction, LaxFriedrichsScratch, Mesh1D, Outflow, PointLocation, QuadMesh, ShallowWater,
    SteadyStateConfig, lax_friedrichs, run_steady_state,
};
use faer::Mat;
use std::f64::consts::PI;

const TOL: f64 = 1e-11;

/// Smooth, non-uniform Euler state in 2D.
fn euler_wave() -> InflowFunction {
    InflowFunction::steady(4, |x, out| {
        let rho = 1.0 + 0.2 * (2.0 * PI * x[0]).sin() * (2.0 * PI * x[1]).cos();
        let (vx, vy) = (0.3, -0.2);
        let p = 1.0 + 0.1 * (2.0 * PI * (x[0] + x[1])).cos();
        out[0] = rho;
        out[1] = rho * vx;
        out[2] = rho * vy;
        out[3] = p / 0.4 + 0.5 * rho * (vx * vx + vy * vy);
    })
}

/// 3×3 quad mesh of the unit square with jittered interior vertices.
fn distorted_mesh() -> QuadMesh {
    let n = 3;
    let mut vertices = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            let (mut x, mut y) = (i as f64 / n as f64, j as f64 / n as f64);
            if i > 0 && i < n && j > 0 && j < n {
                x += 0.07 * ((i + 2 * j) as f64).sin();
                y -= 0.05 * ((2 * i + j) as f64).cos();
            }
            vertices.push([x, y]);
        }
    }
    let v = |i: usize, j: usize| j * (n + 1) + i;
    let elements = (0..n)
        .flat_map(|j| (0..n).map(move |i| [v(i, j), v(i + 1, j), v(i + 1, j + 1), v(i, j + 1)]))
        .collect();
    QuadMesh::new(vertices, elements)
        .unwrap()
        .with_boundary_tags(|_| BoundaryTag::Inflow)
}

fn sum_component(r: &DgState, n: usize) -> f64 {
    r.component(n).iter().sum()
}

#[test]
fn test_flux_exchange_is_conservative_2d_euler() {
    let mesh = QuadMesh::uniform_periodic(0.0, 1.0, 0.0, 1.0, 4, 3);
    let system = Euler::air(2);
    let bcs = BoundaryConditions::standard(&system);
    let mut op = DgEvolution::new(
        &mesh,
        &BernsteinQuad::new(2),
        system,
        bcs,
        InflowFunction::constant(vec![1.0, 0.0, 0.0, 2.5]),
        EvolutionConfig::time_accurate(),
    )
    .unwrap();

    let u = op.project(&euler_wave(), 0.0).unwrap();
    let mut r = DgState::zeros_like(&u);
    op.residual(u.as_slice(), &[], 0.0, r.as_mut_slice()).unwrap();

    // Bernstein shapes sum to one, so the sum over all dofs is the net
    // flux through all faces
    assert!(r.max_abs() > 1e-3, "the test state should not be stationary");
    for n in 0..4 {
        let total = sum_component(&r, n);
        assert!(total.abs() < TOL, "equation {}: net flux {:e}", n, total);
    }
}

#[test]
fn test_flux_exchange_is_conservative_1d_swe() {
    let mesh = Mesh1D::from_vertices(vec![0.0, 0.1, 0.35, 0.5, 0.8, 1.0])
        .unwrap()
        .with_boundary_tags(BoundaryTag::Wall, BoundaryTag::Wall);
    let system = ShallowWater::new(9.81, 1);
    let bcs = BoundaryConditions::standard(&system);
    let mut op = DgEvolution::new(
        &mesh,
        &BernsteinSegment::new(3),
        system,
        bcs,
        InflowFunction::constant(vec![1.0, 0.0]),
        EvolutionConfig::time_accurate(),
    )
    .unwrap();

    let initial = InflowFunction::steady(2, |x, out| {
        out[0] = 1.0 + 0.3 * x[0];
        out[1] = 0.0;
    });
    let u = op.project(&initial, 0.0).unwrap();
    let mut r = DgState::zeros_like(&u);
    op.residual(u.as_slice(), &[], 0.0, r.as_mut_slice()).unwrap();

    // Walls let no mass through: the net mass flux vanishes
    assert!(sum_component(&r, 0).abs() < TOL);
    // Net momentum change is the pressure difference between the walls
    let pressure = |h: f64| 0.5 * 9.81 * h * h;
    let expected = pressure(1.0) - pressure(1.3);
    assert!((sum_component(&r, 1) - expected).abs() < 1e-9);
}

#[test]
fn test_free_stream_preserved_on_distorted_mesh() {
    let mesh = distorted_mesh();
    let system = Euler::air(2);
    let bcs = BoundaryConditions::standard(&system);
    let free_stream = vec![1.2, 0.5, -0.3, 3.0];
    let inflow = InflowFunction::constant(free_stream);
    let mut op = DgEvolution::new(
        &mesh,
        &BernsteinQuad::new(2),
        system,
        bcs,
        inflow.clone(),
        EvolutionConfig::time_accurate(),
    )
    .unwrap();

    let u = op.project(&inflow, 0.0).unwrap();
    let mut du = vec![0.0; op.state_len()];
    op.evaluate(u.as_slice(), &[], 0.0, &mut du).unwrap();

    let max = du.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    assert!(max < 1e-10, "free stream drifts at rate {:e}", max);
}

#[test]
fn test_single_element_at_rest_on_skewed_quad() {
    let mesh = QuadMesh::new(
        vec![[0.0, 0.0], [2.0, 0.1], [2.3, 1.5], [-0.2, 1.0]],
        vec![[0, 1, 2, 3]],
    )
    .unwrap()
    .with_boundary_tags(|_| BoundaryTag::Inflow);
    let system = ShallowWater::new(1.0, 2);
    let bcs = BoundaryConditions::standard(&system);
    let inflow = InflowFunction::constant(vec![1.5, 0.4, -0.2]);
    let mut op = DgEvolution::new(
        &mesh,
        &BernsteinQuad::new(3),
        system,
        bcs,
        inflow.clone(),
        EvolutionConfig::time_accurate(),
    )
    .unwrap();

    assert_eq!(op.neighbors().counts().boundary, 4 * 4);
    let u = op.project(&inflow, 0.0).unwrap();
    let mut du = vec![0.0; op.state_len()];
    op.evaluate(u.as_slice(), &[], 0.0, &mut du).unwrap();
    assert!(du.iter().all(|v| v.abs() < 1e-10));
}

/// Residual at the right end of a single-element 1D Euler problem whose
/// left end is an outflow face.
fn right_end_residual(right: BoundaryTag, bcs: BoundaryConditions, inflow: Vec<f64>) -> (Vec<f64>, Vec<f64>) {
    let mesh = Mesh1D::uniform(0.0, 1.0, 1).with_boundary_tags(BoundaryTag::Outflow, right);
    let system = Euler::air(1);
    let mut op = DgEvolution::new(
        &mesh,
        &BernsteinSegment::new(1),
        system,
        bcs,
        InflowFunction::constant(inflow),
        EvolutionConfig::time_accurate(),
    )
    .unwrap();

    let state = [1.0, 2.0, 5.0];
    let u = DgState::from_fn(3, 1, 2, |n, _, _| state[n]);
    let mut r = DgState::zeros_like(&u);
    op.residual(u.as_slice(), &[], 0.0, r.as_mut_slice()).unwrap();

    let e = ElementIndex::new(0);
    let j = (0..2)
        .find(|&j| (op.geometry().dof_point(e, j)[0] - 1.0).abs() < 1e-12)
        .unwrap();
    let at_right = (0..3).map(|n| r.get(n, e, j)).collect();
    let at_left = (0..3).map(|n| r.get(n, e, 1 - j)).collect();
    (at_left, at_right)
}

/// F(u) - F*(u, ghost, +1) for 1D Euler.
fn expected_right_end(ghost: &[f64]) -> Vec<f64> {
    let system = Euler::air(1);
    let u = [1.0, 2.0, 5.0];
    let x = [1.0];
    let at = PointLocation {
        element: ElementIndex::new(0),
        face: Some(1),
        point: 0,
        x: &x,
    };
    let mut flux = Mat::zeros(3, 1);
    system.evaluate_flux(&u, &at, &mut flux);
    let mut f_star = vec![0.0; 3];
    let mut scratch = LaxFriedrichsScratch::new(3, 1);
    lax_friedrichs(&system, &u, ghost, &[1.0], &at, &mut scratch, &mut f_star);
    (0..3).map(|n| flux[(n, 0)] - f_star[n]).collect()
}

#[test]
fn test_wall_ghost_reverses_momentum() {
    let system = Euler::air(1);
    let bcs = BoundaryConditions::standard(&system);
    // The inflow data must not leak into the wall state
    let (left, right) = right_end_residual(BoundaryTag::Wall, bcs, vec![9.0, 9.0, 90.0]);

    let expected = expected_right_end(&[1.0, -2.0, 5.0]);
    for n in 0..3 {
        assert!(left[n].abs() < TOL, "outflow end: {:e}", left[n]);
        assert!((right[n] - expected[n]).abs() < TOL);
    }
    // No mass crosses the wall, so only the volume term ρv remains
    assert!((right[0] - 2.0).abs() < TOL);
}

#[test]
fn test_unhandled_tag_keeps_boundary_data() {
    let data = vec![1.1, 0.3, 2.6];
    let bcs = BoundaryConditions::new(Outflow).with(BoundaryTag::Custom(0), Inflow);
    let (left, right) = right_end_residual(BoundaryTag::Custom(0), bcs, data.clone());

    let expected = expected_right_end(&data);
    for n in 0..3 {
        assert!(left[n].abs() < TOL);
        assert!((right[n] - expected[n]).abs() < TOL);
    }
}

#[test]
fn test_lax_friedrichs_consistent_for_all_systems() {
    let x = [0.3, 0.7];
    let at = PointLocation {
        element: ElementIndex::new(0),
        face: Some(0),
        point: 0,
        x: &x,
    };
    let normal = [0.8, -0.6];

    let systems: Vec<(Box<dyn HyperbolicSystem>, Vec<f64>)> = vec![
        (Box::new(Advection::new(vec![1.0, -0.5])), vec![0.7]),
        (Box::new(ShallowWater::new(9.81, 2)), vec![2.0, 0.4, -0.6]),
        (Box::new(Euler::air(2)), vec![1.1, 0.3, -0.2, 2.7]),
    ];
    for (system, u) in systems {
        let (n_eq, dim) = (system.n_eq(), system.dim());
        let mut flux = Mat::zeros(n_eq, dim);
        system.evaluate_flux(&u, &at, &mut flux);
        let mut out = vec![0.0; n_eq];
        let mut scratch = LaxFriedrichsScratch::new(n_eq, dim);
        lax_friedrichs(system.as_ref(), &u, &u, &normal, &at, &mut scratch, &mut out);
        for n in 0..n_eq {
            let fn_exact: f64 = (0..dim).map(|c| flux[(n, c)] * normal[c]).sum();
            assert!((out[n] - fn_exact).abs() < 1e-13, "{}: equation {}", system.name(), n);
        }
    }
}

#[test]
fn test_mass_integrals_on_distorted_mesh() {
    let mesh = distorted_mesh();
    let system = Advection::new(vec![1.0, 0.0]);
    let bcs = BoundaryConditions::standard(&system);
    let op = DgEvolution::new(
        &mesh,
        &BernsteinQuad::new(2),
        system,
        bcs,
        InflowFunction::constant(vec![0.0]),
        EvolutionConfig::steady_state(),
    )
    .unwrap();

    let mass = op.mass();
    let nd = op.n_dofs();
    let mut total = 0.0;
    for e in ElementIndex::iter(op.n_elements()) {
        let volume = op.geometry().volume(e);
        let lumped: f64 = (0..nd).map(|j| mass.lumped(e, j)).sum();
        let m = mass.matrix(e);
        let consistent: f64 = (0..nd).flat_map(|i| (0..nd).map(move |j| (i, j))).map(|(i, j)| m[(i, j)]).sum();
        assert!((lumped - volume).abs() < 1e-12);
        assert!((consistent - volume).abs() < 1e-12);
        assert!((0..nd).all(|j| mass.lumped(e, j) > 0.0));
        total += volume;
    }
    assert!((total - 1.0).abs() < 1e-12);
}

#[test]
fn test_monitor_decreases_on_geometric_sequence() {
    let mesh = Mesh1D::uniform(0.0, 2.0, 3);
    let system = ShallowWater::new(9.81, 1);
    let bcs = BoundaryConditions::standard(&system);
    let op = DgEvolution::new(
        &mesh,
        &BernsteinSegment::new(2),
        system,
        bcs,
        InflowFunction::constant(vec![1.0, 0.0]),
        EvolutionConfig::time_accurate(),
    )
    .unwrap();

    let target = DgState::from_fn(2, 3, 3, |n, e, j| 1.0 + n as f64 + 0.1 * (e.as_usize() + j) as f64);
    let offset = DgState::from_fn(2, 3, 3, |n, e, j| ((n + 2 * e.as_usize() + j) as f64).sin());

    for steady_state in [false, true] {
        let mut u = target.clone();
        u.axpy(1.0, &offset);
        let mut monitor =
            ConvergenceMonitor::new(op.mass().clone(), 2, steady_state, u.as_slice())
                .unwrap()
                .with_tolerance(1e-6);

        let mut previous = f64::INFINITY;
        let mut steps: i32 = 0;
        while !monitor.is_converged() {
            steps += 1;
            assert!(steps < 100, "monitor never converged");
            let mut next = target.clone();
            next.axpy(0.5_f64.powi(steps), &offset);
            let residual = monitor.check(next.as_slice(), 0.1).unwrap();
            assert!(residual < previous);
            previous = residual;
        }
        assert_eq!(monitor.n_checks(), steps as usize);
    }
}

#[test]
fn test_steady_inflow_problem_converges() {
    let _ = env_logger::builder().is_test(true).try_init();

    let sides = [
        BoundaryTag::Inflow,
        BoundaryTag::Outflow,
        BoundaryTag::Outflow,
        BoundaryTag::Inflow,
    ];
    let mesh = QuadMesh::uniform_rectangle_with_sides(0.0, 1.0, 0.0, 1.0, 4, 4, sides);
    let system = Advection::new(vec![1.0, 0.5]);
    let bcs = BoundaryConditions::standard(&system);
    let mut op = DgEvolution::new(
        &mesh,
        &BernsteinQuad::new(1),
        system,
        bcs,
        InflowFunction::constant(vec![1.0]),
        EvolutionConfig::steady_state(),
    )
    .unwrap();

    let mut u = DgState::new(1, op.n_elements(), op.n_dofs());
    let config = SteadyStateConfig::new(1e-8, 20_000).with_cfl(0.2);
    let report = run_steady_state(&mut op, &mut u, &config).unwrap();

    assert!(report.converged, "residual {:e}", report.residual);
    assert!(report.residual < 1e-8);
    assert_eq!(report.history.len(), report.steps);
    assert!(report.history[report.steps - 1] < report.history[0]);
    assert!(u.as_slice().iter().all(|v| (v - 1.0).abs() < 1e-6));
}
