//! Pseudo-time marching to a steady state.
//!
//! Repeats SSP-RK3 steps of the evolution operator until the convergence
//! monitor reports a weighted rate of change below the tolerance.

use log::{debug, info, warn};

use crate::equations::HyperbolicSystem;
use crate::error::{DgError, Result};
use crate::solver::{DgEvolution, DgState};

use super::ssp_rk3_step;

/// Configuration for [`run_steady_state`].
#[derive(Clone, Debug, PartialEq)]
pub struct SteadyStateConfig {
    /// CFL number for the time step
    pub cfl: f64,
    /// Fixed time step, overriding the CFL estimate
    pub dt: Option<f64>,
    /// Convergence threshold on the monitor residual
    pub tolerance: f64,
    /// Step limit
    pub max_steps: usize,
    /// Log progress every this many steps (0 disables)
    pub output_interval: usize,
}

impl Default for SteadyStateConfig {
    fn default() -> Self {
        Self {
            cfl: 0.3,
            dt: None,
            tolerance: 1e-8,
            max_steps: 10_000,
            output_interval: 100,
        }
    }
}

impl SteadyStateConfig {
    /// Create a configuration with the given tolerance and step limit.
    pub fn new(tolerance: f64, max_steps: usize) -> Self {
        Self {
            tolerance,
            max_steps,
            ..Default::default()
        }
    }

    /// Set the CFL number.
    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.cfl = cfl;
        self
    }

    /// Use a fixed time step.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Set the progress logging interval.
    pub fn with_output_interval(mut self, interval: usize) -> Self {
        self.output_interval = interval;
        self
    }
}

/// Outcome of a steady-state run.
#[derive(Clone, Debug, PartialEq)]
pub struct SteadyStateReport {
    /// Steps taken
    pub steps: usize,
    /// Pseudo time reached
    pub time: f64,
    /// Last monitor residual
    pub residual: f64,
    /// Monitor residual after every step
    pub history: Vec<f64>,
    /// Whether the tolerance was reached
    pub converged: bool,
}

/// March `u` in pseudo time until it stops changing.
///
/// Only unpartitioned meshes are supported here (the halo is empty); a
/// partitioned run needs a halo exchange between stages, which belongs to
/// the caller's own loop.
pub fn run_steady_state<S: HyperbolicSystem>(
    op: &mut DgEvolution<S>,
    u: &mut DgState,
    config: &SteadyStateConfig,
) -> Result<SteadyStateReport> {
    if op.halo_len() != 0 {
        return Err(DgError::HaloSizeMismatch {
            expected: op.halo_len(),
            actual: 0,
        });
    }

    let mut monitor = op
        .convergence_monitor(u.as_slice())?
        .with_tolerance(config.tolerance);
    let mut history = Vec::new();
    let mut t = 0.0;

    for step in 1..=config.max_steps {
        let dt = match config.dt {
            Some(dt) => dt,
            None => op.stable_time_step(u.as_slice(), config.cfl)?,
        };
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(DgError::InvalidTimeStep(dt));
        }

        ssp_rk3_step(
            u,
            |x, time, out| op.evaluate(x.as_slice(), &[], time, out.as_mut_slice()),
            t,
            dt,
        )?;
        t += dt;

        let residual = monitor.check(u.as_slice(), dt)?;
        history.push(residual);

        if config.output_interval > 0 && step % config.output_interval == 0 {
            debug!("Step {:6}: t = {:.4e}, residual = {:.4e}", step, t, residual);
        }
        if monitor.is_converged() {
            info!(
                "{} converged after {} steps: residual = {:.4e} < {:.1e}",
                op.system().name(),
                step,
                residual,
                config.tolerance
            );
            return Ok(SteadyStateReport {
                steps: step,
                time: t,
                residual,
                history,
                converged: true,
            });
        }
    }

    let residual = monitor.last_residual().unwrap_or(f64::INFINITY);
    warn!(
        "{} not converged after {} steps: residual = {:.4e}",
        op.system().name(),
        config.max_steps,
        residual
    );
    Ok(SteadyStateReport {
        steps: config.max_steps,
        time: t,
        residual,
        history,
        converged: false,
    })
}
