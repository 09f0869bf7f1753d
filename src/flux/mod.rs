//! Numerical flux functions.
//!
//! Inter-element coupling uses the Lax-Friedrichs (local Rusanov) flux,
//! which needs nothing from the system beyond its physical flux and a wave
//! speed estimate.

mod lax_friedrichs;

pub use lax_friedrichs::{LaxFriedrichsScratch, lax_friedrichs};
