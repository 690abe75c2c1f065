//! Physics: particles, forces, boundaries, energy and numerical integration

pub mod boundary;
pub mod energy;
pub mod forces;
pub mod integrators;
pub mod math;
pub mod particles;
pub mod simulation;
pub mod state;
