//! Error taxonomy for the simulation
//!
//! Physics-affecting failures ([`ConfigurationError`], [`IntegrationFailure`]) are
//! propagated to the caller through [`SimulationError`]. Diagnostic sink failures
//! ([`DiagnosticSinkError`]) are observational only and are absorbed by the
//! energy recorder.

use crate::physics::math::Scalar;

/// Invalid parameters detected while building the simulation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("particle count must be at least 1, got {0}")]
    InvalidParticleCount(usize),

    #[error("particle radius must be positive and finite, got {0}")]
    InvalidRadius(Scalar),

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: Scalar },

    #[error("{name} must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: Scalar },

    #[error("malformed {name} range: [{min}, {max}]")]
    MalformedRange {
        name: &'static str,
        min: Scalar,
        max: Scalar,
    },

    #[error("particle radius {radius} leaves no room for placement in a {width}x{height} domain")]
    PlacementAreaEmpty {
        radius: Scalar,
        width: Scalar,
        height: Scalar,
    },

    #[error("particle arrays disagree in length: {masses} masses, {positions} positions, {velocities} velocities")]
    MismatchedLengths {
        masses: usize,
        positions: usize,
        velocities: usize,
    },

    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(Scalar),

    #[error("{0}")]
    UnknownIntegrator(String),

    #[error("failed to load configuration: {0}")]
    Load(String),
}

/// The integrator could not produce an acceptable end-of-interval state
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntegrationFailure {
    #[error("step size {step:e} fell below the floor {floor:e} at t = {time}")]
    StepSizeUnderflow {
        time: Scalar,
        step: Scalar,
        floor: Scalar,
    },

    #[error("exceeded {max_steps} internal steps before reaching t = {target} (stopped at t = {time})")]
    StepBudgetExhausted {
        time: Scalar,
        target: Scalar,
        max_steps: usize,
    },

    #[error("integrator produced a non-finite state at t = {time}")]
    NonFiniteState { time: Scalar },
}

/// The diagnostic sink could not accept a record
#[derive(Debug, thiserror::Error)]
pub enum DiagnosticSinkError {
    #[error("energy log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("energy log CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors surfaced by [`crate::physics::simulation::Simulation`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("integration failure: {0}")]
    Integration(#[from] IntegrationFailure),
}
