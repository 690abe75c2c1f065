//! Numerical integration methods for the n-body system
//!
//! Integrators see the simulation as a first-order ODE `y' = f(t, y)` over a
//! flat state vector (see [`crate::physics::state`]). The right-hand side is a
//! [`StateDerivative`]; the gravitational one is [`GravitationalField`].
//!
//! Derivative evaluations are pure: trial states evaluated by the integrator are
//! never written back to the committed particle set, and no boundary policy is
//! applied to them.

use crate::error::IntegrationFailure;
use crate::physics::forces::ForceEngine;
use crate::physics::math::{Scalar, Vector};
use crate::physics::state;

pub mod dormand_prince;
pub mod registry;
pub mod runge_kutta;

pub use dormand_prince::{DormandPrince, Tolerances};
pub use registry::IntegratorRegistry;
pub use runge_kutta::RungeKuttaFourthOrder;

/// Right-hand side of `y' = f(t, y)`
pub trait StateDerivative {
    /// Write `f(t, state)` into `derivative`, which has the same length as `state`
    fn evaluate(&self, t: Scalar, state: &[Scalar], derivative: &mut [Scalar]);
}

impl<F> StateDerivative for F
where
    F: Fn(Scalar, &[Scalar], &mut [Scalar]),
{
    fn evaluate(&self, t: Scalar, state: &[Scalar], derivative: &mut [Scalar]) {
        self(t, state, derivative)
    }
}

/// Base trait for all integrators
pub trait Integrator: Send + Sync {
    /// Create a boxed clone of this integrator
    fn clone_box(&self) -> Box<dyn Integrator>;

    /// Integrate from `t = 0` to `t = interval`, returning the state at exactly `interval`
    fn advance(
        &self,
        field: &dyn StateDerivative,
        initial_state: &[Scalar],
        interval: Scalar,
    ) -> Result<Vec<Scalar>, IntegrationFailure>;

    /// The order of convergence of this integrator
    fn convergence_order(&self) -> usize;

    /// The canonical name of this integrator
    fn name(&self) -> &'static str;

    /// Alternative names for this integrator
    fn aliases(&self) -> Vec<&'static str> {
        vec![]
    }
}

/// Gravitational right-hand side: `[positions, velocities] -> [velocities, accelerations]`
pub struct GravitationalField<'a> {
    engine: &'a ForceEngine,
    masses: &'a [Scalar],
}

impl<'a> GravitationalField<'a> {
    pub fn new(engine: &'a ForceEngine, masses: &'a [Scalar]) -> Self {
        Self { engine, masses }
    }
}

impl StateDerivative for GravitationalField<'_> {
    fn evaluate(&self, _t: Scalar, trial: &[Scalar], derivative: &mut [Scalar]) {
        let count = state::particle_count(trial.len());
        let (trial_positions, trial_velocities) = state::split(trial);
        let (position_rates, velocity_rates) = state::split_mut(derivative);

        // d(position)/dt is the trial velocity
        position_rates.copy_from_slice(trial_velocities);

        let positions: Vec<Vector> = state::to_vectors(trial_positions).collect();
        let mut forces = vec![Vector::ZERO; count];
        let mut accelerations = vec![Vector::ZERO; count];

        self.engine.compute(&positions, self.masses, &mut forces);
        ForceEngine::accelerations(&forces, self.masses, &mut accelerations);

        state::write_vectors(velocity_rates, accelerations);
    }
}

#[inline]
pub(crate) fn all_finite(values: &[Scalar]) -> bool {
    values.iter().all(|v| v.is_finite())
}
