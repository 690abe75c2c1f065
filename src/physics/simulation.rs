//! The simulation core: particles, forces, integration and boundaries
//!
//! [`Simulation::step`] runs one complete step:
//!
//! ```text
//! compute forces -> compute accelerations -> integrate(dt) -> apply boundary
//! ```
//!
//! The step either completes and commits, or fails and leaves the committed
//! state exactly as it was.

use crate::config::SimulationConfig;
use crate::error::{ConfigurationError, IntegrationFailure, SimulationError};
use crate::physics::boundary::BoundaryPolicy;
use crate::physics::energy::{EnergyAccountant, EnergyReport};
use crate::physics::forces::ForceEngine;
use crate::physics::integrators::{GravitationalField, Integrator, IntegratorRegistry, all_finite};
use crate::physics::math::{Scalar, Vector};
use crate::physics::particles::ParticleSystem;
use crate::physics::state;
use crate::resources::SharedRng;

/// Outcome of a successful step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Simulated time after the step
    pub time: Scalar,
    /// Steps completed so far
    pub steps: u64,
}

pub struct Simulation {
    config: SimulationConfig,
    particles: ParticleSystem,
    engine: ForceEngine,
    accountant: EnergyAccountant,
    integrator: Box<dyn Integrator>,
    time: Scalar,
    steps: u64,
}

impl Simulation {
    /// Build a simulation with randomly sampled particles
    pub fn new(config: SimulationConfig, rng: &mut SharedRng) -> Result<Self, ConfigurationError> {
        let particles = ParticleSystem::random(&config, rng)?;
        Self::from_particles(config, particles)
    }

    /// Build a simulation around an explicit particle set, using the configured integrator
    pub fn from_particles(
        config: SimulationConfig,
        particles: ParticleSystem,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let integrator = IntegratorRegistry::new()
            .with_standard_integrators(&config.integrator)
            .create(&config.integrator.integrator_type)?;
        Self::with_integrator(config, particles, integrator)
    }

    /// Build a simulation with a caller-supplied integrator
    pub fn with_integrator(
        config: SimulationConfig,
        particles: ParticleSystem,
        integrator: Box<dyn Integrator>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let engine = ForceEngine::from_config(&config, particles.len());
        let accountant = EnergyAccountant::for_engine(&engine);

        Ok(Self {
            config,
            particles,
            engine,
            accountant,
            integrator,
            time: 0.0,
            steps: 0,
        })
    }

    /// Advance the simulation by `dt` seconds of simulated time
    pub fn step(&mut self, dt: Scalar) -> Result<StepReport, SimulationError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ConfigurationError::InvalidTimeStep(dt).into());
        }

        let particles = &mut self.particles;

        self.engine
            .compute(&particles.position, &particles.mass, &mut particles.force);
        ForceEngine::accelerations(&particles.force, &particles.mass, &mut particles.acceleration);

        let initial_state = state::pack(&particles.position, &particles.velocity);
        let field = GravitationalField::new(&self.engine, &particles.mass);
        let final_state = self.integrator.advance(&field, &initial_state, dt)?;

        if !all_finite(&final_state) {
            return Err(IntegrationFailure::NonFiniteState {
                time: self.time + dt,
            }
            .into());
        }

        let (mut position, mut velocity) = state::unpack(&final_state);
        self.config.physics.boundary.enforce(
            &mut position,
            &mut velocity,
            particles.radius(),
            self.engine.metric().domain,
        );
        particles.position = position;
        particles.velocity = velocity;

        self.time += dt;
        self.steps += 1;

        Ok(StepReport {
            time: self.time,
            steps: self.steps,
        })
    }

    /// Kinetic, potential and total energy of the committed state
    pub fn energy(&self) -> EnergyReport {
        self.accountant.report(
            &self.engine,
            self.particles.masses(),
            self.particles.positions(),
            self.particles.velocities(),
        )
    }

    pub fn positions(&self) -> &[Vector] {
        self.particles.positions()
    }

    pub fn radius(&self) -> Scalar {
        self.particles.radius()
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn time(&self) -> Scalar {
        self.time
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn boundary(&self) -> BoundaryPolicy {
        self.config.physics.boundary
    }

    pub fn integrator_name(&self) -> &'static str {
        self.integrator.name()
    }
}
