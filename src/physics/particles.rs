//! Particle state
//!
//! Masses are fixed at construction. Positions and velocities change only
//! through the integrator and the boundary policy; forces and accelerations
//! are transient buffers refreshed every step.

use crate::config::SimulationConfig;
use crate::error::ConfigurationError;
use crate::physics::math::{Scalar, Vector, random_point_in_rect, random_symmetric_vector};
use crate::resources::SharedRng;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSystem {
    radius: Scalar,
    pub(crate) mass: Vec<Scalar>,
    pub(crate) position: Vec<Vector>,
    pub(crate) velocity: Vec<Vector>,
    pub(crate) force: Vec<Vector>,
    pub(crate) acceleration: Vec<Vector>,
}

impl ParticleSystem {
    /// Sample a fresh particle set from the configured ranges
    ///
    /// Positions are drawn from `[r, W - r] x [r, H - r]`, keeping a radius of
    /// clearance from every edge.
    pub fn random(config: &SimulationConfig, rng: &mut SharedRng) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let physics = &config.physics;
        let radius = physics.particle_radius;
        let count = physics.particle_count;
        let lower = Vector::splat(radius);
        let upper = config.domain.size() - Vector::splat(radius);

        let mut mass = Vec::with_capacity(count);
        let mut position = Vec::with_capacity(count);
        let mut velocity = Vec::with_capacity(count);

        for _ in 0..count {
            mass.push(rng.random_range(physics.min_mass..=physics.max_mass));
            position.push(random_point_in_rect(rng, lower, upper));
            velocity.push(random_symmetric_vector(rng, physics.max_initial_speed));
        }

        Self::from_parts(mass, position, velocity, radius)
    }

    /// Build a particle set from explicit arrays
    pub fn from_parts(
        mass: Vec<Scalar>,
        position: Vec<Vector>,
        velocity: Vec<Vector>,
        radius: Scalar,
    ) -> Result<Self, ConfigurationError> {
        if mass.len() != position.len() || mass.len() != velocity.len() {
            return Err(ConfigurationError::MismatchedLengths {
                masses: mass.len(),
                positions: position.len(),
                velocities: velocity.len(),
            });
        }
        if mass.is_empty() {
            return Err(ConfigurationError::InvalidParticleCount(0));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigurationError::InvalidRadius(radius));
        }
        if let Some(&value) = mass.iter().find(|m| !(m.is_finite() && **m > 0.0)) {
            return Err(ConfigurationError::NonPositive {
                name: "particle mass",
                value,
            });
        }

        let count = mass.len();
        Ok(Self {
            radius,
            mass,
            position,
            velocity,
            force: vec![Vector::ZERO; count],
            acceleration: vec![Vector::ZERO; count],
        })
    }

    pub fn len(&self) -> usize {
        self.mass.len()
    }

    /// Never true: construction rejects empty sets
    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }

    /// Shared display radius
    pub fn radius(&self) -> Scalar {
        self.radius
    }

    pub fn masses(&self) -> &[Scalar] {
        &self.mass
    }

    pub fn positions(&self) -> &[Vector] {
        &self.position
    }

    pub fn velocities(&self) -> &[Vector] {
        &self.velocity
    }

    /// Forces from the most recent step
    pub fn forces(&self) -> &[Vector] {
        &self.force
    }

    /// Accelerations from the most recent step
    pub fn accelerations(&self) -> &[Vector] {
        &self.acceleration
    }

    pub fn total_mass(&self) -> Scalar {
        self.mass.iter().sum()
    }
}
