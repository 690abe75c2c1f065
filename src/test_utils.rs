//! Test utilities for plugin and physics testing

use crate::config::SimulationConfig;
use crate::error::ConfigurationError;
use crate::physics::math::{Scalar, Vector};
use crate::physics::particles::ParticleSystem;
use bevy::prelude::*;

/// Creates a minimal headless app with the core Bevy plugins the simulation needs
pub fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins,
        bevy::state::app::StatesPlugin,
        bevy::diagnostic::DiagnosticsPlugin,
    ));

    app
}

/// Default configuration with `count` particles, a fixed seed and no energy log file
pub fn quiet_config(count: usize) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.physics.particle_count = count;
    config.physics.initial_seed = Some(7);
    config.diagnostics.energy_log_enabled = false;
    config
}

/// Two equal masses at rest, 100 units apart along x
pub fn pair_at_rest() -> Result<ParticleSystem, ConfigurationError> {
    ParticleSystem::from_parts(
        vec![4.0, 4.0],
        vec![Vector::new(100.0, 100.0), Vector::new(200.0, 100.0)],
        vec![Vector::ZERO; 2],
        10.0,
    )
}

/// Two equal masses on a circular orbit about the domain centre
///
/// Each body moves at `sqrt(G m / (2 d))` perpendicular to the line joining
/// them, the circular-orbit speed for separation `d`.
pub fn circular_binary(
    config: &SimulationConfig,
    mass: Scalar,
    separation: Scalar,
) -> Result<ParticleSystem, ConfigurationError> {
    let centre = config.domain.size() / 2.0;
    let speed = (config.physics.gravitational_constant * mass / (2.0 * separation)).sqrt();
    let offset = Vector::new(separation / 2.0, 0.0);

    ParticleSystem::from_parts(
        vec![mass, mass],
        vec![centre - offset, centre + offset],
        vec![Vector::new(0.0, -speed), Vector::new(0.0, speed)],
        config.physics.particle_radius,
    )
}
