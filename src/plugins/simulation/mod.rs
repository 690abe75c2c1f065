//! Simulation plugin - Self-contained plugin pattern
//!
//! Owns the simulation resource and the fixed-rate systems that step it,
//! sample its energy and stop the run.

use crate::diagnostics::EnergyRecorder;
use crate::events::EnergySampled;
use crate::prelude::*;
use crate::resources::{ActiveSimulation, InitialEnergy, RunDuration};
use bevy::ecs::schedule::{LogLevel, ScheduleBuildSettings};

mod physics;

pub use physics::PhysicsSet;
use physics::{
    advance_simulation, log_energy_drift, record_energy, setup_simulation, stop_after_duration,
};

/// Steps the simulation once per fixed tick
///
/// Uses the [`SimulationConfig`] resource when one is already inserted, and
/// otherwise loads the per-user configuration.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = match app.world().get_resource::<SimulationConfig>() {
            Some(config) => config.clone(),
            None => SimulationConfig::load_from_user_config(),
        };

        match toml::to_string_pretty(&config) {
            Ok(toml_string) => {
                info!("=== Current Configuration (TOML) ===\n{}", toml_string);
                info!("=== End Configuration ===");
            }
            Err(e) => {
                error!("Failed to serialize configuration to TOML: {}", e);
            }
        }

        app.insert_resource(config.clone());
        app.insert_resource(SharedRng::from_optional_seed(config.physics.initial_seed));
        app.insert_resource(EnergyRecorder::from_config(&config.diagnostics));
        // an invalid configuration halts at startup, when the simulation is built
        match config.validate() {
            Ok(()) => {
                app.insert_resource(Time::<Fixed>::from_hz(config.timing.frame_rate));
            }
            Err(e) => error!("Invalid configuration: {}", e),
        }
        app.init_resource::<InitialEnergy>();
        app.init_resource::<RunDuration>();
        app.init_state::<AppState>();
        app.add_event::<EnergySampled>();

        app.edit_schedule(FixedUpdate, |schedule| {
            schedule.set_build_settings(ScheduleBuildSettings {
                ambiguity_detection: LogLevel::Warn,
                ..default()
            });
        });

        app.configure_sets(
            FixedUpdate,
            (PhysicsSet::Step, PhysicsSet::Diagnostics, PhysicsSet::Control)
                .chain()
                .run_if(resource_exists::<ActiveSimulation>),
        );

        app.add_systems(Startup, setup_simulation);

        app.add_systems(
            FixedUpdate,
            (
                advance_simulation
                    .in_set(PhysicsSet::Step)
                    .run_if(in_state(AppState::Running)),
                (record_energy, log_energy_drift)
                    .chain()
                    .in_set(PhysicsSet::Diagnostics),
                stop_after_duration.in_set(PhysicsSet::Control),
            ),
        );
    }
}
