use crate::config::SimulationConfig;
use crate::diagnostics::EnergyRecorder;
use crate::events::EnergySampled;
use crate::physics::simulation::Simulation;
use crate::resources::{ActiveSimulation, InitialEnergy, RunDuration, SharedRng};
use crate::states::AppState;
use bevy::prelude::*;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    Step,
    Diagnostics,
    Control,
}

/// Build the simulation from the configuration and take the t = 0 energy sample
pub fn setup_simulation(
    mut commands: Commands,
    config: Res<SimulationConfig>,
    mut rng: ResMut<SharedRng>,
    mut recorder: ResMut<EnergyRecorder>,
    mut samples: EventWriter<EnergySampled>,
    mut next_state: ResMut<NextState<AppState>>,
    mut exit: EventWriter<AppExit>,
) {
    let simulation = match Simulation::new((*config).clone(), &mut rng) {
        Ok(simulation) => simulation,
        Err(e) => {
            error!("Invalid simulation configuration: {}", e);
            next_state.set(AppState::Halted);
            exit.write(AppExit::error());
            return;
        }
    };

    let energy = simulation.energy();
    info!(
        "Simulating {} particles with {} integration and {} boundaries (E0 = {:.6e})",
        simulation.particles().len(),
        simulation.integrator_name(),
        simulation.boundary().name(),
        energy.total
    );

    if let Some(sample) = recorder.observe(simulation.time(), &energy) {
        samples.write(EnergySampled(sample));
    }

    commands.insert_resource(InitialEnergy(Some(energy)));
    commands.insert_resource(ActiveSimulation(simulation));
}

/// Advance the simulation by one fixed timestep
pub fn advance_simulation(
    mut simulation: ResMut<ActiveSimulation>,
    time: Res<Time<Fixed>>,
    mut next_state: ResMut<NextState<AppState>>,
    mut exit: EventWriter<AppExit>,
) {
    // a failure earlier this frame has not reached the state machine yet
    if matches!(*next_state, NextState::Pending(AppState::Halted)) {
        return;
    }

    let dt = time.timestep().as_secs_f64();

    match simulation.step(dt) {
        Ok(report) => {
            debug!("Step {} reached t = {:.4}", report.steps, report.time);
        }
        Err(e) => {
            error!(
                "Simulation halted at t = {:.4} after {} steps: {}",
                simulation.time(),
                simulation.steps(),
                e
            );
            next_state.set(AppState::Halted);
            exit.write(AppExit::error());
        }
    }
}

/// Sample energy when the recorder's cadence says so
pub fn record_energy(
    simulation: Res<ActiveSimulation>,
    mut recorder: ResMut<EnergyRecorder>,
    mut samples: EventWriter<EnergySampled>,
) {
    let time = simulation.time();
    if !recorder.is_due(time) {
        return;
    }

    if let Some(sample) = recorder.observe(time, &simulation.energy()) {
        samples.write(EnergySampled(sample));
    }
}

/// Log energy drift relative to the start of the run
pub fn log_energy_drift(mut samples: EventReader<EnergySampled>, initial: Res<InitialEnergy>) {
    let Some(initial) = **initial else {
        return;
    };

    for EnergySampled(sample) in samples.read() {
        let drift = sample.report().relative_drift_from(&initial);
        debug!(
            "t = {:.3}: E = {:.6e} (kinetic {:.6e}, potential {:.6e}), drift {:.3e}",
            sample.time, sample.total_energy, sample.kinetic_energy, sample.potential_energy, drift
        );
    }
}

/// Request exit once the configured simulated duration has elapsed
pub fn stop_after_duration(
    simulation: Res<ActiveSimulation>,
    duration: Res<RunDuration>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(duration) = **duration else {
        return;
    };

    if simulation.time() >= duration {
        info!(
            "Reached t = {:.4} after {} steps, exiting",
            simulation.time(),
            simulation.steps()
        );
        exit.write(AppExit::Success);
    }
}
