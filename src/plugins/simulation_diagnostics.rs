//! Simulation diagnostics module.
//!
//! Publishes every energy sample to Bevy's diagnostics store, so the usual
//! diagnostic consumers (such as `LogDiagnosticsPlugin`) can report it:
//!
//! - `energy/kinetic`, `energy/potential`, `energy/total`
//! - `energy/relative_drift`: `|E - E0| / |E0|` against the t = 0 sample
//!
//! # Usage
//!
//! ```rust,ignore
//! app.add_plugins(SimulationDiagnosticsPlugin::default());
//! ```

use crate::events::EnergySampled;
use crate::plugins::simulation::PhysicsSet;
use crate::resources::InitialEnergy;
use bevy::diagnostic::DEFAULT_MAX_HISTORY_LENGTH;
use bevy::diagnostic::Diagnostic;
use bevy::diagnostic::DiagnosticPath;
use bevy::diagnostic::Diagnostics;
use bevy::diagnostic::RegisterDiagnostic;
use bevy::prelude::*;

pub struct SimulationDiagnosticsPlugin {
    max_history_length: usize,
    smoothing_factor: f64,
}

impl Default for SimulationDiagnosticsPlugin {
    fn default() -> Self {
        Self {
            max_history_length: DEFAULT_MAX_HISTORY_LENGTH,
            smoothing_factor: 0.0,
        }
    }
}

impl SimulationDiagnosticsPlugin {
    pub const KINETIC_ENERGY_PATH: DiagnosticPath = DiagnosticPath::const_new("energy/kinetic");
    pub const POTENTIAL_ENERGY_PATH: DiagnosticPath = DiagnosticPath::const_new("energy/potential");
    pub const TOTAL_ENERGY_PATH: DiagnosticPath = DiagnosticPath::const_new("energy/total");
    pub const RELATIVE_DRIFT_PATH: DiagnosticPath =
        DiagnosticPath::const_new("energy/relative_drift");

    const DIAGNOSTIC_PATHS: &'static [DiagnosticPath] = &[
        Self::KINETIC_ENERGY_PATH,
        Self::POTENTIAL_ENERGY_PATH,
        Self::TOTAL_ENERGY_PATH,
        Self::RELATIVE_DRIFT_PATH,
    ];

    fn register_diagnostics(&self, app: &mut App) {
        for path in Self::DIAGNOSTIC_PATHS {
            app.register_diagnostic(
                Diagnostic::new(path.clone())
                    .with_max_history_length(self.max_history_length)
                    .with_smoothing_factor(self.smoothing_factor),
            );
        }
    }

    fn update_energy_diagnostics(
        mut samples: EventReader<EnergySampled>,
        initial: Res<InitialEnergy>,
        mut diagnostics: Diagnostics,
    ) {
        for EnergySampled(sample) in samples.read() {
            diagnostics.add_measurement(&Self::KINETIC_ENERGY_PATH, || sample.kinetic_energy);
            diagnostics.add_measurement(&Self::POTENTIAL_ENERGY_PATH, || sample.potential_energy);
            diagnostics.add_measurement(&Self::TOTAL_ENERGY_PATH, || sample.total_energy);

            if let Some(initial) = **initial {
                diagnostics.add_measurement(&Self::RELATIVE_DRIFT_PATH, || {
                    sample.report().relative_drift_from(&initial)
                });
            }
        }
    }
}

impl Plugin for SimulationDiagnosticsPlugin {
    fn build(&self, app: &mut App) {
        self.register_diagnostics(app);

        app.add_systems(
            FixedUpdate,
            Self::update_energy_diagnostics.after(PhysicsSet::Diagnostics),
        );
    }
}
