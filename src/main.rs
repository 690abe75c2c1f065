use anyhow::Result;
use bevy::app::ScheduleRunnerPlugin;
use bevy::diagnostic::{DiagnosticsPlugin, FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use clap::Parser;
use gravwell::cli::{self, Args};
use gravwell::plugins::simulation::SimulationPlugin;
use gravwell::plugins::simulation_diagnostics::SimulationDiagnosticsPlugin;
use gravwell::resources::RunDuration;
use std::time::Duration;

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_integrators {
        cli::handle_list_integrators();
        return Ok(());
    }

    let run_duration = args.run_duration()?;

    let mut app = App::new();

    // installed before the configuration is read so load warnings are emitted
    app.add_plugins(LogPlugin {
        level: if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        },
        ..default()
    });

    let config = cli::load_and_apply_config(&args)?;

    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            config.timing.frame_time(),
        ))),
        StatesPlugin,
        DiagnosticsPlugin,
    ));

    info!(
        "gravwell {} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_DATE")
    );

    if args.profile {
        app.add_plugins((
            FrameTimeDiagnosticsPlugin::default(),
            LogDiagnosticsPlugin::default(),
        ));
    }

    app.insert_resource(config);
    app.insert_resource(RunDuration(run_duration));
    app.add_plugins((SimulationPlugin, SimulationDiagnosticsPlugin::default()));

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("simulation halted (exit code {code})"),
    }
}
