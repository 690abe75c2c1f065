//! Command line interface for Gravwell

use clap::Parser;
use std::path::PathBuf;

use crate::config::SimulationConfig;
use crate::error::ConfigurationError;
use crate::physics::boundary::BoundaryPolicy;
use crate::physics::integrators::IntegratorRegistry;
use crate::physics::math::Scalar;

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Invalid integrator name provided
    #[error("Invalid integrator: {0}")]
    InvalidIntegrator(ConfigurationError),

    /// The resulting configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),

    #[error("Duration must be positive and finite, got {0}")]
    InvalidDuration(Scalar),
}

/// Gravwell - 2D n-body gravity simulation
#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of particles to simulate (overrides config file)
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub particles: Option<usize>,

    /// Particle radius (overrides config file)
    #[arg(short = 'r', long, value_name = "R")]
    pub radius: Option<Scalar>,

    /// Gravitational constant (overrides config file)
    #[arg(short = 'g', long, value_name = "VALUE")]
    pub gravity: Option<Scalar>,

    /// Integrator type (e.g., dormand_prince, rk45, rk4)
    #[arg(short = 'i', long, value_name = "TYPE")]
    pub integrator: Option<String>,

    /// Random seed for particle generation
    #[arg(short = 's', long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Boundary policy at the domain edges
    #[arg(short = 'b', long, value_enum, value_name = "POLICY")]
    pub boundary: Option<BoundaryPolicy>,

    /// Stop after this much simulated time
    #[arg(short = 'd', long, value_name = "SECONDS")]
    pub duration: Option<Scalar>,

    /// Path of the CSV energy log (overrides config file)
    #[arg(long, value_name = "PATH", conflicts_with = "no_energy_log")]
    pub energy_log: Option<PathBuf>,

    /// Disable the CSV energy log
    #[arg(long)]
    pub no_energy_log: bool,

    /// Log frame time diagnostics
    #[arg(long)]
    pub profile: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// List available integrators and exit
    #[arg(long)]
    pub list_integrators: bool,
}

impl Args {
    /// Simulated run length, if one was requested
    pub fn run_duration(&self) -> Result<Option<Scalar>, CliError> {
        match self.duration {
            Some(duration) if !(duration.is_finite() && duration > 0.0) => {
                Err(CliError::InvalidDuration(duration))
            }
            duration => Ok(duration),
        }
    }
}

/// Handles the --list-integrators flag by printing available integrators
pub fn handle_list_integrators() {
    let registry = IntegratorRegistry::default();
    println!("Available integrators:");
    for name in registry.list_available() {
        println!("  - {name}");
    }

    let aliases = registry.list_aliases();
    if !aliases.is_empty() {
        println!("\nAliases:");
        for (alias, target) in aliases {
            println!("  - {alias} -> {target}");
        }
    }
}

/// Loads configuration from file or defaults, then applies command-line overrides
pub fn load_and_apply_config(args: &Args) -> Result<SimulationConfig, CliError> {
    let config = if let Some(config_path) = &args.config {
        println!("Loading configuration from: {}", config_path.display());
        SimulationConfig::load_or_default(config_path)
    } else {
        SimulationConfig::load_from_user_config()
    };

    apply_overrides(config, args)
}

/// Apply command-line overrides to `config` and validate the result
pub fn apply_overrides(mut config: SimulationConfig, args: &Args) -> Result<SimulationConfig, CliError> {
    if let Some(count) = args.particles {
        println!("Overriding particle count to: {count}");
        config.physics.particle_count = count;
    }

    if let Some(radius) = args.radius {
        println!("Overriding particle radius to: {radius}");
        config.physics.particle_radius = radius;
    }

    if let Some(gravity) = args.gravity {
        println!("Overriding gravitational constant to: {gravity}");
        config.physics.gravitational_constant = gravity;
    }

    if let Some(integrator_type) = &args.integrator {
        IntegratorRegistry::default()
            .create(integrator_type)
            .map_err(CliError::InvalidIntegrator)?;

        println!("Using integrator: {integrator_type}");
        config.integrator.integrator_type = integrator_type.clone();
    }

    if let Some(seed) = args.seed {
        println!("Using random seed: {seed}");
        config.physics.initial_seed = Some(seed);
    }

    if let Some(boundary) = args.boundary {
        println!("Using {} boundaries", boundary.name());
        config.physics.boundary = boundary;
    }

    if let Some(path) = &args.energy_log {
        config.diagnostics.energy_log_enabled = true;
        config.diagnostics.energy_log_path = path.clone();
    }

    if args.no_energy_log {
        config.diagnostics.energy_log_enabled = false;
    }

    config.validate()?;
    Ok(config)
}
