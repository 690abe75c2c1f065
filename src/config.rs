//! Simulation configuration
//!
//! A single immutable [`SimulationConfig`] value carries every physical and
//! numerical parameter. It is handed to each component at construction.

use crate::error::ConfigurationError;
use crate::physics::boundary::BoundaryPolicy;
use crate::physics::math::{Scalar, Vector};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment variable overrides, e.g. `GRAVWELL__PHYSICS__PARTICLE_COUNT=50`
pub const ENVIRONMENT_PREFIX: &str = "GRAVWELL";

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
    pub domain: DomainConfig,
    pub integrator: IntegratorConfig,
    pub diagnostics: DiagnosticsConfig,
    pub timing: TimingConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravitational_constant: Scalar,
    /// Added to the squared pair separation, never to the separation itself
    pub softening: Scalar,
    pub particle_count: usize,
    pub particle_radius: Scalar,
    pub min_mass: Scalar,
    pub max_mass: Scalar,
    /// Initial velocity components are drawn from `[-max_initial_speed, max_initial_speed]`
    pub max_initial_speed: Scalar,
    pub boundary: BoundaryPolicy,
    pub initial_seed: Option<u64>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: 1e4,
            softening: 1e-4,
            particle_count: 500,
            particle_radius: 10.0,
            min_mass: 1.0,
            max_mass: 10.0,
            max_initial_speed: 150.0,
            boundary: BoundaryPolicy::default(),
            initial_seed: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct DomainConfig {
    pub width: Scalar,
    pub height: Scalar,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl DomainConfig {
    pub fn size(&self) -> Vector {
        Vector::new(self.width, self.height)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct IntegratorConfig {
    pub integrator_type: String,
    pub relative_tolerance: Scalar,
    pub absolute_tolerance: Scalar,
    /// Smallest internal step, as a fraction of the requested interval
    pub min_step_fraction: Scalar,
    pub max_steps: usize,
    /// Substeps per frame for fixed-step integrators
    pub fixed_substeps: usize,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            integrator_type: "dormand_prince".to_string(),
            relative_tolerance: 1e-6,
            absolute_tolerance: 1e-9,
            min_step_fraction: 1e-12,
            max_steps: 100_000,
            fixed_substeps: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub energy_log_enabled: bool,
    pub energy_log_path: PathBuf,
    /// Energy samples per simulated second
    pub samples_per_second: Scalar,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            energy_log_enabled: true,
            energy_log_path: PathBuf::from("logs/energy_log.csv"),
            samples_per_second: 10.0,
        }
    }
}

impl DiagnosticsConfig {
    pub fn sample_interval(&self) -> Scalar {
        1.0 / self.samples_per_second
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub frame_rate: Scalar,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { frame_rate: 60.0 }
    }
}

impl TimingConfig {
    pub fn frame_time(&self) -> Scalar {
        1.0 / self.frame_rate
    }
}

fn positive(name: &'static str, value: Scalar) -> Result<(), ConfigurationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: Scalar) -> Result<(), ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::Negative { name, value })
    }
}

impl SimulationConfig {
    /// Check every parameter, failing on the first invalid one
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let physics = &self.physics;

        if physics.particle_count < 1 {
            return Err(ConfigurationError::InvalidParticleCount(
                physics.particle_count,
            ));
        }
        if !(physics.particle_radius.is_finite() && physics.particle_radius > 0.0) {
            return Err(ConfigurationError::InvalidRadius(physics.particle_radius));
        }

        positive("gravitational constant", physics.gravitational_constant)?;
        positive("softening", physics.softening)?;
        positive("minimum mass", physics.min_mass)?;
        positive("maximum mass", physics.max_mass)?;
        if physics.min_mass > physics.max_mass {
            return Err(ConfigurationError::MalformedRange {
                name: "mass",
                min: physics.min_mass,
                max: physics.max_mass,
            });
        }
        non_negative("maximum initial speed", physics.max_initial_speed)?;

        positive("domain width", self.domain.width)?;
        positive("domain height", self.domain.height)?;
        let r = physics.particle_radius;
        if 2.0 * r > self.domain.width || 2.0 * r > self.domain.height {
            return Err(ConfigurationError::PlacementAreaEmpty {
                radius: r,
                width: self.domain.width,
                height: self.domain.height,
            });
        }

        positive("relative tolerance", self.integrator.relative_tolerance)?;
        positive("absolute tolerance", self.integrator.absolute_tolerance)?;
        positive("minimum step fraction", self.integrator.min_step_fraction)?;
        if self.integrator.max_steps == 0 {
            return Err(ConfigurationError::NonPositive {
                name: "maximum integrator steps",
                value: 0.0,
            });
        }
        if self.integrator.fixed_substeps == 0 {
            return Err(ConfigurationError::NonPositive {
                name: "fixed substeps",
                value: 0.0,
            });
        }

        positive("energy samples per second", self.diagnostics.samples_per_second)?;
        positive("frame rate", self.timing.frame_rate)?;

        Ok(())
    }

    /// Read a TOML configuration file
    ///
    /// A missing file is `Ok(None)`; an unreadable or unparsable one is an error.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigurationError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ConfigurationError::Load(format!(
                    "could not read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        toml::from_str(&content).map(Some).map_err(|e| {
            ConfigurationError::Load(format!("could not parse {}: {}", path.display(), e))
        })
    }

    /// Load configuration from a file, falling back to defaults if it is missing or malformed
    ///
    /// Logging must already be initialized for the fallback warning to be seen.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_file(path) {
            Ok(Some(config)) => config,
            Ok(None) => {
                info!("Config file {} not found. Using defaults.", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Location of the per-user configuration file, if the platform has one
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "gravwell")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Layer defaults, the per-user config file, and environment overrides
    pub fn load_layered(user_file: Option<&Path>) -> Result<Self, ConfigurationError> {
        let load_error = |e: config::ConfigError| ConfigurationError::Load(e.to_string());

        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default()).map_err(load_error)?);

        if let Some(path) = user_file {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENVIRONMENT_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(load_error)?
            .try_deserialize()
            .map_err(load_error)
    }

    /// Load the per-user configuration, falling back to defaults on failure
    pub fn load_from_user_config() -> Self {
        let path = Self::user_config_path();
        match Self::load_layered(path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_constants() {
        let config = SimulationConfig::default();
        assert_eq!(config.physics.gravitational_constant, 10_000.0);
        assert_eq!(config.physics.softening, 1e-4);
        assert_eq!(config.physics.particle_count, 500);
        assert_eq!(config.domain.size(), Vector::new(1280.0, 720.0));
        assert_eq!(config.physics.boundary, BoundaryPolicy::Periodic);
        assert!((config.diagnostics.sample_interval() - 0.1).abs() < 1e-15);
    }

    #[test]
    fn test_rejects_zero_particles() {
        let mut config = SimulationConfig::default();
        config.physics.particle_count = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::InvalidParticleCount(0))
        );
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        for radius in [0.0, -1.0, Scalar::NAN] {
            let mut config = SimulationConfig::default();
            config.physics.particle_radius = radius;
            assert!(matches!(
                config.validate(),
                Err(ConfigurationError::InvalidRadius(_))
            ));
        }
    }

    #[test]
    fn test_rejects_inverted_mass_range() {
        let mut config = SimulationConfig::default();
        config.physics.min_mass = 10.0;
        config.physics.max_mass = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MalformedRange { name: "mass", .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_mass() {
        let mut config = SimulationConfig::default();
        config.physics.min_mass = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::NonPositive { .. })
        ));
    }

    #[test]
    fn test_rejects_radius_larger_than_domain() {
        let mut config = SimulationConfig::default();
        config.physics.particle_radius = 400.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::PlacementAreaEmpty { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_tolerances() {
        let mut config = SimulationConfig::default();
        config.integrator.relative_tolerance = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.integrator.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_speed() {
        let mut config = SimulationConfig::default();
        config.physics.max_initial_speed = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::Negative { .. })
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = SimulationConfig::default();
        config.physics.particle_count = 3;
        config.physics.boundary = BoundaryPolicy::Reflective;
        config.physics.initial_seed = Some(42);

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: SimulationConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: SimulationConfig = toml::from_str(
            r#"
            [physics]
            particle_count = 12
            boundary = "reflective"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.physics.particle_count, 12);
        assert_eq!(parsed.physics.boundary, BoundaryPolicy::Reflective);
        assert_eq!(parsed.domain, DomainConfig::default());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = SimulationConfig::load_or_default("/nonexistent/gravwell.toml");
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[physics\nparticle_count = \"oops\"").unwrap();

        let Err(ConfigurationError::Load(message)) = SimulationConfig::load_file(&path) else {
            panic!("expected a load error for a malformed file");
        };
        assert!(message.contains("bad.toml"), "{message}");

        assert_eq!(SimulationConfig::load_or_default(&path), SimulationConfig::default());
    }

    #[test]
    fn test_load_file_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(SimulationConfig::load_file(dir.path().join("absent.toml")), Ok(None));
    }

    #[test]
    fn test_save_and_load_layered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = SimulationConfig::default();
        config.physics.particle_count = 7;
        config.timing.frame_rate = 30.0;
        config.save(&path).unwrap();

        let loaded = SimulationConfig::load_layered(Some(path.as_path())).unwrap();
        assert_eq!(loaded.physics.particle_count, 7);
        assert_eq!(loaded.timing.frame_rate, 30.0);
    }

    #[test]
    fn test_load_layered_without_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let loaded = SimulationConfig::load_layered(Some(missing.as_path())).unwrap();
        assert_eq!(loaded.physics, PhysicsConfig::default());
    }
}
