//! Energy sampling and the sinks samples are written to
//!
//! Samples are taken on a fixed cadence in simulated time, plus one at t = 0.
//! Sink failures never reach the physics: the first failure is logged once and
//! further emission is switched off.

use crate::config::DiagnosticsConfig;
use crate::error::DiagnosticSinkError;
use crate::physics::energy::EnergyReport;
use crate::physics::math::Scalar;
use bevy::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// Column order of the energy log
pub const ENERGY_LOG_HEADER: [&str; 4] = [
    "time",
    "kinetic_energy",
    "potential_energy",
    "total_energy",
];

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct EnergySample {
    pub time: Scalar,
    pub kinetic_energy: Scalar,
    pub potential_energy: Scalar,
    pub total_energy: Scalar,
}

impl EnergySample {
    pub fn new(time: Scalar, report: &EnergyReport) -> Self {
        Self {
            time,
            kinetic_energy: report.kinetic,
            potential_energy: report.potential,
            total_energy: report.total,
        }
    }

    pub fn report(&self) -> EnergyReport {
        EnergyReport {
            kinetic: self.kinetic_energy,
            potential: self.potential_energy,
            total: self.total_energy,
        }
    }
}

/// Destination for energy samples
pub trait DiagnosticSink: Send + Sync {
    fn record(&mut self, sample: &EnergySample) -> Result<(), DiagnosticSinkError>;
}

impl DiagnosticSink for Vec<EnergySample> {
    fn record(&mut self, sample: &EnergySample) -> Result<(), DiagnosticSinkError> {
        self.push(*sample);
        Ok(())
    }
}

/// CSV energy log, flushed after every row
pub struct CsvEnergyLog {
    writer: csv::Writer<File>,
}

impl CsvEnergyLog {
    /// Create (or truncate) the log, creating its parent directory and writing the header
    pub fn create(path: impl AsRef<Path>) -> Result<Self, DiagnosticSinkError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        writer.write_record(ENERGY_LOG_HEADER)?;
        writer.flush()?;

        Ok(Self { writer })
    }
}

impl DiagnosticSink for CsvEnergyLog {
    fn record(&mut self, sample: &EnergySample) -> Result<(), DiagnosticSinkError> {
        self.writer.serialize(sample)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Decides when to sample and forwards samples to the sink
#[derive(Resource)]
pub struct EnergyRecorder {
    sink: Option<Box<dyn DiagnosticSink>>,
    interval: Scalar,
    next_sample: Scalar,
    samples_taken: usize,
}

impl EnergyRecorder {
    /// Tolerance on the cadence, as a fraction of the interval
    const CADENCE_SLACK: Scalar = 1e-9;

    pub fn new(sink: Option<Box<dyn DiagnosticSink>>, interval: Scalar) -> Self {
        Self {
            sink,
            interval,
            next_sample: 0.0,
            samples_taken: 0,
        }
    }

    /// Recorder writing to the configured CSV log, or to nothing when logging is off
    ///
    /// Failing to open the log is treated like any other sink failure.
    pub fn from_config(config: &DiagnosticsConfig) -> Self {
        let sink: Option<Box<dyn DiagnosticSink>> = if config.energy_log_enabled {
            match CsvEnergyLog::create(&config.energy_log_path) {
                Ok(log) => {
                    info!("Writing energy log to {}", config.energy_log_path.display());
                    Some(Box::new(log))
                }
                Err(e) => {
                    warn!(
                        "Could not open energy log {}: {}. Energy logging disabled.",
                        config.energy_log_path.display(),
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        Self::new(sink, config.sample_interval())
    }

    /// Whether a sample is due at simulated time `time`
    pub fn is_due(&self, time: Scalar) -> bool {
        time >= self.next_sample - Self::CADENCE_SLACK * self.interval
    }

    /// Take a sample if one is due
    ///
    /// The sample is returned even when the sink has been disabled.
    pub fn observe(&mut self, time: Scalar, report: &EnergyReport) -> Option<EnergySample> {
        if !self.is_due(time) {
            return None;
        }

        // first multiple of the interval strictly after `time`
        let elapsed_intervals = libm::floor(time / self.interval + Self::CADENCE_SLACK);
        self.next_sample = (elapsed_intervals + 1.0) * self.interval;

        let sample = EnergySample::new(time, report);
        self.samples_taken += 1;

        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.record(&sample) {
                warn!("Energy log write failed: {}. Energy logging disabled.", e);
                self.sink = None;
            }
        }

        Some(sample)
    }

    /// Whether samples are still being written to a sink
    pub fn is_emitting(&self) -> bool {
        self.sink.is_some()
    }

    pub fn samples_taken(&self) -> usize {
        self.samples_taken
    }

    pub fn interval(&self) -> Scalar {
        self.interval
    }
}
