//! Energy accounting
//!
//! Uses the same [`PairMetric`] as the force engine, so the potential is
//! measured over exactly the separations the forces were derived from.

use crate::physics::forces::{ForceEngine, PairMetric};
use crate::physics::math::{Scalar, Vector};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnergyReport {
    pub kinetic: Scalar,
    pub potential: Scalar,
    pub total: Scalar,
}

impl EnergyReport {
    /// `|E - E0| / |E0|`, or the absolute difference when `E0` is zero
    pub fn relative_drift_from(&self, initial: &EnergyReport) -> Scalar {
        let difference = (self.total - initial.total).abs();
        if initial.total == 0.0 {
            difference
        } else {
            difference / initial.total.abs()
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnergyAccountant {
    gravitational_constant: Scalar,
    metric: PairMetric,
}

impl EnergyAccountant {
    pub fn new(gravitational_constant: Scalar, metric: PairMetric) -> Self {
        Self {
            gravitational_constant,
            metric,
        }
    }

    /// Accountant sharing the force engine's constant and distance rule
    pub fn for_engine(engine: &ForceEngine) -> Self {
        Self::new(engine.gravitational_constant(), *engine.metric())
    }

    pub fn kinetic(&self, masses: &[Scalar], velocities: &[Vector]) -> Scalar {
        0.5 * masses
            .iter()
            .zip(velocities)
            .map(|(m, v)| m * v.length_squared())
            .sum::<Scalar>()
    }

    /// Sum of `-G m_i m_j / r_ij` over the engine's pair order
    pub fn potential(&self, engine: &ForceEngine, masses: &[Scalar], positions: &[Vector]) -> Scalar {
        engine
            .pairs()
            .iter()
            .map(|&(i, j)| {
                let separation = self.metric.separation(positions[i], positions[j]);
                -self.gravitational_constant * masses[i] * masses[j]
                    / libm::sqrt(separation.softened_distance_squared)
            })
            .sum()
    }

    pub fn report(
        &self,
        engine: &ForceEngine,
        masses: &[Scalar],
        positions: &[Vector],
        velocities: &[Vector],
    ) -> EnergyReport {
        let kinetic = self.kinetic(masses, velocities);
        let potential = self.potential(engine, masses, positions);
        EnergyReport {
            kinetic,
            potential,
            total: kinetic + potential,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::boundary::BoundaryPolicy;

    fn metric(boundary: BoundaryPolicy) -> PairMetric {
        PairMetric {
            boundary,
            domain: Vector::new(1280.0, 720.0),
            softening: 1e-4,
        }
    }

    #[test]
    fn test_kinetic_energy() {
        let accountant = EnergyAccountant::new(1e4, metric(BoundaryPolicy::Periodic));
        let kinetic = accountant.kinetic(
            &[2.0, 4.0],
            &[Vector::new(3.0, 4.0), Vector::new(0.0, -1.0)],
        );
        // 0.5 * (2 * 25 + 4 * 1)
        assert_eq!(kinetic, 27.0);
    }

    #[test]
    fn test_potential_energy_two_bodies() {
        let engine = ForceEngine::new(1e4, metric(BoundaryPolicy::Periodic), 2);
        let accountant = EnergyAccountant::for_engine(&engine);
        let potential = accountant.potential(
            &engine,
            &[4.0, 4.0],
            &[Vector::new(100.0, 100.0), Vector::new(200.0, 100.0)],
        );

        let expected = -1e4 * 16.0 / (10_000.0f64 + 1e-4).sqrt();
        assert!((potential - expected).abs() < 1e-12 * expected.abs());
    }

    #[test]
    fn test_potential_uses_minimum_image() {
        let engine = ForceEngine::new(1.0, metric(BoundaryPolicy::Periodic), 2);
        let accountant = EnergyAccountant::for_engine(&engine);
        let positions = [Vector::new(1.0, 360.0), Vector::new(1279.0, 360.0)];

        let potential = accountant.potential(&engine, &[1.0, 1.0], &positions);
        let expected = -1.0 / (4.0f64 + 1e-4).sqrt();
        assert!((potential - expected).abs() < 1e-12);

        let reflective = ForceEngine::new(1.0, metric(BoundaryPolicy::Reflective), 2);
        let far = EnergyAccountant::for_engine(&reflective).potential(
            &reflective,
            &[1.0, 1.0],
            &positions,
        );
        assert!(far > potential, "the long path is weaker");
    }

    #[test]
    fn test_coincident_potential_is_finite() {
        let engine = ForceEngine::new(1e4, metric(BoundaryPolicy::Periodic), 2);
        let accountant = EnergyAccountant::for_engine(&engine);
        let p = Vector::new(5.0, 5.0);
        let potential = accountant.potential(&engine, &[1.0, 1.0], &[p, p]);

        assert!(potential.is_finite());
        assert!((potential + 1e4 / 1e-2).abs() < 1e-6);
    }

    #[test]
    fn test_report_sums_terms() {
        let engine = ForceEngine::new(1e4, metric(BoundaryPolicy::Periodic), 2);
        let accountant = EnergyAccountant::for_engine(&engine);
        let report = accountant.report(
            &engine,
            &[1.0, 3.0],
            &[Vector::new(10.0, 10.0), Vector::new(40.0, 50.0)],
            &[Vector::new(1.0, 0.0), Vector::new(0.0, 2.0)],
        );

        assert_eq!(report.total, report.kinetic + report.potential);
        assert_eq!(report.kinetic, 0.5 * (1.0 + 3.0 * 4.0));
        assert!(report.potential < 0.0);
    }

    #[test]
    fn test_relative_drift() {
        let initial = EnergyReport {
            kinetic: 1.0,
            potential: -3.0,
            total: -2.0,
        };
        let later = EnergyReport {
            kinetic: 1.5,
            potential: -3.49,
            total: -1.99,
        };
        assert!((later.relative_drift_from(&initial) - 0.005).abs() < 1e-12);

        let zero = EnergyReport::default();
        assert_eq!(later.relative_drift_from(&zero), 1.99);
    }
}
