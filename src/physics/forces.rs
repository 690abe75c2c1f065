//! Pairwise gravitational forces
//!
//! Forces are accumulated with a scatter-add over unique pairs: each pair (i, j)
//! with i < j is visited exactly once, its contribution added to particle i and
//! subtracted from particle j. The pair list is built once and reused so that the
//! summation order, and therefore the result, is identical on every call.

use crate::config::SimulationConfig;
use crate::physics::boundary::BoundaryPolicy;
use crate::physics::math::{Scalar, Vector};

/// Separation between two particles as used by force and energy terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    /// Displacement from the first particle to the second
    pub displacement: Vector,
    /// Softened squared distance, never below the softening term
    pub softened_distance_squared: Scalar,
}

/// The one distance rule shared by [`ForceEngine`] and
/// [`crate::physics::energy::EnergyAccountant`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairMetric {
    pub boundary: BoundaryPolicy,
    pub domain: Vector,
    pub softening: Scalar,
}

impl PairMetric {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            boundary: config.physics.boundary,
            domain: config.domain.size(),
            softening: config.physics.softening,
        }
    }

    #[inline]
    pub fn separation(&self, from: Vector, to: Vector) -> Separation {
        let displacement = self.boundary.displacement(from, to, self.domain);
        Separation {
            displacement,
            softened_distance_squared: displacement.length_squared() + self.softening,
        }
    }
}

/// Net gravitational force on every particle
#[derive(Debug, Clone)]
pub struct ForceEngine {
    gravitational_constant: Scalar,
    metric: PairMetric,
    particle_count: usize,
    pairs: Vec<(usize, usize)>,
}

impl ForceEngine {
    pub fn new(gravitational_constant: Scalar, metric: PairMetric, particle_count: usize) -> Self {
        Self {
            gravitational_constant,
            metric,
            particle_count,
            pairs: unique_pairs(particle_count),
        }
    }

    pub fn from_config(config: &SimulationConfig, particle_count: usize) -> Self {
        Self::new(
            config.physics.gravitational_constant,
            PairMetric::from_config(config),
            particle_count,
        )
    }

    pub fn metric(&self) -> &PairMetric {
        &self.metric
    }

    pub fn gravitational_constant(&self) -> Scalar {
        self.gravitational_constant
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// The fixed enumeration order: i ascending, then j ascending with j > i
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Force exerted on particle `i` by particle `j`
    #[inline]
    pub fn pair_force(&self, position_i: Vector, mass_i: Scalar, position_j: Vector, mass_j: Scalar) -> Vector {
        let separation = self.metric.separation(position_i, position_j);
        let magnitude =
            self.gravitational_constant * mass_i * mass_j / separation.softened_distance_squared;
        separation.displacement.normalize_or_zero() * magnitude
    }

    /// Accumulate the net force on each particle into `forces`
    pub fn compute(&self, positions: &[Vector], masses: &[Scalar], forces: &mut [Vector]) {
        debug_assert_eq!(positions.len(), masses.len());
        debug_assert_eq!(positions.len(), forces.len());

        forces.fill(Vector::ZERO);

        for &(i, j) in &self.pairs {
            let force = self.pair_force(positions[i], masses[i], positions[j], masses[j]);
            forces[i] += force;
            forces[j] -= force;
        }
    }

    /// Convert forces to accelerations, `a = F / m`
    ///
    /// Must only be called once [`ForceEngine::compute`] has finished accumulating.
    pub fn accelerations(forces: &[Vector], masses: &[Scalar], accelerations: &mut [Vector]) {
        for ((acceleration, force), mass) in accelerations.iter_mut().zip(forces).zip(masses) {
            *acceleration = *force / *mass;
        }
    }
}

fn unique_pairs(particle_count: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(particle_count * particle_count.saturating_sub(1) / 2);
    for i in 0..particle_count {
        for j in (i + 1)..particle_count {
            pairs.push((i, j));
        }
    }
    pairs
}
