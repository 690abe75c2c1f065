//! Domain boundary topologies
//!
//! Exactly one [`BoundaryPolicy`] is active per run. It normalizes committed
//! positions after each step and defines how separations are measured between
//! particles (see [`crate::physics::forces::PairMetric`]).

use crate::physics::math::{self, Scalar, Vector};
use serde::{Deserialize, Serialize};

#[derive(
    Serialize, Deserialize, clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Opposite edges are identified; particles leaving one edge reappear at the other
    #[default]
    Periodic,
    /// Particles bounce off the edges, keeping a radius of clearance
    Reflective,
}

impl BoundaryPolicy {
    /// Displacement from `from` to `to` as seen under this topology
    ///
    /// Under [`BoundaryPolicy::Periodic`] the minimum-image convention applies, so
    /// no component is ever longer than half the domain.
    #[inline]
    pub fn displacement(&self, from: Vector, to: Vector, domain: Vector) -> Vector {
        let displacement = to - from;
        match self {
            BoundaryPolicy::Periodic => math::minimum_image(displacement, domain),
            BoundaryPolicy::Reflective => displacement,
        }
    }

    /// Bring a single particle back inside the domain
    pub fn apply(&self, position: &mut Vector, velocity: &mut Vector, radius: Scalar, domain: Vector) {
        match self {
            BoundaryPolicy::Periodic => *position = math::wrap(*position, domain),
            BoundaryPolicy::Reflective => {
                reflect_axis(&mut position.x, &mut velocity.x, radius, domain.x);
                reflect_axis(&mut position.y, &mut velocity.y, radius, domain.y);
            }
        }
    }

    /// Bring every particle back inside the domain
    pub fn enforce(
        &self,
        positions: &mut [Vector],
        velocities: &mut [Vector],
        radius: Scalar,
        domain: Vector,
    ) {
        for (position, velocity) in positions.iter_mut().zip(velocities.iter_mut()) {
            self.apply(position, velocity, radius, domain);
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoundaryPolicy::Periodic => "periodic",
            BoundaryPolicy::Reflective => "reflective",
        }
    }
}

fn reflect_axis(position: &mut Scalar, velocity: &mut Scalar, radius: Scalar, dimension: Scalar) {
    if *position < radius {
        *position = radius;
        *velocity = -*velocity;
    } else if *position > dimension - radius {
        *position = dimension - radius;
        *velocity = -*velocity;
    }
}
