//! Flat phase-space state for the ODE integrators
//!
//! Layout: every position in particle order, then every velocity in particle
//! order, each vector as consecutive `x, y` components:
//!
//! ```text
//! [x0, y0, x1, y1, ..., vx0, vy0, vx1, vy1, ...]
//! ```

use crate::physics::math::{Scalar, Vector};

/// Scalars per particle in the flat state (2 for position, 2 for velocity)
pub const COMPONENTS_PER_PARTICLE: usize = 4;

/// Number of particles described by a flat state of this length
#[inline]
pub fn particle_count(state_len: usize) -> usize {
    state_len / COMPONENTS_PER_PARTICLE
}

/// Flatten positions and velocities into one state vector
pub fn pack(positions: &[Vector], velocities: &[Vector]) -> Vec<Scalar> {
    debug_assert_eq!(positions.len(), velocities.len());

    let mut state = Vec::with_capacity(positions.len() * COMPONENTS_PER_PARTICLE);
    for v in positions.iter().chain(velocities) {
        state.push(v.x);
        state.push(v.y);
    }
    state
}

/// Split a flat state back into positions and velocities
pub fn unpack(state: &[Scalar]) -> (Vec<Vector>, Vec<Vector>) {
    let (positions, velocities) = split(state);
    (to_vectors(positions).collect(), to_vectors(velocities).collect())
}

/// Split a flat state into its position half and velocity half
#[inline]
pub fn split(state: &[Scalar]) -> (&[Scalar], &[Scalar]) {
    debug_assert_eq!(state.len() % COMPONENTS_PER_PARTICLE, 0);
    state.split_at(state.len() / 2)
}

/// Mutable variant of [`split`]
#[inline]
pub fn split_mut(state: &mut [Scalar]) -> (&mut [Scalar], &mut [Scalar]) {
    debug_assert_eq!(state.len() % COMPONENTS_PER_PARTICLE, 0);
    let half = state.len() / 2;
    state.split_at_mut(half)
}

/// Interpret consecutive `x, y` pairs as vectors
#[inline]
pub fn to_vectors(components: &[Scalar]) -> impl Iterator<Item = Vector> + '_ {
    components
        .chunks_exact(2)
        .map(|pair| Vector::new(pair[0], pair[1]))
}

/// Write vectors as consecutive `x, y` pairs
#[inline]
pub fn write_vectors(components: &mut [Scalar], vectors: impl IntoIterator<Item = Vector>) {
    for (slot, v) in components.chunks_exact_mut(2).zip(vectors) {
        slot[0] = v.x;
        slot[1] = v.y;
    }
}
