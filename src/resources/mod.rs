use crate::physics::energy::EnergyReport;
use crate::physics::simulation::Simulation;
use crate::prelude::*;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

#[derive(Resource, Deref, DerefMut, Debug, Clone, PartialEq)]
pub struct SharedRng(pub ChaCha8Rng);

impl SharedRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::default(),
        }
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self(ChaCha8Rng::from_rng(&mut rand::rng()))
    }
}

/// The running simulation, stepped once per fixed frame
#[derive(Resource, Deref, DerefMut)]
pub struct ActiveSimulation(pub Simulation);

/// Energy measured at the start of the run, the reference for drift diagnostics
#[derive(Resource, Deref, DerefMut, Copy, Clone, Default, PartialEq, Debug)]
pub struct InitialEnergy(pub Option<EnergyReport>);

/// Stop the run once simulated time reaches this value
#[derive(Resource, Deref, DerefMut, Copy, Clone, Default, PartialEq, Debug)]
pub struct RunDuration(pub Option<Scalar>);
