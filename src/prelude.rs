//! Gravwell prelude module
//!
//! Re-exports the most commonly used types across the crate to reduce import
//! boilerplate.

// External crate re-exports
pub use bevy::prelude::*;
pub use rand::Rng;

pub use crate::physics::math::{Scalar, Vector};

// Internal re-exports - Config
pub use crate::config::SimulationConfig;

// Internal re-exports - States
pub use crate::states::AppState;

// Internal re-exports - Resources (most commonly used)
pub use crate::resources::SharedRng;
