//! Gravwell library
//!
//! A 2D n-body gravity engine: pairwise softened gravity over a periodic or
//! reflective rectangular domain, advanced with adaptive Dormand–Prince
//! integration, with energy accounting and CSV energy logs. The Bevy plugins
//! in [`plugins`] drive it headlessly at a fixed rate.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod physics;
pub mod plugins;
pub mod prelude;
pub mod resources;
pub mod states;

// Test utilities are public for integration tests
pub mod test_utils;
