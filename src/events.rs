//! Centralized event definitions

use crate::diagnostics::EnergySample;
use bevy::prelude::*;

/// An energy sample was taken at the configured cadence
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EnergySampled(pub EnergySample);
