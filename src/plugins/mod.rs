pub mod simulation;
pub mod simulation_diagnostics;
