//! # vf-physics
//!
//! Deterministic evaluators for VoltForge: a subthreshold transistor model and
//! a lumped thermal solver. Both are pure functions of their inputs and the
//! constant set they were built with.

pub mod device;
pub mod thermal;

pub use device::{DeviceModel, DEFAULT_TEMPERATURE};
pub use thermal::{uniform_grid, IntegrationMethod, ThermalSolver};

use vf_types::MaterialProfile;

/// Build both evaluators from one material profile.
pub fn evaluators_for(profile: &MaterialProfile) -> (DeviceModel, ThermalSolver) {
    (
        DeviceModel::new(profile.device),
        ThermalSolver::new(profile.thermal),
    )
}
