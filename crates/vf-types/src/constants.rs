//! Physical constant sets injected into the evaluators.
//!
//! The sets are plain immutable values: an evaluator copies the set it is
//! built with and never mutates it, so several material profiles can be
//! evaluated side by side from different threads.

use serde::{Deserialize, Serialize};

/// Constants used by the subthreshold transistor model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceConstants {
    /// Boltzmann constant (J/K).
    pub boltzmann: f64,
    /// Elementary charge (C).
    pub electron_charge: f64,
    /// Subthreshold slope factor `n`.
    pub slope_factor: f64,
    /// Threshold voltage `Vt` (V).
    pub threshold_voltage: f64,
    /// Specific current `I_spec` (A).
    pub specific_current: f64,
}

impl Default for DeviceConstants {
    fn default() -> Self {
        Self {
            boltzmann: 1.38e-23,
            electron_charge: 1.6e-19,
            slope_factor: 1.5,
            threshold_voltage: 0.7,
            specific_current: 1e-6,
        }
    }
}

/// Constants of the lumped heating/cooling model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalConstants {
    /// Heating coefficient `alpha` applied to dissipated power.
    pub diffusivity: f64,
    /// Linear cooling coefficient `beta` (1/s).
    pub cooling: f64,
    /// Ambient temperature (K); also the initial condition.
    pub ambient: f64,
}

impl Default for ThermalConstants {
    fn default() -> Self {
        Self {
            diffusivity: 1.5e-4,
            cooling: 0.1,
            ambient: 300.0,
        }
    }
}

impl ThermalConstants {
    /// Temperature the model settles at under constant `power`.
    pub fn steady_state(&self, power: f64) -> f64 {
        self.ambient + self.diffusivity * power / self.cooling
    }
}

/// A named pairing of device and thermal constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProfile {
    pub name: String,
    pub device: DeviceConstants,
    pub thermal: ThermalConstants,
}

impl MaterialProfile {
    pub fn new(name: impl Into<String>, device: DeviceConstants, thermal: ThermalConstants) -> Self {
        Self {
            name: name.into(),
            device,
            thermal,
        }
    }

    pub fn silicon() -> Self {
        Self::new("silicon", DeviceConstants::default(), ThermalConstants::default())
    }
}

impl Default for MaterialProfile {
    fn default() -> Self {
        Self::silicon()
    }
}
