use serde::{Deserialize, Serialize};
use vf_types::{ensure_finite, VfResult};

/// Number of input features a predictor consumes.
pub const FEATURE_COUNT: usize = 5;

/// Descriptors of a candidate semiconductor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialFeatures {
    /// Band gap (eV).
    pub band_gap: f64,
    /// Electron mobility (cm²/V·s).
    pub electron_mobility: f64,
    /// Lattice constant (Å).
    pub lattice_constant: f64,
    /// Temperature (K).
    pub temperature: f64,
    /// Pressure (atm).
    pub pressure: f64,
}

impl MaterialFeatures {
    pub fn new(
        band_gap: f64,
        electron_mobility: f64,
        lattice_constant: f64,
        temperature: f64,
        pressure: f64,
    ) -> Self {
        Self {
            band_gap,
            electron_mobility,
            lattice_constant,
            temperature,
            pressure,
        }
    }

    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.band_gap,
            self.electron_mobility,
            self.lattice_constant,
            self.temperature,
            self.pressure,
        ]
    }

    pub fn validate(&self) -> VfResult<()> {
        ensure_finite("band_gap", self.band_gap)?;
        ensure_finite("electron_mobility", self.electron_mobility)?;
        ensure_finite("lattice_constant", self.lattice_constant)?;
        ensure_finite("temperature", self.temperature)?;
        ensure_finite("pressure", self.pressure)?;
        Ok(())
    }
}

/// Predicted transport properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Electrical conductivity (S/m).
    pub electrical_conductivity: f64,
    /// Thermal conductivity (W/m·K).
    pub thermal_conductivity: f64,
}

impl MaterialProperties {
    pub fn new(electrical_conductivity: f64, thermal_conductivity: f64) -> Self {
        Self {
            electrical_conductivity,
            thermal_conductivity,
        }
    }

    pub(crate) fn to_array(self) -> [f64; 2] {
        [self.electrical_conductivity, self.thermal_conductivity]
    }
}

/// Three reference semiconductors at room conditions, used as a seed
/// training set.
pub fn reference_dataset() -> (Vec<MaterialFeatures>, Vec<MaterialProperties>) {
    let features = vec![
        MaterialFeatures::new(1.1, 1400.0, 5.43, 300.0, 1.0),
        MaterialFeatures::new(0.67, 8500.0, 5.65, 300.0, 1.0),
        MaterialFeatures::new(3.4, 200.0, 3.11, 300.0, 1.0),
    ];
    let properties = vec![
        MaterialProperties::new(4.3, 150.0),
        MaterialProperties::new(0.5, 55.0),
        MaterialProperties::new(0.1, 130.0),
    ];
    (features, properties)
}
