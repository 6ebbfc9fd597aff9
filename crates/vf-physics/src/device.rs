//! Subthreshold transistor model.
//!
//! Drain current follows the EKV-style interpolation
//! `I = I_spec * ln(1 + exp((Vgs - Vt) / (2 n kT/q)))^2`, which is
//! exponential below threshold and quadratic above it.

use tracing::debug;
use vf_types::{ensure_finite, invalid_input, BiasPoint, DeviceConstants, SimulationResult, VfResult};

/// Temperature used when the caller does not supply one (K).
pub const DEFAULT_TEMPERATURE: f64 = 300.0;

/// Numerically stable `ln(1 + e^x)`.
fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// Stateless transistor evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceModel {
    constants: DeviceConstants,
}

impl DeviceModel {
    pub fn new(constants: DeviceConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &DeviceConstants {
        &self.constants
    }

    /// Thermal voltage `kT/q` at `temperature` kelvin.
    pub fn thermal_voltage(&self, temperature: f64) -> VfResult<f64> {
        ensure_finite("temperature", temperature)?;
        if temperature <= 0.0 {
            return Err(invalid_input!(
                "temperature must be positive kelvin, got {temperature}"
            ));
        }
        Ok(self.constants.boltzmann * temperature / self.constants.electron_charge)
    }

    /// Evaluate drain current and dissipated power at one bias point.
    pub fn simulate(
        &self,
        gate_voltage: f64,
        drain_voltage: f64,
        temperature: f64,
    ) -> VfResult<SimulationResult> {
        ensure_finite("gate_voltage", gate_voltage)?;
        ensure_finite("drain_voltage", drain_voltage)?;
        let vth = self.thermal_voltage(temperature)?;

        let c = &self.constants;
        let overdrive = (gate_voltage - c.threshold_voltage) / (2.0 * c.slope_factor * vth);
        let current = c.specific_current * softplus(overdrive).powi(2);
        let power = current * drain_voltage;

        debug!(gate_voltage, drain_voltage, temperature, current, "transistor evaluated");

        Ok(SimulationResult {
            current,
            power,
            temperature,
        })
    }

    pub fn simulate_bias(&self, bias: &BiasPoint) -> VfResult<SimulationResult> {
        self.simulate(bias.gate_voltage, bias.drain_voltage, bias.temperature)
    }

    /// Transfer curve: one evaluation per gate voltage at fixed drain bias.
    pub fn sweep_gate(
        &self,
        gate_voltages: &[f64],
        drain_voltage: f64,
        temperature: f64,
    ) -> VfResult<Vec<SimulationResult>> {
        gate_voltages
            .iter()
            .map(|&vgs| self.simulate(vgs, drain_voltage, temperature))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_form(vgs: f64, temp: f64) -> f64 {
        let vth = 1.38e-23 * temp / 1.6e-19;
        let x = (vgs - 0.7) / (2.0 * 1.5 * vth);
        1e-6 * (1.0 + x.exp()).ln().powi(2)
    }

    fn assert_sig_digits(actual: f64, expected: f64, digits: i32) {
        let rel = ((actual - expected) / expected).abs();
        assert!(
            rel < 10f64.powi(-digits),
            "actual={actual}, expected={expected}, rel={rel}"
        );
    }

    #[test]
    fn test_nominal_bias_matches_closed_form() {
        let model = DeviceModel::default();
        let result = model.simulate(1.2, 1.8, 300.0).unwrap();
        let expected = closed_form(1.2, 300.0);

        assert_sig_digits(result.current, expected, 6);
        assert_sig_digits(result.power, expected * 1.8, 6);
        assert_eq!(result.temperature, 300.0);
    }

    #[test]
    fn test_power_is_current_times_drain_voltage() {
        let model = DeviceModel::default();
        for &(vgs, vds, temp) in &[
            (0.0, 1.0, 300.0),
            (0.7, 0.5, 250.0),
            (1.5, -1.2, 400.0),
            (-2.0, 3.3, 77.0),
        ] {
            let result = model.simulate(vgs, vds, temp).unwrap();
            assert!(result.current >= 0.0, "negative current at vgs={vgs}");
            assert_eq!(result.power, result.current * vds);
        }
    }

    #[test]
    fn test_subthreshold_current_is_small() {
        let model = DeviceModel::default();
        let off = model.simulate(0.0, 1.8, 300.0).unwrap();
        let on = model.simulate(1.2, 1.8, 300.0).unwrap();
        assert!(off.current < on.current * 1e-6);
    }

    #[test]
    fn test_large_overdrive_does_not_overflow() {
        let model = DeviceModel::default();
        let result = model.simulate(500.0, 1.0, 1.0).unwrap();
        assert!(result.current.is_finite());
        assert!(result.current > 0.0);
    }

    #[test]
    fn test_rejects_non_positive_temperature() {
        let model = DeviceModel::default();
        let err = model.simulate(1.2, 1.8, 0.0).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(model.simulate(1.2, 1.8, -10.0).is_err());
        assert!(model.simulate(f64::NAN, 1.8, 300.0).is_err());
    }

    #[test]
    fn test_thermal_voltage_room_temperature() {
        let model = DeviceModel::default();
        let vth = model.thermal_voltage(300.0).unwrap();
        assert!((vth - 0.025875).abs() < 1e-9);
    }

    #[test]
    fn test_sweep_is_monotonic_in_gate_voltage() {
        let model = DeviceModel::default();
        let gates: Vec<f64> = (0..=12).map(|i| i as f64 * 0.1).collect();
        let curve = model.sweep_gate(&gates, 1.8, 300.0).unwrap();
        assert_eq!(curve.len(), gates.len());
        for pair in curve.windows(2) {
            assert!(pair[1].current >= pair[0].current);
        }
    }

    #[test]
    fn test_custom_constants_shift_threshold() {
        let low_vt = DeviceModel::new(DeviceConstants {
            threshold_voltage: 0.3,
            ..DeviceConstants::default()
        });
        let nominal = DeviceModel::default();
        let a = low_vt.simulate(0.5, 1.0, 300.0).unwrap();
        let b = nominal.simulate(0.5, 1.0, 300.0).unwrap();
        assert!(a.current > b.current);
    }
}
