use serde::{Deserialize, Serialize};

/// Operating point of a transistor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiasPoint {
    /// Gate-source voltage (V).
    pub gate_voltage: f64,
    /// Drain-source voltage (V).
    pub drain_voltage: f64,
    /// Device temperature (K), must be positive.
    pub temperature: f64,
}

impl BiasPoint {
    pub fn new(gate_voltage: f64, drain_voltage: f64, temperature: f64) -> Self {
        Self {
            gate_voltage,
            drain_voltage,
            temperature,
        }
    }
}

impl Default for BiasPoint {
    fn default() -> Self {
        Self::new(1.2, 1.8, 300.0)
    }
}

/// Result of a transistor evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Drain current (A).
    pub current: f64,
    /// Dissipated power `current * drain_voltage` (W).
    pub power: f64,
    /// Temperature the evaluation was made at (K).
    pub temperature: f64,
}

/// Temperatures sampled at the caller's time points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalTrajectory {
    pub time_points: Vec<f64>,
    pub temperatures: Vec<f64>,
}

impl ThermalTrajectory {
    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }

    pub fn final_temperature(&self) -> Option<f64> {
        self.temperatures.last().copied()
    }

    pub fn peak_temperature(&self) -> Option<f64> {
        self.temperatures.iter().copied().reduce(f64::max)
    }

    /// `(time, temperature)` pairs in time order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time_points
            .iter()
            .copied()
            .zip(self.temperatures.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bias() {
        let bias = BiasPoint::default();
        assert_eq!(bias.gate_voltage, 1.2);
        assert_eq!(bias.drain_voltage, 1.8);
        assert_eq!(bias.temperature, 300.0);
    }

    #[test]
    fn test_trajectory_accessors() {
        let trajectory = ThermalTrajectory {
            time_points: vec![0.0, 1.0, 2.0],
            temperatures: vec![300.0, 300.5, 300.8],
        };
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.final_temperature(), Some(300.8));
        assert_eq!(trajectory.peak_temperature(), Some(300.8));
        let pairs: Vec<_> = trajectory.iter().collect();
        assert_eq!(pairs[1], (1.0, 300.5));
    }

    #[test]
    fn test_result_serializes_as_key_value_document() {
        let result = SimulationResult {
            current: 1e-5,
            power: 1.8e-5,
            temperature: 300.0,
        };
        let value = serde_json::to_value(result).unwrap();
        assert_eq!(value["temperature"], 300.0);
        assert!(value.get("current").is_some());
        assert!(value.get("power").is_some());
    }
}
