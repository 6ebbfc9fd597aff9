//! Lumped thermal response of a die under constant dissipation.
//!
//! The temperature obeys `dT/dt = alpha * P - beta * (T - T_ambient)` and
//! starts at ambient. Being linear, the equation has the exact solution
//! `T(t) = T_ambient + (alpha * P / beta) * (1 - exp(-beta * t))`, which is
//! the default. Runge-Kutta integration of the same equation is available for
//! cross-checking and for callers who want a stepped solution.

use ode_solvers::{Rk4, SVector, System};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vf_types::{
    ensure_finite, invalid_input, ThermalConstants, ThermalTrajectory, VfError, VfResult,
};

type Temperature = SVector<f64, 1>;

/// Relative slack on the RK4 step so rounding in `span / substeps` never
/// adds an extra step past the interval end.
const STEP_SLACK: f64 = 1e-12;

/// Supported solution methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrationMethod {
    /// Exact exponential solution.
    ClosedForm,
    /// Classic fixed-step 4th-order Runge–Kutta with `substeps` uniform steps
    /// between consecutive time points.
    RungeKutta4 { substeps: usize },
}

impl Default for IntegrationMethod {
    fn default() -> Self {
        Self::ClosedForm
    }
}

/// Evenly spaced grid of `count` points from `start` to `end` inclusive.
pub fn uniform_grid(start: f64, end: f64, count: usize) -> VfResult<Vec<f64>> {
    ensure_finite("start", start)?;
    ensure_finite("end", end)?;
    if count < 2 {
        return Err(invalid_input!("a time grid needs at least 2 points, got {count}"));
    }
    if end <= start {
        return Err(invalid_input!("grid end {end} must exceed start {start}"));
    }
    let step = (end - start) / (count - 1) as f64;
    Ok((0..count)
        .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
        .collect())
}

/// Stateless thermal evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThermalSolver {
    constants: ThermalConstants,
    method: IntegrationMethod,
}

impl ThermalSolver {
    pub fn new(constants: ThermalConstants) -> Self {
        Self {
            constants,
            method: IntegrationMethod::default(),
        }
    }

    pub fn with_method(mut self, method: IntegrationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn constants(&self) -> &ThermalConstants {
        &self.constants
    }

    pub fn method(&self) -> IntegrationMethod {
        self.method
    }

    pub fn steady_state(&self, power: f64) -> VfResult<f64> {
        ensure_finite("power", power)?;
        Ok(self.constants.steady_state(power))
    }

    /// Temperature at each of `time_points` under constant `power`.
    ///
    /// `time_points` must start at 0, be strictly increasing and hold at
    /// least two entries.
    pub fn integrate(&self, power: f64, time_points: &[f64]) -> VfResult<ThermalTrajectory> {
        ensure_finite("power", power)?;
        validate_time_points(time_points)?;

        let temperatures = match self.method {
            IntegrationMethod::ClosedForm => self.closed_form(power, time_points),
            IntegrationMethod::RungeKutta4 { substeps } => {
                if substeps == 0 {
                    return Err(invalid_input!("RK4 substeps must be at least 1"));
                }
                self.runge_kutta(power, time_points, substeps)?
            }
        };

        debug!(
            power,
            points = time_points.len(),
            method = ?self.method,
            final_temperature = temperatures.last().copied().unwrap_or(self.constants.ambient),
            "thermal trajectory computed"
        );

        Ok(ThermalTrajectory {
            time_points: time_points.to_vec(),
            temperatures,
        })
    }

    fn closed_form(&self, power: f64, time_points: &[f64]) -> Vec<f64> {
        let c = &self.constants;
        let rise = c.diffusivity * power / c.cooling;
        time_points
            .iter()
            .map(|&t| c.ambient + rise * -(-c.cooling * t).exp_m1())
            .collect()
    }

    fn runge_kutta(
        &self,
        power: f64,
        time_points: &[f64],
        substeps: usize,
    ) -> VfResult<Vec<f64>> {
        let mut temperature = self.constants.ambient;
        let mut temperatures = Vec::with_capacity(time_points.len());
        temperatures.push(temperature);

        for window in time_points.windows(2) {
            let (start, end) = (window[0], window[1]);
            let step = (end - start) / substeps as f64 * (1.0 + STEP_SLACK);
            let system = HeatBalance {
                constants: self.constants,
                power,
            };

            let mut stepper = Rk4::new(system, start, Temperature::new(temperature), end, step);
            stepper
                .integrate()
                .map_err(|e| VfError::degeneracy(format!("RK4 integration failed: {e:?}")))?;
            temperature = stepper
                .y_out()
                .last()
                .map(|y| y[0])
                .ok_or_else(|| VfError::degeneracy("RK4 produced no output"))?;
            temperatures.push(temperature);
        }

        Ok(temperatures)
    }
}

/// `dT/dt = alpha * P - beta * (T - T_ambient)` as an ODE system.
struct HeatBalance {
    constants: ThermalConstants,
    power: f64,
}

impl System<f64, Temperature> for HeatBalance {
    fn system(&self, _t: f64, y: &Temperature, dy: &mut Temperature) {
        let c = &self.constants;
        dy[0] = c.diffusivity * self.power - c.cooling * (y[0] - c.ambient);
    }
}

fn validate_time_points(time_points: &[f64]) -> VfResult<()> {
    if time_points.len() < 2 {
        return Err(invalid_input!(
            "time_points needs at least 2 entries, got {}",
            time_points.len()
        ));
    }
    if let Some(t) = time_points.iter().find(|t| !t.is_finite()) {
        return Err(invalid_input!("time point {t} is not finite"));
    }
    if time_points[0] != 0.0 {
        return Err(invalid_input!(
            "time_points must start at 0, got {}",
            time_points[0]
        ));
    }
    if let Some(i) = time_points.windows(2).position(|w| w[1] <= w[0]) {
        return Err(invalid_input!(
            "time_points must be strictly increasing (index {} -> {})",
            i,
            i + 1
        ));
    }
    Ok(())
}
