//! Material property predictors.
//!
//! The evaluators never depend on a particular predictor; they only need
//! something implementing [`MaterialPredictor`]. [`LinearMaterialPredictor`]
//! is a small ridge regressor over standardized features that can be fitted
//! once and then served from any number of threads.

use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vf_types::{ensure_finite, invalid_input, VfError, VfResult};

use crate::features::{MaterialFeatures, MaterialProperties, FEATURE_COUNT};

const OUTPUTS: usize = 2;
const COEFFICIENTS: usize = FEATURE_COUNT + 1;
/// Smallest LU pivot, relative to the largest, accepted as non-singular.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Maps material descriptors to transport properties.
pub trait MaterialPredictor: Send + Sync {
    fn predict(&self, features: &MaterialFeatures) -> VfResult<MaterialProperties>;

    fn predict_batch(&self, batch: &[MaterialFeatures]) -> VfResult<Vec<MaterialProperties>> {
        batch.iter().map(|f| self.predict(f)).collect()
    }
}

/// Per-feature standardization fitted on training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: [f64; FEATURE_COUNT],
    pub scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    pub fn fit(samples: &[MaterialFeatures]) -> VfResult<Self> {
        if samples.is_empty() {
            return Err(invalid_input!("cannot fit a scaler on zero samples"));
        }
        let n = samples.len() as f64;
        let mut mean = [0.0; FEATURE_COUNT];
        for sample in samples {
            for (m, x) in mean.iter_mut().zip(sample.to_array()) {
                *m += x / n;
            }
        }

        let mut scale = [0.0; FEATURE_COUNT];
        for sample in samples {
            for (j, x) in sample.to_array().into_iter().enumerate() {
                scale[j] += (x - mean[j]).powi(2) / n;
            }
        }
        for s in &mut scale {
            *s = s.sqrt();
            // constant feature
            if *s <= f64::EPSILON {
                *s = 1.0;
            }
        }

        Ok(Self { mean, scale })
    }

    pub fn transform(&self, features: &MaterialFeatures) -> [f64; FEATURE_COUNT] {
        let mut out = features.to_array();
        for (j, x) in out.iter_mut().enumerate() {
            *x = (*x - self.mean[j]) / self.scale[j];
        }
        out
    }
}

/// Ridge regression on standardized features, one linear model per output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearMaterialPredictor {
    scaler: StandardScaler,
    /// `weights[k][0]` is the intercept of output `k`.
    weights: [[f64; COEFFICIENTS]; OUTPUTS],
    ridge: f64,
}

impl LinearMaterialPredictor {
    /// Fit on paired samples. `ridge` penalizes feature weights (never the
    /// intercept) and must be non-negative.
    pub fn fit(
        samples: &[MaterialFeatures],
        targets: &[MaterialProperties],
        ridge: f64,
    ) -> VfResult<Self> {
        ensure_finite("ridge", ridge)?;
        if ridge < 0.0 {
            return Err(invalid_input!("ridge must be non-negative, got {ridge}"));
        }
        if samples.len() != targets.len() {
            return Err(invalid_input!(
                "{} samples but {} targets",
                samples.len(),
                targets.len()
            ));
        }
        for sample in samples {
            sample.validate()?;
        }
        for target in targets {
            ensure_finite("electrical_conductivity", target.electrical_conductivity)?;
            ensure_finite("thermal_conductivity", target.thermal_conductivity)?;
        }

        let scaler = StandardScaler::fit(samples)?;
        let design: Vec<SVector<f64, COEFFICIENTS>> = samples
            .iter()
            .map(|s| {
                let z = scaler.transform(s);
                SVector::<f64, COEFFICIENTS>::from_fn(|i, _| if i == 0 { 1.0 } else { z[i - 1] })
            })
            .collect();

        // Normal equations (X^T X + ridge * I') w = X^T y; the intercept is
        // not penalized.
        let mut gram = SMatrix::<f64, COEFFICIENTS, COEFFICIENTS>::zeros();
        for row in &design {
            gram += row * row.transpose();
        }
        for i in 1..COEFFICIENTS {
            gram[(i, i)] += ridge;
        }

        let lu = gram.lu();
        let pivots = lu.u().diagonal();
        let largest = pivots.amax();
        if let Some(col) = pivots.iter().position(|p| p.abs() <= PIVOT_TOLERANCE * largest) {
            return Err(VfError::degeneracy(format!(
                "normal equations are singular at column {col}; add ridge regularization"
            )));
        }

        let mut weights = [[0.0; COEFFICIENTS]; OUTPUTS];
        for (k, w) in weights.iter_mut().enumerate() {
            let mut rhs = SVector::<f64, COEFFICIENTS>::zeros();
            for (row, target) in design.iter().zip(targets) {
                rhs += row * target.to_array()[k];
            }
            let solution = lu
                .solve(&rhs)
                .ok_or_else(|| VfError::degeneracy("normal equations are singular"))?;
            *w = std::array::from_fn(|i| solution[i]);
        }

        info!(samples = samples.len(), ridge, "fitted linear material predictor");
        Ok(Self {
            scaler,
            weights,
            ridge,
        })
    }

    pub fn ridge(&self) -> f64 {
        self.ridge
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}

impl MaterialPredictor for LinearMaterialPredictor {
    fn predict(&self, features: &MaterialFeatures) -> VfResult<MaterialProperties> {
        features.validate()?;
        let z = self.scaler.transform(features);
        let mut out = [0.0; OUTPUTS];
        for (o, w) in out.iter_mut().zip(&self.weights) {
            let linear = w[0] + w[1..].iter().zip(&z).map(|(a, b)| a * b).sum::<f64>();
            // conductivities are non-negative
            *o = linear.max(0.0);
        }
        debug!(?features, electrical = out[0], thermal = out[1], "material predicted");
        Ok(MaterialProperties::new(out[0], out[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reference_dataset;

    fn synthetic() -> (Vec<MaterialFeatures>, Vec<MaterialProperties>) {
        let features: Vec<MaterialFeatures> = (0..12)
            .map(|k| {
                let k = k as f64;
                MaterialFeatures::new(
                    0.5 + 0.25 * k,
                    1000.0 + 40.0 * k * k,
                    5.0 + k.sin(),
                    280.0 + 10.0 * k.cos(),
                    1.0 + (k * 7.0) % 5.0,
                )
            })
            .collect();
        let targets = features
            .iter()
            .map(|f| {
                MaterialProperties::new(
                    10.0 + 2.0 * f.band_gap + 0.001 * f.electron_mobility - 0.5 * f.lattice_constant,
                    200.0 - 0.1 * f.temperature + 3.0 * f.pressure,
                )
            })
            .collect();
        (features, targets)
    }

    #[test]
    fn recovers_noiseless_linear_relationship() {
        let (features, targets) = synthetic();
        let model = LinearMaterialPredictor::fit(&features, &targets, 0.0).unwrap();

        for (f, t) in features.iter().zip(&targets) {
            let p = model.predict(f).unwrap();
            assert!(
                (p.electrical_conductivity - t.electrical_conductivity).abs() < 1e-6,
                "electrical {} vs {}",
                p.electrical_conductivity,
                t.electrical_conductivity
            );
            assert!((p.thermal_conductivity - t.thermal_conductivity).abs() < 1e-6);
        }
    }

    #[test]
    fn reference_dataset_needs_ridge() {
        let (features, targets) = reference_dataset();
        let err = LinearMaterialPredictor::fit(&features, &targets, 0.0).unwrap_err();
        assert!(matches!(err, VfError::NumericDegeneracy { .. }));

        let model = LinearMaterialPredictor::fit(&features, &targets, 1e-3).unwrap();
        let p = model
            .predict(&MaterialFeatures::new(1.5, 1000.0, 5.0, 300.0, 1.0))
            .unwrap();
        assert!(p.electrical_conductivity >= 0.0);
        assert!(p.thermal_conductivity >= 0.0);
    }

    #[test]
    fn collinear_features_need_ridge() {
        let features: Vec<MaterialFeatures> = (0..8)
            .map(|k| {
                let k = k as f64;
                MaterialFeatures::new(k, 100.0 * k * k, 5.0 + k.sin(), 300.0 + 10.0 * k, 1.0 + k % 3.0)
            })
            .collect();
        let targets: Vec<MaterialProperties> = features
            .iter()
            .map(|f| MaterialProperties::new(1.0 + f.band_gap, 50.0 + f.pressure))
            .collect();

        let err = LinearMaterialPredictor::fit(&features, &targets, 0.0).unwrap_err();
        assert!(matches!(err, VfError::NumericDegeneracy { .. }), "{err}");
        assert!(LinearMaterialPredictor::fit(&features, &targets, 0.1).is_ok());
    }

    #[test]
    fn ridge_fit_stays_close_on_training_points() {
        let (features, targets) = reference_dataset();
        let model = LinearMaterialPredictor::fit(&features, &targets, 1e-6).unwrap();
        for (f, t) in features.iter().zip(&targets) {
            let p = model.predict(f).unwrap();
            assert!((p.thermal_conductivity - t.thermal_conductivity).abs() < 0.1);
        }
    }

    #[test]
    fn scaler_handles_constant_features() {
        let (features, _) = reference_dataset();
        let scaler = StandardScaler::fit(&features).unwrap();
        // temperature and pressure are constant in the reference set
        assert_eq!(scaler.scale[3], 1.0);
        assert_eq!(scaler.scale[4], 1.0);
        let z = scaler.transform(&features[0]);
        assert_eq!(z[3], 0.0);
    }

    #[test]
    fn rejects_bad_training_input() {
        let (features, targets) = reference_dataset();
        assert!(LinearMaterialPredictor::fit(&features[..2], &targets, 1.0).is_err());
        assert!(LinearMaterialPredictor::fit(&[], &[], 1.0).is_err());
        assert!(LinearMaterialPredictor::fit(&features, &targets, -1.0).is_err());

        let mut bad = features.clone();
        bad[0].band_gap = f64::NAN;
        assert!(LinearMaterialPredictor::fit(&bad, &targets, 1.0).is_err());
    }

    #[test]
    fn predictions_are_clamped_non_negative() {
        let (features, targets) = synthetic();
        let model = LinearMaterialPredictor::fit(&features, &targets, 0.0).unwrap();
        let extreme = MaterialFeatures::new(-1000.0, 0.0, 5.0, 300.0, 1.0);
        let p = model.predict(&extreme).unwrap();
        assert_eq!(p.electrical_conductivity, 0.0);
    }

    #[test]
    fn predictor_is_usable_as_trait_object() {
        let (features, targets) = synthetic();
        let model: Box<dyn MaterialPredictor> =
            Box::new(LinearMaterialPredictor::fit(&features, &targets, 0.0).unwrap());
        let out = model.predict_batch(&features[..3]).unwrap();
        assert_eq!(out.len(), 3);
    }
}
