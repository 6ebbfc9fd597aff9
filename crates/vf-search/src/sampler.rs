//! Interference-based scoring of design configurations.
//!
//! Each parameter `p` becomes an angle `2 * atan(p)`, which sets how much
//! amplitude its bit carries in the "on" state. The per-bit pairs are combined
//! into one amplitude vector, which is then passed through a unitary discrete
//! Fourier transform so that correlated parameters reinforce or cancel each
//! other. Squared magnitudes give the configuration distribution.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vf_types::{ConfigurationDistribution, DesignParameters, SamplerReport, VfResult};

use crate::amplitude::{check_dim, AmplitudeVector};
use crate::scorer::ConfigurationScorer;
use crate::DEFAULT_DIM;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Number of design bits; the distribution covers `2^dim` configurations.
    pub dim: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { dim: DEFAULT_DIM }
    }
}

impl SamplerConfig {
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }
}

/// Deterministic amplitude sampler.
#[derive(Debug, Clone, Default)]
pub struct AmplitudeSampler {
    config: SamplerConfig,
}

impl AmplitudeSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Score `params` with the configured dimension.
    pub fn evaluate(&self, params: &DesignParameters) -> VfResult<SamplerReport> {
        self.evaluate_dim(params, self.config.dim)
    }

    /// Score `params` over `2^dim` configurations. Entries beyond `dim` are
    /// ignored and missing entries count as zero.
    pub fn evaluate_dim(&self, params: &DesignParameters, dim: usize) -> VfResult<SamplerReport> {
        let distribution = self.distribution_dim(params, dim)?;
        let optimal_index = distribution.argmax();

        debug!(
            dim,
            optimal_index,
            probability = distribution.probability(optimal_index).unwrap_or(0.0),
            "amplitude sampler evaluated"
        );

        Ok(SamplerReport {
            optimal_index,
            distribution,
        })
    }

    fn distribution_dim(
        &self,
        params: &DesignParameters,
        dim: usize,
    ) -> VfResult<ConfigurationDistribution> {
        check_dim(dim)?;
        params.validate()?;

        let pairs: Vec<(f64, f64)> = (0..dim)
            .map(|i| {
                // half of 2 * atan(p)
                let (s, c) = params.value(i).atan().sin_cos();
                (c, s)
            })
            .collect();
        let state = AmplitudeVector::product(&pairs)?;

        let len = state.as_slice().len();
        let mut buffer: Vec<Complex<f64>> = state
            .as_slice()
            .iter()
            .map(|&a| Complex::new(a, 0.0))
            .collect();

        // Positive-exponent transform: a'[k] = sum_j a[j] e^{+2 pi i jk/N}.
        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_inverse(len).process(&mut buffer);

        let scale = 1.0 / len as f64;
        ConfigurationDistribution::normalize(buffer.iter().map(|c| c.norm_sqr() * scale).collect())
    }
}

impl ConfigurationScorer for AmplitudeSampler {
    fn distribution(&self, params: &DesignParameters) -> VfResult<ConfigurationDistribution> {
        self.distribution_dim(params, self.config.dim)
    }

    fn name(&self) -> &str {
        "amplitude"
    }
}
