//! Design-space types: parameter vectors, configuration distributions and
//! search outcomes.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::VfResult;

/// Allowed drift of a distribution's total mass from 1 before it is rescaled.
pub const NORMALIZATION_TOLERANCE: f64 = 1e-9;

/// Masses closer than this are treated as tied when picking the mode.
pub const TIE_TOLERANCE: f64 = 1e-12;

/// Ordered vector of normalized design parameters.
///
/// Entry `i` drives bit `i` of a configuration index. Reading past the end
/// yields `0.0`, which leaves the corresponding bit unrotated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignParameters {
    values: Vec<f64>,
}

impl DesignParameters {
    pub fn new(values: Vec<f64>) -> VfResult<Self> {
        if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(invalid_input!("design parameter {i} must be finite, got {v}"));
        }
        Ok(Self { values })
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    /// Entry `i`, or `0.0` when the vector is shorter than `i + 1`.
    pub fn value(&self, i: usize) -> f64 {
        self.values.get(i).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Deserialized vectors bypass [`DesignParameters::new`]; evaluators call
    /// this before using one.
    pub fn validate(&self) -> VfResult<()> {
        if let Some((i, v)) = self.values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(invalid_input!("design parameter {i} must be finite, got {v}"));
        }
        Ok(())
    }
}

impl TryFrom<Vec<f64>> for DesignParameters {
    type Error = crate::VfError;

    fn try_from(values: Vec<f64>) -> VfResult<Self> {
        Self::new(values)
    }
}

/// Probability mass over the `2^dim` configurations of a search space.
///
/// Masses are non-negative and sum to one within [`NORMALIZATION_TOLERANCE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDistribution")]
pub struct ConfigurationDistribution {
    dim: usize,
    probabilities: Vec<f64>,
}

/// Wire form of a distribution before it is checked and normalized.
#[derive(Deserialize)]
struct RawDistribution {
    dim: usize,
    probabilities: Vec<f64>,
}

impl TryFrom<RawDistribution> for ConfigurationDistribution {
    type Error = crate::VfError;

    fn try_from(raw: RawDistribution) -> VfResult<Self> {
        let distribution = Self::normalize(raw.probabilities)?;
        if distribution.dim != raw.dim {
            return Err(invalid_input!(
                "dim {} does not match {} probabilities",
                raw.dim,
                distribution.len()
            ));
        }
        Ok(distribution)
    }
}

impl ConfigurationDistribution {
    /// Build a distribution from raw (possibly unnormalized) masses.
    ///
    /// A zero total is treated as a degeneracy and replaced by the uniform
    /// distribution.
    pub fn normalize(mut masses: Vec<f64>) -> VfResult<Self> {
        let len = masses.len();
        if len < 2 || !len.is_power_of_two() {
            return Err(invalid_input!(
                "distribution length must be a power of two >= 2, got {len}"
            ));
        }
        if let Some((i, m)) = masses
            .iter()
            .enumerate()
            .find(|(_, m)| !m.is_finite() || **m < 0.0)
        {
            return Err(invalid_input!(
                "configuration {i} has invalid probability mass {m}"
            ));
        }

        let total: f64 = masses.iter().sum();
        if total <= 0.0 {
            warn!(
                configurations = len,
                "distribution has zero total mass, falling back to uniform"
            );
            masses.fill(1.0 / len as f64);
        } else if (total - 1.0).abs() > NORMALIZATION_TOLERANCE {
            for m in &mut masses {
                *m /= total;
            }
        }

        Ok(Self {
            dim: len.trailing_zeros() as usize,
            probabilities: masses,
        })
    }

    pub fn uniform(dim: usize) -> VfResult<Self> {
        if dim == 0 || dim >= usize::BITS as usize {
            return Err(invalid_input!("dim must be in 1..{}, got {dim}", usize::BITS));
        }
        let len = 1usize << dim;
        Self::normalize(vec![1.0 / len as f64; len])
    }

    /// Number of bits per configuration.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn probability(&self, index: usize) -> Option<f64> {
        self.probabilities.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn total(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// Most probable configuration; ties resolve to the lowest index.
    ///
    /// Masses within [`TIE_TOLERANCE`] of the current best count as ties, so
    /// rounding noise from the transforms cannot promote a higher index.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, p) in self.probabilities.iter().enumerate().skip(1) {
            if *p > self.probabilities[best] + TIE_TOLERANCE {
                best = i;
            }
        }
        best
    }
}

/// Output of the amplitude sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerReport {
    pub optimal_index: usize,
    pub distribution: ConfigurationDistribution,
}

/// Output of the stochastic optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    /// Selected configuration index; bit `i` is design choice `i`.
    pub selected_configuration: usize,
    /// The same configuration as a bit string, bit 0 rightmost.
    pub bitstring: String,
    /// How many of the draws landed on the selected configuration.
    pub support_count: usize,
    pub trials: usize,
    /// Empirical frequency `support_count / trials`.
    pub probability: f64,
}

impl OptimizationOutcome {
    /// `trials` is the number of draws actually taken and is never zero.
    pub fn new(selected_configuration: usize, dim: usize, support_count: usize, trials: usize) -> Self {
        Self {
            selected_configuration,
            bitstring: format!("{selected_configuration:0dim$b}"),
            support_count,
            trials,
            probability: support_count as f64 / trials as f64,
        }
    }

    /// Whether design choice `bit` is switched on in the selected configuration.
    pub fn is_enabled(&self, bit: usize) -> bool {
        bit < usize::BITS as usize && (self.selected_configuration >> bit) & 1 == 1
    }
}
