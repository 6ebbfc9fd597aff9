//! Biased stochastic selection of design configurations.
//!
//! The optimizer prepares an amplitude vector in four steps: entangle the
//! all-off and all-on configurations, rotate every bit by `pi * p_i`, run a
//! mark-and-invert pass between two layers of Hadamards, then square. It then
//! draws `trials` samples from the result and keeps the configuration that
//! came up most often.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;
use vf_types::{
    invalid_input, ConfigurationDistribution, DesignParameters, OptimizationOutcome, VfError,
    VfResult,
};

use crate::amplitude::{check_dim, AmplitudeVector};
use crate::scorer::ConfigurationScorer;
use crate::DEFAULT_DIM;

pub const DEFAULT_TRIALS: usize = 1024;
pub const DEFAULT_SEED: u64 = 42;

/// Which configurations the mixing pass marks for inversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MixingPolicy {
    /// Mark configurations with both the first and the last design bit set.
    Endpoints,
    /// Mark configurations in which every bit of at least one group is set.
    Groups(Vec<Vec<usize>>),
    /// Mark nothing; the mixing pass reduces to the identity.
    Disabled,
}

impl Default for MixingPolicy {
    fn default() -> Self {
        Self::Endpoints
    }
}

impl MixingPolicy {
    /// Bit masks for `dim` design bits. A configuration is marked when it
    /// contains all bits of any mask.
    pub fn masks(&self, dim: usize) -> VfResult<Vec<usize>> {
        check_dim(dim)?;
        match self {
            MixingPolicy::Endpoints => Ok(vec![1 | (1 << (dim - 1))]),
            MixingPolicy::Disabled => Ok(Vec::new()),
            MixingPolicy::Groups(groups) => groups
                .iter()
                .map(|group| {
                    if group.is_empty() {
                        return Err(invalid_input!("mixing groups must not be empty"));
                    }
                    group.iter().try_fold(0usize, |mask, &bit| {
                        if bit >= dim {
                            Err(invalid_input!(
                                "mixing bit {bit} out of range for dim {dim}"
                            ))
                        } else {
                            Ok(mask | (1 << bit))
                        }
                    })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub dim: usize,
    /// Number of independent draws.
    pub trials: usize,
    /// Seed for [`StochasticOptimizer::optimize`]; ignored when the caller
    /// supplies its own generator.
    pub seed: u64,
    pub policy: MixingPolicy,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            trials: DEFAULT_TRIALS,
            seed: DEFAULT_SEED,
            policy: MixingPolicy::default(),
        }
    }
}

impl OptimizerConfig {
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_policy(mut self, policy: MixingPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Stochastic configuration optimizer. Holds no generator of its own.
#[derive(Debug, Clone, Default)]
pub struct StochasticOptimizer {
    config: OptimizerConfig,
}

impl StochasticOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Optimize with a ChaCha8 generator seeded from the configured seed.
    pub fn optimize(&self, params: &DesignParameters) -> VfResult<OptimizationOutcome> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.optimize_with_rng(params, &mut rng)
    }

    /// Optimize drawing from the caller's generator.
    pub fn optimize_with_rng<R: Rng + ?Sized>(
        &self,
        params: &DesignParameters,
        rng: &mut R,
    ) -> VfResult<OptimizationOutcome> {
        let trials = self.config.trials;
        if trials < 1 {
            return Err(invalid_input!("trials must be at least 1, got {trials}"));
        }
        let distribution = self.biased_distribution(params)?;

        let sampler: WeightedIndex<f64> = WeightedIndex::new(distribution.as_slice().iter().copied())
            .map_err(|e| VfError::degeneracy(format!("cannot sample distribution: {e}")))?;
        let mut counts = vec![0usize; distribution.len()];
        for _ in 0..trials {
            counts[sampler.sample(rng)] += 1;
        }

        let mut selected = 0;
        for (index, &count) in counts.iter().enumerate().skip(1) {
            if count > counts[selected] {
                selected = index;
            }
        }

        debug!(
            dim = self.config.dim,
            trials,
            selected,
            support = counts[selected],
            "stochastic optimizer selected configuration"
        );

        Ok(OptimizationOutcome::new(
            selected,
            self.config.dim,
            counts[selected],
            trials,
        ))
    }

    fn biased_distribution(&self, params: &DesignParameters) -> VfResult<ConfigurationDistribution> {
        let dim = self.config.dim;
        params.validate()?;
        let masks = self.config.policy.masks(dim)?;

        let mut state = AmplitudeVector::ground(dim)?;
        state.hadamard(0);
        for bit in 1..dim {
            state.controlled_not(0, bit);
        }

        for bit in 0..dim {
            state.rotate(bit, PI * params.value(bit));
        }

        state.hadamard_all();
        state.invert_marked(|index| masks.iter().any(|&mask| index & mask == mask));
        state.hadamard_all();

        state.into_distribution()
    }
}

impl ConfigurationScorer for StochasticOptimizer {
    fn distribution(&self, params: &DesignParameters) -> VfResult<ConfigurationDistribution> {
        self.biased_distribution(params)
    }

    fn name(&self) -> &str {
        "stochastic"
    }
}
