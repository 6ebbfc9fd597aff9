//! # vf-search
//!
//! Probabilistic evaluation of the VoltForge design space.
//!
//! Provides a deterministic interference-based sampler, a seeded stochastic
//! optimizer with a tunable mixing policy, and rayon-backed batch helpers.
//! Neither evaluator keeps state between calls; randomness always comes from
//! a generator the caller owns or seeds.

mod amplitude;
mod batch;
mod optimizer;
mod sampler;
mod scorer;

/// Design bits used when the caller does not choose.
pub const DEFAULT_DIM: usize = 4;
/// Largest supported dimension (a `2^20` amplitude vector).
pub const MAX_DIM: usize = 20;

pub use amplitude::AmplitudeVector;
pub use batch::{evaluate_batch, job_seed, optimize_batch};
pub use optimizer::{
    MixingPolicy, OptimizerConfig, StochasticOptimizer, DEFAULT_SEED, DEFAULT_TRIALS,
};
pub use sampler::{AmplitudeSampler, SamplerConfig};
pub use scorer::ConfigurationScorer;
