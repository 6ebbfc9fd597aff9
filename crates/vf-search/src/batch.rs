//! Parallel evaluation of many parameter vectors.
//!
//! Every job owns its working vectors and, for the optimizer, its own
//! generator seeded from `(base_seed, job index)`. Results therefore match
//! sequential calls regardless of how rayon schedules the jobs.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;
use vf_types::{DesignParameters, OptimizationOutcome, SamplerReport, VfResult};

use crate::optimizer::StochasticOptimizer;
use crate::sampler::AmplitudeSampler;

const SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seed for job `index` of a batch started with `base_seed`.
pub fn job_seed(base_seed: u64, index: usize) -> u64 {
    base_seed ^ (index as u64).wrapping_mul(SEED_STRIDE)
}

pub fn evaluate_batch(
    sampler: &AmplitudeSampler,
    batch: &[DesignParameters],
) -> VfResult<Vec<SamplerReport>> {
    debug!(jobs = batch.len(), "evaluating sampler batch");
    batch.par_iter().map(|params| sampler.evaluate(params)).collect()
}

pub fn optimize_batch(
    optimizer: &StochasticOptimizer,
    batch: &[DesignParameters],
    base_seed: u64,
) -> VfResult<Vec<OptimizationOutcome>> {
    debug!(jobs = batch.len(), base_seed, "optimizing batch");
    batch
        .par_iter()
        .enumerate()
        .map(|(index, params)| {
            let mut rng = ChaCha8Rng::seed_from_u64(job_seed(base_seed, index));
            optimizer.optimize_with_rng(params, &mut rng)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::OptimizerConfig;

    fn batch() -> Vec<DesignParameters> {
        (0..16)
            .map(|i| {
                let x = i as f64 / 16.0;
                DesignParameters::new(vec![x, 1.0 - x, -x, 0.5]).unwrap()
            })
            .collect()
    }

    #[test]
    fn sampler_batch_matches_sequential() {
        let sampler = AmplitudeSampler::default();
        let inputs = batch();
        let parallel = evaluate_batch(&sampler, &inputs).unwrap();
        for (params, report) in inputs.iter().zip(&parallel) {
            assert_eq!(&sampler.evaluate(params).unwrap(), report);
        }
    }

    #[test]
    fn optimizer_batch_matches_sequential() {
        let optimizer = StochasticOptimizer::new(OptimizerConfig::default().with_trials(256));
        let inputs = batch();
        let parallel = optimize_batch(&optimizer, &inputs, 1234).unwrap();
        assert_eq!(parallel.len(), inputs.len());

        for (index, (params, outcome)) in inputs.iter().zip(&parallel).enumerate() {
            let mut rng = ChaCha8Rng::seed_from_u64(job_seed(1234, index));
            let sequential = optimizer.optimize_with_rng(params, &mut rng).unwrap();
            assert_eq!(&sequential, outcome);
        }
    }

    #[test]
    fn batch_propagates_first_error() {
        let optimizer = StochasticOptimizer::new(OptimizerConfig::default().with_trials(0));
        assert!(optimize_batch(&optimizer, &batch(), 1).is_err());
    }

    #[test]
    fn job_seeds_differ() {
        assert_eq!(job_seed(5, 0), 5);
        assert_ne!(job_seed(5, 1), job_seed(5, 2));
    }
}
