use vf_types::{ConfigurationDistribution, DesignParameters, VfResult};

/// Common trait for evaluators that turn design parameters into a
/// distribution over configurations.
pub trait ConfigurationScorer: Send + Sync {
    /// Probability mass over the `2^dim` configurations for `params`.
    fn distribution(&self, params: &DesignParameters) -> VfResult<ConfigurationDistribution>;

    /// Human-readable scorer name.
    fn name(&self) -> &str;

    /// Most probable configuration, ties resolved to the lowest index.
    fn best_configuration(&self, params: &DesignParameters) -> VfResult<usize> {
        Ok(self.distribution(params)?.argmax())
    }
}
