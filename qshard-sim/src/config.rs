//! Simulator configuration

use qshard_state::{KernelConfig, MemoryModel, Threading};
use serde::{Deserialize, Serialize};

/// Configuration shared by every rank of a distributed state vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Whether shard kernels may use the rayon pool
    ///
    /// Default: `MultiThread`
    pub threading: Threading,

    /// Force a memory model instead of detecting it from the buffer address
    ///
    /// Default: None (detect)
    pub memory_model: Option<MemoryModel>,

    /// Minimum number of local qubits before parallel kernels are preferred
    ///
    /// Shards smaller than this run sequentially to avoid scheduling overhead.
    ///
    /// Default: 14
    pub parallel_threshold: usize,

    /// Seed for measurement and sampling draws
    ///
    /// Only rank 0 draws and broadcasts the outcome, so only rank 0's seed
    /// affects results.
    ///
    /// Default: None (entropy)
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        let kernel = KernelConfig::default();
        Self {
            threading: kernel.threading,
            memory_model: kernel.memory_model,
            parallel_threshold: kernel.parallel_threshold,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration tuned for large shards
    ///
    /// - Multi-threaded kernels
    /// - Lower parallel threshold
    pub fn fast() -> Self {
        Self {
            threading: Threading::MultiThread,
            parallel_threshold: 10,
            ..Default::default()
        }
    }

    /// Create a configuration for debugging
    ///
    /// - Sequential kernels only
    /// - Deterministic seed
    pub fn debug() -> Self {
        Self {
            threading: Threading::SingleThread,
            seed: Some(42),
            ..Default::default()
        }
    }

    /// Set the threading mode
    pub fn with_threading(mut self, threading: Threading) -> Self {
        self.threading = threading;
        self
    }

    /// Force a memory model
    pub fn with_memory_model(mut self, model: MemoryModel) -> Self {
        self.memory_model = Some(model);
        self
    }

    /// Set the parallel threshold in qubits
    pub fn with_parallel_threshold(mut self, qubits: usize) -> Self {
        self.parallel_threshold = qubits;
        self
    }

    /// Set the random seed for deterministic execution
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Kernel selection settings for each shard
    pub fn kernel_config(&self) -> KernelConfig {
        let mut config = KernelConfig::default()
            .with_threading(self.threading)
            .with_parallel_threshold(self.parallel_threshold);
        if let Some(model) = self.memory_model {
            config = config.with_memory_model(model);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulatorConfig::default();
        assert_eq!(config.threading, Threading::MultiThread);
        assert_eq!(config.parallel_threshold, 14);
        assert_eq!(config.memory_model, None);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_presets() {
        assert_eq!(SimulatorConfig::fast().parallel_threshold, 10);

        let debug = SimulatorConfig::debug();
        assert_eq!(debug.threading, Threading::SingleThread);
        assert_eq!(debug.seed, Some(42));
    }

    #[test]
    fn test_builder_pattern() {
        let config = SimulatorConfig::new()
            .with_threading(Threading::SingleThread)
            .with_memory_model(MemoryModel::Unaligned)
            .with_parallel_threshold(20)
            .with_seed(7);

        let kernel = config.kernel_config();
        assert_eq!(kernel.threading, Threading::SingleThread);
        assert_eq!(kernel.memory_model, Some(MemoryModel::Unaligned));
        assert_eq!(kernel.parallel_threshold, 20);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = SimulatorConfig::debug();
        let json = serde_json::to_string(&config).unwrap();
        let back: SimulatorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
