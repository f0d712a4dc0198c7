//! Kernel selection configuration

use serde::{Deserialize, Serialize};

/// Threading policy for kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Threading {
    /// Sequential kernels only
    SingleThread,
    /// Allow rayon kernels on large shards
    MultiThread,
}

/// Alignment of the amplitude buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemoryModel {
    Unaligned,
    Aligned256,
    Aligned512,
}

impl MemoryModel {
    /// Best memory model satisfied by an address
    pub fn detect<T>(ptr: *const T) -> Self {
        let addr = ptr as usize;
        if addr % 64 == 0 {
            MemoryModel::Aligned512
        } else if addr % 32 == 0 {
            MemoryModel::Aligned256
        } else {
            MemoryModel::Unaligned
        }
    }
}

/// Inputs to kernel map construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Threading policy
    ///
    /// Default: MultiThread
    pub threading: Threading,

    /// Memory model override; `None` detects it from the buffer
    ///
    /// Default: None
    pub memory_model: Option<MemoryModel>,

    /// Minimum number of shard qubits before rayon kernels are used
    ///
    /// Default: 14
    pub parallel_threshold: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            threading: Threading::MultiThread,
            memory_model: None,
            parallel_threshold: 14,
        }
    }
}

impl KernelConfig {
    /// Sequential kernels only
    pub fn single_threaded() -> Self {
        Self {
            threading: Threading::SingleThread,
            ..Default::default()
        }
    }

    /// Set the threading policy
    pub fn with_threading(mut self, threading: Threading) -> Self {
        self.threading = threading;
        self
    }

    /// Force a memory model instead of detecting it
    pub fn with_memory_model(mut self, model: MemoryModel) -> Self {
        self.memory_model = Some(model);
        self
    }

    /// Set the parallel threshold in qubits
    pub fn with_parallel_threshold(mut self, qubits: usize) -> Self {
        self.parallel_threshold = qubits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(MemoryModel::detect(64 as *const u8), MemoryModel::Aligned512);
        assert_eq!(MemoryModel::detect(96 as *const u8), MemoryModel::Aligned256);
        assert_eq!(MemoryModel::detect(8 as *const u8), MemoryModel::Unaligned);
    }

    #[test]
    fn test_serde_round_trip() {
        let config = KernelConfig::single_threaded().with_memory_model(MemoryModel::Aligned256);
        let json = serde_json::to_string(&config).unwrap();
        let back: KernelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
