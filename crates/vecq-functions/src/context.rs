//! Per-execution state passed explicitly to every function call.

use vecq_core::config::ExecutionConfig;
use vecq_mem::BufferAllocator;
use vecq_vector::VectorFactory;

/// One allocator per execution scope, plus the settings it was created from.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    allocator: BufferAllocator,
    config: ExecutionConfig,
}

impl ExecutionContext {
    pub fn new(config: ExecutionConfig) -> Self {
        Self {
            allocator: BufferAllocator::new(config.allocator),
            config,
        }
    }

    /// Context configured from `VECQ_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(ExecutionConfig::from_env())
    }

    pub fn allocator(&self) -> &BufferAllocator {
        &self.allocator
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    pub fn factory(&self) -> VectorFactory {
        VectorFactory::new(self.allocator.clone())
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(ExecutionConfig::default())
    }
}
