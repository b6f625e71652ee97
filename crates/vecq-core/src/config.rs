//! Execution configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default allocation granularity, in elements.
pub const DEFAULT_BIT_SIZE: usize = 1024;

/// Default number of rows per batch produced by readers.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Buffer allocator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorSettings {
    /// Allocation granularity: every backing array is sized to a multiple of this.
    pub bit_size: usize,
}

impl AllocatorSettings {
    pub fn with_bit_size(bit_size: usize) -> Result<Self> {
        if bit_size == 0 {
            return Err(Error::Config("allocator bit size must be positive".into()));
        }
        Ok(Self { bit_size })
    }
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self {
            bit_size: DEFAULT_BIT_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub allocator: AllocatorSettings,

    /// Rows per batch for readers that split their input.
    pub batch_size: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            allocator: AllocatorSettings::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ExecutionConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `VECQ_ALLOCATOR_BIT_SIZE`: allocation granularity in elements
    /// - `VECQ_BATCH_SIZE`: rows per reader batch
    ///
    /// Unparseable or zero values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("VECQ_ALLOCATOR_BIT_SIZE") {
            if let Ok(v) = s.parse::<usize>() {
                if let Ok(settings) = AllocatorSettings::with_bit_size(v) {
                    cfg.allocator = settings;
                }
            }
        }

        if let Ok(s) = std::env::var("VECQ_BATCH_SIZE") {
            if let Ok(v) = s.parse::<usize>() {
                if v > 0 {
                    cfg.batch_size = v;
                }
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.allocator.bit_size == 0 {
            return Err(Error::Config("allocator bit size must be positive".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch size must be positive".into()));
        }
        Ok(())
    }
}
