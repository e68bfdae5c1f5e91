//! Chunked deque configuration parameters.

use crate::error::ConfigError;

/// Configuration for a chunked deque's block layout.
///
/// The block byte budget bounds how much memory one block occupies. The
/// number of elements per block is derived from it and the element size
/// at the point of use, see [`DequeConfig::block_capacity`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DequeConfig {
    /// Byte budget of a single block.
    ///
    /// Default: 512. Must be non-zero.
    pub block_bytes: usize,
}

impl DequeConfig {
    /// Default per-block byte budget.
    pub const DEFAULT_BLOCK_BYTES: usize = 512;

    /// Create a config with the given per-block byte budget.
    pub fn new(block_bytes: usize) -> Self {
        Self { block_bytes }
    }

    /// Check that the config can produce a usable block layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_bytes == 0 {
            return Err(ConfigError::ZeroBlockBytes);
        }
        Ok(())
    }

    /// Number of `T` slots per block.
    ///
    /// `max(1, block_bytes / size_of::<T>())`: elements larger than the
    /// budget still get one slot. Zero-sized types get `block_bytes` slots.
    pub fn block_capacity<T>(&self) -> usize {
        let elem = std::mem::size_of::<T>();
        if elem == 0 {
            return self.block_bytes.max(1);
        }
        (self.block_bytes / elem).max(1)
    }
}

impl Default for DequeConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BLOCK_BYTES)
    }
}
