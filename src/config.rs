use crate::error::{RankError, Result};

/// Default number of entries a bucket can hold.
pub const DEFAULT_BUCKET_CAPACITY: usize = 256;

/// Smallest accepted bucket capacity; the fill floor must be at least one entry.
pub const MIN_BUCKET_CAPACITY: usize = 4;

/// Tuning for a [`RankedEngine`](crate::RankedEngine).
///
/// # Examples
///
/// ```
/// use ranked_index::{EngineConfig, RankedEngine};
///
/// let config = EngineConfig::default().bucket_capacity(64);
/// assert_eq!(config.initial_fill(), 32);
/// assert_eq!(config.min_fill(), 16);
///
/// let engine = RankedEngine::with_config(config).unwrap();
/// assert!(engine.is_empty());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Maximum entries per bucket. Buckets split when an insert would exceed it.
    pub bucket_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bucket_capacity: DEFAULT_BUCKET_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Sets the bucket capacity.
    #[must_use]
    pub const fn bucket_capacity(mut self, capacity: usize) -> Self {
        self.bucket_capacity = capacity;
        self
    }

    /// Entries per bucket when bulk-loading, leaving headroom for inserts.
    #[must_use]
    pub const fn initial_fill(&self) -> usize {
        self.bucket_capacity / 2
    }

    /// Fill floor. Subtrees smaller than this collapse into one bucket, and leaves
    /// below it are refilled from a neighbor.
    #[must_use]
    pub const fn min_fill(&self) -> usize {
        self.bucket_capacity / 4
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// [`RankError::InvalidCapacity`] when the capacity is below [`MIN_BUCKET_CAPACITY`].
    pub fn validate(&self) -> Result<()> {
        if self.bucket_capacity < MIN_BUCKET_CAPACITY {
            return Err(RankError::InvalidCapacity {
                capacity: self.bucket_capacity,
                min: MIN_BUCKET_CAPACITY,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.bucket_capacity, DEFAULT_BUCKET_CAPACITY);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn tiny_capacity_is_rejected() {
        let config = EngineConfig::default().bucket_capacity(3);
        assert_eq!(config.validate(), Err(RankError::InvalidCapacity { capacity: 3, min: 4 }));
    }

    #[test]
    fn fills_derive_from_capacity() {
        let config = EngineConfig::default().bucket_capacity(4);
        assert_eq!(config.initial_fill(), 2);
        assert_eq!(config.min_fill(), 1);
    }
}
