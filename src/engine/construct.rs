use std::collections::HashMap;

use tracing::debug;

use super::RankedEngine;
use crate::config::EngineConfig;
use crate::entry::Entry;
use crate::error::{RankError, Result};
use crate::raw::RawRankTree;

impl RankedEngine {
    /// Creates an empty engine with the default bucket capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_index::RankedEngine;
    ///
    /// let board = RankedEngine::new();
    /// assert!(board.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(EngineConfig::default())
    }

    /// Creates an empty engine with the given configuration.
    ///
    /// # Errors
    ///
    /// [`RankError::InvalidCapacity`] if the configuration does not validate.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EngineConfig) -> Self {
        debug!(bucket_capacity = config.bucket_capacity, "created ranked engine");
        RankedEngine {
            tree: RawRankTree::new(config),
            index: HashMap::new(),
        }
    }

    /// Builds an engine from a batch of entries with the default configuration.
    ///
    /// See [`from_entries_with_config`](Self::from_entries_with_config).
    ///
    /// # Errors
    ///
    /// [`RankError::DuplicateId`] if two entries share an id.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Result<Self> {
        Self::from_entries_with_config(EngineConfig::default(), entries)
    }

    /// Builds an engine from a batch of entries.
    ///
    /// The batch is sorted once and packed into half-full buckets under a perfectly
    /// balanced tree, which is much faster than adding the entries one at a time.
    ///
    /// # Errors
    ///
    /// [`RankError::InvalidCapacity`] if the configuration does not validate, or
    /// [`RankError::DuplicateId`] if two entries share an id.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_index::{EngineConfig, Entry, RankError, RankedEngine, Timestamp};
    ///
    /// let config = EngineConfig::default().bucket_capacity(8);
    /// let entries = (0..100).map(|id| Entry::new(id, (id % 7) as i64, Timestamp(id)));
    /// let board = RankedEngine::from_entries_with_config(config, entries).unwrap();
    /// assert_eq!(board.len(), 100);
    ///
    /// let twice = [Entry::new(1, 1, Timestamp(0)), Entry::new(1, 2, Timestamp(0))];
    /// assert_eq!(
    ///     RankedEngine::from_entries_with_config(config, twice).unwrap_err(),
    ///     RankError::DuplicateId(1),
    /// );
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n log n) for the sort; O(n) for the build.
    pub fn from_entries_with_config(config: EngineConfig, entries: impl IntoIterator<Item = Entry>) -> Result<Self> {
        config.validate()?;

        let entries = entries.into_iter();
        let mut index = HashMap::with_capacity(entries.size_hint().0);
        let mut sorted = Vec::with_capacity(entries.size_hint().0);
        for entry in entries {
            if index.insert(entry.id, entry).is_some() {
                debug!(id = entry.id, "rejected bulk load: duplicate id");
                return Err(RankError::DuplicateId(entry.id));
            }
            sorted.push(entry);
        }
        sorted.sort_unstable();

        Ok(RankedEngine {
            tree: RawRankTree::from_sorted(config, &sorted),
            index,
        })
    }

    /// Returns the configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        self.tree.config()
    }
}
