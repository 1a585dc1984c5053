use crate::engine::RankedEngine;
use crate::entry::{EntityId, Entry, Rank, Ranked};
use crate::error::Result;

/// The capability set shared by every leaderboard strategy.
///
/// [`RankedEngine`] is the production implementation. Simpler strategies, such as a
/// sorted vector, can implement this trait to cross-check results.
///
/// Ranks are 1-based and best-first under the [`Entry`] order.
pub trait RankingList {
    /// Adds an entry for an id that is not yet ranked and returns its rank.
    ///
    /// # Errors
    ///
    /// [`RankError::DuplicateId`](crate::RankError::DuplicateId) if the id is ranked.
    fn add(&mut self, entry: Entry) -> Result<Rank>;

    /// Replaces the entry of a ranked id and returns its new rank.
    ///
    /// # Errors
    ///
    /// [`RankError::NotFound`](crate::RankError::NotFound) if the id is not ranked.
    fn update(&mut self, entry: Entry) -> Result<Rank>;

    /// Removes the entry of `id` and returns it.
    ///
    /// # Errors
    ///
    /// [`RankError::NotFound`](crate::RankError::NotFound) if the id is not ranked.
    fn remove(&mut self, id: EntityId) -> Result<Entry>;

    /// Returns the current entry of `id` with its rank.
    fn rank_of(&self, id: EntityId) -> Option<Ranked>;

    /// Returns up to `n` of the best entries, best-first.
    fn top_n(&self, n: usize) -> Vec<Ranked>;

    /// Returns `id` with up to `k` neighbors on each side, best-first.
    ///
    /// # Errors
    ///
    /// [`RankError::NotFound`](crate::RankError::NotFound) if the list is not empty
    /// and `id` is not ranked.
    fn around(&self, id: EntityId, k: usize) -> Result<Vec<Ranked>>;

    /// Returns the number of ranked entries.
    fn count(&self) -> usize;

    fn contains(&self, id: EntityId) -> bool {
        self.rank_of(id).is_some()
    }

    /// Adds or replaces the entry and returns its rank.
    ///
    /// # Panics
    ///
    /// Panics if the implementation rejects an add right after rejecting the update
    /// for the same id.
    fn upsert(&mut self, entry: Entry) -> Rank {
        match self.update(entry) {
            Ok(rank) => rank,
            Err(_) => match self.add(entry) {
                Ok(rank) => rank,
                Err(error) => panic!("upsert of a missing id failed: {error}"),
            },
        }
    }
}

impl RankingList for RankedEngine {
    fn add(&mut self, entry: Entry) -> Result<Rank> {
        RankedEngine::add(self, entry)
    }

    fn update(&mut self, entry: Entry) -> Result<Rank> {
        RankedEngine::update(self, entry)
    }

    fn remove(&mut self, id: EntityId) -> Result<Entry> {
        RankedEngine::remove(self, id)
    }

    fn rank_of(&self, id: EntityId) -> Option<Ranked> {
        RankedEngine::rank_of(self, id)
    }

    fn top_n(&self, n: usize) -> Vec<Ranked> {
        RankedEngine::top_n(self, n)
    }

    fn around(&self, id: EntityId, k: usize) -> Result<Vec<Ranked>> {
        RankedEngine::around(self, id, k)
    }

    fn count(&self) -> usize {
        self.len()
    }

    fn contains(&self, id: EntityId) -> bool {
        RankedEngine::contains(self, id)
    }

    fn upsert(&mut self, entry: Entry) -> Rank {
        RankedEngine::upsert(self, entry)
    }
}
