use tracing::debug;

use super::RankedEngine;
use crate::entry::{EntityId, Rank, Ranked};
use crate::error::{RankError, Result};

/// The combined leaderboard view returned by [`RankedEngine::standings`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Standings {
    /// The best entries, best-first.
    pub top: Vec<Ranked>,
    /// The neighborhood of the requested id, or `None` if that id is not ranked.
    pub around: Option<Vec<Ranked>>,
    /// Number of ranked entries.
    pub total: usize,
}

impl RankedEngine {
    /// Returns the current entry for `id` together with its rank.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_index::{Entry, Rank, RankedEngine, Timestamp};
    ///
    /// let board = RankedEngine::from_entries([
    ///     Entry::new(1, 100, Timestamp(0)),
    ///     Entry::new(2, 100, Timestamp(1)),
    ///     Entry::new(3, 50, Timestamp(0)),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(board.rank_of(2).map(|r| r.rank), Some(Rank(1)));
    /// assert_eq!(board.rank_of(3).map(|r| r.rank), Some(Rank(3)));
    /// assert_eq!(board.rank_of(4), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn rank_of(&self, id: EntityId) -> Option<Ranked> {
        let entry = self.index.get(&id)?;
        let position = self.tree.position_of(entry);
        debug_assert!(position.is_some(), "indexed entry {entry:?} missing from the tree");
        position.map(|position| Ranked::at_position(*entry, position))
    }

    /// Returns the entry holding `rank`, or `None` if the rank is 0 or past the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_index::{Entry, Rank, RankedEngine, Timestamp};
    ///
    /// let board = RankedEngine::from_entries([
    ///     Entry::new(1, 10, Timestamp(0)),
    ///     Entry::new(2, 20, Timestamp(0)),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(board.get_by_rank(Rank(1)).map(|r| r.entry.id), Some(2));
    /// assert_eq!(board.get_by_rank(Rank(3)), None);
    /// assert_eq!(board.get_by_rank(Rank(0)), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get_by_rank(&self, rank: Rank) -> Option<Ranked> {
        let position = rank.position()?;
        self.tree
            .select(position)
            .map(|entry| Ranked::at_position(*entry, position))
    }

    /// Returns up to `n` of the best entries, best-first.
    ///
    /// Asking for more entries than are ranked returns all of them.
    ///
    /// # Complexity
    ///
    /// O(log n + n)
    #[must_use]
    pub fn top_n(&self, n: usize) -> Vec<Ranked> {
        self.iter().take(n).collect()
    }

    /// Returns the entry for `id` with up to `k` neighbors on each side, best-first.
    ///
    /// Near either end of the leaderboard fewer than `k` neighbors exist on that side;
    /// the result is then simply shorter. An empty engine yields an empty result for
    /// any id.
    ///
    /// # Errors
    ///
    /// [`RankError::NotFound`] if the engine is not empty and `id` is not ranked.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_index::{Entry, Rank, RankedEngine, Timestamp};
    ///
    /// let board = RankedEngine::from_entries((1..=10).map(|id| Entry::new(id, -(id as i64), Timestamp(0)))).unwrap();
    ///
    /// let ranks: Vec<Rank> = board.around(5, 2).unwrap().iter().map(|r| r.rank).collect();
    /// assert_eq!(ranks, [Rank(3), Rank(4), Rank(5), Rank(6), Rank(7)]);
    ///
    /// let ranks: Vec<Rank> = board.around(1, 2).unwrap().iter().map(|r| r.rank).collect();
    /// assert_eq!(ranks, [Rank(1), Rank(2), Rank(3)]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n + k)
    pub fn around(&self, id: EntityId, k: usize) -> Result<Vec<Ranked>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let Some(entry) = self.index.get(&id) else {
            debug!(id, "rejected around: id is not ranked");
            return Err(RankError::NotFound(id));
        };
        Ok(self.tree.around(entry, k))
    }

    /// Returns the top `top_n` entries, the neighborhood of `around_id` with up to `k`
    /// entries on each side, and the total count, in one call.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_index::{Entry, RankedEngine, Timestamp};
    ///
    /// let board = RankedEngine::from_entries((1..=20).map(|id| Entry::new(id, id as i64, Timestamp(0)))).unwrap();
    ///
    /// let view = board.standings(3, 10, 1);
    /// assert_eq!(view.total, 20);
    /// assert_eq!(view.top.iter().map(|r| r.entry.id).collect::<Vec<_>>(), [20, 19, 18]);
    /// let around = view.around.unwrap();
    /// assert_eq!(around.iter().map(|r| r.entry.id).collect::<Vec<_>>(), [11, 10, 9]);
    ///
    /// assert_eq!(board.standings(3, 99, 1).around, None);
    /// ```
    #[must_use]
    pub fn standings(&self, top_n: usize, around_id: EntityId, k: usize) -> Standings {
        Standings {
            top: self.top_n(top_n),
            around: self.index.get(&around_id).map(|entry| self.tree.around(entry, k)),
            total: self.len(),
        }
    }
}
