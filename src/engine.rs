use core::fmt;
use std::collections::HashMap;
use std::collections::hash_map;

use tracing::debug;

use crate::entry::{EntityId, Entry, Rank, Ranked};
use crate::error::{InvariantViolation, RankError, Result};
use crate::raw::RawRankTree;

mod construct;
mod iter;
mod order_statistic;

pub use iter::Iter;
pub use order_statistic::Standings;

/// An in-memory leaderboard that answers rank, top-N and neighborhood queries in
/// O(log n).
///
/// Entries live in fixed-capacity sorted buckets at the leaves of a height-balanced
/// binary tree whose internal nodes cache subtree counts and boundary entries. An
/// identity index maps each [`EntityId`] to its current [`Entry`], so updates and
/// removals find the old value without searching the tree.
///
/// Ranks are 1-based and best-first; see [`Entry`] for the order.
///
/// The engine itself is not synchronized. Share it across threads through
/// [`SharedRankedEngine`](crate::SharedRankedEngine) or an equivalent external lock.
///
/// # Examples
///
/// ```
/// use ranked_index::{Entry, Rank, RankedEngine, Timestamp};
///
/// let mut board = RankedEngine::new();
/// board.add(Entry::new(1, 100, Timestamp(0))).unwrap();
/// board.add(Entry::new(2, 100, Timestamp(1))).unwrap();
/// board.add(Entry::new(3, 50, Timestamp(0))).unwrap();
///
/// // Same score: the more recent entry wins.
/// assert_eq!(board.rank_of(2).map(|r| r.rank), Some(Rank(1)));
/// assert_eq!(board.rank_of(1).map(|r| r.rank), Some(Rank(2)));
///
/// let rank = board.update(Entry::new(3, 500, Timestamp(2))).unwrap();
/// assert_eq!(rank, Rank(1));
///
/// let podium: Vec<u64> = board.top_n(2).iter().map(|r| r.entry.id).collect();
/// assert_eq!(podium, [3, 2]);
/// ```
pub struct RankedEngine {
    tree: RawRankTree,
    index: HashMap<EntityId, Entry>,
}

impl RankedEngine {
    // ─── Mutation ───────────────────────────────────────────────────────────────

    /// Adds an entry for an id that is not yet ranked and returns its rank.
    ///
    /// # Errors
    ///
    /// [`RankError::DuplicateId`] if the id is already ranked. The engine is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_index::{Entry, Rank, RankError, RankedEngine, Timestamp};
    ///
    /// let mut board = RankedEngine::new();
    /// assert_eq!(board.add(Entry::new(1, 10, Timestamp(0))), Ok(Rank(1)));
    /// assert_eq!(board.add(Entry::new(2, 20, Timestamp(0))), Ok(Rank(1)));
    /// assert_eq!(board.add(Entry::new(1, 30, Timestamp(0))), Err(RankError::DuplicateId(1)));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n + capacity)
    pub fn add(&mut self, entry: Entry) -> Result<Rank> {
        match self.index.entry(entry.id) {
            hash_map::Entry::Occupied(_) => {
                debug!(id = entry.id, "rejected add: id is already ranked");
                Err(RankError::DuplicateId(entry.id))
            }
            hash_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(Rank::from_position(self.tree.insert(entry)))
            }
        }
    }

    /// Replaces the entry stored for an already ranked id and returns its new rank.
    ///
    /// The old value is removed and the new one inserted, since a score change usually
    /// moves the entry to a different bucket.
    ///
    /// # Errors
    ///
    /// [`RankError::NotFound`] if the id is not ranked. The engine is unchanged. Use
    /// [`upsert`](Self::upsert) to add missing ids instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_index::{Entry, Rank, RankError, RankedEngine, Timestamp};
    ///
    /// let mut board = RankedEngine::new();
    /// board.add(Entry::new(1, 10, Timestamp(0))).unwrap();
    /// board.add(Entry::new(2, 20, Timestamp(0))).unwrap();
    ///
    /// assert_eq!(board.update(Entry::new(1, 30, Timestamp(1))), Ok(Rank(1)));
    /// assert_eq!(board.update(Entry::new(9, 30, Timestamp(1))), Err(RankError::NotFound(9)));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n + capacity)
    pub fn update(&mut self, entry: Entry) -> Result<Rank> {
        let Some(slot) = self.index.get_mut(&entry.id) else {
            debug!(id = entry.id, "rejected update: id is not ranked");
            return Err(RankError::NotFound(entry.id));
        };
        let old = core::mem::replace(slot, entry);
        Ok(Rank::from_position(Self::replace(&mut self.tree, &old, entry)))
    }

    /// Adds the entry if its id is new, otherwise replaces the stored entry. Returns the
    /// resulting rank.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_index::{Entry, Rank, RankedEngine, Timestamp};
    ///
    /// let mut board = RankedEngine::new();
    /// assert_eq!(board.upsert(Entry::new(1, 10, Timestamp(0))), Rank(1));
    /// assert_eq!(board.upsert(Entry::new(2, 5, Timestamp(0))), Rank(2));
    /// assert_eq!(board.upsert(Entry::new(2, 50, Timestamp(1))), Rank(1));
    /// assert_eq!(board.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n + capacity)
    pub fn upsert(&mut self, entry: Entry) -> Rank {
        let position = match self.index.insert(entry.id, entry) {
            Some(old) => Self::replace(&mut self.tree, &old, entry),
            None => self.tree.insert(entry),
        };
        Rank::from_position(position)
    }

    fn replace(tree: &mut RawRankTree, old: &Entry, new: Entry) -> usize {
        if *old == new {
            if let Some(position) = tree.position_of(old) {
                return position;
            }
        }
        let removed = tree.remove(old);
        debug_assert!(removed.is_some(), "indexed entry {old:?} missing from the tree");
        tree.insert(new)
    }

    /// Removes the entry for `id` and returns it.
    ///
    /// # Errors
    ///
    /// [`RankError::NotFound`] if the id is not ranked.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_index::{Entry, RankError, RankedEngine, Timestamp};
    ///
    /// let mut board = RankedEngine::new();
    /// let entry = Entry::new(1, 10, Timestamp(0));
    /// board.add(entry).unwrap();
    ///
    /// assert_eq!(board.remove(1), Ok(entry));
    /// assert_eq!(board.remove(1), Err(RankError::NotFound(1)));
    /// assert!(board.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n + capacity)
    pub fn remove(&mut self, id: EntityId) -> Result<Entry> {
        let Some(entry) = self.index.remove(&id) else {
            debug!(id, "rejected remove: id is not ranked");
            return Err(RankError::NotFound(id));
        };
        let removed = self.tree.remove(&entry);
        debug_assert!(removed.is_some(), "indexed entry {entry:?} missing from the tree");
        Ok(entry)
    }

    /// Removes every entry. The configuration is kept.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.index.clear();
    }

    // ─── Lookup ─────────────────────────────────────────────────────────────────

    /// Returns the current entry for `id`.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entry> {
        self.index.get(&id)
    }

    /// Returns `true` if `id` is ranked.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Returns the number of ranked entries.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Same as [`len`](Self::len).
    #[must_use]
    pub fn count(&self) -> usize {
        self.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a best-first iterator over every entry with its rank.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_index::{Entry, Rank, RankedEngine, Timestamp};
    ///
    /// let board = RankedEngine::from_entries([
    ///     Entry::new(1, 10, Timestamp(0)),
    ///     Entry::new(2, 30, Timestamp(0)),
    ///     Entry::new(3, 20, Timestamp(0)),
    /// ])
    /// .unwrap();
    ///
    /// let order: Vec<(Rank, u64)> = board.iter().map(|r| (r.rank, r.entry.id)).collect();
    /// assert_eq!(order, [(Rank(1), 2), (Rank(2), 3), (Rank(3), 1)]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; amortized O(1) per step.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.tree.root())
    }

    // ─── Validation ─────────────────────────────────────────────────────────────

    /// Audits the whole structure: entry order, cached counts, boundaries and heights,
    /// AVL balance, bucket fill, and agreement between the identity index and the tree.
    ///
    /// A healthy engine always returns `Ok(())`; this exists for tests and for
    /// diagnosing suspected corruption.
    ///
    /// # Errors
    ///
    /// The first [`InvariantViolation`] found.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let entries = self.tree.audit()?;

        if self.index.len() != entries.len() {
            return Err(InvariantViolation::IndexSize {
                indexed: self.index.len(),
                ranked: entries.len(),
            });
        }
        match entries.iter().find(|entry| self.index.get(&entry.id) != Some(entry)) {
            Some(entry) => Err(InvariantViolation::IndexMismatch(entry.id)),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for RankedEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Default for RankedEngine {
    fn default() -> Self {
        RankedEngine::new()
    }
}

impl<'a> IntoIterator for &'a RankedEngine {
    type Item = Ranked;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
