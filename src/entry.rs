use core::cmp::Ordering;
use core::fmt;

/// Identifier of one ranked entity.
pub type EntityId = u64;

/// Numeric score. Higher scores rank better.
pub type Score = i64;

/// Opaque, totally ordered recency stamp. More recent (larger) stamps win score ties.
///
/// The engine never interprets the value; callers typically store milliseconds since
/// an epoch or a monotonically increasing sequence number.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub u64);

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// One ranked identity.
///
/// Entries are values: an update replaces the entry stored for an id, it never mutates
/// one in place.
///
/// # Ordering
///
/// An entry that compares *less* ranks *better*:
///
/// 1. higher `score` first,
/// 2. then more recent `last_active` first,
/// 3. then lower `id` first.
///
/// The final `id` key makes the order total, so two entities with the same score and
/// the same activity stamp still receive deterministic, insertion-order independent ranks.
///
/// # Examples
///
/// ```
/// use ranked_index::{Entry, Timestamp};
///
/// let veteran = Entry::new(1, 100, Timestamp(10));
/// let rookie = Entry::new(2, 100, Timestamp(20));
/// let leader = Entry::new(3, 250, Timestamp(0));
///
/// assert!(leader < rookie);
/// assert!(rookie < veteran);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    pub id: EntityId,
    pub score: Score,
    pub last_active: Timestamp,
}

impl Entry {
    /// Creates an entry.
    #[must_use]
    pub const fn new(id: EntityId, score: Score, last_active: Timestamp) -> Self {
        Self { id, score, last_active }
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| other.last_active.cmp(&self.last_active))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A 1-based position in the best-first order of an engine.
///
/// `Rank(1)` is the best entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rank(pub usize);

impl Rank {
    /// The best rank.
    pub const FIRST: Self = Self(1);

    /// Converts a 0-based position into a rank.
    #[inline]
    #[must_use]
    pub const fn from_position(position: usize) -> Self {
        Self(position + 1)
    }

    /// Returns the 0-based position, or `None` for the invalid rank 0.
    #[inline]
    #[must_use]
    pub const fn position(self) -> Option<usize> {
        self.0.checked_sub(1)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An entry together with its rank at the time of the query.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ranked {
    pub entry: Entry,
    pub rank: Rank,
}

impl Ranked {
    #[inline]
    pub(crate) const fn at_position(entry: Entry, position: usize) -> Self {
        Self {
            entry,
            rank: Rank::from_position(position),
        }
    }
}
