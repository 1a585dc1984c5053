use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::EngineConfig;
use crate::engine::{RankedEngine, Standings};
use crate::entry::{EntityId, Entry, Rank, Ranked};
use crate::error::Result;

/// A cloneable, thread-safe handle to one [`RankedEngine`].
///
/// Mutations take the write lock and queries take the read lock, so readers run
/// concurrently with each other but never alongside a writer. Use [`read`](Self::read)
/// or [`write`](Self::write) to run several steps under one lock acquisition.
///
/// # Examples
///
/// ```
/// use std::thread;
/// use ranked_index::{Entry, SharedRankedEngine, Timestamp};
///
/// let board = SharedRankedEngine::new();
/// thread::scope(|s| {
///     for worker in 0..4u64 {
///         let board = board.clone();
///         s.spawn(move || {
///             for i in 0..25 {
///                 let id = worker * 100 + i;
///                 board.add(Entry::new(id, i as i64, Timestamp(id))).unwrap();
///             }
///         });
///     }
/// });
/// assert_eq!(board.count(), 100);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SharedRankedEngine {
    inner: Arc<RwLock<RankedEngine>>,
}

impl SharedRankedEngine {
    /// Creates a handle to an empty engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from(RankedEngine::new())
    }

    /// Creates a handle to an empty engine with the given configuration.
    ///
    /// # Errors
    ///
    /// [`RankError::InvalidCapacity`](crate::RankError::InvalidCapacity) if the
    /// configuration does not validate.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        RankedEngine::with_config(config).map(Self::from)
    }

    /// Runs `f` with shared access to the engine.
    pub fn read<R>(&self, f: impl FnOnce(&RankedEngine) -> R) -> R {
        f(&self.inner.read())
    }

    /// Runs `f` with exclusive access to the engine.
    pub fn write<R>(&self, f: impl FnOnce(&mut RankedEngine) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// See [`RankedEngine::add`].
    ///
    /// # Errors
    ///
    /// [`RankError::DuplicateId`](crate::RankError::DuplicateId) if the id is ranked.
    pub fn add(&self, entry: Entry) -> Result<Rank> {
        self.inner.write().add(entry)
    }

    /// See [`RankedEngine::update`].
    ///
    /// # Errors
    ///
    /// [`RankError::NotFound`](crate::RankError::NotFound) if the id is not ranked.
    pub fn update(&self, entry: Entry) -> Result<Rank> {
        self.inner.write().update(entry)
    }

    pub fn upsert(&self, entry: Entry) -> Rank {
        self.inner.write().upsert(entry)
    }

    /// See [`RankedEngine::remove`].
    ///
    /// # Errors
    ///
    /// [`RankError::NotFound`](crate::RankError::NotFound) if the id is not ranked.
    pub fn remove(&self, id: EntityId) -> Result<Entry> {
        self.inner.write().remove(id)
    }

    #[must_use]
    pub fn rank_of(&self, id: EntityId) -> Option<Ranked> {
        self.inner.read().rank_of(id)
    }

    #[must_use]
    pub fn top_n(&self, n: usize) -> Vec<Ranked> {
        self.inner.read().top_n(n)
    }

    /// See [`RankedEngine::around`].
    ///
    /// # Errors
    ///
    /// [`RankError::NotFound`](crate::RankError::NotFound) if the engine is not empty
    /// and `id` is not ranked.
    pub fn around(&self, id: EntityId, k: usize) -> Result<Vec<Ranked>> {
        self.inner.read().around(id, k)
    }

    #[must_use]
    pub fn standings(&self, top_n: usize, around_id: EntityId, k: usize) -> Standings {
        self.inner.read().standings(top_n, around_id, k)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns the engine if this is the last handle, or the handle back otherwise.
    ///
    /// # Errors
    ///
    /// `Err(self)` while other clones of the handle are alive.
    pub fn try_into_inner(self) -> Result<RankedEngine, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<RankedEngine> for SharedRankedEngine {
    fn from(engine: RankedEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }
}
