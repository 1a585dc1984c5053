use thiserror::Error;

use crate::entry::{EntityId, Entry};

/// Result alias for fallible engine operations.
pub type Result<T, E = RankError> = core::result::Result<T, E>;

/// Errors reported to callers of the engine.
///
/// These describe misuse of the public API (an id that is already present, or one
/// that is missing) and invalid configuration. Internal corruption is reported
/// separately as an [`InvariantViolation`].
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum RankError {
    #[error("entity {0} is already ranked")]
    DuplicateId(EntityId),

    #[error("entity {0} is not ranked")]
    NotFound(EntityId),

    #[error("bucket capacity {capacity} is below the minimum of {min}")]
    InvalidCapacity { capacity: usize, min: usize },
}

/// A broken structural invariant, found by
/// [`RankedEngine::check_invariants`](crate::RankedEngine::check_invariants).
///
/// Any of these indicates a defect in the index itself, never caller misuse.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum InvariantViolation {
    #[error("entries out of order at position {position}: {before:?} is not ahead of {after:?}")]
    Order { position: usize, before: Entry, after: Entry },

    #[error("cached count {cached} differs from actual {actual} at depth {depth}")]
    Count { depth: usize, cached: usize, actual: usize },

    #[error("cached height {cached} differs from actual {actual} at depth {depth}")]
    Height { depth: usize, cached: usize, actual: usize },

    #[error("node at depth {depth} is unbalanced: left height {left}, right height {right}")]
    Balance { depth: usize, left: usize, right: usize },

    #[error("cached boundary at depth {depth} differs from subtree content")]
    Boundary { depth: usize },

    #[error("leaf at depth {depth} holds {len} entries, outside [{min}, {max}]")]
    Fill { depth: usize, len: usize, min: usize, max: usize },

    #[error("identity index holds {indexed} entries but the tree holds {ranked}")]
    IndexSize { indexed: usize, ranked: usize },

    #[error("identity index disagrees with the tree for entity {0}")]
    IndexMismatch(EntityId),
}
