//! An in-memory ranking index for leaderboards.
//!
//! [`RankedEngine`] keeps scored entities in best-first order and answers, in
//! O(log n):
//!
//! - [`rank_of`](RankedEngine::rank_of) - the 1-based rank of an entity
//! - [`top_n`](RankedEngine::top_n) - the best `n` entities
//! - [`around`](RankedEngine::around) - an entity and its `k` nearest neighbors on each side
//!
//! while supporting point [`add`](RankedEngine::add), [`update`](RankedEngine::update)
//! and [`remove`](RankedEngine::remove).
//!
//! # Example
//!
//! ```
//! use ranked_index::{Entry, Rank, RankedEngine, Timestamp};
//!
//! let mut board = RankedEngine::from_entries([
//!     Entry::new(1, 100, Timestamp(0)),
//!     Entry::new(2, 100, Timestamp(1)),
//!     Entry::new(3, 50, Timestamp(0)),
//! ])
//! .unwrap();
//!
//! // Equal scores: the more recently active entity ranks first.
//! assert_eq!(board.rank_of(2).unwrap().rank, Rank(1));
//! assert_eq!(board.rank_of(1).unwrap().rank, Rank(2));
//!
//! assert_eq!(board.add(Entry::new(4, 200, Timestamp(2))), Ok(Rank(1)));
//! assert_eq!(board.rank_of(3).unwrap().rank, Rank(4));
//!
//! let window: Vec<u64> = board.around(2, 1).unwrap().iter().map(|r| r.entry.id).collect();
//! assert_eq!(window, [4, 2, 1]);
//! ```
//!
//! # Features
//!
//! - **`serde`** - `Serialize`/`Deserialize` for entries, ranks, standings and
//!   [`EngineConfig`]
//!
//! # Implementation
//!
//! Entries are stored in fixed-capacity sorted buckets. Each bucket is a leaf of an AVL
//! tree whose internal nodes cache the entry count and the best and worst entry of
//! their subtree. Rank queries sum left-subtree counts on the way down; mutations split
//! full buckets, merge or refill sparse ones, and rotate to keep the tree balanced.
//! An identity index maps each id to its current entry so updates and removals never
//! search the tree by id.

// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod config;
mod engine;
mod entry;
mod error;
mod ranking;
mod raw;
mod shared;

pub use config::{DEFAULT_BUCKET_CAPACITY, EngineConfig, MIN_BUCKET_CAPACITY};
pub use engine::{Iter, RankedEngine, Standings};
pub use entry::{EntityId, Entry, Rank, Ranked, Score, Timestamp};
pub use error::{InvariantViolation, RankError, Result};
pub use ranking::RankingList;
pub use shared::SharedRankedEngine;
