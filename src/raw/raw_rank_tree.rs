use smallvec::SmallVec;
use tracing::debug;

use super::bucket::Bucket;
use super::node::{Internal, Node};
use crate::config::EngineConfig;
use crate::entry::{Entry, Ranked};
use crate::error::InvariantViolation;

/// The bucketed AVL tree backing `RankedEngine`. Knows nothing about entity ids.
pub(crate) struct RawRankTree {
    root: Node,
    config: EngineConfig,
}

/// Which child a descent took at an internal node.
#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Path element recorded while descending towards an entry.
struct PathElement<'a> {
    node: &'a Internal,
    went: Side,
}

/// Type alias for a root-to-leaf path (stack of path elements).
type Path<'a> = SmallVec<[PathElement<'a>; 32]>;

impl RawRankTree {
    /// Creates an empty tree.
    pub(crate) fn new(config: EngineConfig) -> Self {
        Self {
            root: Node::Leaf(Bucket::with_capacity(config.bucket_capacity)),
            config,
        }
    }

    /// Bulk-loads entries that are sorted best-first and distinct.
    ///
    /// Entries are spread evenly over `ceil(n / initial_fill)` buckets, so every bucket
    /// starts at or below half capacity and, when there is more than one, at or above the
    /// fill floor. The tree is then built bottom-up in O(n).
    pub(crate) fn from_sorted(config: EngineConfig, entries: &[Entry]) -> Self {
        debug_assert!(entries.is_sorted(), "bulk load input is not sorted");
        if entries.is_empty() {
            return Self::new(config);
        }

        let count = entries.len().div_ceil(config.initial_fill());
        let base = entries.len() / count;
        let extra = entries.len() % count;
        let mut offset = 0;
        let mut buckets = (0..count).map(|i| {
            let len = base + usize::from(i < extra);
            let bucket = Bucket::from_sorted(&entries[offset..offset + len], config.bucket_capacity);
            offset += len;
            bucket
        });

        let root = Node::build(&mut buckets, count);
        debug!(entries = entries.len(), buckets = count, height = root.height(), "bulk loaded rank tree");
        Self { root, config }
    }

    pub(crate) fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn root(&self) -> &Node {
        &self.root
    }

    pub(crate) fn len(&self) -> usize {
        self.root.len()
    }

    pub(crate) fn height(&self) -> usize {
        self.root.height()
    }

    pub(crate) fn clear(&mut self) {
        self.root = Node::Leaf(Bucket::with_capacity(self.config.bucket_capacity));
    }

    /// Inserts an entry that is not yet present and returns its 0-based position.
    pub(crate) fn insert(&mut self, entry: Entry) -> usize {
        self.root.insert(entry, &self.config)
    }

    /// Removes an entry and returns the 0-based position it held.
    pub(crate) fn remove(&mut self, entry: &Entry) -> Option<usize> {
        self.root.remove(entry, &self.config)
    }

    /// Returns the 0-based position of `entry`.
    pub(crate) fn position_of(&self, entry: &Entry) -> Option<usize> {
        let mut current = &self.root;
        let mut position = 0;

        loop {
            match current {
                Node::Internal(internal) => {
                    if internal.routes_left(entry) {
                        current = internal.left();
                    } else {
                        position += internal.left().len();
                        current = internal.right();
                    }
                }
                Node::Leaf(bucket) => return bucket.search(entry).ok().map(|index| position + index),
            }
        }
    }

    /// Returns the entry at the 0-based `position`.
    pub(crate) fn select(&self, position: usize) -> Option<&Entry> {
        if position >= self.len() {
            return None;
        }

        let mut current = &self.root;
        let mut remaining = position;

        loop {
            match current {
                Node::Internal(internal) => {
                    let left_len = internal.left().len();
                    if remaining < left_len {
                        current = internal.left();
                    } else {
                        remaining -= left_len;
                        current = internal.right();
                    }
                }
                Node::Leaf(bucket) => return bucket.entries().get(remaining),
            }
        }
    }

    /// Returns up to `k` entries on each side of `entry`, plus `entry` itself, best-first.
    ///
    /// Phase one descends to the owning bucket, recording the path, and takes the
    /// neighbors available inside that bucket. Phase two walks the path back up from the
    /// deepest ancestor and harvests the sibling subtree on whichever side is still short,
    /// nearest entries first. Returns an empty vector if `entry` is not in the tree.
    pub(crate) fn around(&self, entry: &Entry, k: usize) -> Vec<Ranked> {
        // Phase 1
        let mut path: Path<'_> = SmallVec::new();
        let mut current = &self.root;
        let mut offset = 0;

        let bucket = loop {
            match current {
                Node::Internal(internal) => {
                    if internal.routes_left(entry) {
                        path.push(PathElement {
                            node: internal,
                            went: Side::Left,
                        });
                        current = internal.left();
                    } else {
                        offset += internal.left().len();
                        path.push(PathElement {
                            node: internal,
                            went: Side::Right,
                        });
                        current = internal.right();
                    }
                }
                Node::Leaf(bucket) => break bucket,
            }
        };

        let found = bucket.search(entry);
        debug_assert!(found.is_ok(), "around: {entry:?} is not in the tree");
        let Ok(index) = found else {
            return Vec::new();
        };
        let entries = bucket.entries();

        // Both sides are kept nearest-first.
        let mut before: Vec<Entry> = entries[index.saturating_sub(k)..index].iter().rev().copied().collect();
        let mut after: Vec<Entry> = entries[index + 1..].iter().take(k).copied().collect();

        // Phase 2
        for elem in path.iter().rev() {
            if before.len() >= k && after.len() >= k {
                break;
            }
            match elem.went {
                Side::Left if after.len() < k => harvest_forward(elem.node.right(), k, &mut after),
                Side::Right if before.len() < k => harvest_backward(elem.node.left(), k, &mut before),
                _ => {}
            }
        }

        let first = offset + index - before.len();
        before
            .into_iter()
            .rev()
            .chain(core::iter::once(entries[index]))
            .chain(after)
            .enumerate()
            .map(|(i, entry)| Ranked::at_position(entry, first + i))
            .collect()
    }

    /// Audits every structural invariant of the tree and returns its entries best-first.
    pub(crate) fn audit(&self) -> Result<Vec<Entry>, InvariantViolation> {
        let mut entries = Vec::with_capacity(self.len());
        audit_node(&self.root, 0, &self.config, &mut entries)?;

        if let Some(position) = entries.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(InvariantViolation::Order {
                position,
                before: entries[position],
                after: entries[position + 1],
            });
        }
        Ok(entries)
    }
}

/// Appends entries of `node` best-first until `out` holds `quota` entries.
fn harvest_forward(node: &Node, quota: usize, out: &mut Vec<Entry>) {
    match node {
        Node::Leaf(bucket) => {
            let need = quota.saturating_sub(out.len());
            out.extend(bucket.entries().iter().take(need).copied());
        }
        Node::Internal(internal) => {
            harvest_forward(internal.left(), quota, out);
            if out.len() < quota {
                harvest_forward(internal.right(), quota, out);
            }
        }
    }
}

/// Appends entries of `node` worst-first until `out` holds `quota` entries.
fn harvest_backward(node: &Node, quota: usize, out: &mut Vec<Entry>) {
    match node {
        Node::Leaf(bucket) => {
            let need = quota.saturating_sub(out.len());
            out.extend(bucket.entries().iter().rev().take(need).copied());
        }
        Node::Internal(internal) => {
            harvest_backward(internal.right(), quota, out);
            if out.len() < quota {
                harvest_backward(internal.left(), quota, out);
            }
        }
    }
}

/// Checks one subtree and returns its actual height.
fn audit_node(
    node: &Node,
    depth: usize,
    config: &EngineConfig,
    entries: &mut Vec<Entry>,
) -> Result<usize, InvariantViolation> {
    match node {
        Node::Leaf(bucket) => {
            // The root leaf may hold anything from zero entries up.
            let min = if depth == 0 { 0 } else { config.min_fill() };
            let max = config.bucket_capacity;
            if bucket.len() < min || bucket.len() > max || bucket.capacity() != max {
                return Err(InvariantViolation::Fill {
                    depth,
                    len: bucket.len(),
                    min,
                    max,
                });
            }
            entries.extend_from_slice(bucket.entries());
            Ok(0)
        }
        Node::Internal(internal) => {
            let start = entries.len();
            let left = audit_node(internal.left(), depth + 1, config, entries)?;
            let right = audit_node(internal.right(), depth + 1, config, entries)?;

            let actual = entries.len() - start;
            if internal.len() != actual {
                return Err(InvariantViolation::Count {
                    depth,
                    cached: internal.len(),
                    actual,
                });
            }

            let height = 1 + left.max(right);
            if internal.height() != height {
                return Err(InvariantViolation::Height {
                    depth,
                    cached: internal.height(),
                    actual: height,
                });
            }
            if left.abs_diff(right) > 1 {
                return Err(InvariantViolation::Balance { depth, left, right });
            }

            let subtree = &entries[start..];
            if subtree.first() != Some(internal.min()) || subtree.last() != Some(internal.max()) {
                return Err(InvariantViolation::Boundary { depth });
            }
            Ok(height)
        }
    }
}
