use core::mem;

use tracing::trace;

use super::bucket::Bucket;
use crate::config::EngineConfig;
use crate::entry::Entry;

/// A tree node: a leaf owns one bucket, an internal node owns exactly two children.
///
/// Every entry under `left` ranks ahead of every entry under `right`, and the heights
/// of the two children of an internal node differ by at most one.
pub(crate) enum Node {
    Leaf(Bucket),
    Internal(Internal),
}

/// Internal node with cached subtree metadata.
pub(crate) struct Internal {
    left: Box<Node>,
    right: Box<Node>,
    // Number of entries in the subtree.
    len: usize,
    // Leaves have height 0.
    height: usize,
    // Best and worst entries in the subtree, used to route descents.
    min: Entry,
    max: Entry,
}

impl Node {
    /// A leaf that owns no storage, used as a stand-in while a node is replaced.
    pub(crate) const fn vacant() -> Self {
        Node::Leaf(Bucket::detached())
    }

    /// Builds a height-balanced tree over `count` sorted buckets.
    pub(crate) fn build(buckets: &mut impl Iterator<Item = Bucket>, count: usize) -> Self {
        debug_assert!(count > 0, "cannot build a tree over zero buckets");
        if count == 1 {
            return match buckets.next() {
                Some(bucket) => Node::Leaf(bucket),
                None => panic!("bucket iterator ended early"),
            };
        }
        let left = Node::build(buckets, count / 2);
        let right = Node::build(buckets, count - count / 2);
        Node::Internal(Internal::join(Box::new(left), Box::new(right)))
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        match self {
            Node::Leaf(bucket) => bucket.len(),
            Node::Internal(inner) => inner.len,
        }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub(crate) fn height(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Internal(inner) => inner.height,
        }
    }

    /// Best-ranked entry of the subtree.
    #[inline]
    pub(crate) fn first(&self) -> Option<&Entry> {
        match self {
            Node::Leaf(bucket) => bucket.first(),
            Node::Internal(inner) => Some(&inner.min),
        }
    }

    /// Worst-ranked entry of the subtree.
    #[inline]
    pub(crate) fn last(&self) -> Option<&Entry> {
        match self {
            Node::Leaf(bucket) => bucket.last(),
            Node::Internal(inner) => Some(&inner.max),
        }
    }

    fn balance(&self) -> isize {
        match self {
            Node::Leaf(_) => 0,
            Node::Internal(inner) => inner.balance(),
        }
    }

    fn is_underfull(&self, config: &EngineConfig) -> bool {
        matches!(self, Node::Leaf(bucket) if bucket.len() < config.min_fill())
    }

    /// Replaces this node with `f(node)`.
    fn replace_with(&mut self, f: impl FnOnce(Node) -> Node) {
        let node = mem::replace(self, Node::vacant());
        *self = f(node);
    }

    /// Inserts `entry` and returns its 0-based position within this subtree.
    pub(crate) fn insert(&mut self, entry: Entry, config: &EngineConfig) -> usize {
        match self {
            Node::Leaf(bucket) => {
                if !bucket.is_full() {
                    return bucket.insert(entry);
                }
                let (right, position) = bucket.split(entry);
                let left = mem::replace(bucket, Bucket::detached());
                trace!(left = left.len(), right = right.len(), "split bucket");
                *self = Node::Internal(Internal::join(Box::new(Node::Leaf(left)), Box::new(Node::Leaf(right))));
                position
            }
            Node::Internal(inner) => {
                let position = if inner.routes_left(&entry) {
                    inner.left.insert(entry, config)
                } else {
                    inner.left.len() + inner.right.insert(entry, config)
                };
                self.settle(config);
                position
            }
        }
    }

    /// Removes `entry` and returns the 0-based position it held within this subtree,
    /// or `None` if the subtree does not contain it.
    pub(crate) fn remove(&mut self, entry: &Entry, config: &EngineConfig) -> Option<usize> {
        match self {
            Node::Leaf(bucket) => bucket.remove(entry),
            Node::Internal(inner) => {
                let position = if inner.routes_left(entry) {
                    inner.left.remove(entry, config)?
                } else {
                    inner.left.len() + inner.right.remove(entry, config)?
                };
                self.settle(config);
                Some(position)
            }
        }
    }

    /// Post-mutation policy for an internal node whose child just changed, in order of
    /// precedence: collapse an empty child, merge a small subtree into one bucket,
    /// repair an underfull leaf child, then restore AVL balance.
    fn settle(&mut self, config: &EngineConfig) {
        let Node::Internal(inner) = self else {
            return;
        };

        if inner.left.is_empty() || inner.right.is_empty() {
            self.collapse();
            return;
        }

        inner.refresh();
        if inner.len < config.min_fill() {
            self.merge_children();
            return;
        }

        if inner.left.is_underfull(config) {
            if inner.left.len() + inner.right.front_bucket().len() <= config.bucket_capacity {
                let entries = inner.left.take_front(inner.left.len());
                trace!(moved = entries.len(), "absorbed underfull leaf into right neighbor");
                inner.right.prepend(entries);
                self.collapse();
                return;
            }
            let total = inner.left.len() + inner.right.front_bucket().len();
            let moved = inner.right.take_front(total / 2 - inner.left.len());
            trace!(moved = moved.len(), "refilled underfull leaf from right neighbor");
            inner.left.append(moved);
            inner.refresh();
        } else if inner.right.is_underfull(config) {
            if inner.right.len() + inner.left.back_bucket().len() <= config.bucket_capacity {
                let entries = inner.right.take_back(inner.right.len());
                trace!(moved = entries.len(), "absorbed underfull leaf into left neighbor");
                inner.left.append(entries);
                self.collapse();
                return;
            }
            let total = inner.right.len() + inner.left.back_bucket().len();
            let moved = inner.left.take_back(total / 2 - inner.right.len());
            trace!(moved = moved.len(), "refilled underfull leaf from left neighbor");
            inner.right.prepend(moved);
            inner.refresh();
        }

        self.rebalance();
    }

    /// Replaces this node with its only non-empty child.
    fn collapse(&mut self) {
        self.replace_with(|node| match node {
            Node::Internal(inner) if inner.left.is_empty() => *inner.right,
            Node::Internal(inner) => *inner.left,
            leaf => leaf,
        });
    }

    /// Combines the whole subtree into a single leaf.
    fn merge_children(&mut self) {
        self.replace_with(|node| {
            let bucket = node.into_bucket();
            trace!(len = bucket.len(), "merged subtree into one bucket");
            Node::Leaf(bucket)
        });
    }

    fn into_bucket(self) -> Bucket {
        match self {
            Node::Leaf(bucket) => bucket,
            Node::Internal(inner) => {
                let mut bucket = inner.left.into_bucket();
                bucket.combine(inner.right.into_bucket());
                bucket
            }
        }
    }

    fn rebalance(&mut self) {
        let Node::Internal(inner) = self else {
            return;
        };
        let balance = inner.balance();
        debug_assert!((-2..=2).contains(&balance), "balance {balance} out of reach of one rotation");

        if balance > 1 {
            if inner.left.balance() < 0 {
                inner.left.rotate_left();
            }
            self.rotate_right();
        } else if balance < -1 {
            if inner.right.balance() > 0 {
                inner.right.rotate_right();
            }
            self.rotate_left();
        }
    }

    fn rotate_left(&mut self) {
        self.replace_with(|node| match node {
            Node::Internal(inner) => Node::Internal(inner.rotated_left()),
            Node::Leaf(_) => panic!("expected internal node"),
        });
    }

    fn rotate_right(&mut self) {
        self.replace_with(|node| match node {
            Node::Internal(inner) => Node::Internal(inner.rotated_right()),
            Node::Leaf(_) => panic!("expected internal node"),
        });
    }

    /// The leaf holding the best entries of the subtree.
    pub(crate) fn front_bucket(&self) -> &Bucket {
        match self {
            Node::Leaf(bucket) => bucket,
            Node::Internal(inner) => inner.left.front_bucket(),
        }
    }

    /// The leaf holding the worst entries of the subtree.
    pub(crate) fn back_bucket(&self) -> &Bucket {
        match self {
            Node::Leaf(bucket) => bucket,
            Node::Internal(inner) => inner.right.back_bucket(),
        }
    }

    // The four spine operations below move entries in or out of the front or back leaf
    // and refresh the cached metadata on the way back up. They never change heights.

    fn take_front(&mut self, count: usize) -> Vec<Entry> {
        match self {
            Node::Leaf(bucket) => bucket.take_front(count),
            Node::Internal(inner) => {
                let entries = inner.left.take_front(count);
                inner.refresh();
                entries
            }
        }
    }

    fn take_back(&mut self, count: usize) -> Vec<Entry> {
        match self {
            Node::Leaf(bucket) => bucket.take_back(count),
            Node::Internal(inner) => {
                let entries = inner.right.take_back(count);
                inner.refresh();
                entries
            }
        }
    }

    fn prepend(&mut self, entries: Vec<Entry>) {
        match self {
            Node::Leaf(bucket) => bucket.prepend(entries),
            Node::Internal(inner) => {
                inner.left.prepend(entries);
                inner.refresh();
            }
        }
    }

    fn append(&mut self, entries: Vec<Entry>) {
        match self {
            Node::Leaf(bucket) => bucket.append(entries),
            Node::Internal(inner) => {
                inner.right.append(entries);
                inner.refresh();
            }
        }
    }
}

impl Internal {
    /// Creates an internal node over two non-empty, ordered subtrees.
    pub(crate) fn join(left: Box<Node>, right: Box<Node>) -> Self {
        let mut inner = Internal {
            len: 0,
            height: 0,
            min: *boundary(left.first()),
            max: *boundary(right.last()),
            left,
            right,
        };
        inner.refresh();
        inner
    }

    #[inline]
    pub(crate) fn left(&self) -> &Node {
        &self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> &Node {
        &self.right
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub(crate) fn min(&self) -> &Entry {
        &self.min
    }

    #[inline]
    pub(crate) fn max(&self) -> &Entry {
        &self.max
    }

    /// Whether a descent for `entry` continues into the left child.
    #[inline]
    pub(crate) fn routes_left(&self, entry: &Entry) -> bool {
        self.right.first().is_some_and(|min| entry < min)
    }

    #[allow(clippy::cast_possible_wrap)]
    fn balance(&self) -> isize {
        self.left.height() as isize - self.right.height() as isize
    }

    /// Recomputes count, height and boundaries from the children.
    fn refresh(&mut self) {
        self.len = self.left.len() + self.right.len();
        self.height = 1 + self.left.height().max(self.right.height());
        self.min = *boundary(self.left.first());
        self.max = *boundary(self.right.last());
    }

    fn rotated_left(self) -> Internal {
        let Internal { left: a, right, .. } = self;
        let Node::Internal(pivot) = *right else {
            panic!("expected internal node");
        };
        let Internal { left: b, right: c, .. } = pivot;
        trace!("rotate left");
        Internal::join(Box::new(Node::Internal(Internal::join(a, b))), c)
    }

    fn rotated_right(self) -> Internal {
        let Internal { left, right: c, .. } = self;
        let Node::Internal(pivot) = *left else {
            panic!("expected internal node");
        };
        let Internal { left: a, right: b, .. } = pivot;
        trace!("rotate right");
        Internal::join(a, Box::new(Node::Internal(Internal::join(b, c))))
    }
}

#[inline]
fn boundary(entry: Option<&Entry>) -> &Entry {
    match entry {
        Some(entry) => entry,
        None => panic!("children of an internal node are never empty"),
    }
}
