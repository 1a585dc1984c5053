use core::iter::FusedIterator;
use core::slice;

use smallvec::SmallVec;

use crate::entry::{Entry, Ranked};
use crate::raw::Node;

/// A best-first iterator over the entries of a [`RankedEngine`](super::RankedEngine),
/// yielding each entry with its rank.
///
/// This `struct` is created by the [`iter`](super::RankedEngine::iter) method.
///
/// # Examples
///
/// ```
/// use ranked_index::{Entry, RankedEngine, Timestamp};
///
/// let board = RankedEngine::from_entries((0..10).map(|id| Entry::new(id, 0, Timestamp(id)))).unwrap();
/// let mut iter = board.iter();
/// assert_eq!(iter.len(), 10);
/// assert_eq!(iter.next().map(|r| r.entry.id), Some(9));
/// assert_eq!(iter.len(), 9);
/// ```
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Clone)]
pub struct Iter<'a> {
    // Right subtrees still to visit, nearest on top.
    pending: SmallVec<[&'a Node; 32]>,
    bucket: slice::Iter<'a, Entry>,
    position: usize,
    remaining: usize,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(root: &'a Node) -> Self {
        let mut iter = Iter {
            pending: SmallVec::new(),
            bucket: [].iter(),
            position: 0,
            remaining: root.len(),
        };
        iter.descend(root);
        iter
    }

    /// Walks to the leftmost leaf of `node`, stacking the right siblings passed on the way.
    fn descend(&mut self, mut node: &'a Node) {
        loop {
            match node {
                Node::Internal(internal) => {
                    self.pending.push(internal.right());
                    node = internal.left();
                }
                Node::Leaf(bucket) => {
                    self.bucket = bucket.entries().iter();
                    return;
                }
            }
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = Ranked;

    fn next(&mut self) -> Option<Ranked> {
        loop {
            if let Some(entry) = self.bucket.next() {
                let ranked = Ranked::at_position(*entry, self.position);
                self.position += 1;
                self.remaining -= 1;
                return Some(ranked);
            }
            let node = self.pending.pop()?;
            self.descend(node);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
