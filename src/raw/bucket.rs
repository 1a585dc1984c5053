use crate::entry::Entry;

/// Fixed-capacity sorted run of entries. The only entry storage in the tree.
///
/// `entries[0]` is the best-ranked entry of the bucket.
pub(crate) struct Bucket {
    entries: Vec<Entry>,
    capacity: usize,
}

impl Bucket {
    /// Creates an empty bucket with room for `capacity` entries.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Creates a bucket from entries that are already sorted.
    pub(crate) fn from_sorted(entries: &[Entry], capacity: usize) -> Self {
        debug_assert!(entries.len() <= capacity, "bulk bucket exceeds capacity");
        debug_assert!(entries.is_sorted(), "bulk bucket is not sorted");
        let mut bucket = Self::with_capacity(capacity);
        bucket.entries.extend_from_slice(entries);
        bucket
    }

    /// An empty bucket that owns no storage. Only used as a stand-in while a node is
    /// being replaced.
    pub(crate) const fn detached() -> Self {
        Self {
            entries: Vec::new(),
            capacity: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn first(&self) -> Option<&Entry> {
        self.entries.first()
    }

    #[inline]
    pub(crate) fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    #[inline]
    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Binary search: `Ok(index)` when present, `Err(index)` with the insertion point otherwise.
    #[inline]
    pub(crate) fn search(&self, entry: &Entry) -> Result<usize, usize> {
        self.entries.binary_search(entry)
    }

    /// Inserts `entry` in order and returns its index. The bucket must not be full.
    pub(crate) fn insert(&mut self, entry: Entry) -> usize {
        debug_assert!(!self.is_full(), "insert into a full bucket; split first");
        let index = match self.search(&entry) {
            Ok(index) | Err(index) => index,
        };
        self.entries.insert(index, entry);
        index
    }

    /// Removes `entry` and returns the index it occupied, or `None` if it is not here.
    pub(crate) fn remove(&mut self, entry: &Entry) -> Option<usize> {
        let index = self.search(entry).ok()?;
        self.entries.remove(index);
        Some(index)
    }

    /// Splits a full bucket at its midpoint while inserting `entry`.
    ///
    /// `self` keeps the better half and the returned bucket holds the worse half.
    /// `entry` lands in whichever half its order selects. The returned index is the
    /// position of `entry` across both halves.
    pub(crate) fn split(&mut self, entry: Entry) -> (Bucket, usize) {
        let mid = self.entries.len() / 2;
        let index = match self.search(&entry) {
            Ok(index) | Err(index) => index,
        };

        let mut right = Bucket::with_capacity(self.capacity);
        right.entries.extend(self.entries.drain(mid..));

        if index >= mid {
            right.entries.insert(index - mid, entry);
        } else {
            self.entries.insert(index, entry);
        }

        (right, index)
    }

    /// Appends every entry of `other`, which must all rank after this bucket's entries.
    pub(crate) fn combine(&mut self, mut other: Bucket) {
        debug_assert!(self.len() + other.len() <= self.capacity, "combined buckets overflow");
        debug_assert!(
            match (self.last(), other.first()) {
                (Some(last), Some(first)) => last < first,
                _ => true,
            },
            "combined buckets overlap"
        );
        self.entries.append(&mut other.entries);
    }

    /// Removes and returns the `count` best entries.
    pub(crate) fn take_front(&mut self, count: usize) -> Vec<Entry> {
        self.entries.drain(..count).collect()
    }

    /// Removes and returns the `count` worst entries.
    pub(crate) fn take_back(&mut self, count: usize) -> Vec<Entry> {
        let at = self.entries.len() - count;
        self.entries.split_off(at)
    }

    /// Inserts entries that all rank ahead of this bucket's entries.
    pub(crate) fn prepend(&mut self, entries: Vec<Entry>) {
        debug_assert!(self.len() + entries.len() <= self.capacity, "prepend overflows bucket");
        self.entries.splice(0..0, entries);
    }

    /// Appends entries that all rank behind this bucket's entries.
    pub(crate) fn append(&mut self, mut entries: Vec<Entry>) {
        debug_assert!(self.len() + entries.len() <= self.capacity, "append overflows bucket");
        self.entries.append(&mut entries);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::entry::Timestamp;
    use proptest::prelude::*;

    fn entry(id: u64, score: i64) -> Entry {
        Entry::new(id, score, Timestamp(0))
    }

    fn scores(bucket: &Bucket) -> Vec<i64> {
        bucket.entries().iter().map(|e| e.score).collect()
    }

    #[test]
    fn insert_keeps_best_first() {
        let mut bucket = Bucket::with_capacity(8);
        assert_eq!(bucket.insert(entry(1, 10)), 0);
        assert_eq!(bucket.insert(entry(2, 30)), 0);
        assert_eq!(bucket.insert(entry(3, 20)), 1);
        assert_eq!(scores(&bucket), [30, 20, 10]);
        assert_eq!(bucket.first(), Some(&entry(2, 30)));
        assert_eq!(bucket.last(), Some(&entry(1, 10)));
    }

    #[test]
    fn remove_reports_position() {
        let mut bucket = Bucket::from_sorted(&[entry(1, 30), entry(2, 20), entry(3, 10)], 4);
        assert_eq!(bucket.remove(&entry(2, 20)), Some(1));
        assert_eq!(bucket.remove(&entry(2, 20)), None);
        assert_eq!(scores(&bucket), [30, 10]);
    }

    #[test]
    fn split_places_incoming_entry_right() {
        let mut bucket = Bucket::from_sorted(&[entry(1, 40), entry(2, 30), entry(3, 20), entry(4, 10)], 4);
        assert!(bucket.is_full());
        let (right, index) = bucket.split(entry(5, 15));
        assert_eq!(index, 3);
        assert_eq!(scores(&bucket), [40, 30]);
        assert_eq!(scores(&right), [20, 15, 10]);
    }

    #[test]
    fn split_places_incoming_entry_left() {
        let mut bucket = Bucket::from_sorted(&[entry(1, 40), entry(2, 30), entry(3, 20), entry(4, 10)], 4);
        let (right, index) = bucket.split(entry(5, 50));
        assert_eq!(index, 0);
        assert_eq!(scores(&bucket), [50, 40, 30]);
        assert_eq!(scores(&right), [20, 10]);
    }

    #[test]
    fn combine_and_transfer() {
        let mut left = Bucket::from_sorted(&[entry(1, 40), entry(2, 30)], 6);
        let right = Bucket::from_sorted(&[entry(3, 20), entry(4, 10)], 6);
        left.combine(right);
        assert_eq!(scores(&left), [40, 30, 20, 10]);

        let front = left.take_front(1);
        let back = left.take_back(2);
        assert_eq!(scores(&left), [30]);
        left.prepend(front);
        left.append(back);
        assert_eq!(scores(&left), [40, 30, 20, 10]);
    }

    proptest! {
        #[test]
        fn split_preserves_content(mut values in prop::collection::btree_set(0i64..1000, 9..=9)) {
            let extra = values.pop_first().unwrap_or_default();
            let sorted: Vec<Entry> = values.iter().rev().map(|&s| entry(s as u64, s)).collect();
            let mut bucket = Bucket::from_sorted(&sorted, 8);
            let incoming = entry(extra as u64, extra);
            let (right, index) = bucket.split(incoming);

            let mut all: Vec<Entry> = bucket.entries().to_vec();
            all.extend_from_slice(right.entries());
            prop_assert!(all.is_sorted());
            prop_assert_eq!(all.len(), 9);
            prop_assert_eq!(all[index], incoming);
            prop_assert!(bucket.len() >= 4 && right.len() >= 4);
        }
    }
}
